//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ledger policy configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Reconciler job configuration.
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

/// Ledger policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Days after creation before an unapplied credit expires.
    #[serde(default = "default_credit_expiry_days")]
    pub credit_expiry_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            credit_expiry_days: default_credit_expiry_days(),
        }
    }
}

fn default_credit_expiry_days() -> u32 {
    365
}

/// Reconciler job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Pretty-print the report JSON.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REMITA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.credit_expiry_days, 365);

        let reconciler = ReconcilerConfig::default();
        assert!(reconciler.pretty);
    }

    #[test]
    fn test_deserialize_partial() {
        // Sections are optional; omitted fields fall back to defaults.
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[ledger]\ncredit_expiry_days = 90\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.ledger.credit_expiry_days, 90);
        assert!(cfg.reconciler.pretty);
    }
}
