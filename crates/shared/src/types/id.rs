//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PaymentId` where an
//! `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(ClientId, "Unique identifier for a billed client.");
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(LineItemId, "Unique identifier for an invoice line item.");
typed_id!(PaymentId, "Unique identifier for a received payment.");
typed_id!(AllocationId, "Unique identifier for a payment allocation.");
typed_id!(CreditId, "Unique identifier for a client credit.");
typed_id!(DisputeId, "Unique identifier for a line-item dispute.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_distinct_types() {
        // Compile-time property: this only checks construction works per type.
        let invoice = InvoiceId::new();
        let payment = PaymentId::new();
        assert_ne!(invoice.into_inner(), payment.into_inner());
    }

    #[test]
    fn test_id_display_round_trip() {
        let id = CreditId::new();
        let parsed = CreditId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_from_uuid() {
        let raw = Uuid::now_v7();
        let id = DisputeId::from_uuid(raw);
        assert_eq!(id.into_inner(), raw);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        // UUID v7 embeds a timestamp, so sequentially created IDs sort in
        // creation order. The credit manager relies on this for tie-breaks.
        let first = InvoiceId::new();
        let second = InvoiceId::new();
        assert!(first <= second);
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert!(PaymentId::from_str("not-a-uuid").is_err());
    }
}
