//! Transfer message schema and codec.
//!
//! The message is the only coupling point between the intake gateway and the
//! consumer, so both ends validate against the exact same rule set here:
//! the producer before publishing (defense before commit), the consumer
//! before applying (defense against corrupted or replayed payloads).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum digits before the decimal point.
pub const MAX_INTEGER_DIGITS: u32 = 24;
/// Maximum digits after the decimal point.
pub const MAX_FRACTIONAL_DIGITS: u32 = 8;

/// Schema violations. None of these are recoverable by redelivery.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("malformed transfer message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error(
        "amount exceeds {MAX_INTEGER_DIGITS} integer / {MAX_FRACTIONAL_DIGITS} fractional digits"
    )]
    AmountOutOfBounds,
}

/// A transfer request as it travels over the queue.
///
/// The schema is closed: unknown fields fail deserialization. The `ammount`
/// spelling is a frozen cross-process wire contract and must not be fixed
/// unilaterally on either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferMessage {
    #[serde(rename = "messageId")]
    pub message_id: Uuid,
    pub from: i64,
    pub to: i64,
    #[serde(
        rename = "ammount",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    pub amount: Decimal,
}

impl TransferMessage {
    /// Build a message with a freshly minted idempotency key.
    pub fn new(from: i64, to: i64, amount: Decimal) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            from,
            to,
            amount,
        }
    }

    /// Apply the shared amount rules. Structural checks (field types,
    /// closed object, UUID format) already happened at deserialization.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.amount <= Decimal::ZERO {
            return Err(SchemaError::NonPositiveAmount);
        }
        if !amount_in_bounds(&self.amount) {
            return Err(SchemaError::AmountOutOfBounds);
        }
        Ok(())
    }

    /// Validate, then serialize for publishing.
    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        self.validate()?;
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate an inbound payload.
    pub fn decode(payload: &[u8]) -> Result<Self, SchemaError> {
        let msg: TransferMessage = serde_json::from_slice(payload)?;
        msg.validate()?;
        Ok(msg)
    }
}

/// Check the 24-integer / 8-fractional digit bound.
///
/// Trailing zeros are not significant: `1.000000000` (scale 9) passes.
pub fn amount_in_bounds(amount: &Decimal) -> bool {
    let normalized = amount.normalize();
    if normalized.scale() > MAX_FRACTIONAL_DIGITS {
        return false;
    }
    // 10^24: smallest value whose integral part needs 25 digits
    let integral_limit = Decimal::from_i128_with_scale(1_000_000_000_000_000_000_000_000, 0);
    normalized.trunc().abs() < integral_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let msg = TransferMessage::new(1, 2, dec("1000.5"));
        let bytes = msg.encode().unwrap();
        let parsed = TransferMessage::decode(&bytes).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_wire_field_names() {
        let msg = TransferMessage::new(1, 2, dec("10"));
        let json: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("messageId"));
        assert!(obj.contains_key("ammount"));
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let payload = format!(
            r#"{{"messageId":"{}","from":1,"to":2,"ammount":10,"note":"hi"}}"#,
            Uuid::new_v4()
        );
        assert!(TransferMessage::decode(payload.as_bytes()).is_err());
    }

    #[test]
    fn test_garbage_types_rejected() {
        // Mirrors the classic bad payload: missing id, string sender,
        // object receiver, empty-string amount.
        let payload = br#"{"from":"a string","to":{},"ammount":""}"#;
        assert!(TransferMessage::decode(payload).is_err());
    }

    #[test]
    fn test_string_amount_rejected() {
        let payload = format!(
            r#"{{"messageId":"{}","from":1,"to":2,"ammount":"10"}}"#,
            Uuid::new_v4()
        );
        assert!(TransferMessage::decode(payload.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let payload = br#"{"messageId":"not-a-uuid","from":1,"to":2,"ammount":10}"#;
        assert!(TransferMessage::decode(payload).is_err());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let zero = TransferMessage::new(1, 2, Decimal::ZERO);
        assert!(matches!(
            zero.validate(),
            Err(SchemaError::NonPositiveAmount)
        ));

        let negative = TransferMessage::new(1, 2, dec("-5"));
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_precision_bounds() {
        // 24 integer digits: largest allowed magnitude class
        assert!(amount_in_bounds(&dec("999999999999999999999999")));
        // 25 integer digits
        assert!(!amount_in_bounds(&dec("1000000000000000000000000")));
        // 8 fractional digits
        assert!(amount_in_bounds(&dec("0.00000001")));
        // 9 fractional digits
        assert!(!amount_in_bounds(&dec("0.000000001")));
        // trailing zeros are not significant digits
        assert!(amount_in_bounds(&dec("1.0000000000")));
    }

    #[test]
    fn test_fresh_message_ids() {
        let a = TransferMessage::new(1, 2, dec("1"));
        let b = TransferMessage::new(1, 2, dec("1"));
        assert_ne!(a.message_id, b.message_id);
    }
}
