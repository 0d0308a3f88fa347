//! # Fee Gate
//!
//! Per-message fee and content bound checks. Collection itself is a staged
//! write: [`FeeGate::collect`] returns the settings record with the grown fee
//! pool, which the caller commits in the same batch as the message.

use crate::domain::entities::LedgerSettings;
use crate::domain::value_objects::Amount;
use crate::errors::{LedgerError, LedgerResult};

/// Read-only view over the fee-related settings.
#[derive(Debug, Clone, Copy)]
pub struct FeeGate<'a> {
    settings: &'a LedgerSettings,
}

impl<'a> FeeGate<'a> {
    /// Wraps the current settings.
    #[must_use]
    pub fn new(settings: &'a LedgerSettings) -> Self {
        Self { settings }
    }

    /// Fee required per appended message.
    #[must_use]
    pub fn message_fee(&self) -> Amount {
        self.settings.message_fee
    }

    /// Content bound in bytes.
    #[must_use]
    pub fn max_message_length(&self) -> usize {
        self.settings.max_message_length
    }

    /// Accepts any payment at or above the fee. Surplus is kept, not refunded.
    pub fn require_fee(&self, paid: Amount) -> LedgerResult<()> {
        if paid < self.settings.message_fee {
            return Err(LedgerError::InsufficientFee {
                required: self.settings.message_fee,
                paid,
            });
        }
        Ok(())
    }

    /// Checks `0 < len(content) <= max_message_length` (bytes).
    pub fn validate_content(&self, content: &str) -> LedgerResult<()> {
        if content.is_empty() {
            return Err(LedgerError::EmptyContent);
        }
        let max = self.settings.max_message_length;
        if content.len() > max {
            return Err(LedgerError::ContentTooLong {
                len: content.len(),
                max,
            });
        }
        Ok(())
    }

    /// Settings with `paid` added to the fee pool. Nothing is written here.
    pub fn collect(&self, paid: Amount) -> LedgerResult<LedgerSettings> {
        self.require_fee(paid)?;
        let fee_pool = self
            .settings
            .fee_pool
            .checked_add(paid)
            .ok_or(LedgerError::FeePoolOverflow)?;
        Ok(LedgerSettings {
            fee_pool,
            ..self.settings.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LedgerConfig;

    fn settings(fee: u64, max_len: usize) -> LedgerSettings {
        LedgerSettings::from(&LedgerConfig {
            message_fee: Amount::from(fee),
            max_message_length: max_len,
            ..LedgerConfig::default()
        })
    }

    #[test]
    fn test_require_fee() {
        let s = settings(100, 10);
        let gate = FeeGate::new(&s);
        assert!(gate.require_fee(Amount::from(100u64)).is_ok());
        assert!(gate.require_fee(Amount::from(1_000u64)).is_ok());
        assert_eq!(
            gate.require_fee(Amount::from(99u64)),
            Err(LedgerError::InsufficientFee {
                required: Amount::from(100u64),
                paid: Amount::from(99u64),
            })
        );
    }

    #[test]
    fn test_zero_fee_accepts_zero_payment() {
        let s = settings(0, 10);
        assert!(FeeGate::new(&s).require_fee(Amount::zero()).is_ok());
    }

    #[test]
    fn test_validate_content_bounds() {
        let s = settings(0, 5);
        let gate = FeeGate::new(&s);
        assert_eq!(gate.validate_content(""), Err(LedgerError::EmptyContent));
        assert!(gate.validate_content("12345").is_ok());
        assert_eq!(
            gate.validate_content("123456"),
            Err(LedgerError::ContentTooLong { len: 6, max: 5 })
        );
    }

    #[test]
    fn test_length_is_measured_in_bytes() {
        let s = settings(0, 4);
        let gate = FeeGate::new(&s);
        // Two chars, six bytes
        assert!(matches!(
            gate.validate_content("日本"),
            Err(LedgerError::ContentTooLong { len: 6, max: 4 })
        ));
    }

    #[test]
    fn test_collect_keeps_surplus() {
        let s = settings(100, 10);
        let next = FeeGate::new(&s).collect(Amount::from(150u64)).unwrap();
        assert_eq!(next.fee_pool, Amount::from(150u64));
        // Source settings untouched
        assert!(s.fee_pool.is_zero());
    }

    #[test]
    fn test_collect_rejects_underpayment() {
        let s = settings(100, 10);
        assert!(matches!(
            FeeGate::new(&s).collect(Amount::from(1u64)),
            Err(LedgerError::InsufficientFee { .. })
        ));
    }

    #[test]
    fn test_collect_overflow() {
        let mut s = settings(1, 10);
        s.fee_pool = Amount::MAX;
        assert_eq!(
            FeeGate::new(&s).collect(Amount::from(1u64)),
            Err(LedgerError::FeePoolOverflow)
        );
    }
}
