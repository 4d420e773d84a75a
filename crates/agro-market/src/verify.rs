//! Verification of bundled transfer actions.
//!
//! Each operation states what its accompanying payment or goods transfer
//! must look like, and these checks run before any mutation is attempted.
//! A check either passes or aborts the call; it never changes state.

use std::fmt;

use agro_core::{Address, GoodsTransfer, Payment};

use crate::error::{MarketError, Result};

/// Constraint on the amount moved by a bundled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    /// Exactly this amount.
    Exactly(u64),
    /// This amount or more.
    AtLeast(u64),
    /// Strictly more than this amount.
    GreaterThan(u64),
}

impl AmountRule {
    /// Returns true if `amount` satisfies the rule.
    #[must_use]
    pub const fn accepts(&self, amount: u64) -> bool {
        match *self {
            Self::Exactly(v) => amount == v,
            Self::AtLeast(v) => amount >= v,
            Self::GreaterThan(v) => amount > v,
        }
    }

    fn check(&self, action: &'static str, amount: u64) -> Result<()> {
        if self.accepts(amount) {
            Ok(())
        } else {
            Err(MarketError::amount_rejected(action, self.to_string(), amount))
        }
    }
}

impl fmt::Display for AmountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(v) => write!(f, "exactly {v}"),
            Self::AtLeast(v) => write!(f, "at least {v}"),
            Self::GreaterThan(v) => write!(f, "more than {v}"),
        }
    }
}

/// Requirements for a bundled payment.
#[derive(Debug, Clone, Copy)]
pub struct PaymentCheck {
    /// Required sender, if constrained.
    pub sender: Option<Address>,
    /// Required receiver.
    pub receiver: Address,
    /// Accepted amount, in micro-units.
    pub amount: AmountRule,
}

/// Requirements for a bundled goods transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferCheck {
    /// Required sender, if constrained.
    pub sender: Option<Address>,
    /// Required receiver.
    pub receiver: Address,
    /// Accepted quantity.
    pub quantity: AmountRule,
}

/// Checks a payment against its requirements.
///
/// # Errors
///
/// Returns the first mismatch found, in the order sender, receiver, amount.
pub fn verify_payment(action: &'static str, payment: &Payment, check: &PaymentCheck) -> Result<()> {
    verify_parties(action, payment.sender, payment.receiver, check.sender, check.receiver)?;
    check.amount.check(action, payment.amount.as_micro())
}

/// Checks a goods transfer against its requirements.
///
/// # Errors
///
/// Returns the first mismatch found, in the order sender, receiver, quantity.
pub fn verify_goods_transfer(
    action: &'static str,
    transfer: &GoodsTransfer,
    check: &TransferCheck,
) -> Result<()> {
    verify_parties(action, transfer.sender, transfer.receiver, check.sender, check.receiver)?;
    check.quantity.check(action, transfer.quantity)
}

fn verify_parties(
    action: &'static str,
    sender: Address,
    receiver: Address,
    expected_sender: Option<Address>,
    expected_receiver: Address,
) -> Result<()> {
    if let Some(expected) = expected_sender {
        if sender != expected {
            return Err(MarketError::SenderMismatch {
                action,
                expected,
                actual: sender,
            });
        }
    }
    if receiver != expected_receiver {
        return Err(MarketError::ReceiverMismatch {
            action,
            expected: expected_receiver,
            actual: receiver,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::{Amount, GoodId};
    use test_case::test_case;

    const ALICE: Address = Address::new([1; 32]);
    const BOB: Address = Address::new([2; 32]);
    const LEDGER: Address = Address::new([9; 32]);

    #[test_case(AmountRule::Exactly(5), 5, true ; "exactly equal")]
    #[test_case(AmountRule::Exactly(5), 6, false ; "exactly above")]
    #[test_case(AmountRule::AtLeast(5), 5, true ; "at least equal")]
    #[test_case(AmountRule::AtLeast(5), 4, false ; "at least below")]
    #[test_case(AmountRule::AtLeast(0), 0, true ; "at least zero")]
    #[test_case(AmountRule::GreaterThan(0), 1, true ; "positive")]
    #[test_case(AmountRule::GreaterThan(0), 0, false ; "zero is not positive")]
    fn amount_rules(rule: AmountRule, amount: u64, expected: bool) {
        assert_eq!(rule.accepts(amount), expected);
    }

    #[test]
    fn amount_rule_display() {
        assert_eq!(AmountRule::Exactly(3).to_string(), "exactly 3");
        assert_eq!(AmountRule::AtLeast(3).to_string(), "at least 3");
        assert_eq!(AmountRule::GreaterThan(0).to_string(), "more than 0");
    }

    #[test]
    fn payment_checks_parties_then_amount() {
        let check = PaymentCheck {
            sender: Some(ALICE),
            receiver: BOB,
            amount: AmountRule::AtLeast(3_000_000),
        };

        let ok = Payment::new(ALICE, BOB, Amount::from_micro(3_000_000));
        assert!(verify_payment("payment", &ok, &check).is_ok());

        let overpaid = Payment::new(ALICE, BOB, Amount::from_micro(4_000_000));
        assert!(verify_payment("payment", &overpaid, &check).is_ok());

        let short = Payment::new(ALICE, BOB, Amount::from_micro(2_999_999));
        assert!(matches!(
            verify_payment("payment", &short, &check),
            Err(MarketError::AmountRejected { actual: 2_999_999, .. })
        ));

        let stolen = Payment::new(BOB, BOB, Amount::from_micro(3_000_000));
        assert!(matches!(
            verify_payment("payment", &stolen, &check),
            Err(MarketError::SenderMismatch { .. })
        ));

        let misdirected = Payment::new(ALICE, LEDGER, Amount::from_micro(3_000_000));
        assert!(matches!(
            verify_payment("payment", &misdirected, &check),
            Err(MarketError::ReceiverMismatch { .. })
        ));
    }

    #[test]
    fn unconstrained_sender_is_not_checked() {
        let check = PaymentCheck {
            sender: None,
            receiver: LEDGER,
            amount: AmountRule::Exactly(1),
        };
        let payment = Payment::new(BOB, LEDGER, Amount::from_micro(1));
        assert!(verify_payment("payment", &payment, &check).is_ok());
    }

    #[test]
    fn goods_transfer_checks_parties_and_quantity() {
        let check = TransferCheck {
            sender: Some(ALICE),
            receiver: LEDGER,
            quantity: AmountRule::GreaterThan(0),
        };

        let ok = GoodsTransfer::new(ALICE, LEDGER, GoodId::new(7), 3);
        assert!(verify_goods_transfer("goods transfer", &ok, &check).is_ok());

        let foreign = GoodsTransfer::new(BOB, LEDGER, GoodId::new(7), 3);
        assert!(matches!(
            verify_goods_transfer("goods transfer", &foreign, &check),
            Err(MarketError::SenderMismatch { .. })
        ));

        let empty = GoodsTransfer::new(ALICE, LEDGER, GoodId::new(7), 0);
        assert!(matches!(
            verify_goods_transfer("goods transfer", &empty, &check),
            Err(MarketError::AmountRejected { .. })
        ));

        let elsewhere = GoodsTransfer::new(ALICE, BOB, GoodId::new(7), 3);
        assert!(matches!(
            verify_goods_transfer("goods transfer", &elsewhere, &check),
            Err(MarketError::ReceiverMismatch { .. })
        ));
    }
}
