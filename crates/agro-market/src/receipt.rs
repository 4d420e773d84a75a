//! Outcome of a committed call.

use agro_core::{Address, Amount, GoodId};
use serde::{Deserialize, Serialize};

/// A transfer issued by the ledger from its own custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    /// Native value paid out of the ledger.
    Payment {
        /// Receiving account.
        receiver: Address,
        /// Amount paid.
        amount: Amount,
    },
    /// Units of a good released from custody.
    GoodsTransfer {
        /// Good released.
        good: GoodId,
        /// Receiving account.
        receiver: Address,
        /// Units released.
        quantity: u64,
    },
}

/// The side effects of one committed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Name of the operation that committed.
    pub operation: String,
    /// Outbound transfers, in issue order.
    pub effects: Vec<Outbound>,
}

impl Receipt {
    /// Creates a receipt with no outbound transfers.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            effects: Vec::new(),
        }
    }

    /// Appends an outbound transfer.
    #[must_use]
    pub fn with(mut self, effect: Outbound) -> Self {
        self.effects.push(effect);
        self
    }

    /// Total native value paid to `receiver`.
    #[must_use]
    pub fn paid_to(&self, receiver: Address) -> Amount {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Outbound::Payment { receiver: r, amount } if *r == receiver => Some(*amount),
                _ => None,
            })
            .fold(Amount::ZERO, |total, amount| {
                total.checked_add(amount).unwrap_or(Amount::MAX)
            })
    }

    /// Total units of `good` released to `receiver`.
    #[must_use]
    pub fn goods_to(&self, receiver: Address, good: GoodId) -> u64 {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Outbound::GoodsTransfer {
                    good: g,
                    receiver: r,
                    quantity,
                } if *r == receiver && *g == good => Some(*quantity),
                _ => None,
            })
            .fold(0u64, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_filter_by_receiver_and_good() {
        let alice = Address::new([1; 32]);
        let bob = Address::new([2; 32]);
        let good = GoodId::new(3);

        let receipt = Receipt::new("withdraw")
            .with(Outbound::Payment {
                receiver: alice,
                amount: Amount::from_micro(47_300),
            })
            .with(Outbound::GoodsTransfer {
                good,
                receiver: alice,
                quantity: 4,
            })
            .with(Outbound::GoodsTransfer {
                good,
                receiver: bob,
                quantity: 9,
            });

        assert_eq!(receipt.paid_to(alice), Amount::from_micro(47_300));
        assert_eq!(receipt.paid_to(bob), Amount::ZERO);
        assert_eq!(receipt.goods_to(alice, good), 4);
        assert_eq!(receipt.goods_to(alice, GoodId::new(4)), 0);
    }

    #[test]
    fn outbound_json_is_tagged() {
        let effect = Outbound::GoodsTransfer {
            good: GoodId::new(3),
            receiver: Address::new([1; 32]),
            quantity: 2,
        };
        let json = serde_json::to_value(effect).expect("serialize");
        assert_eq!(json["kind"], "goods_transfer");
        assert_eq!(json["quantity"], 2);
    }
}
