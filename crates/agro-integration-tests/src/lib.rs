//! Integration test support for the Agroshop marketplace.
//!
//! [`SimulatedNetwork`] plays the part of the surrounding network: it keeps
//! account balances, settles the transfers bundled with each call, hands the
//! call to the marketplace, and settles the outbound transfers the
//! marketplace issues. A call group either settles completely or not at all.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{BTreeMap, HashMap};

use agro_core::{Address, Amount, Call, GoodId, GoodsTransfer, Operation, Payment};
use agro_market::{MarketConfig, MarketError, Marketplace, MemoryBoxStore, Outbound, Receipt};
use thiserror::Error;
use tracing::debug;

/// Errors that reject a whole call group.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The marketplace aborted the call.
    #[error("call rejected: {0}")]
    Rejected(#[from] MarketError),

    /// An account could not cover a payment.
    #[error("{account} cannot pay {amount}")]
    InsufficientFunds {
        /// Paying account.
        account: Address,
        /// Amount requested.
        amount: Amount,
    },

    /// An account could not cover a goods transfer.
    #[error("{account} holds fewer than {quantity} units of good {good}")]
    InsufficientGoods {
        /// Sending account.
        account: Address,
        /// Good moved.
        good: GoodId,
        /// Units requested.
        quantity: u64,
    },

    /// The receiving account has not opted in to the good.
    #[error("{account} is not opted in to good {good}")]
    NotOptedIn {
        /// Receiving account.
        account: Address,
        /// Good moved.
        good: GoodId,
    },
}

/// Result type alias for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Debug, Clone, Default)]
struct Account {
    native: Amount,
    goods: HashMap<GoodId, u64>,
}

/// Accounts plus one deployed marketplace.
#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    market: Marketplace<MemoryBoxStore>,
    accounts: BTreeMap<Address, Account>,
}

impl SimulatedNetwork {
    /// Deploys a marketplace at `ledger` with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    pub fn deploy(ledger: Address) -> Result<Self> {
        Self::deploy_with(ledger, &MarketConfig::default())
    }

    /// Deploys a marketplace at `ledger`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    pub fn deploy_with(ledger: Address, config: &MarketConfig) -> Result<Self> {
        let market = Marketplace::new(ledger, config, MemoryBoxStore::new())?;
        let mut accounts = BTreeMap::new();
        accounts.insert(ledger, Account::default());
        Ok(Self { market, accounts })
    }

    /// The deployed marketplace.
    #[must_use]
    pub const fn market(&self) -> &Marketplace<MemoryBoxStore> {
        &self.market
    }

    /// Address of the deployed marketplace.
    #[must_use]
    pub const fn ledger(&self) -> Address {
        self.market.address()
    }

    /// Credits native value to `account` out of thin air.
    pub fn fund(&mut self, account: Address, amount: Amount) {
        let entry = self.accounts.entry(account).or_default();
        entry.native = entry.native.checked_add(amount).unwrap_or(Amount::MAX);
    }

    /// Opts `account` in to holding `good`.
    pub fn opt_in(&mut self, account: Address, good: GoodId) {
        self.accounts
            .entry(account)
            .or_default()
            .goods
            .entry(good)
            .or_insert(0);
    }

    /// Creates `quantity` units of `good` held by `creator`.
    pub fn mint(&mut self, creator: Address, good: GoodId, quantity: u64) {
        let units = self
            .accounts
            .entry(creator)
            .or_default()
            .goods
            .entry(good)
            .or_insert(0);
        *units = units.saturating_add(quantity);
    }

    /// Native balance of `account`.
    #[must_use]
    pub fn native(&self, account: Address) -> Amount {
        self.accounts.get(&account).map_or(Amount::ZERO, |a| a.native)
    }

    /// Units of `good` held by `account`, or `None` if not opted in.
    #[must_use]
    pub fn goods(&self, account: Address, good: GoodId) -> Option<u64> {
        self.accounts
            .get(&account)
            .and_then(|a| a.goods.get(&good).copied())
    }

    /// Total units of `good` held across every account.
    #[must_use]
    pub fn goods_supply(&self, good: GoodId) -> u128 {
        self.accounts
            .values()
            .filter_map(|a| a.goods.get(&good))
            .map(|units| u128::from(*units))
            .sum()
    }

    /// Total native value held across every account.
    #[must_use]
    pub fn native_supply(&self) -> u128 {
        self.accounts
            .values()
            .map(|a| u128::from(a.native.as_micro()))
            .sum()
    }

    /// Settles the call's bundled transfers, applies the call, then settles
    /// the marketplace's outbound transfers.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Accounts and marketplace are unchanged.
    pub fn submit(&mut self, call: &Call) -> Result<Receipt> {
        let saved = self.clone();
        match self.settle(call) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                debug!(operation = call.operation.name(), error = %e, "call group rolled back");
                *self = saved;
                Err(e)
            }
        }
    }

    fn settle(&mut self, call: &Call) -> Result<Receipt> {
        let (payments, transfers) = bundled(&call.operation);
        for payment in payments {
            self.pay(payment.sender, payment.receiver, payment.amount)?;
        }
        for transfer in transfers {
            self.transfer(transfer.sender, transfer.receiver, transfer.good, transfer.quantity)?;
        }

        let receipt = self.market.apply(call)?;

        let ledger = self.ledger();
        for effect in &receipt.effects {
            match *effect {
                Outbound::Payment { receiver, amount } => self.pay(ledger, receiver, amount)?,
                Outbound::GoodsTransfer {
                    good,
                    receiver,
                    quantity,
                } => self.transfer(ledger, receiver, good, quantity)?,
            }
        }
        Ok(receipt)
    }

    fn pay(&mut self, sender: Address, receiver: Address, amount: Amount) -> Result<()> {
        let from = self.accounts.entry(sender).or_default();
        from.native = from
            .native
            .checked_sub(amount)
            .ok_or(NetworkError::InsufficientFunds {
                account: sender,
                amount,
            })?;
        let to = self.accounts.entry(receiver).or_default();
        to.native = to.native.checked_add(amount).unwrap_or(Amount::MAX);
        Ok(())
    }

    fn transfer(&mut self, sender: Address, receiver: Address, good: GoodId, quantity: u64) -> Result<()> {
        // A zero-unit transfer to oneself is how an account opts in.
        if sender == receiver && quantity == 0 {
            self.opt_in(sender, good);
            return Ok(());
        }

        if self.goods(receiver, good).is_none() {
            return Err(NetworkError::NotOptedIn {
                account: receiver,
                good,
            });
        }
        let held = self.goods(sender, good).unwrap_or(0);
        let remaining = held.checked_sub(quantity).ok_or(NetworkError::InsufficientGoods {
            account: sender,
            good,
            quantity,
        })?;

        self.accounts.entry(sender).or_default().goods.insert(good, remaining);
        let units = self
            .accounts
            .entry(receiver)
            .or_default()
            .goods
            .entry(good)
            .or_insert(0);
        *units = units.saturating_add(quantity);
        Ok(())
    }
}

/// Payments and goods transfers that travel with an operation.
fn bundled(operation: &Operation) -> (Vec<Payment>, Vec<GoodsTransfer>) {
    match operation {
        Operation::RegisterGood { rent_payment, .. } => (vec![*rent_payment], vec![]),
        Operation::CreateListing {
            rent_payment,
            transfer,
            ..
        } => (vec![*rent_payment], vec![*transfer]),
        Operation::TopUp { transfer, .. } => (vec![], vec![*transfer]),
        Operation::Purchase { payment, .. } => (vec![*payment], vec![]),
        Operation::Reprice { .. } | Operation::Withdraw { .. } => (vec![], vec![]),
    }
}
