//! Ledger custody bookkeeping.
//!
//! The [`CustodyManager`] records which goods the ledger is registered to
//! hold, how many units of each it holds, and its native balance.
//!
//! Changes are staged first and applied afterwards: an operation builds a
//! [`CustodyStage`] while it validates, which can fail without touching the
//! manager, and only a fully validated call applies the resulting
//! [`CustodyChanges`].

use std::collections::HashMap;

use agro_core::{Amount, GoodId};

use crate::error::{MarketError, Result};

/// Goods and native value held by the ledger.
#[derive(Debug, Clone, Default)]
pub struct CustodyManager {
    holdings: HashMap<GoodId, u64>,
    native: Amount,
}

impl CustodyManager {
    /// Creates a manager holding nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager with an initial native balance.
    #[must_use]
    pub fn with_native(native: Amount) -> Self {
        Self {
            holdings: HashMap::new(),
            native,
        }
    }

    /// Returns true if the ledger can hold `good`.
    #[must_use]
    pub fn is_registered(&self, good: GoodId) -> bool {
        self.holdings.contains_key(&good)
    }

    /// Units of `good` held, or `None` if not registered.
    #[must_use]
    pub fn holding(&self, good: GoodId) -> Option<u64> {
        self.holdings.get(&good).copied()
    }

    /// Native balance held.
    #[must_use]
    pub const fn native(&self) -> Amount {
        self.native
    }

    /// Starts staging changes against the current state.
    #[must_use]
    pub fn stage(&self) -> CustodyStage<'_> {
        CustodyStage {
            base: self,
            changes: CustodyChanges::default(),
        }
    }

    /// Applies changes produced by [`CustodyStage::finish`].
    pub fn apply(&mut self, changes: CustodyChanges) {
        for (good, units) in changes.holdings {
            self.holdings.insert(good, units);
        }
        if let Some(native) = changes.native {
            self.native = native;
        }
    }
}

/// Validated custody changes ready to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyChanges {
    holdings: Vec<(GoodId, u64)>,
    native: Option<Amount>,
}

/// Pending custody changes layered over a [`CustodyManager`].
#[derive(Debug)]
pub struct CustodyStage<'a> {
    base: &'a CustodyManager,
    changes: CustodyChanges,
}

impl CustodyStage<'_> {
    fn holding(&self, good: GoodId) -> Option<u64> {
        self.changes
            .holdings
            .iter()
            .rev()
            .find(|(g, _)| *g == good)
            .map(|(_, units)| *units)
            .or_else(|| self.base.holding(good))
    }

    fn native(&self) -> Amount {
        self.changes.native.unwrap_or(self.base.native)
    }

    /// Registers `good` with a zero holding.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::GoodAlreadyRegistered` if it is already registered.
    pub fn register(&mut self, good: GoodId) -> Result<()> {
        if self.holding(good).is_some() {
            return Err(MarketError::GoodAlreadyRegistered(good));
        }
        self.changes.holdings.push((good, 0));
        Ok(())
    }

    /// Adds units of a registered good.
    pub fn credit_goods(&mut self, good: GoodId, units: u64) -> Result<()> {
        let current = self.holding(good).ok_or(MarketError::GoodNotRegistered(good))?;
        let next = current
            .checked_add(units)
            .ok_or(MarketError::Overflow("custodied goods"))?;
        self.changes.holdings.push((good, next));
        Ok(())
    }

    /// Removes units of a registered good.
    pub fn debit_goods(&mut self, good: GoodId, units: u64) -> Result<()> {
        let current = self.holding(good).ok_or(MarketError::GoodNotRegistered(good))?;
        let next = current
            .checked_sub(units)
            .ok_or(MarketError::InsufficientQuantity {
                requested: units,
                available: current,
            })?;
        self.changes.holdings.push((good, next));
        Ok(())
    }

    /// Adds native value.
    pub fn credit_native(&mut self, amount: Amount) -> Result<()> {
        let next = self
            .native()
            .checked_add(amount)
            .ok_or(MarketError::Overflow("ledger balance"))?;
        self.changes.native = Some(next);
        Ok(())
    }

    /// Removes native value.
    pub fn debit_native(&mut self, amount: Amount) -> Result<()> {
        let available = self.native();
        let next = available
            .checked_sub(amount)
            .ok_or(MarketError::LedgerBalance {
                required: amount,
                available,
            })?;
        self.changes.native = Some(next);
        Ok(())
    }

    /// Ends staging, returning the changes to apply.
    #[must_use]
    pub fn finish(self) -> CustodyChanges {
        self.changes
    }
}
