//! The marketplace state machine.
//!
//! Six operations, each an atomic transition over the listing store:
//!
//! | Operation        | Store effect            | Outbound transfers               |
//! |------------------|-------------------------|----------------------------------|
//! | `register_good`  | none                    | zero-unit transfer to the ledger |
//! | `create_listing` | record allocated        | none                             |
//! | `top_up`         | `deposited` increased   | none                             |
//! | `reprice`        | `unitary_price` replaced| none                             |
//! | `purchase`       | `deposited` decreased   | goods to the buyer               |
//! | `withdraw`       | record deleted          | rent refund and goods to owner   |
//!
//! Every operation validates all preconditions and bundled actions first,
//! stages its custody changes, and only then performs its single store
//! mutation. If that mutation fails the staged custody changes are dropped,
//! so an aborted call has no observable effect.
//!
//! Listing keys for the caller's own listings are always built from the
//! authenticated sender. Only `purchase` addresses someone else's listing,
//! and it only ever decrements that listing's inventory.

use agro_core::{Address, Amount, Call, GoodId, GoodsTransfer, Operation, Payment};
use tracing::{debug, info};

use crate::codec::{ListingKey, ListingRecord};
use crate::config::MarketConfig;
use crate::custody::CustodyManager;
use crate::error::{MarketError, Result};
use crate::receipt::{Outbound, Receipt};
use crate::rent::RentSchedule;
use crate::store::{BoxStore, ListingStore};
use crate::verify::{verify_goods_transfer, verify_payment, AmountRule, PaymentCheck, TransferCheck};

/// Custodial marketplace ledger.
#[derive(Debug, Clone)]
pub struct Marketplace<S> {
    address: Address,
    rent: RentSchedule,
    listings: ListingStore<S>,
    custody: CustodyManager,
}

impl<S: BoxStore> Marketplace<S> {
    /// Deploys a fresh marketplace at `address` over an empty `store`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the rent schedule is unusable, or
    /// `MarketError::CustodyMismatch` if `store` already holds listings. A
    /// populated store must be reopened with [`Marketplace::resume`].
    pub fn new(address: Address, config: &MarketConfig, store: S) -> Result<Self> {
        let market = Self::build(address, config, store, CustodyManager::new())?;
        let existing = market.listings.boxes().entries()?.len();
        if existing > 0 {
            return Err(MarketError::CustodyMismatch(format!(
                "store already holds {existing} listings; resume it with its custody book"
            )));
        }
        info!(
            address = %address,
            listing_fee = %market.rent.listing_fee(),
            registration_fee = %market.rent.registration_fee(),
            "marketplace deployed"
        );
        Ok(market)
    }

    /// Reopens a marketplace over a persisted `store` with the custody book
    /// the ledger held when it stopped.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::CustodyMismatch` unless `custody` registers
    /// every listed good, holds every listed unit and can refund every
    /// listing's rent.
    pub fn resume(address: Address, config: &MarketConfig, store: S, custody: CustodyManager) -> Result<Self> {
        let market = Self::build(address, config, store, custody)?;
        if let Some(shortfall) = market.custody_shortfall()? {
            return Err(MarketError::CustodyMismatch(shortfall));
        }
        info!(
            address = %address,
            listings = market.listings.listings()?.len(),
            balance = %market.custody.native(),
            "marketplace resumed"
        );
        Ok(market)
    }

    fn build(address: Address, config: &MarketConfig, store: S, custody: CustodyManager) -> Result<Self> {
        let rent = RentSchedule::from_config(&config.rent)?;
        Ok(Self {
            address,
            rent,
            listings: ListingStore::new(store),
            custody,
        })
    }

    /// Credits native value sent to the ledger outside any call.
    pub fn fund(&mut self, amount: Amount) -> Result<()> {
        let changes = {
            let mut stage = self.custody.stage();
            stage.credit_native(amount)?;
            stage.finish()
        };
        self.custody.apply(changes);
        debug!(amount = %amount, balance = %self.custody.native(), "ledger funded");
        Ok(())
    }

    /// Address of the ledger's execution context.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The rent schedule in force.
    #[must_use]
    pub const fn rent(&self) -> &RentSchedule {
        &self.rent
    }

    /// The ledger's custody book.
    #[must_use]
    pub const fn custody(&self) -> &CustodyManager {
        &self.custody
    }

    /// The listing store.
    #[must_use]
    pub const fn store(&self) -> &ListingStore<S> {
        &self.listings
    }

    /// Reads one listing.
    pub fn listing(&self, key: &ListingKey) -> Result<Option<ListingRecord>> {
        self.listings.get(key)
    }

    /// Reads every listing in key order.
    pub fn listings(&self) -> Result<Vec<(ListingKey, ListingRecord)>> {
        self.listings.listings()
    }

    /// Returns true if the custody book backs every listing: each listed
    /// good is registered, listed inventory does not exceed the units held,
    /// and the native balance covers every outstanding rent refund.
    pub fn is_conserved(&self) -> Result<bool> {
        Ok(self.custody_shortfall()?.is_none())
    }

    /// Describes the first way custody fails to back the listings, if any.
    fn custody_shortfall(&self) -> Result<Option<String>> {
        let listings = self.listings.listings()?;
        let mut goods: Vec<GoodId> = listings.iter().map(|(key, _)| key.good).collect();
        goods.sort_unstable();
        goods.dedup();

        for good in goods {
            let Some(held) = self.custody.holding(good) else {
                return Ok(Some(format!("good {good} is listed but not registered")));
            };
            let listed: u128 = listings
                .iter()
                .filter(|(key, _)| key.good == good)
                .map(|(_, record)| u128::from(record.deposited))
                .sum();
            if listed > u128::from(held) {
                return Ok(Some(format!("good {good}: {listed} units listed, {held} held")));
            }
        }

        let owed = u128::from(self.rent.listing_refund().as_micro()) * listings.len() as u128;
        let balance = self.custody.native();
        if owed > u128::from(balance.as_micro()) {
            return Ok(Some(format!(
                "{} listings owe {owed} micro-units of rent, balance is {balance}",
                listings.len()
            )));
        }
        Ok(None)
    }

    /// Applies one submitted call.
    ///
    /// # Errors
    ///
    /// Returns the precondition that failed. The marketplace is unchanged.
    pub fn apply(&mut self, call: &Call) -> Result<Receipt> {
        let sender = call.sender;
        let result = match &call.operation {
            Operation::RegisterGood { rent_payment, good } => {
                self.register_good(sender, rent_payment, *good)
            }
            Operation::CreateListing {
                rent_payment,
                transfer,
                nonce,
                unitary_price,
            } => self.create_listing(sender, rent_payment, transfer, *nonce, *unitary_price),
            Operation::TopUp { transfer, nonce } => self.top_up(sender, transfer, *nonce),
            Operation::Reprice {
                good,
                nonce,
                unitary_price,
            } => self.reprice(sender, *good, *nonce, *unitary_price),
            Operation::Purchase {
                owner,
                good,
                nonce,
                payment,
                quantity,
            } => self.purchase(sender, *owner, *good, *nonce, payment, *quantity),
            Operation::Withdraw { good, nonce } => self.withdraw(sender, *good, *nonce),
        };

        if let Err(e) = &result {
            debug!(
                operation = call.operation.name(),
                sender = %sender,
                error = %e,
                "call aborted"
            );
        }
        result
    }

    /// Registers the ledger to hold `good`.
    ///
    /// `rent_payment` must pay exactly the registration fee to the ledger.
    /// Finalized by a zero-unit transfer of `good` from the ledger to itself.
    pub fn register_good(&mut self, caller: Address, rent_payment: &Payment, good: GoodId) -> Result<Receipt> {
        let changes = {
            let mut stage = self.custody.stage();
            stage.register(good)?;
            self.rent.verify_registration_rent(rent_payment, self.address)?;
            stage.credit_native(rent_payment.amount)?;
            stage.finish()
        };
        self.custody.apply(changes);

        info!(good = %good, caller = %caller, "good registered");
        Ok(Receipt::new("register_good").with(Outbound::GoodsTransfer {
            good,
            receiver: self.address,
            quantity: 0,
        }))
    }

    /// Opens a listing keyed by the caller, the transferred good and `nonce`.
    pub fn create_listing(
        &mut self,
        caller: Address,
        rent_payment: &Payment,
        transfer: &GoodsTransfer,
        nonce: u64,
        unitary_price: u64,
    ) -> Result<Receipt> {
        let key = ListingKey::new(caller, transfer.good, nonce);
        if self.listings.exists(&key)? {
            return Err(MarketError::ListingExists(key));
        }

        self.rent.verify_listing_rent(rent_payment, caller, self.address)?;
        self.verify_deposit(caller, transfer)?;

        let changes = {
            let mut stage = self.custody.stage();
            stage.credit_goods(transfer.good, transfer.quantity)?;
            stage.credit_native(rent_payment.amount)?;
            stage.finish()
        };

        let record = ListingRecord::new(transfer.quantity, unitary_price);
        self.listings.create(&key, record)?;
        self.custody.apply(changes);

        info!(
            owner = %key.owner,
            good = %key.good,
            nonce = key.nonce,
            deposited = record.deposited,
            unitary_price = record.unitary_price,
            "listing created"
        );
        Ok(Receipt::new("create_listing"))
    }

    /// Adds the transferred units to the caller's listing.
    pub fn top_up(&mut self, caller: Address, transfer: &GoodsTransfer, nonce: u64) -> Result<Receipt> {
        let key = ListingKey::new(caller, transfer.good, nonce);
        let record = self.listings.load(&key)?;

        self.verify_deposit(caller, transfer)?;
        let deposited = record
            .deposited
            .checked_add(transfer.quantity)
            .ok_or(MarketError::Overflow("listing deposit"))?;

        let changes = {
            let mut stage = self.custody.stage();
            stage.credit_goods(transfer.good, transfer.quantity)?;
            stage.finish()
        };

        let updated = ListingRecord { deposited, ..record };
        self.listings.update(&key, updated)?;
        self.custody.apply(changes);

        info!(
            owner = %key.owner,
            good = %key.good,
            nonce = key.nonce,
            added = transfer.quantity,
            deposited,
            "listing topped up"
        );
        Ok(Receipt::new("top_up"))
    }

    /// Replaces the unit price of the caller's listing.
    pub fn reprice(&mut self, caller: Address, good: GoodId, nonce: u64, unitary_price: u64) -> Result<Receipt> {
        let key = ListingKey::new(caller, good, nonce);
        let record = self.listings.load(&key)?;

        let updated = ListingRecord {
            unitary_price,
            ..record
        };
        self.listings.update(&key, updated)?;

        info!(
            owner = %key.owner,
            good = %key.good,
            nonce = key.nonce,
            old_price = record.unitary_price,
            unitary_price,
            "listing repriced"
        );
        Ok(Receipt::new("reprice"))
    }

    /// Buys `quantity` units from `owner`'s listing.
    ///
    /// `payment` must pay at least `unitary_price * quantity` from the
    /// caller to `owner`. The listing is read afresh on every call.
    pub fn purchase(
        &mut self,
        caller: Address,
        owner: Address,
        good: GoodId,
        nonce: u64,
        payment: &Payment,
        quantity: u64,
    ) -> Result<Receipt> {
        let key = ListingKey::new(owner, good, nonce);
        let record = self.listings.load(&key)?;

        let remaining = record
            .deposited
            .checked_sub(quantity)
            .ok_or(MarketError::InsufficientQuantity {
                requested: quantity,
                available: record.deposited,
            })?;
        let amount_due = Amount::from_micro(record.unitary_price)
            .checked_mul(quantity)
            .ok_or(MarketError::Overflow("amount due"))?;

        verify_payment(
            "purchase payment",
            payment,
            &PaymentCheck {
                sender: Some(caller),
                receiver: owner,
                amount: AmountRule::AtLeast(amount_due.as_micro()),
            },
        )?;

        let changes = {
            let mut stage = self.custody.stage();
            stage.debit_goods(good, quantity)?;
            stage.finish()
        };

        let updated = ListingRecord {
            deposited: remaining,
            ..record
        };
        self.listings.update(&key, updated)?;
        self.custody.apply(changes);

        info!(
            owner = %owner,
            buyer = %caller,
            good = %good,
            nonce,
            quantity,
            amount_due = %amount_due,
            remaining,
            "listing purchased"
        );
        Ok(Receipt::new("purchase").with(Outbound::GoodsTransfer {
            good,
            receiver: caller,
            quantity,
        }))
    }

    /// Closes the caller's listing, refunding its rent and remaining units.
    pub fn withdraw(&mut self, caller: Address, good: GoodId, nonce: u64) -> Result<Receipt> {
        let key = ListingKey::new(caller, good, nonce);
        let record = self.listings.load(&key)?;
        let refund = self.rent.listing_refund();

        let changes = {
            let mut stage = self.custody.stage();
            stage.debit_goods(good, record.deposited)?;
            stage.debit_native(refund)?;
            stage.finish()
        };

        self.listings.remove(&key)?;
        self.custody.apply(changes);

        info!(
            owner = %caller,
            good = %good,
            nonce,
            returned = record.deposited,
            refund = %refund,
            "listing withdrawn"
        );
        Ok(Receipt::new("withdraw")
            .with(Outbound::Payment {
                receiver: caller,
                amount: refund,
            })
            .with(Outbound::GoodsTransfer {
                good,
                receiver: caller,
                quantity: record.deposited,
            }))
    }

    /// A deposit must come from the caller to the ledger and move at least one unit.
    fn verify_deposit(&self, caller: Address, transfer: &GoodsTransfer) -> Result<()> {
        verify_goods_transfer(
            "goods transfer",
            transfer,
            &TransferCheck {
                sender: Some(caller),
                receiver: self.address,
                quantity: AmountRule::GreaterThan(0),
            },
        )
    }
}
