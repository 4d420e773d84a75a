//! Storage rent accounting.
//!
//! Rent is charged once, in full, when a listing box is allocated and
//! refunded once, in full, when it is deleted. There is no partial rent.

use agro_core::{Address, Amount, Payment};

use crate::config::RentConfig;
use crate::error::{MarketError, Result};
use crate::verify::{verify_payment, AmountRule, PaymentCheck};

/// The resolved rent fees charged by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentSchedule {
    listing_fee: Amount,
    registration_fee: Amount,
}

impl RentSchedule {
    /// Resolves fees from configuration.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the listing fee overflows.
    pub fn from_config(config: &RentConfig) -> Result<Self> {
        let listing_fee = config
            .box_byte_fee
            .checked_mul(config.listing_box_bytes)
            .and_then(|bytes| bytes.checked_add(config.box_flat_fee))
            .ok_or_else(|| MarketError::config("listing rent overflows"))?;

        Ok(Self {
            listing_fee: Amount::from_micro(listing_fee),
            registration_fee: Amount::from_micro(config.good_registration_fee),
        })
    }

    /// Rent prepaid when a listing is created.
    #[must_use]
    pub const fn listing_fee(&self) -> Amount {
        self.listing_fee
    }

    /// Rent refunded when a listing is withdrawn. Always equal to the fee.
    #[must_use]
    pub const fn listing_refund(&self) -> Amount {
        self.listing_fee
    }

    /// Minimum balance the ledger needs to hold one more good.
    #[must_use]
    pub const fn registration_fee(&self) -> Amount {
        self.registration_fee
    }

    /// Checks a listing rent payment: from the caller, to the ledger, exactly the fee.
    pub fn verify_listing_rent(&self, payment: &Payment, caller: Address, ledger: Address) -> Result<()> {
        verify_payment(
            "rent payment",
            payment,
            &PaymentCheck {
                sender: Some(caller),
                receiver: ledger,
                amount: AmountRule::Exactly(self.listing_fee.as_micro()),
            },
        )
    }

    /// Checks a registration payment: to the ledger, exactly the registration fee.
    ///
    /// Anyone may pay to register a good, so the sender is not constrained.
    pub fn verify_registration_rent(&self, payment: &Payment, ledger: Address) -> Result<()> {
        verify_payment(
            "registration payment",
            payment,
            &PaymentCheck {
                sender: None,
                receiver: ledger,
                amount: AmountRule::Exactly(self.registration_fee.as_micro()),
            },
        )
    }
}

impl Default for RentSchedule {
    fn default() -> Self {
        Self {
            listing_fee: Amount::from_micro(47_300),
            registration_fee: Amount::from_micro(100_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SELLER: Address = Address::new([1; 32]);
    const LEDGER: Address = Address::new([9; 32]);

    #[test]
    fn default_schedule_matches_default_config() {
        let schedule = RentSchedule::from_config(&RentConfig::default()).expect("schedule");
        assert_eq!(schedule, RentSchedule::default());
        assert_eq!(schedule.listing_fee().as_micro(), 2_500 + 400 * 112);
        assert_eq!(schedule.listing_refund(), schedule.listing_fee());
    }

    #[test]
    fn corrected_byte_count_lowers_fee() {
        let config = RentConfig {
            listing_box_bytes: 64,
            ..RentConfig::default()
        };
        let schedule = RentSchedule::from_config(&config).expect("schedule");
        assert_eq!(schedule.listing_fee().as_micro(), 28_100);
    }

    #[test_case(47_300, true ; "exact fee")]
    #[test_case(47_299, false ; "one short")]
    #[test_case(47_301, false ; "one over")]
    #[test_case(0, false ; "nothing")]
    fn listing_rent_must_be_exact(amount: u64, ok: bool) {
        let schedule = RentSchedule::default();
        let payment = Payment::new(SELLER, LEDGER, Amount::from_micro(amount));
        assert_eq!(schedule.verify_listing_rent(&payment, SELLER, LEDGER).is_ok(), ok);
    }

    #[test]
    fn listing_rent_must_come_from_caller_to_ledger() {
        let schedule = RentSchedule::default();
        let other = Address::new([3; 32]);
        let fee = schedule.listing_fee();

        let wrong_sender = Payment::new(other, LEDGER, fee);
        assert!(matches!(
            schedule.verify_listing_rent(&wrong_sender, SELLER, LEDGER),
            Err(MarketError::SenderMismatch { .. })
        ));

        let wrong_receiver = Payment::new(SELLER, other, fee);
        assert!(matches!(
            schedule.verify_listing_rent(&wrong_receiver, SELLER, LEDGER),
            Err(MarketError::ReceiverMismatch { .. })
        ));
    }

    #[test]
    fn registration_accepts_any_sender() {
        let schedule = RentSchedule::default();
        let payment = Payment::new(Address::new([4; 32]), LEDGER, schedule.registration_fee());
        assert!(schedule.verify_registration_rent(&payment, LEDGER).is_ok());

        let short = Payment::new(SELLER, LEDGER, Amount::from_micro(99_999));
        assert!(matches!(
            schedule.verify_registration_rent(&short, LEDGER),
            Err(MarketError::AmountRejected { .. })
        ));
    }
}
