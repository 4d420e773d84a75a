//! Integration tests for the listing lifecycle.
//!
//! Runs every operation end to end over a simulated network:
//! 1. Good registration and seller/buyer opt-in
//! 2. Listing creation, top-up and repricing
//! 3. Purchases with settlement to buyer and seller
//! 4. Withdrawal with rent refund and return of unsold units

use agro_core::{Address, Amount, Call, GoodId, GoodsTransfer, Operation, Payment};
use agro_integration_tests::{NetworkError, SimulatedNetwork};
use agro_market::{ListingKey, ListingRecord, MarketError};
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

const LEDGER: Address = Address::new([0xAA; 32]);
const SELLER: Address = Address::new([1; 32]);
const BUYER: Address = Address::new([2; 32]);
const GOOD: GoodId = GoodId::new(1001);

const LISTING_FEE: u64 = 47_300;
const REGISTRATION_FEE: u64 = 100_000;
const START_NATIVE: u64 = 100_000_000;
const START_GOODS: u64 = 100;

fn algo(micro: u64) -> Amount {
    Amount::from_micro(micro)
}

fn network() -> SimulatedNetwork {
    let mut net = SimulatedNetwork::deploy(LEDGER).expect("deploy");
    net.fund(SELLER, algo(START_NATIVE));
    net.fund(BUYER, algo(START_NATIVE));
    net.mint(SELLER, GOOD, START_GOODS);
    net.opt_in(BUYER, GOOD);

    net.submit(&Call::new(
        SELLER,
        Operation::RegisterGood {
            rent_payment: Payment::new(SELLER, LEDGER, algo(REGISTRATION_FEE)),
            good: GOOD,
        },
    ))
    .expect("register");
    net
}

fn create(nonce: u64, quantity: u64, unitary_price: u64) -> Call {
    Call::new(
        SELLER,
        Operation::CreateListing {
            rent_payment: Payment::new(SELLER, LEDGER, algo(LISTING_FEE)),
            transfer: GoodsTransfer::new(SELLER, LEDGER, GOOD, quantity),
            nonce,
            unitary_price,
        },
    )
}

fn top_up(nonce: u64, quantity: u64) -> Call {
    Call::new(
        SELLER,
        Operation::TopUp {
            transfer: GoodsTransfer::new(SELLER, LEDGER, GOOD, quantity),
            nonce,
        },
    )
}

fn reprice(nonce: u64, unitary_price: u64) -> Call {
    Call::new(
        SELLER,
        Operation::Reprice {
            good: GOOD,
            nonce,
            unitary_price,
        },
    )
}

fn purchase(nonce: u64, quantity: u64, paid: u64) -> Call {
    Call::new(
        BUYER,
        Operation::Purchase {
            owner: SELLER,
            good: GOOD,
            nonce,
            payment: Payment::new(BUYER, SELLER, algo(paid)),
            quantity,
        },
    )
}

fn withdraw(nonce: u64) -> Call {
    Call::new(SELLER, Operation::Withdraw { good: GOOD, nonce })
}

fn record(net: &SimulatedNetwork, nonce: u64) -> Option<ListingRecord> {
    net.market()
        .listing(&ListingKey::new(SELLER, GOOD, nonce))
        .expect("read")
}

/// Units the ledger holds on the network equal what its listings account for.
fn assert_custody_consistent(net: &SimulatedNetwork) {
    let listed = net.market().store().total_deposited(GOOD).expect("total");
    let held = net.goods(LEDGER, GOOD).map_or(0, u128::from);
    assert_eq!(listed, held);
    assert_eq!(net.market().custody().holding(GOOD).map(u128::from), Some(held));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn registration_opts_ledger_in() {
    let net = network();
    assert_eq!(net.goods(LEDGER, GOOD), Some(0));
    assert_eq!(net.native(LEDGER), algo(REGISTRATION_FEE));
    assert!(net.market().custody().is_registered(GOOD));
}

#[test]
fn full_listing_lifecycle() {
    let mut net = network();
    let seller_native = net.native(SELLER);
    let buyer_native = net.native(BUYER);

    // A
    net.submit(&create(0, 3, 1_000_000)).expect("create");
    assert_eq!(record(&net, 0), Some(ListingRecord::new(3, 1_000_000)));
    assert_eq!(net.goods(SELLER, GOOD), Some(START_GOODS - 3));

    // B
    net.submit(&top_up(0, 3)).expect("top up");
    assert_eq!(record(&net, 0), Some(ListingRecord::new(6, 1_000_000)));

    // C
    net.submit(&reprice(0, 1_500_000)).expect("reprice");
    assert_eq!(record(&net, 0), Some(ListingRecord::new(6, 1_500_000)));

    // D
    net.submit(&purchase(0, 2, 3_000_000)).expect("purchase");
    assert_eq!(record(&net, 0), Some(ListingRecord::new(4, 1_500_000)));
    assert_eq!(net.goods(BUYER, GOOD), Some(2));
    assert_eq!(net.native(BUYER), algo(buyer_native.as_micro() - 3_000_000));

    // E
    let receipt = net.submit(&withdraw(0)).expect("withdraw");
    assert_eq!(record(&net, 0), None);
    assert_eq!(receipt.paid_to(SELLER), algo(LISTING_FEE));
    assert_eq!(receipt.goods_to(SELLER, GOOD), 4);
    assert_eq!(net.goods(SELLER, GOOD), Some(START_GOODS - 2));
    assert_eq!(net.goods(LEDGER, GOOD), Some(0));

    // Rent came back in full, so the seller is up exactly the sale.
    assert_eq!(net.native(SELLER), algo(seller_native.as_micro() + 3_000_000));
    assert_eq!(net.native(LEDGER), algo(REGISTRATION_FEE));
    assert_custody_consistent(&net);
}

#[test]
fn independent_listings_share_custody() {
    let mut net = network();
    net.submit(&create(0, 10, 1)).expect("create 0");
    net.submit(&create(1, 20, 2)).expect("create 1");
    assert_eq!(net.goods(LEDGER, GOOD), Some(30));

    net.submit(&purchase(1, 5, 10)).expect("purchase");
    net.submit(&withdraw(0)).expect("withdraw");

    assert_eq!(record(&net, 1), Some(ListingRecord::new(15, 2)));
    assert_eq!(net.goods(LEDGER, GOOD), Some(15));
    assert_custody_consistent(&net);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn rejected_call_settles_nothing() {
    let mut net = network();
    net.submit(&create(0, 3, 1_000_000)).expect("create");
    let seller_native = net.native(SELLER);
    let buyer_native = net.native(BUYER);

    let err = net.submit(&purchase(0, 2, 1_999_999)).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Rejected(MarketError::AmountRejected { .. })
    ));
    assert_eq!(net.native(SELLER), seller_native);
    assert_eq!(net.native(BUYER), buyer_native);
    assert_eq!(net.goods(BUYER, GOOD), Some(0));
    assert_eq!(record(&net, 0), Some(ListingRecord::new(3, 1_000_000)));
}

#[test]
fn overselling_is_rejected() {
    let mut net = network();
    net.submit(&create(0, 3, 1)).expect("create");
    let err = net.submit(&purchase(0, 4, 4)).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Rejected(MarketError::InsufficientQuantity { requested: 4, available: 3 })
    ));
    assert_custody_consistent(&net);
}

#[test]
fn buyer_must_be_opted_in() {
    let mut net = network();
    let stranger = Address::new([9; 32]);
    net.fund(stranger, algo(10_000_000));
    net.submit(&create(0, 3, 1)).expect("create");

    let call = Call::new(
        stranger,
        Operation::Purchase {
            owner: SELLER,
            good: GOOD,
            nonce: 0,
            payment: Payment::new(stranger, SELLER, algo(1)),
            quantity: 1,
        },
    );
    let err = net.submit(&call).unwrap_err();
    assert!(matches!(err, NetworkError::NotOptedIn { account, .. } if account == stranger));

    // The marketplace's own commit was rolled back with the group.
    assert_eq!(record(&net, 0), Some(ListingRecord::new(3, 1)));
    assert_eq!(net.native(stranger), algo(10_000_000));
}

#[test]
fn seller_cannot_list_more_than_held() {
    let mut net = network();
    let err = net.submit(&create(0, START_GOODS + 1, 1)).unwrap_err();
    assert!(matches!(err, NetworkError::InsufficientGoods { .. }));
    assert_eq!(record(&net, 0), None);
    assert_eq!(net.native(LEDGER), algo(REGISTRATION_FEE));
}

#[test]
fn unregistered_good_cannot_be_listed() {
    let mut net = SimulatedNetwork::deploy(LEDGER).expect("deploy");
    net.fund(SELLER, algo(START_NATIVE));
    net.mint(SELLER, GOOD, START_GOODS);

    // The ledger never opted in, so the deposit itself bounces.
    let err = net.submit(&create(0, 3, 1)).unwrap_err();
    assert!(matches!(err, NetworkError::NotOptedIn { account, .. } if account == LEDGER));
    assert_eq!(net.goods(SELLER, GOOD), Some(START_GOODS));
}

#[test]
fn only_owner_can_withdraw_or_reprice() {
    let mut net = network();
    net.submit(&create(0, 3, 1)).expect("create");

    let steal = Call::new(BUYER, Operation::Withdraw { good: GOOD, nonce: 0 });
    assert!(matches!(
        net.submit(&steal),
        Err(NetworkError::Rejected(MarketError::ListingNotFound(_)))
    ));

    let undercut = Call::new(
        BUYER,
        Operation::Reprice {
            good: GOOD,
            nonce: 0,
            unitary_price: 0,
        },
    );
    assert!(net.submit(&undercut).is_err());
    assert_eq!(record(&net, 0), Some(ListingRecord::new(3, 1)));
}

#[test]
fn receipts_serialize_for_clients() {
    let mut net = network();
    net.submit(&create(0, 3, 1)).expect("create");
    let receipt = net.submit(&withdraw(0)).expect("withdraw");

    let json = serde_json::to_value(&receipt).expect("serialize");
    assert_eq!(json["operation"], "withdraw");
    assert_eq!(json["effects"][0]["kind"], "payment");
    assert_eq!(json["effects"][1]["kind"], "goods_transfer");
    assert_eq!(json["effects"][1]["quantity"], 3);
}

// ============================================================================
// Conservation
// ============================================================================

proptest! {
    #[test]
    fn value_is_conserved_across_any_call_sequence(
        calls in proptest::collection::vec((0u8..5, 0u64..3, 0u64..30), 1..40),
    ) {
        let mut net = network();
        let goods_supply = net.goods_supply(GOOD);
        let native_supply = net.native_supply();

        for (kind, nonce, value) in calls {
            let call = match kind {
                0 => create(nonce, value, 1_000),
                1 => top_up(nonce, value),
                2 => reprice(nonce, value * 1_000),
                3 => purchase(nonce, value, value * 2_000),
                _ => withdraw(nonce),
            };
            let _ = net.submit(&call);

            prop_assert_eq!(net.goods_supply(GOOD), goods_supply);
            prop_assert_eq!(net.native_supply(), native_supply);
            prop_assert!(net.market().is_conserved().expect("audit"));

            let listed = net.market().store().total_deposited(GOOD).expect("total");
            prop_assert_eq!(listed, net.goods(LEDGER, GOOD).map_or(0, u128::from));
        }
    }
}
