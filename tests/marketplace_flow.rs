//! Marketplace Flow Tests
//!
//! End-to-end and adversarial coverage:
//! - Full list → buy → confirm lifecycle with balance accounting
//! - Double-settlement and double-purchase rejection
//! - Unlisting before and after settlement
//! - Fee administration boundaries and retroactive rate changes
//! - Custody failure atomicity
//! - Fuzz testing (proptest) of the fee-split conservation invariant

use marketplace::custody::{AssetCustodian, InMemoryCustodian};
use marketplace::errors::MarketError;
use marketplace::fees::FeeConfig;
use marketplace::ids::{AccountId, AssetKey};
use marketplace::market::Marketplace;
use marketplace::MARKET_ABI_VERSION;
use proptest::prelude::*;
use rust_decimal::Decimal;

struct Fixture {
    market: Marketplace<InMemoryCustodian>,
    owner: AccountId,
    seller: AccountId,
    buyer: AccountId,
    key: AssetKey,
}

/// Seller holds PUNKS#1, buyer is funded with 10_000, fee is 2%.
fn fixture() -> Fixture {
    let owner = AccountId::new();
    let seller = AccountId::new();
    let buyer = AccountId::new();
    let key = AssetKey::new("PUNKS", 1u64);

    let mut custodian = InMemoryCustodian::new();
    custodian.register(key.clone(), seller);

    let mut market = Marketplace::new(custodian, FeeConfig::new(owner, 2).unwrap());
    market.deposit(buyer, Decimal::from(10_000)).unwrap();

    Fixture {
        market,
        owner,
        seller,
        buyer,
        key,
    }
}

fn total_balances(f: &Fixture) -> Decimal {
    f.market.balance_of(&f.owner)
        + f.market.balance_of(&f.seller)
        + f.market.balance_of(&f.buyer)
        + f.market.balance_of(f.market.market_account())
}

// ═══════════════════════════════════════════════════════════════════
// End-to-End Lifecycle
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_full_lifecycle_list_buy_confirm() {
    let mut f = fixture();

    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();
    let receipt = f.market.confirm(&f.buyer, &f.key).unwrap();

    // 2% of 1000 = 20 to the platform, 980 to the seller
    assert_eq!(receipt.fee_amount, Decimal::from(20));
    assert_eq!(receipt.seller_amount, Decimal::from(980));
    assert_eq!(f.market.balance_of(&f.owner), Decimal::from(20));
    assert_eq!(f.market.balance_of(&f.seller), Decimal::from(980));
    assert_eq!(f.market.balance_of(&f.buyer), Decimal::from(9000));

    // Asset moved to the buyer, escrow terminal
    assert_eq!(f.market.custodian().holder_of(&f.key), Some(f.buyer));
    assert!(f.market.escrow(&f.key).unwrap().released);

    // Second confirm is rejected and pays nothing
    let second = f.market.confirm(&f.buyer, &f.key);
    assert!(matches!(second, Err(MarketError::AlreadyReleased { .. })));
    assert_eq!(f.market.balance_of(&f.seller), Decimal::from(980));
    assert_eq!(f.market.balance_of(&f.owner), Decimal::from(20));
}

#[test]
fn test_lifecycle_conserves_total_balances() {
    let mut f = fixture();
    let initial = total_balances(&f);

    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    assert_eq!(total_balances(&f), initial);

    f.market.buy(&f.buyer, &f.key, Decimal::from(1200)).unwrap();
    assert_eq!(total_balances(&f), initial);

    f.market.confirm(&f.buyer, &f.key).unwrap();
    assert_eq!(total_balances(&f), initial);
    // Market account drained exactly
    assert_eq!(
        f.market.balance_of(f.market.market_account()),
        Decimal::ZERO
    );
}

#[test]
fn test_overpayment_refunded_at_settlement() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1500)).unwrap();
    f.market.confirm(&f.buyer, &f.key).unwrap();

    // Split comes from the price; the 500 excess goes back to the buyer
    assert_eq!(f.market.balance_of(&f.seller), Decimal::from(980));
    assert_eq!(f.market.balance_of(&f.owner), Decimal::from(20));
    assert_eq!(f.market.balance_of(&f.buyer), Decimal::from(9000));
}

// ═══════════════════════════════════════════════════════════════════
// Purchase Guards
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_buy_unlisted_key() {
    let mut f = fixture();
    let result = f.market.buy(&f.buyer, &f.key, Decimal::from(1000));
    assert!(matches!(result, Err(MarketError::NotListed { .. })));
    assert!(f.market.escrow(&f.key).is_none());
}

#[test]
fn test_buy_below_price() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();

    let result = f.market.buy(&f.buyer, &f.key, Decimal::from(500));
    assert!(matches!(result, Err(MarketError::InsufficientPayment { .. })));
    assert!(f.market.escrow(&f.key).is_none());
    assert_eq!(f.market.balance_of(&f.buyer), Decimal::from(10_000));
}

#[test]
fn test_second_buyer_cannot_displace_first() {
    let mut f = fixture();
    let rival = AccountId::new();
    f.market.deposit(rival, Decimal::from(10_000)).unwrap();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();

    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();
    let result = f.market.buy(&rival, &f.key, Decimal::from(2000));
    assert!(matches!(result, Err(MarketError::AlreadyInEscrow { .. })));

    // First buyer still settles normally
    let receipt = f.market.confirm(&f.buyer, &f.key).unwrap();
    assert_eq!(receipt.buyer, f.buyer);
    assert_eq!(f.market.balance_of(&rival), Decimal::from(10_000));
}

#[test]
fn test_confirm_by_stranger() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();

    let eve = AccountId::new();
    let result = f.market.confirm(&eve, &f.key);
    assert_eq!(result.unwrap_err(), MarketError::NotBuyer);
    assert!(!f.market.escrow(&f.key).unwrap().released);
    assert_eq!(
        f.market.balance_of(f.market.market_account()),
        Decimal::from(1000)
    );
}

// ═══════════════════════════════════════════════════════════════════
// Unlisting
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_unlist_before_buy_returns_asset() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.unlist(&f.seller, &f.key).unwrap();

    assert_eq!(f.market.custodian().holder_of(&f.key), Some(f.seller));
    assert!(f.market.listing(&f.key).is_none());

    // Key is gone from the market
    let result = f.market.buy(&f.buyer, &f.key, Decimal::from(1000));
    assert!(matches!(result, Err(MarketError::NotListed { .. })));
}

#[test]
fn test_unlist_with_locked_escrow_refunds_buyer() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();

    f.market.unlist(&f.seller, &f.key).unwrap();
    assert_eq!(f.market.balance_of(&f.buyer), Decimal::from(10_000));
    assert_eq!(f.market.custodian().holder_of(&f.key), Some(f.seller));
    assert!(f.market.escrow(&f.key).is_none());
}

#[test]
fn test_unlist_after_settlement_rejected() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();
    f.market.confirm(&f.buyer, &f.key).unwrap();

    let result = f.market.unlist(&f.seller, &f.key);
    assert!(matches!(result, Err(MarketError::AlreadyReleased { .. })));
    // Buyer keeps the asset
    assert_eq!(f.market.custodian().holder_of(&f.key), Some(f.buyer));
}

// ═══════════════════════════════════════════════════════════════════
// Fee Administration
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_fee_boundary_100_rejected_99_allowed() {
    let mut f = fixture();
    let result = f.market.set_fee_percentage(&f.owner, 100);
    assert_eq!(result.unwrap_err(), MarketError::InvalidFeePercentage(100));

    f.market.set_fee_percentage(&f.owner, 99).unwrap();
    assert_eq!(f.market.fee_percentage(), 99);
}

#[test]
fn test_fee_change_applies_to_later_settlement() {
    let mut f = fixture();
    f.market
        .list(&f.seller, f.key.clone(), Decimal::from(1000))
        .unwrap();
    f.market.buy(&f.buyer, &f.key, Decimal::from(1000)).unwrap();

    // Rate change between lock and confirmation changes the split
    f.market.set_fee_percentage(&f.owner, 10).unwrap();
    let receipt = f.market.confirm(&f.buyer, &f.key).unwrap();
    assert_eq!(receipt.fee_amount, Decimal::from(100));
    assert_eq!(receipt.seller_amount, Decimal::from(900));
}

#[test]
fn test_set_fee_by_non_owner() {
    let mut f = fixture();
    let result = f.market.set_fee_percentage(&f.seller, 1);
    assert_eq!(result.unwrap_err(), MarketError::NotOwner);
    assert_eq!(f.market.fee_percentage(), 2);
}

// ═══════════════════════════════════════════════════════════════════
// Atomicity Under Custody Failure
// ═══════════════════════════════════════════════════════════════════

/// Custodian that refuses every transfer after a set number of calls.
struct FlakyCustodian {
    inner: InMemoryCustodian,
    allowed: u32,
}

impl AssetCustodian for FlakyCustodian {
    fn holder_of(&self, key: &AssetKey) -> Option<AccountId> {
        self.inner.holder_of(key)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: AccountId,
        key: &AssetKey,
    ) -> Result<(), marketplace::errors::CustodyError> {
        if self.allowed == 0 {
            return Err(marketplace::errors::CustodyError::NotHeld {
                key: key.to_string(),
            });
        }
        self.allowed -= 1;
        self.inner.transfer(from, to, key)
    }
}

#[test]
fn test_confirm_custody_failure_is_all_or_nothing() {
    let owner = AccountId::new();
    let seller = AccountId::new();
    let buyer = AccountId::new();
    let key = AssetKey::new("LAND", 9u64);

    let mut inner = InMemoryCustodian::new();
    inner.register(key.clone(), seller);
    // One transfer allowed (the listing custody), then failures
    let custodian = FlakyCustodian { inner, allowed: 1 };

    let mut market = Marketplace::new(custodian, FeeConfig::new(owner, 2).unwrap());
    market.deposit(buyer, Decimal::from(2000)).unwrap();
    market.list(&seller, key.clone(), Decimal::from(1000)).unwrap();
    market.buy(&buyer, &key, Decimal::from(1500)).unwrap();

    let result = market.confirm(&buyer, &key);
    assert!(matches!(result, Err(MarketError::CustodyTransferFailed(_))));

    // No payout leaked, escrow retryable
    assert_eq!(market.balance_of(&owner), Decimal::ZERO);
    assert_eq!(market.balance_of(&seller), Decimal::ZERO);
    assert_eq!(market.balance_of(&buyer), Decimal::from(500));
    assert_eq!(
        market.balance_of(market.market_account()),
        Decimal::from(1500)
    );
    assert!(!market.escrow(&key).unwrap().released);
    assert!(market.listing(&key).unwrap().is_active);
}

#[test]
fn test_abi_version_frozen() {
    assert_eq!(MARKET_ABI_VERSION, "1.0.0");
}

// ═══════════════════════════════════════════════════════════════════
// Fuzz Testing (proptest)
// ═══════════════════════════════════════════════════════════════════

proptest! {
    /// Fee plus seller amount always reconstructs the price exactly,
    /// for any price and any accepted rate.
    #[test]
    fn prop_fee_split_conserves_price(price in 1u64..1_000_000_000_000, rate in 0u8..100) {
        let config = FeeConfig::new(AccountId::new(), rate).unwrap();
        let price = Decimal::from(price);
        let (fee, seller) = config.split(price);

        prop_assert_eq!(fee + seller, price);
        prop_assert!(fee >= Decimal::ZERO);
        prop_assert!(seller >= Decimal::ZERO);
        // Fee never exceeds the rate's share
        prop_assert!(fee * Decimal::from(100) <= price * Decimal::from(rate));
    }

    /// A settled sale pays out exactly the locked amount across the three
    /// recipients, for any payment at or above the price.
    #[test]
    fn prop_settlement_conserves_locked_amount(
        price in 1u64..1_000_000,
        excess in 0u64..1_000_000,
        rate in 0u8..100,
    ) {
        let owner = AccountId::new();
        let seller = AccountId::new();
        let buyer = AccountId::new();
        let key = AssetKey::new("PUNKS", 1u64);

        let mut custodian = InMemoryCustodian::new();
        custodian.register(key.clone(), seller);

        let mut market = Marketplace::new(custodian, FeeConfig::new(owner, rate).unwrap());
        let payment = Decimal::from(price) + Decimal::from(excess);
        market.deposit(buyer, payment).unwrap();

        market.list(&seller, key.clone(), Decimal::from(price)).unwrap();
        market.buy(&buyer, &key, payment).unwrap();
        let receipt = market.confirm(&buyer, &key).unwrap();

        let paid_out = market.balance_of(&owner)
            + market.balance_of(&seller)
            + market.balance_of(&buyer);
        prop_assert_eq!(paid_out, payment);
        prop_assert_eq!(receipt.fee_amount + receipt.seller_amount, Decimal::from(price));
        prop_assert_eq!(market.balance_of(market.market_account()), Decimal::ZERO);
    }
}
