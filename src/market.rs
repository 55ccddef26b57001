//! Marketplace facade — the public entry points
//!
//! Owns the two ledgers, the payment treasury, the custodian handle, the
//! fee configuration, and the append-only event log. Every operation takes
//! `&mut self`, so calls are serialized by construction; callers needing
//! concurrent access wrap the market in a lock of their choosing.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::custody::AssetCustodian;
use crate::errors::MarketError;
use crate::escrow::{Escrow, EscrowBook};
use crate::events::{Listed, MarketEvent, PriceChanged, Settled, Sold, Unlisted};
use crate::fees::FeeConfig;
use crate::ids::{AccountId, AssetKey};
use crate::listing::{Listing, ListingBook};
use crate::receipts::{
    BuyReceipt, ListReceipt, PriceChangeReceipt, SettlementReceipt, UnlistReceipt,
};
use crate::settlement::SettlementEngine;
use crate::treasury::Treasury;

/// Asset-for-payment exchange coordinator.
///
/// Listings deposit the asset into custody under the market's account;
/// purchases lock payment in the treasury under the same account; the
/// buyer's confirmation is the only path that pays out and hands the
/// asset over.
#[derive(Debug)]
pub struct Marketplace<C: AssetCustodian> {
    listings: ListingBook,
    escrows: EscrowBook,
    treasury: Treasury,
    custodian: C,
    fees: FeeConfig,
    /// Internal account holding escrowed funds and custodied assets
    market_account: AccountId,
    /// Emitted events log (append-only)
    events: Vec<MarketEvent>,
}

impl<C: AssetCustodian> Marketplace<C> {
    /// Create a marketplace over a custodian with the given fee
    /// configuration.
    pub fn new(custodian: C, fees: FeeConfig) -> Self {
        Self {
            listings: ListingBook::new(),
            escrows: EscrowBook::new(),
            treasury: Treasury::new(),
            custodian,
            fees,
            market_account: AccountId::new(),
            events: Vec::new(),
        }
    }

    /// The account that holds custody and escrowed funds between
    /// operations.
    pub fn market_account(&self) -> &AccountId {
        &self.market_account
    }

    // ───────────────────────── Treasury ─────────────────────────

    /// Credit a payment balance so an account can buy.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<(), MarketError> {
        self.treasury.deposit(account, amount).map_err(Into::into)
    }

    /// Payment balance of an account. Unknown accounts read as zero.
    pub fn balance_of(&self, account: &AccountId) -> Decimal {
        self.treasury.balance_of(account)
    }

    // ───────────────────────── Listing ─────────────────────────

    /// List an asset for sale, taking it into custody.
    ///
    /// Validates price and listing state before touching custody; if the
    /// custody transfer fails, no listing is created.
    pub fn list(
        &mut self,
        caller: &AccountId,
        key: AssetKey,
        price: Decimal,
    ) -> Result<ListReceipt, MarketError> {
        tracing::debug!(%key, %caller, %price, "list");

        if price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice);
        }
        if self.listings.active(&key).is_some() {
            return Err(MarketError::AlreadyListed {
                key: key.to_string(),
            });
        }

        // Custody first: the asset must be in the market's hands before
        // the listing becomes visible
        self.custodian.transfer(caller, self.market_account, &key)?;

        // A released escrow from a previous sale cycle is history now
        if self.escrows.has_released(&key) {
            self.escrows.take(&key);
        }

        self.listings
            .create(key.clone(), *caller, price, Utc::now().timestamp_millis())?;

        self.events.push(MarketEvent::Listed(Listed {
            key: key.clone(),
            seller: *caller,
            price,
        }));

        Ok(ListReceipt {
            seller: *caller,
            key,
            price,
        })
    }

    /// Change the price of an active listing. Seller-only; any already
    /// locked escrow amount is unaffected.
    pub fn change_price(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
        new_price: Decimal,
    ) -> Result<PriceChangeReceipt, MarketError> {
        tracing::debug!(%key, %caller, %new_price, "change_price");

        self.listings.change_price(key, caller, new_price)?;

        self.events.push(MarketEvent::PriceChanged(PriceChanged {
            key: key.clone(),
            seller: *caller,
            new_price,
        }));

        Ok(PriceChangeReceipt {
            seller: *caller,
            key: key.clone(),
            new_price,
        })
    }

    // ───────────────────────── Purchase ─────────────────────────

    /// Lock a payment against an active listing. No payout happens here;
    /// funds move from the buyer's balance into the market account and
    /// stay there until `confirm` or `unlist`.
    pub fn buy(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
        payment: Decimal,
    ) -> Result<BuyReceipt, MarketError> {
        tracing::debug!(%key, %caller, %payment, "buy");

        let listing = self
            .listings
            .active(key)
            .cloned()
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;

        if payment < listing.price {
            return Err(MarketError::InsufficientPayment {
                payment: payment.to_string(),
                price: listing.price.to_string(),
            });
        }
        if self.escrows.get(key).is_some_and(|e| !e.released) {
            return Err(MarketError::AlreadyInEscrow {
                key: key.to_string(),
            });
        }

        // Lock the funds under the market account
        self.treasury.transfer(*caller, self.market_account, payment)?;
        self.escrows
            .lock(key.clone(), *caller, payment, Utc::now().timestamp_millis())?;

        self.events.push(MarketEvent::Sold(Sold {
            key: key.clone(),
            seller: listing.seller,
            buyer: *caller,
            price: listing.price,
            amount: payment,
        }));

        Ok(BuyReceipt {
            seller: listing.seller,
            buyer: *caller,
            key: key.clone(),
            price: listing.price,
        })
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Buyer confirmation: pay out the fee split, transfer the asset,
    /// mark the escrow released.
    pub fn confirm(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
    ) -> Result<SettlementReceipt, MarketError> {
        let receipt = self.engine().confirm(caller, key)?;
        tracing::info!(%key, buyer = %receipt.buyer, fee = %receipt.fee_amount, "settled");

        self.events.push(MarketEvent::Settled(Settled {
            key: key.clone(),
            seller: receipt.seller,
            buyer: receipt.buyer,
            fee_amount: receipt.fee_amount,
            seller_amount: receipt.seller_amount,
        }));
        Ok(receipt)
    }

    /// Seller-initiated removal: refund any locked escrow, hand the asset
    /// back, drop the listing.
    pub fn unlist(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
    ) -> Result<UnlistReceipt, MarketError> {
        let receipt = self.engine().unlist(caller, key)?;
        tracing::debug!(%key, seller = %receipt.seller, "unlisted");

        self.events.push(MarketEvent::Unlisted(Unlisted {
            key: key.clone(),
            seller: receipt.seller,
        }));
        Ok(receipt)
    }

    // ───────────────────────── Fee Administration ─────────────────────────

    /// Update the platform fee percentage. Owner-only; applies to every
    /// settlement after the change.
    pub fn set_fee_percentage(
        &mut self,
        caller: &AccountId,
        new_percentage: u8,
    ) -> Result<(), MarketError> {
        self.fees.set_fee_percentage(caller, new_percentage)
    }

    pub fn fee_percentage(&self) -> u8 {
        self.fees.fee_percentage()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn listing(&self, key: &AssetKey) -> Option<&Listing> {
        self.listings.get(key)
    }

    pub fn escrow(&self, key: &AssetKey) -> Option<&Escrow> {
        self.escrows.get(key)
    }

    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    fn engine(&mut self) -> SettlementEngine<'_> {
        SettlementEngine {
            listings: &mut self.listings,
            escrows: &mut self.escrows,
            treasury: &mut self.treasury,
            custodian: &mut self.custodian,
            fees: &self.fees,
            market_account: self.market_account,
        }
    }
}
