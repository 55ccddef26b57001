//! Settlement engine — the only path that moves value
//!
//! Borrows both ledgers, the treasury, the custodian, and the fee
//! configuration for the duration of one operation. Every operation is
//! validate-then-act: all preconditions are checked before any state
//! changes, and the treasury payouts are compensated in full if the
//! external custody transfer fails afterwards, so callers observe
//! all-or-nothing outcomes in both failure directions.

use rust_decimal::Decimal;

use crate::custody::AssetCustodian;
use crate::errors::{MarketError, TreasuryError};
use crate::escrow::EscrowBook;
use crate::fees::FeeConfig;
use crate::ids::{AccountId, AssetKey};
use crate::listing::ListingBook;
use crate::receipts::{SettlementReceipt, UnlistReceipt};
use crate::treasury::Treasury;

/// One-shot orchestrator for `confirm` and `unlist`.
///
/// Constructed per call by the marketplace facade; the borrows guarantee
/// no other operation observes intermediate state.
pub struct SettlementEngine<'a> {
    pub listings: &'a mut ListingBook,
    pub escrows: &'a mut EscrowBook,
    pub treasury: &'a mut Treasury,
    pub custodian: &'a mut dyn AssetCustodian,
    pub fees: &'a FeeConfig,
    /// Account holding escrowed funds and asset custody between lock and
    /// settlement
    pub market_account: AccountId,
}

impl<'a> SettlementEngine<'a> {
    /// Buyer-initiated settlement: pay out the fee split, refund any
    /// overpayment, transfer the asset, then mark the escrow released.
    ///
    /// The split is computed from the listing price at confirmation time.
    /// If the seller raised the price after the lock, the escrowed amount
    /// cannot cover the split and the call fails with no state change.
    pub fn confirm(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
    ) -> Result<SettlementReceipt, MarketError> {
        let listing = self
            .listings
            .get(key)
            .cloned()
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;
        // No escrow at the key means no recorded buyer
        let escrow = self.escrows.get(key).cloned().ok_or(MarketError::NotBuyer)?;

        if escrow.buyer != *caller {
            return Err(MarketError::NotBuyer);
        }
        if escrow.released {
            return Err(MarketError::AlreadyReleased {
                key: key.to_string(),
            });
        }
        if escrow.amount < listing.price {
            return Err(MarketError::ValueTransferFailed(
                TreasuryError::InsufficientBalance {
                    required: listing.price.to_string(),
                    available: escrow.amount.to_string(),
                },
            ));
        }

        let (fee_amount, seller_amount) = self.fees.split(listing.price);
        let overpayment = escrow.amount - listing.price;
        let platform = *self.fees.owner();
        let market = self.market_account;

        // Payouts from the escrowed funds, compensated on any later failure
        self.treasury.transfer(market, platform, fee_amount)?;
        if let Err(err) = self.treasury.transfer(market, listing.seller, seller_amount) {
            self.revert(platform, fee_amount);
            return Err(err.into());
        }
        if let Err(err) = self.treasury.transfer(market, escrow.buyer, overpayment) {
            self.revert(listing.seller, seller_amount);
            self.revert(platform, fee_amount);
            return Err(err.into());
        }

        // External custody hand-off to the buyer
        if let Err(err) = self.custodian.transfer(&market, escrow.buyer, key) {
            tracing::warn!(%key, error = %err, "custody transfer failed, payouts rolled back");
            self.revert(escrow.buyer, overpayment);
            self.revert(listing.seller, seller_amount);
            self.revert(platform, fee_amount);
            return Err(err.into());
        }

        // Commit: funds and asset have moved, flip the terminal flag
        self.escrows.mark_released(key)?;
        self.listings.deactivate(key)?;

        Ok(SettlementReceipt {
            seller: listing.seller,
            buyer: escrow.buyer,
            fee_amount,
            seller_amount,
        })
    }

    /// Seller-initiated unlisting: refund any live escrow to its buyer,
    /// return custody of the asset, and remove the listing.
    ///
    /// Illegal once the escrow has been released.
    pub fn unlist(
        &mut self,
        caller: &AccountId,
        key: &AssetKey,
    ) -> Result<UnlistReceipt, MarketError> {
        let listing = self
            .listings
            .get(key)
            .cloned()
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller);
        }
        if self.escrows.has_released(key) {
            return Err(MarketError::AlreadyReleased {
                key: key.to_string(),
            });
        }

        let market = self.market_account;

        // A locked escrow goes back to its buyer in full
        let refund = self.escrows.get(key).cloned();
        if let Some(escrow) = &refund {
            self.treasury.transfer(market, escrow.buyer, escrow.amount)?;
        }

        // Asset back to the seller
        if let Err(err) = self.custodian.transfer(&market, listing.seller, key) {
            if let Some(escrow) = &refund {
                self.revert(escrow.buyer, escrow.amount);
            }
            return Err(err.into());
        }

        self.escrows.take(key);
        self.listings.remove(key, caller)?;

        Ok(UnlistReceipt {
            seller: listing.seller,
            key: key.clone(),
        })
    }

    /// Return funds moved earlier in the same operation to the market
    /// account. The reverse of a transfer that just succeeded cannot fail.
    fn revert(&mut self, recipient: AccountId, amount: Decimal) {
        let _ = self.treasury.transfer(recipient, self.market_account, amount);
    }
}
