//! Listing ledger — source of truth for what is for sale, at what price
//!
//! One listing at most per asset key. A listing with `is_active = true`
//! means the custodian holds the asset on the seller's behalf; the flag is
//! cleared when the escrow settles so the record stays behind as an inert
//! historical entry until a fresh listing overwrites it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::errors::MarketError;
use crate::ids::{AccountId, AssetKey};

/// A recorded listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub seller: AccountId,
    pub price: Decimal,
    pub is_active: bool,
    /// Millisecond epoch timestamp of the listing
    pub listed_at: i64,
}

/// Ledger of listings keyed by asset.
#[derive(Debug, Default)]
pub struct ListingBook {
    listings: HashMap<AssetKey, Listing>,
}

impl ListingBook {
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
        }
    }

    /// Look up a listing record, active or stale.
    pub fn get(&self, key: &AssetKey) -> Option<&Listing> {
        self.listings.get(key)
    }

    /// Look up a listing only if it is active.
    pub fn active(&self, key: &AssetKey) -> Option<&Listing> {
        self.listings.get(key).filter(|l| l.is_active)
    }

    /// Record a new listing.
    ///
    /// Validates: price positive, no active listing already at the key.
    /// A stale (settled) record at the key is overwritten; the caller must
    /// have taken custody of the asset before recording.
    pub fn create(
        &mut self,
        key: AssetKey,
        seller: AccountId,
        price: Decimal,
        listed_at: i64,
    ) -> Result<&Listing, MarketError> {
        if price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice);
        }
        if self.active(&key).is_some() {
            return Err(MarketError::AlreadyListed {
                key: key.to_string(),
            });
        }

        let listing = Listing {
            seller,
            price,
            is_active: true,
            listed_at,
        };
        match self.listings.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(listing);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(listing)),
        }
    }

    /// Change the price of an active listing. Seller-only.
    ///
    /// Does not touch any escrow amount already locked against the key.
    pub fn change_price(
        &mut self,
        key: &AssetKey,
        caller: &AccountId,
        new_price: Decimal,
    ) -> Result<&Listing, MarketError> {
        if new_price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice);
        }
        let listing = self
            .listings
            .get_mut(key)
            .filter(|l| l.is_active)
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller);
        }
        listing.price = new_price;
        Ok(listing)
    }

    /// Remove a listing, returning the record so custody can be handed
    /// back. Seller-only; the settlement layer checks the escrow state
    /// before calling this.
    pub fn remove(&mut self, key: &AssetKey, caller: &AccountId) -> Result<Listing, MarketError> {
        let listing = self
            .listings
            .get(key)
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller);
        }
        // Checked above, entry is present
        Ok(self
            .listings
            .remove(key)
            .expect("listing present after lookup"))
    }

    /// Clear the active flag after settlement. The record stays behind.
    pub fn deactivate(&mut self, key: &AssetKey) -> Result<(), MarketError> {
        let listing = self
            .listings
            .get_mut(key)
            .ok_or_else(|| MarketError::NotListed {
                key: key.to_string(),
            })?;
        listing.is_active = false;
        Ok(())
    }
}
