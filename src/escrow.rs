//! Escrow ledger — buyer payments locked pending confirmation
//!
//! At most one live escrow per asset key. `released` is terminal and
//! irreversible: once flipped, the only way forward for the key is a
//! brand-new listing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::MarketError;
use crate::ids::{AccountId, AssetKey};

/// A locked payment awaiting settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub buyer: AccountId,
    /// Amount locked; at least the listing price at lock time
    pub amount: Decimal,
    pub released: bool,
    /// Millisecond epoch timestamp of the lock
    pub locked_at: i64,
}

/// Ledger of escrows keyed by asset.
#[derive(Debug, Default)]
pub struct EscrowBook {
    escrows: HashMap<AssetKey, Escrow>,
}

impl EscrowBook {
    pub fn new() -> Self {
        Self {
            escrows: HashMap::new(),
        }
    }

    pub fn get(&self, key: &AssetKey) -> Option<&Escrow> {
        self.escrows.get(key)
    }

    /// True if the key carries a settled (released) escrow record.
    pub fn has_released(&self, key: &AssetKey) -> bool {
        self.escrows.get(key).map_or(false, |e| e.released)
    }

    /// Record a locked payment.
    ///
    /// An unreleased escrow at the key is never overwritten — the first
    /// buyer's funds stay locked until settlement or unlisting. A released
    /// record from a previous sale cycle is replaced. The caller validates
    /// the listing and the payment amount before locking.
    pub fn lock(
        &mut self,
        key: AssetKey,
        buyer: AccountId,
        amount: Decimal,
        locked_at: i64,
    ) -> Result<&Escrow, MarketError> {
        if self.escrows.get(&key).is_some_and(|e| !e.released) {
            return Err(MarketError::AlreadyInEscrow {
                key: key.to_string(),
            });
        }

        let escrow = Escrow {
            buyer,
            amount,
            released: false,
            locked_at,
        };
        self.escrows.insert(key.clone(), escrow);
        Ok(&self.escrows[&key])
    }

    /// Flip `released`, durably. Fails if already released.
    ///
    /// Called only after funds and custody have moved; no observer sees
    /// `released = true` before the value movement completed.
    pub fn mark_released(&mut self, key: &AssetKey) -> Result<&Escrow, MarketError> {
        let escrow = self
            .escrows
            .get_mut(key)
            .ok_or(MarketError::NotBuyer)?;
        if escrow.released {
            return Err(MarketError::AlreadyReleased {
                key: key.to_string(),
            });
        }
        escrow.released = true;
        Ok(escrow)
    }

    /// Remove the record at the key, returning it. Used for refunds on
    /// unlisting and for clearing a stale record under a fresh listing.
    pub fn take(&mut self, key: &AssetKey) -> Option<Escrow> {
        self.escrows.remove(key)
    }
}
