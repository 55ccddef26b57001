//! Asset custody — the external registry seam
//!
//! The marketplace never moves assets itself; it asks an [`AssetCustodian`]
//! to do so. The registry is authoritative for who currently holds each
//! asset. Transfers are atomic: they fully succeed or fully fail with no
//! partial state.

use std::collections::HashMap;

use crate::errors::CustodyError;
use crate::ids::{AccountId, AssetKey};

/// Authoritative registry mapping each asset to its current holder.
pub trait AssetCustodian {
    /// Current holder of an asset, if the registry knows it.
    fn holder_of(&self, key: &AssetKey) -> Option<AccountId>;

    /// Move an asset from `from` to `to`.
    ///
    /// Fails with [`CustodyError::NotHeld`] if the registry does not track
    /// the asset, and [`CustodyError::WrongHolder`] if `from` is not the
    /// current holder. On failure nothing moves.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: AccountId,
        key: &AssetKey,
    ) -> Result<(), CustodyError>;
}

/// In-memory custodian for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryCustodian {
    holdings: HashMap<AssetKey, AccountId>,
}

impl InMemoryCustodian {
    pub fn new() -> Self {
        Self {
            holdings: HashMap::new(),
        }
    }

    /// Seed the registry with an asset held by `holder`.
    pub fn register(&mut self, key: AssetKey, holder: AccountId) {
        self.holdings.insert(key, holder);
    }
}

impl AssetCustodian for InMemoryCustodian {
    fn holder_of(&self, key: &AssetKey) -> Option<AccountId> {
        self.holdings.get(key).copied()
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: AccountId,
        key: &AssetKey,
    ) -> Result<(), CustodyError> {
        let holder = self
            .holdings
            .get(key)
            .copied()
            .ok_or_else(|| CustodyError::NotHeld {
                key: key.to_string(),
            })?;

        if holder != *from {
            return Err(CustodyError::WrongHolder {
                key: key.to_string(),
                holder: holder.to_string(),
                expected: from.to_string(),
            });
        }

        self.holdings.insert(key.clone(), to);
        Ok(())
    }
}
