//! Platform fee configuration
//!
//! Explicit configuration object threaded into settlement — the owner
//! identity travels with the fee rather than living in ambient state.
//! The rate is read at confirmation time, never snapshotted at listing
//! time, so a rate change applies to every settlement after it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketError;
use crate::ids::AccountId;

/// Fee rate and the account it is paid to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    owner: AccountId,
    /// Whole-number percentage in [0, 100)
    fee_percentage: u8,
}

impl FeeConfig {
    /// Create a fee configuration. The rate must be below 100.
    pub fn new(owner: AccountId, fee_percentage: u8) -> Result<Self, MarketError> {
        if fee_percentage >= 100 {
            return Err(MarketError::InvalidFeePercentage(fee_percentage));
        }
        Ok(Self {
            owner,
            fee_percentage,
        })
    }

    /// The platform owner account, paid the fee cut at settlement.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn fee_percentage(&self) -> u8 {
        self.fee_percentage
    }

    /// Update the rate. Owner-only; 100 and above are rejected (99 is the
    /// maximum accepted value).
    pub fn set_fee_percentage(
        &mut self,
        caller: &AccountId,
        new_percentage: u8,
    ) -> Result<(), MarketError> {
        if *caller != self.owner {
            return Err(MarketError::NotOwner);
        }
        if new_percentage >= 100 {
            return Err(MarketError::InvalidFeePercentage(new_percentage));
        }
        self.fee_percentage = new_percentage;
        Ok(())
    }

    /// Split a sale price into (fee, seller) amounts.
    ///
    /// `fee = floor(price * rate / 100)`; the seller receives the rest,
    /// so the two always sum to the price exactly.
    pub fn split(&self, price: Decimal) -> (Decimal, Decimal) {
        let fee = (price * Decimal::from(self.fee_percentage) / Decimal::from(100)).floor();
        (fee, price - fee)
    }
}
