//! Treasury — payment balances, deposits, and checked transfers
//!
//! Holds per-account balances in the single payment unit. All arithmetic
//! is checked; a transfer either applies both the debit and the credit or
//! leaves both balances untouched.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::TreasuryError;
use crate::ids::AccountId;

/// Payment ledger backing the marketplace.
///
/// Escrowed funds live under the market's own account between `buy` and
/// `confirm`/`unlist`; every movement is a plain account-to-account
/// transfer, so the sum of all balances is invariant after `deposit`.
#[derive(Debug, Default)]
pub struct Treasury {
    balances: HashMap<AccountId, Decimal>,
}

impl Treasury {
    /// Create an empty treasury.
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit a payment balance from outside the system.
    ///
    /// Validates: amount positive, no overflow.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<(), TreasuryError> {
        if amount <= Decimal::ZERO {
            return Err(TreasuryError::InvalidAmount);
        }
        let current = self.balances.entry(account).or_insert(Decimal::ZERO);
        let new_balance = current.checked_add(amount).ok_or(TreasuryError::Overflow)?;
        *current = new_balance;
        Ok(())
    }

    /// Get the balance for an account. Unknown accounts read as zero.
    pub fn balance_of(&self, account: &AccountId) -> Decimal {
        self.balances
            .get(account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Move `amount` from one account to another.
    ///
    /// Check-then-commit: both balances are validated before either is
    /// written, so a failed transfer leaves no partial state. A zero
    /// amount is a no-op.
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), TreasuryError> {
        if amount < Decimal::ZERO {
            return Err(TreasuryError::InvalidAmount);
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let from_balance = self
            .balances
            .get(&from)
            .copied()
            .ok_or_else(|| TreasuryError::AccountNotFound {
                account_id: from.to_string(),
            })?;

        if from_balance < amount {
            return Err(TreasuryError::InsufficientBalance {
                required: amount.to_string(),
                available: from_balance.to_string(),
            });
        }

        let to_balance = self.balance_of(&to);
        let new_to = to_balance.checked_add(amount).ok_or(TreasuryError::Overflow)?;
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(TreasuryError::Overflow)?;

        self.balances.insert(from, new_from);
        self.balances.insert(to, new_to);
        Ok(())
    }

    /// Sum of all balances. Constant across transfers.
    pub fn total_supply(&self) -> Decimal {
        self.balances.values().copied().sum()
    }
}
