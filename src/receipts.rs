//! Receipts returned by the public marketplace operations
//!
//! Each public entry point returns one of these on success, confirming
//! the recorded terms back to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, AssetKey};

/// Result of a successful `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReceipt {
    pub seller: AccountId,
    pub key: AssetKey,
    pub price: Decimal,
}

/// Result of a successful `buy` (payment locked, nothing paid out yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyReceipt {
    pub seller: AccountId,
    pub buyer: AccountId,
    pub key: AssetKey,
    pub price: Decimal,
}

/// Result of a successful `confirm`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub seller: AccountId,
    pub buyer: AccountId,
    pub fee_amount: Decimal,
    pub seller_amount: Decimal,
}

/// Result of a successful `change_price`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChangeReceipt {
    pub seller: AccountId,
    pub key: AssetKey,
    pub new_price: Decimal,
}

/// Result of a successful `unlist`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlistReceipt {
    pub seller: AccountId,
    pub key: AssetKey,
}
