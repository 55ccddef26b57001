//! Marketplace events
//!
//! Events are immutable records emitted by successful operations, each
//! carrying the identity of the asset and the parties involved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, AssetKey};

/// Asset listed for sale and taken into custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listed {
    pub key: AssetKey,
    pub seller: AccountId,
    pub price: Decimal,
}

/// Buyer payment locked in escrow against a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sold {
    pub key: AssetKey,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Decimal,
    /// Amount actually locked (may exceed the price)
    pub amount: Decimal,
}

/// Listing price changed by the seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChanged {
    pub key: AssetKey,
    pub seller: AccountId,
    pub new_price: Decimal,
}

/// Listing removed and custody returned to the seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlisted {
    pub key: AssetKey,
    pub seller: AccountId,
}

/// Escrow released: payment split paid out, asset transferred to buyer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settled {
    pub key: AssetKey,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub fee_amount: Decimal,
    pub seller_amount: Decimal,
}

/// Enum wrapper for all marketplace events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    Listed(Listed),
    Sold(Sold),
    PriceChanged(PriceChanged),
    Unlisted(Unlisted),
    Settled(Settled),
}
