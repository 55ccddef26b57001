//! Custody & Escrow Settlement for the Asset Marketplace
//!
//! This crate implements the coordination layer for two-party
//! asset-for-payment exchange: a seller deposits an asset into custody, a
//! buyer locks payment in escrow against it, and the buyer's confirmation
//! atomically pays out the fee split and hands the asset over.
//!
//! # Modules
//! - `ids`: Strongly-typed account, collection, and asset identifiers
//! - `errors`: Error taxonomy for all operations
//! - `events`: Events emitted by successful operations
//! - `receipts`: Receipts returned by the public entry points
//! - `treasury`: Payment balances and checked transfers
//! - `custody`: External asset-registry seam
//! - `listing`: Listing ledger
//! - `escrow`: Escrow ledger
//! - `fees`: Platform fee configuration and split
//! - `settlement`: Confirm/unlist orchestration — the only value-moving path
//! - `market`: Public marketplace facade
//!
//! # Version
//! v0.1.0 — Initial implementation

pub mod custody;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod fees;
pub mod ids;
pub mod listing;
pub mod market;
pub mod receipts;
pub mod settlement;
pub mod treasury;

/// Marketplace ABI version — frozen after release
pub const MARKET_ABI_VERSION: &str = "1.0.0";
