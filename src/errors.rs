//! Error taxonomy for listing, escrow, treasury, and settlement operations
//!
//! Every validation failure aborts the whole operation with zero side
//! effects; errors surface synchronously as the operation's outcome.

use thiserror::Error;

/// Payment treasury errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreasuryError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Asset custody registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("Asset not held by registry: {key}")]
    NotHeld { key: String },

    #[error("Asset {key} is held by {holder}, not by {expected}")]
    WrongHolder {
        key: String,
        holder: String,
        expected: String,
    },
}

/// Marketplace errors — one variant per rejected precondition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Listing price must be positive")]
    InvalidPrice,

    #[error("Caller is not the listing seller")]
    NotSeller,

    #[error("Caller is not the escrow buyer")]
    NotBuyer,

    #[error("No active listing for asset: {key}")]
    NotListed { key: String },

    #[error("Payment {payment} is below listing price {price}")]
    InsufficientPayment { payment: String, price: String },

    #[error("Escrow already released for asset: {key}")]
    AlreadyReleased { key: String },

    #[error("Caller is not the platform owner")]
    NotOwner,

    #[error("Fee percentage must be below 100, got {0}")]
    InvalidFeePercentage(u8),

    #[error("Asset already has an active listing: {key}")]
    AlreadyListed { key: String },

    #[error("Asset already has a locked escrow: {key}")]
    AlreadyInEscrow { key: String },

    #[error("Custody transfer failed: {0}")]
    CustodyTransferFailed(#[from] CustodyError),

    #[error("Value transfer failed: {0}")]
    ValueTransferFailed(#[from] TreasuryError),
}
