//! Local ledger for personal wallets.
//!
//! Wallets, their ledger rows (income, expense, adjustments and paired
//! transfer legs), two singleton preference rows and an outbox of committed
//! mutations. Every operation runs through [`Engine`], which talks to a
//! [`Store`] backend.

pub use app_state::{AppState, WalletContext};
pub use commands::{AdjustmentCmd, IncomeExpenseCmd, TransferCmd};
pub use currency::{CurrencyCode, CurrencyPreference};
pub use error::{EngineError, ErrorKind};
pub use ops::{Engine, EngineBuilder, TransferPair, WalletBalance};
pub use outbox::{OutboxEntity, OutboxEntry, OutboxOperation, OutboxStatus};
pub use store::{MemoryStore, SqlStore, Store, StoreTx, WalletScope};
pub use transactions::{
    ADJUSTMENT_CATEGORY, TRANSFER_CATEGORY, Transaction, TransactionType, fold_balance,
    signed_amount,
};
pub use util::MAX_AMOUNT;
pub use wallets::{Wallet, WalletIcon};

mod app_state;
mod commands;
mod currency;
mod error;
mod ops;
mod outbox;
pub mod store;
mod transactions;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
