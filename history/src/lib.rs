//! wallet-history library
//!
//! In-memory, normalized transaction history over a wallet ledger. The
//! [`TransactionHistory`] store rebuilds its index from four ledger sources
//! (confirmed incoming, confirmed outgoing, pending outgoing, pool incoming)
//! and serves consistent reads while rebuilds run.

pub mod config;
pub mod confirmations;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod normalize;
pub mod payment_id;
pub mod record;
pub mod refresher;
pub mod snapshot;
pub mod store;

pub use error::{HistoryError, LedgerError};
pub use ledger::Ledger;
pub use record::{Direction, RewardType, TransactionRecord, Transfer};
pub use refresher::HistoryRefresher;
pub use snapshot::HistorySnapshot;
pub use store::TransactionHistory;
