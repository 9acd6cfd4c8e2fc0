//! Pending-transaction storage and pool service (spec §4.3 `C3`).

pub mod error;
pub mod local;
pub mod service;
pub mod shared;
pub mod storage;

pub use error::TxPoolError;
pub use local::LocalPendingTxStorage;
pub use service::PendingTransactionPoolService;
pub use shared::SharedPendingTxStorage;
pub use storage::PendingTxStorage;
