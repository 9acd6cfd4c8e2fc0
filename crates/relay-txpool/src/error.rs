//! Errors the pending-transaction pool can raise (spec §4.3).

#[derive(Debug, Clone, thiserror::Error)]
pub enum TxPoolError {
    #[error("pool storage backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("transaction pool disabled")]
    Disabled,
}
