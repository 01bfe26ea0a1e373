/// Failures raised by the storage backends.
///
/// These never cross the [`StorageFacade`](crate::StorageFacade) boundary; the
/// facade folds them into its boolean results and logs them. Backends return
/// them wrapped in `anyhow::Error`, next to I/O, JSON and SQLite errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded ({used} of {quota} bytes)")]
    QuotaExceeded { used: usize, quota: usize },

    #[error("Storage is disabled")]
    Disabled,

    #[error("Behavior {0} is not attached")]
    BehaviorNotAttached(String),

    #[error("Behaviors are not supported by this store")]
    BehaviorsUnsupported,

    #[error("Invalid store name: {0:?}")]
    InvalidStoreName(String),
}
