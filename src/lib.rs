pub mod clock;
pub mod codec;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod facade;
pub mod probe;
pub mod storage;

pub use config::{StorageConfig, StorageConfigBuilder, StorageConfigError};
pub use errors::StorageError;
pub use facade::{Environment, EnvironmentBuilder, StorageFacade};
pub use probe::Support;
pub use storage::Lookup;
