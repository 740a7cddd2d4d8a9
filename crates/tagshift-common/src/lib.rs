pub mod bridge;
pub mod config;
pub mod loader;
pub mod logging;
pub mod vfs;

pub type Result<T> = anyhow::Result<T>;

pub use bridge::{BridgeError, HostBridge, MemoryBridge, migrate_host_object};
pub use config::TagshiftConfig;
pub use vfs::{MemoryVfs, OsVfs, Vfs};
