//! Durable storage of wizard progress.
//!
//! - **Store**: string key-value backends (`SqliteStore`, `MemoryStore`)
//! - **Adapter**: prefixed save/load/clear of the session `Snapshot`
//!
//! Snapshot layout under the default prefix:
//!
//! - `assessment_state` - JSON snapshot (screen, step, photo presence,
//!   user data, results, ISO-8601 timestamp)
//! - `assessment_timestamp` - epoch milliseconds of the last save

mod adapter;
mod store;
mod types;

pub use adapter::PersistenceAdapter;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use types::{PhotosCaptured, Snapshot};
