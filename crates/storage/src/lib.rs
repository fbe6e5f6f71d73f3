#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryLocalStore, InMemoryRemoteStore, LocalProgressStore, ProgressRecord,
    RemoteProgressStore, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
