//! Credential store for the TurboNET command bridge.
//!
//! Persists one opaque bot credential per platform user behind the two-method
//! [`CredentialStore`] contract. Backends:
//! - **SQLite** (`SqliteCredentialStore`): the default, survives restarts
//! - **In-memory** (`InMemoryCredentialStore`): sharded map, for tests and ephemeral runs

pub mod credentials;
pub mod migration;

pub use credentials::{CredentialStore, InMemoryCredentialStore, SqliteCredentialStore};
