//! Storage layer (durable credential pair).

pub mod store;

pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
