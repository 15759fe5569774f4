//! Vault module: encrypted entry storage.
//!
//! This module provides:
//! - `Entry`, `EntryId` and friends (`entry`)
//! - The versioned on-disk envelope (`format`)
//! - Crash-safe file writes (`storage`)
//! - The high-level `VaultSession` for creating, unlocking and editing vaults (`session`)

pub mod entry;
pub mod format;
pub mod session;
pub mod storage;

// Re-export the most commonly used items.
pub use entry::{Entry, EntryId, EntryKey, EntryMetadata, EntryUpdate};
pub use format::{Envelope, CURRENT_VERSION};
pub use session::VaultSession;
