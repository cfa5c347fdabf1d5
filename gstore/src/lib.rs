//! SQLite persistence for the gatehouse model routing platform.
//!
//! [`SqliteChatStore`] implements every storage contract the chat
//! orchestrator depends on: the model catalog, user credentials,
//! conversations with their messages, and the call audit trail.
//!
//! ```rust
//! use gstore::SqliteChatStore;
//!
//! let store = SqliteChatStore::new_in_memory().expect("open store");
//! let _ = store;
//! ```

mod sqlite;

pub use sqlite::SqliteChatStore;
