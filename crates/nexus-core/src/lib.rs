//! nexus-core - Core library for Nexus
//!
//! This crate contains the shared domain models, the document store seam,
//! and the offline write-queue / sync engine used by all Nexus front ends.

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use models::{Chat, ChatId, Collection, Context, ContextId, Message, MessageId};
pub use sync::{Operation, SyncManager, SyncOperation, SyncStatus};
