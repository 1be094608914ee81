//! Data models module
//!
//! This module contains all data structures used throughout the application.
//! Every persisted entity implements [`Record`] so lists, the change feed and
//! the admin screens can treat tables uniformly.

pub mod event;
pub mod gallery;
pub mod team;
pub mod message;
pub mod admin_user;
pub mod department;
pub mod table;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

// Re-export commonly used models
pub use event::{Event, EventInput};
pub use gallery::{GalleryItem, GalleryInput};
pub use team::{TeamMember, TeamMemberInput};
pub use message::{Message, MessageInput};
pub use admin_user::{AdminUser, AdminUserInput};
pub use department::Department;
pub use table::Table;

/// A row owned by the backend and identified by its backend-assigned id
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table the record lives in
    const TABLE: Table;

    /// Human readable entity name used in notifications and errors
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;

    /// Short description of the record for toasts
    fn label(&self) -> String;
}
