//! Database repositories module
//!
//! This module contains all repository implementations for data access.
//! Every function either returns the requested data or propagates the
//! backend error unchanged; nothing is retried or cached here.

pub mod event;
pub mod gallery;
pub mod team;
pub mod message;
pub mod admin_user;
pub mod department;

use async_trait::async_trait;
use uuid::Uuid;
use crate::models::{Message, Record};
use crate::utils::errors::Result;

// Re-export repositories
pub use event::EventRepository;
pub use gallery::GalleryRepository;
pub use team::TeamRepository;
pub use message::MessageRepository;
pub use admin_user::AdminUserRepository;
pub use department::DepartmentRepository;

/// A table an admin screen can list and delete from
#[async_trait]
pub trait ListRepository: Send + Sync + 'static {
    type Record: Record;

    /// All rows in the table's fixed display order
    async fn get_all(&self) -> Result<Vec<Self::Record>>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// A table an admin screen can also create and edit rows in
#[async_trait]
pub trait EntityRepository: ListRepository {
    type Input: Send + Sync + 'static;

    async fn create(&self, input: Self::Input) -> Result<Self::Record>;

    /// Overwrite every writable column of `id`
    async fn update(&self, id: Uuid, input: Self::Input) -> Result<Self::Record>;
}

/// The messages inbox
#[async_trait]
pub trait InboxRepository: ListRepository<Record = Message> {
    async fn mark_as_read(&self, id: Uuid) -> Result<Message>;
}
