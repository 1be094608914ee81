//! State management module
//!
//! Client-side state: the toast queue, id-keyed entity lists, the admin
//! screen state machines and the shared application context.

pub mod context;
pub mod dashboard;
pub mod list;
pub mod notifications;
pub mod screen;

// Re-export commonly used state components
pub use context::AppContext;
pub use dashboard::{Dashboard, DashboardSource, DashboardState};
pub use list::EntityList;
pub use notifications::{NotificationStore, Toast, ToastKind};
pub use screen::{
    AdminUsersScreen, CrudScreen, DeleteOutcome, EventsScreen, GalleryScreen, ListPhase, ListScreen,
    MessagesScreen, ModalState, TeamScreen,
};
