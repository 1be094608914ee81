//! Admin screen state machines
//!
//! A list screen goes `Loading -> Empty | Populated` and keeps its rows in
//! sync with the change feed while mounted. Screens for writable tables add a
//! modal: `Closed -> Adding | Editing -> Submitting -> Closed`.
//!
//! Backend failures never change local state. They are reported as an error
//! toast and returned to the caller.

use std::sync::{Arc, Mutex, MutexGuard};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::database::{
    AdminUserRepository, EntityRepository, EventRepository, GalleryRepository, InboxRepository,
    ListRepository, MessageRepository, TeamRepository,
};
use crate::models::{Message, Record};
use crate::realtime::{Change, RealtimeHub, SyncCallbacks, SyncHook, SyncOptions, SyncStatus};
use crate::utils::errors::{StageLightError, Result};
use crate::validation::{
    AdminUserForm, EditForm, EventForm, GalleryForm, TeamMemberForm, Validate, ValidationContext,
    ValidationErrors,
};
use super::list::EntityList;
use super::notifications::NotificationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPhase {
    Loading,
    Empty,
    Populated,
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First request: the row now awaits confirmation
    Armed,
    Deleted,
}

type SharedList<T> = Arc<Mutex<EntityList<T>>>;
type RefetchSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

fn lock<T>(list: &SharedList<T>) -> MutexGuard<'_, EntityList<T>> {
    // A panicking callback must not take the screen down with it
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_slot(slot: &RefetchSlot) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn plural(entity: &str) -> String {
    format!("{}s", entity.to_lowercase())
}

/// A screen showing every row of one table
pub struct ListScreen<R: ListRepository> {
    repo: Arc<R>,
    list: SharedList<R::Record>,
    notifications: NotificationStore,
    pending_delete: Option<Uuid>,
    sync: SyncHook,
    refetch: RefetchSlot,
}

impl<R: ListRepository> ListScreen<R> {
    pub fn new(repo: R, notifications: NotificationStore) -> Self {
        Self {
            repo: Arc::new(repo),
            list: Arc::new(Mutex::new(EntityList::new())),
            notifications,
            pending_delete: None,
            sync: SyncHook::new(),
            refetch: Arc::new(Mutex::new(None)),
        }
    }

    /// Mount the screen: subscribe to changes, then fetch the rows
    ///
    /// The subscription is opened first so nothing committed during the fetch
    /// is missed.
    pub async fn open(&mut self, hub: &RealtimeHub, options: SyncOptions) -> Result<()> {
        lock(&self.list).begin_load();
        self.mount_sync(hub, options).await;
        self.fetch().await
    }

    /// Unmount the screen; no change reaches it afterwards
    ///
    /// A re-fetch requested by the change feed is aborted, so nothing patches
    /// the rows once this returns.
    pub async fn close(&mut self) {
        self.pending_delete = None;
        self.sync.unmount().await;
        self.abort_refetch();
    }

    fn abort_refetch(&self) {
        if let Some(task) = lock_slot(&self.refetch).take() {
            if !task.is_finished() {
                task.abort();
                lock(&self.list).fail_load();
            }
        }
    }

    /// Fetch all rows again
    pub async fn load(&mut self) -> Result<()> {
        self.pending_delete = None;
        lock(&self.list).begin_load();
        self.fetch().await
    }

    async fn fetch(&self) -> Result<()> {
        fetch_into(self.repo.as_ref(), &self.list, &self.notifications).await
    }

    async fn mount_sync(&mut self, hub: &RealtimeHub, options: SyncOptions) {
        let on_insert = self.list.clone();
        let on_update = self.list.clone();
        let on_delete = self.list.clone();
        let resync_list = self.list.clone();
        let resync_repo = self.repo.clone();
        let resync_notifications = self.notifications.clone();
        let resync_slot = self.refetch.clone();

        let callbacks = SyncCallbacks::<R::Record>::new()
            .on_insert(move |record| lock(&on_insert).apply(Change::Inserted(record)))
            .on_update(move |record| lock(&on_update).apply(Change::Updated(record)))
            .on_delete(move |id| lock(&on_delete).apply(Change::Deleted(id)))
            .on_resync(move || {
                let list = resync_list.clone();
                let repo = resync_repo.clone();
                let notifications = resync_notifications.clone();
                lock(&list).begin_load();
                let task = tokio::spawn(async move {
                    // Failures are reported as a toast by fetch_into
                    let _ = fetch_into(repo.as_ref(), &list, &notifications).await;
                });
                if let Some(previous) = lock_slot(&resync_slot).replace(task) {
                    previous.abort();
                }
            });

        self.sync
            .mount::<R::Record>(hub, Some(self.notifications.clone()), callbacks, options)
            .await;
    }

    pub fn phase(&self) -> ListPhase {
        let list = lock(&self.list);
        if list.is_loading() || !list.is_loaded() {
            ListPhase::Loading
        } else if list.is_empty() {
            ListPhase::Empty
        } else {
            ListPhase::Populated
        }
    }

    /// Snapshot of the rows in display order
    pub fn items(&self) -> Vec<R::Record> {
        lock(&self.list).items().to_vec()
    }

    pub fn get(&self, id: Uuid) -> Option<R::Record> {
        lock(&self.list).get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.list).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.list).is_empty()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Row currently awaiting delete confirmation
    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Two-step delete
    ///
    /// The first request for a row arms it; a second request for the same row
    /// deletes it. A request for a different row re-arms on that row.
    pub async fn request_delete(&mut self, id: Uuid) -> Result<DeleteOutcome> {
        let table = <R::Record as Record>::TABLE;
        if self.pending_delete != Some(id) {
            debug!(table = %table, id = %id, "Delete armed");
            self.pending_delete = Some(id);
            return Ok(DeleteOutcome::Armed);
        }

        self.pending_delete = None;
        let entity = <R::Record as Record>::ENTITY;

        match self.repo.delete(id).await {
            Ok(()) => {
                lock(&self.list).remove(id);
                self.notifications.success(format!("{} deleted", entity), "The record was removed");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                warn!(table = %table, id = %id, error = %e, "Delete failed");
                self.notifications.error(format!("Could not delete {}", entity.to_lowercase()), e.to_string());
                Err(e)
            }
        }
    }

    fn upsert(&self, record: R::Record) {
        lock(&self.list).insert(record);
    }
}

impl<R: ListRepository> Drop for ListScreen<R> {
    fn drop(&mut self) {
        if let Some(task) = lock_slot(&self.refetch).take() {
            task.abort();
        }
    }
}

async fn fetch_into<R: ListRepository>(
    repo: &R,
    list: &SharedList<R::Record>,
    notifications: &NotificationStore,
) -> Result<()> {
    match repo.get_all().await {
        Ok(rows) => {
            lock(list).finish_load(rows);
            Ok(())
        }
        Err(e) => {
            lock(list).fail_load();
            let table = <R::Record as Record>::TABLE;
            warn!(table = %table, error = %e, "Failed to load rows");
            notifications.error(
                format!("Could not load {}", plural(<R::Record as Record>::ENTITY)),
                e.to_string(),
            );
            Err(e)
        }
    }
}

impl<R: InboxRepository> ListScreen<R> {
    /// Flag a message as read and patch it in place
    pub async fn mark_as_read(&mut self, id: Uuid) -> Result<Message> {
        self.pending_delete = None;
        match self.repo.mark_as_read(id).await {
            Ok(message) => {
                lock(&self.list).replace(message.clone());
                Ok(message)
            }
            Err(e) => {
                self.notifications.error("Could not update message", e.to_string());
                Err(e)
            }
        }
    }

    pub fn unread_count(&self) -> usize {
        lock(&self.list).items().iter().filter(|message| !message.is_read).count()
    }
}

/// Add/edit modal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Adding,
    Editing(Uuid),
    /// Waiting for the backend; `editing` is the row being updated, if any
    Submitting { editing: Option<Uuid> },
}

impl ModalState {
    fn before_submit(self) -> Self {
        match self {
            ModalState::Submitting { editing: Some(id) } => ModalState::Editing(id),
            ModalState::Submitting { editing: None } => ModalState::Adding,
            other => other,
        }
    }
}

/// A list screen with an add/edit modal
pub struct CrudScreen<R, F>
where
    R: EntityRepository,
    F: EditForm<Record = R::Record> + Validate<Output = R::Input>,
{
    list: ListScreen<R>,
    modal: ModalState,
    form: F,
    errors: ValidationErrors,
}

impl<R, F> CrudScreen<R, F>
where
    R: EntityRepository,
    F: EditForm<Record = R::Record> + Validate<Output = R::Input>,
{
    pub fn new(repo: R, notifications: NotificationStore) -> Self {
        Self {
            list: ListScreen::new(repo, notifications),
            modal: ModalState::Closed,
            form: F::default(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn list(&self) -> &ListScreen<R> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListScreen<R> {
        &mut self.list
    }

    pub async fn open(&mut self, hub: &RealtimeHub, options: SyncOptions) -> Result<()> {
        self.list.open(hub, options).await
    }

    pub async fn close(&mut self) {
        self.close_modal();
        self.list.close().await;
    }

    pub async fn load(&mut self) -> Result<()> {
        self.list.load().await
    }

    pub fn phase(&self) -> ListPhase {
        self.list.phase()
    }

    pub fn items(&self) -> Vec<R::Record> {
        self.list.items()
    }

    pub async fn request_delete(&mut self, id: Uuid) -> Result<DeleteOutcome> {
        self.list.request_delete(id).await
    }

    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Edit the open form; field errors stay until the next submit
    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn set_form(&mut self, form: F) {
        self.form = form;
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn open_add(&mut self) {
        self.list.cancel_delete();
        self.modal = ModalState::Adding;
        self.form = F::default();
        self.errors = ValidationErrors::new();
    }

    /// Open the modal prefilled from a row currently shown
    pub fn open_edit(&mut self, id: Uuid) -> Result<()> {
        self.list.cancel_delete();
        let record = self
            .list
            .get(id)
            .ok_or_else(|| StageLightError::not_found(<R::Record as Record>::ENTITY, id))?;

        self.modal = ModalState::Editing(id);
        self.form = F::from_record(&record);
        self.errors = ValidationErrors::new();
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
        self.form = F::default();
        self.errors = ValidationErrors::new();
    }

    /// Validate and save the open form
    ///
    /// Field errors block the backend call and leave the modal open. A
    /// backend failure returns the modal to its pre-submit state.
    pub async fn submit(&mut self, ctx: &ValidationContext) -> Result<R::Record> {
        let editing = match self.modal {
            ModalState::Adding => None,
            ModalState::Editing(id) => Some(id),
            ModalState::Closed | ModalState::Submitting { .. } => {
                return Err(StageLightError::InvalidInput("No form is open".to_string()));
            }
        };

        let input = match self.form.validate(ctx) {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(StageLightError::Validation(errors));
            }
        };
        self.errors = ValidationErrors::new();
        self.modal = ModalState::Submitting { editing };

        let entity = <R::Record as Record>::ENTITY;
        let result = match editing {
            Some(id) => self.list.repo.update(id, input).await,
            None => self.list.repo.create(input).await,
        };

        match result {
            Ok(record) => {
                self.list.upsert(record.clone());
                let verb = if editing.is_some() { "updated" } else { "created" };
                self.list
                    .notifications
                    .success(format!("{} {}", entity, verb), record.label());
                self.close_modal();
                Ok(record)
            }
            Err(e) => {
                self.modal = self.modal.before_submit();
                self.list
                    .notifications
                    .error(format!("Could not save {}", entity.to_lowercase()), e.to_string());
                Err(e)
            }
        }
    }
}

pub type EventsScreen = CrudScreen<EventRepository, EventForm>;
pub type GalleryScreen = CrudScreen<GalleryRepository, GalleryForm>;
pub type TeamScreen = CrudScreen<TeamRepository, TeamMemberForm>;
pub type AdminUsersScreen = CrudScreen<AdminUserRepository, AdminUserForm>;
pub type MessagesScreen = ListScreen<MessageRepository>;
