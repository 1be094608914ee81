//! In-memory repositories
//!
//! Stand-ins for the Postgres repositories that can fail on demand, count
//! backend calls and, like the table triggers, publish every write to a
//! [`RealtimeHub`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use StageLight::database::{EntityRepository, InboxRepository, ListRepository};
use StageLight::models::{Event, EventInput, Message, MessageInput, Record, TeamMember, TeamMemberInput};
use StageLight::realtime::{ChangeKind, RawChange, RealtimeHub};
use StageLight::{Result, StageLightError};

pub struct MemoryRepository<T: Record> {
    rows: Mutex<Vec<T>>,
    feed: Option<RealtimeHub>,
    fail: AtomicBool,
    calls: AtomicUsize,
    fetch_delay: Mutex<Duration>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            feed: None,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            fetch_delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Publish every write to `hub` the way the database triggers do
    pub fn with_feed(mut self, hub: &RealtimeHub) -> Self {
        self.feed = Some(hub.clone());
        self
    }

    pub fn with_rows(self, rows: Vec<T>) -> Self {
        *self.rows.lock().unwrap() = rows;
        self
    }

    /// Make every following backend call fail
    pub fn fail_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make every following `get_all` wait before answering
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    /// Insert a row as another admin would, bypassing any screen
    pub fn insert_remote(&self, record: T) {
        self.rows.lock().unwrap().insert(0, record.clone());
        self.publish(ChangeKind::Insert, Some(&record), record.id());
    }

    /// Insert a row too large for a notification; only its id is published
    pub fn insert_oversized(&self, record: T) {
        let id = record.id();
        self.rows.lock().unwrap().insert(0, record);
        self.publish(ChangeKind::Insert, None, id);
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StageLightError::Backend("backend unavailable".to_string()));
        }
        Ok(())
    }

    fn publish(&self, kind: ChangeKind, record: Option<&T>, id: Uuid) {
        if let Some(hub) = &self.feed {
            hub.publish(RawChange {
                table: T::TABLE.as_str().to_string(),
                event_type: kind,
                id: Some(id),
                new: record.map(|r| serde_json::to_value(r).unwrap()),
                old: (kind != ChangeKind::Insert).then(|| json!({ "id": id })),
            });
        }
    }

    fn store(&self, record: T, kind: ChangeKind) -> T {
        {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|row| row.id() == record.id()) {
                Some(row) => *row = record.clone(),
                None => rows.insert(0, record.clone()),
            }
        }
        self.publish(kind, Some(&record), record.id());
        record
    }

    fn existing(&self, id: Uuid) -> Result<T> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or_else(|| StageLightError::not_found(T::ENTITY, id))
    }
}

#[async_trait]
impl<T: Record> ListRepository for MemoryRepository<T> {
    type Record = T;

    async fn get_all(&self) -> Result<Vec<T>> {
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.enter()?;
        Ok(self.rows())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.enter()?;
        let removed = {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id() != id);
            rows.len() != before
        };
        if !removed {
            return Err(StageLightError::not_found(T::ENTITY, id));
        }
        self.publish(ChangeKind::Delete, None, id);
        Ok(())
    }
}

pub fn event_from(id: Uuid, input: EventInput) -> Event {
    Event {
        id,
        title: input.title,
        description: input.description,
        date: input.date,
        time: input.time,
        venue: input.venue,
        image_url: input.image_url,
        is_upcoming: input.is_upcoming,
        created_at: Utc::now(),
    }
}

pub fn team_member_from(id: Uuid, input: TeamMemberInput) -> TeamMember {
    TeamMember {
        id,
        name: input.name,
        title: input.title,
        phone: input.phone,
        email: input.email,
        photo_url: input.photo_url,
        is_core: input.is_core,
        created_at: Utc::now(),
    }
}

pub fn message_from(id: Uuid, input: MessageInput) -> Message {
    Message {
        id,
        name: input.name,
        email: input.email,
        message: input.message,
        is_read: false,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl EntityRepository for MemoryRepository<Event> {
    type Input = EventInput;

    async fn create(&self, input: EventInput) -> Result<Event> {
        self.enter()?;
        Ok(self.store(event_from(Uuid::new_v4(), input), ChangeKind::Insert))
    }

    async fn update(&self, id: Uuid, input: EventInput) -> Result<Event> {
        self.enter()?;
        let existing = self.existing(id)?;
        let mut updated = event_from(id, input);
        updated.created_at = existing.created_at;
        Ok(self.store(updated, ChangeKind::Update))
    }
}

#[async_trait]
impl EntityRepository for MemoryRepository<TeamMember> {
    type Input = TeamMemberInput;

    async fn create(&self, input: TeamMemberInput) -> Result<TeamMember> {
        self.enter()?;
        Ok(self.store(team_member_from(Uuid::new_v4(), input), ChangeKind::Insert))
    }

    async fn update(&self, id: Uuid, input: TeamMemberInput) -> Result<TeamMember> {
        self.enter()?;
        let existing = self.existing(id)?;
        let mut updated = team_member_from(id, input);
        updated.created_at = existing.created_at;
        Ok(self.store(updated, ChangeKind::Update))
    }
}

#[async_trait]
impl InboxRepository for MemoryRepository<Message> {
    async fn mark_as_read(&self, id: Uuid) -> Result<Message> {
        self.enter()?;
        let mut message = self.existing(id)?;
        message.is_read = true;
        Ok(self.store(message, ChangeKind::Update))
    }
}
