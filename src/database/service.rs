//! Database service layer
//!
//! This module provides a high-level interface to database operations

use std::time::Instant;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::database::{
    DatabasePool, EventRepository, GalleryRepository, TeamRepository, MessageRepository,
    AdminUserRepository, DepartmentRepository,
};
use crate::models::*;
use crate::utils::errors::{StageLightError, Result};
use crate::utils::helpers::truncate_text;
use crate::utils::logging::log_database_operation;
use crate::validation::{JoinApplication, ValidationErrors};

const ACTIVITY_TITLE_MAX: usize = 60;

/// Counters shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub events: i64,
    pub upcoming_events: i64,
    pub gallery_items: i64,
    pub team_members: i64,
    pub core_members: i64,
    pub messages: i64,
    pub unread_messages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    EventCreated,
    GalleryItemAdded,
    MessageReceived,
    TeamMemberAdded,
}

/// One line of the dashboard's recent activity feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub table: Table,
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Content of the public home page
#[derive(Debug, Clone, Serialize)]
pub struct HomeContent {
    pub upcoming_events: Vec<Event>,
    pub latest_gallery: Vec<GalleryItem>,
    pub core_team: Vec<TeamMember>,
}

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub gallery: GalleryRepository,
    pub team: TeamRepository,
    pub messages: MessageRepository,
    pub admin_users: AdminUserRepository,
    pub departments: DepartmentRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            gallery: GalleryRepository::new(pool.clone()),
            team: TeamRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            admin_users: AdminUserRepository::new(pool.clone()),
            departments: DepartmentRepository::new(pool),
        }
    }

    /// Get dashboard counters
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let started = Instant::now();
        let result = self.collect_stats().await;
        log_database_operation(
            "dashboard_stats",
            "*",
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );
        result
    }

    async fn collect_stats(&self) -> Result<DashboardStats> {
        Ok(DashboardStats {
            events: self.events.count().await?,
            upcoming_events: self.events.count_upcoming().await?,
            gallery_items: self.gallery.count().await?,
            team_members: self.team.count().await?,
            core_members: self.team.count_core().await?,
            messages: self.messages.count().await?,
            unread_messages: self.messages.count_unread().await?,
        })
    }

    /// Most recent rows across the content tables, newest first
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>> {
        let started = Instant::now();
        let per_table = limit as i64;

        let mut items: Vec<ActivityItem> = Vec::new();

        items.extend(self.events.recent(per_table).await?.into_iter().map(|event| ActivityItem {
            kind: ActivityKind::EventCreated,
            table: Table::Events,
            id: event.id,
            title: truncate_text(&event.title, ACTIVITY_TITLE_MAX),
            created_at: event.created_at,
        }));

        items.extend(self.gallery.latest(per_table).await?.into_iter().map(|item| ActivityItem {
            kind: ActivityKind::GalleryItemAdded,
            table: Table::Gallery,
            id: item.id,
            title: truncate_text(&item.title, ACTIVITY_TITLE_MAX),
            created_at: item.created_at,
        }));

        items.extend(self.messages.recent(per_table).await?.into_iter().map(|message| ActivityItem {
            kind: ActivityKind::MessageReceived,
            table: Table::Messages,
            id: message.id,
            title: truncate_text(&format!("Message from {}", message.name), ACTIVITY_TITLE_MAX),
            created_at: message.created_at,
        }));

        items.extend(self.team.recent(per_table).await?.into_iter().map(|member| ActivityItem {
            kind: ActivityKind::TeamMemberAdded,
            table: Table::TeamMembers,
            id: member.id,
            title: truncate_text(&member.name, ACTIVITY_TITLE_MAX),
            created_at: member.created_at,
        }));

        let items = merge_activity(items, limit);
        log_database_operation("recent_activity", "*", started.elapsed().as_millis() as u64, true);
        Ok(items)
    }

    /// Public home page content
    pub async fn home_content(&self) -> Result<HomeContent> {
        Ok(HomeContent {
            upcoming_events: self.events.get_upcoming(Some(3)).await?,
            latest_gallery: self.gallery.latest(6).await?,
            core_team: self.team.get_core().await?,
        })
    }

    /// Store a join-us application as an inbox message
    ///
    /// The chosen department must exist; otherwise the application is
    /// rejected as a field error on `department`.
    pub async fn submit_join_application(&self, application: JoinApplication) -> Result<Message> {
        let department = match self.departments.find_by_id(application.department_id).await? {
            Some(department) => department,
            None => {
                let mut errors = ValidationErrors::new();
                errors.add("department", "Please choose a department");
                return Err(StageLightError::Validation(errors));
            }
        };

        self.messages.create(application.into_message(&department)).await
    }
}

/// Sort by `created_at` descending and keep the first `limit` items
pub fn merge_activity(mut items: Vec<ActivityItem>, limit: usize) -> Vec<ActivityItem> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(limit);
    items
}
