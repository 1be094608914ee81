//! Test data builders

use chrono::{Duration, NaiveDate, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::Name;
use fake::Fake;
use StageLight::models::{AdminUserInput, EventInput, GalleryInput, MessageInput, TeamMemberInput};
use StageLight::validation::{EventForm, TeamMemberForm};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// The `Echoes` production used across the scenario tests
pub fn echoes_input() -> EventInput {
    EventInput {
        title: "Echoes".to_string(),
        description: "A new devised piece about memory".to_string(),
        date: date("2025-01-01"),
        time: "19:30".to_string(),
        venue: "Hall A".to_string(),
        image_url: "https://cdn.stagelight.org/echoes.jpg".to_string(),
        is_upcoming: true,
    }
}

pub fn event_input(title: &str, on: &str) -> EventInput {
    EventInput {
        title: title.to_string(),
        description: Sentence(5..10).fake(),
        date: date(on),
        time: "20:00".to_string(),
        venue: format!("{} Theatre", Word().fake::<String>()),
        image_url: "https://cdn.stagelight.org/poster.jpg".to_string(),
        is_upcoming: false,
    }
}

/// A valid event form dated `days_ahead` from today
pub fn event_form(title: &str, days_ahead: i64) -> EventForm {
    EventForm {
        title: title.to_string(),
        description: Sentence(5..10).fake(),
        date: (Utc::now().date_naive() + Duration::days(days_ahead)).format("%Y-%m-%d").to_string(),
        time: "19:30".to_string(),
        venue: "Hall A".to_string(),
        image_url: "https://cdn.stagelight.org/poster.jpg".to_string(),
        is_upcoming: days_ahead >= 0,
    }
}

pub fn gallery_input(title: &str) -> GalleryInput {
    GalleryInput {
        title: title.to_string(),
        media_url: "https://cdn.stagelight.org/gallery/1.jpg".to_string(),
        is_video: false,
    }
}

pub fn team_input(name: &str, is_core: bool) -> TeamMemberInput {
    TeamMemberInput {
        name: name.to_string(),
        title: "Stage Manager".to_string(),
        phone: is_core.then(|| "+1 555 010 2030".to_string()),
        email: is_core.then(|| SafeEmail().fake::<String>()),
        photo_url: is_core.then(|| "https://cdn.stagelight.org/team/1.jpg".to_string()),
        is_core,
    }
}

pub fn team_form(name: &str) -> TeamMemberForm {
    TeamMemberForm {
        name: name.to_string(),
        title: "Lighting Designer".to_string(),
        ..TeamMemberForm::default()
    }
}

pub fn message_input() -> MessageInput {
    MessageInput {
        name: Name().fake(),
        email: SafeEmail().fake(),
        message: Sentence(8..14).fake(),
    }
}

pub fn admin_input(email: &str) -> AdminUserInput {
    AdminUserInput {
        email: email.to_string(),
        name: Name().fake(),
        is_active: true,
    }
}
