//! Admin and public forms
//!
//! Forms deserialize leniently (every field defaults) so that a missing field
//! is reported as a field error instead of a decoding failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AdminUser, AdminUserInput, Department, Event, EventInput, GalleryInput, GalleryItem,
    MessageInput, TeamMember, TeamMemberInput,
};
use super::rules::{self, optional};
use super::{EditForm, Validate, ValidationContext, ValidationErrors};

const TITLE_MAX: usize = 120;
const NAME_MAX: usize = 80;
const TEXT_MAX: usize = 2000;
const TIME_MAX: usize = 40;
const CONTACT_MESSAGE_MIN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub image_url: String,
    pub is_upcoming: bool,
}

impl Validate for EventForm {
    type Output = EventInput;

    fn validate(&self, ctx: &ValidationContext) -> Result<EventInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("title", rules::required(&self.title, "Title"));
        errors.check("title", rules::max_length(&self.title, TITLE_MAX, "Title"));
        errors.check("description", rules::required(&self.description, "Description"));
        errors.check("description", rules::max_length(&self.description, TEXT_MAX, "Description"));
        errors.check("time", rules::required(&self.time, "Time"));
        errors.check("time", rules::max_length(&self.time, TIME_MAX, "Time"));
        errors.check("venue", rules::required(&self.venue, "Venue"));
        errors.check("venue", rules::max_length(&self.venue, TITLE_MAX, "Venue"));
        errors.check("image_url", rules::required(&self.image_url, "Image URL"));
        errors.check("image_url", rules::valid_url(&self.image_url, "Image URL"));

        errors.check("date", rules::required(&self.date, "Date"));
        let date = match rules::parse_date(&self.date, "Date") {
            Ok(date) => Some(date),
            Err(message) => {
                errors.add("date", message);
                None
            }
        };

        if let Some(date) = date {
            if self.is_upcoming && date < ctx.today {
                errors.add("date", "Upcoming events cannot have a past date");
            }
        }

        errors.finish(|| EventInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: date.unwrap_or(ctx.today),
            time: self.time.trim().to_string(),
            venue: self.venue.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            is_upcoming: self.is_upcoming,
        })
    }
}

impl EditForm for EventForm {
    type Record = Event;

    fn from_record(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.clone(),
            venue: event.venue.clone(),
            image_url: event.image_url.clone(),
            is_upcoming: event.is_upcoming,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryForm {
    pub title: String,
    pub media_url: String,
    pub is_video: bool,
}

impl Validate for GalleryForm {
    type Output = GalleryInput;

    fn validate(&self, _ctx: &ValidationContext) -> Result<GalleryInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("title", rules::required(&self.title, "Title"));
        errors.check("title", rules::max_length(&self.title, TITLE_MAX, "Title"));
        errors.check("media_url", rules::required(&self.media_url, "Media URL"));
        errors.check("media_url", rules::valid_url(&self.media_url, "Media URL"));

        errors.finish(|| GalleryInput {
            title: self.title.trim().to_string(),
            media_url: self.media_url.trim().to_string(),
            is_video: self.is_video,
        })
    }
}

impl EditForm for GalleryForm {
    type Record = GalleryItem;

    fn from_record(item: &GalleryItem) -> Self {
        Self {
            title: item.title.clone(),
            media_url: item.media_url.clone(),
            is_video: item.is_video,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMemberForm {
    pub name: String,
    pub title: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub is_core: bool,
}

impl Validate for TeamMemberForm {
    type Output = TeamMemberInput;

    fn validate(&self, _ctx: &ValidationContext) -> Result<TeamMemberInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let phone = optional(&self.phone);
        let email = optional(&self.email);
        let photo_url = optional(&self.photo_url);

        errors.check("name", rules::required(&self.name, "Name"));
        errors.check("name", rules::max_length(&self.name, NAME_MAX, "Name"));
        errors.check("title", rules::required(&self.title, "Title"));
        errors.check("title", rules::max_length(&self.title, NAME_MAX, "Title"));

        if self.is_core {
            errors.check("email", rules::required(email.as_deref().unwrap_or(""), "Email"));
            errors.check("phone", rules::required(phone.as_deref().unwrap_or(""), "Phone"));
            errors.check("photo_url", rules::required(photo_url.as_deref().unwrap_or(""), "Photo URL"));
        }
        if let Some(email) = &email {
            errors.check("email", rules::valid_email(email, "Email"));
        }
        if let Some(phone) = &phone {
            errors.check("phone", rules::valid_phone(phone, "Phone"));
        }
        if let Some(photo_url) = &photo_url {
            errors.check("photo_url", rules::valid_url(photo_url, "Photo URL"));
        }

        errors.finish(|| TeamMemberInput {
            name: self.name.trim().to_string(),
            title: self.title.trim().to_string(),
            phone,
            email,
            photo_url,
            is_core: self.is_core,
        })
    }
}

impl EditForm for TeamMemberForm {
    type Record = TeamMember;

    fn from_record(member: &TeamMember) -> Self {
        Self {
            name: member.name.clone(),
            title: member.title.clone(),
            phone: member.phone.clone(),
            email: member.email.clone(),
            photo_url: member.photo_url.clone(),
            is_core: member.is_core,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUserForm {
    pub email: String,
    pub name: String,
    pub is_active: bool,
}

impl Default for AdminUserForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            name: String::new(),
            is_active: true,
        }
    }
}

impl Validate for AdminUserForm {
    type Output = AdminUserInput;

    fn validate(&self, _ctx: &ValidationContext) -> Result<AdminUserInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("email", rules::required(&self.email, "Email"));
        errors.check("email", rules::valid_email(&self.email, "Email"));
        errors.check("name", rules::required(&self.name, "Name"));
        errors.check("name", rules::max_length(&self.name, NAME_MAX, "Name"));

        errors.finish(|| AdminUserInput {
            email: crate::utils::helpers::normalize_email(&self.email),
            name: self.name.trim().to_string(),
            is_active: self.is_active,
        })
    }
}

impl EditForm for AdminUserForm {
    type Record = AdminUser;

    fn from_record(admin: &AdminUser) -> Self {
        Self {
            email: admin.email.clone(),
            name: admin.name.clone(),
            is_active: admin.is_active,
        }
    }
}

/// Public contact form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Validate for ContactForm {
    type Output = MessageInput;

    fn validate(&self, _ctx: &ValidationContext) -> Result<MessageInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", rules::required(&self.name, "Name"));
        errors.check("name", rules::max_length(&self.name, NAME_MAX, "Name"));
        errors.check("email", rules::required(&self.email, "Email"));
        errors.check("email", rules::valid_email(&self.email, "Email"));
        errors.check("message", rules::required(&self.message, "Message"));
        errors.check("message", rules::min_length(&self.message, CONTACT_MESSAGE_MIN, "Message"));
        errors.check("message", rules::max_length(&self.message, TEXT_MAX, "Message"));

        errors.finish(|| MessageInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Public join-us application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Department id as submitted by the select box
    pub department: String,
    pub message: String,
}

/// A validated join application, still missing its department lookup
#[derive(Debug, Clone, PartialEq)]
pub struct JoinApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department_id: Uuid,
    pub message: String,
}

impl JoinApplication {
    /// Render the application as an inbox message
    pub fn into_message(self, department: &Department) -> MessageInput {
        let mut body = format!(
            "Application to join {}\nPhone: {}",
            department.name, self.phone
        );
        if !self.message.is_empty() {
            body.push_str("\n\n");
            body.push_str(&self.message);
        }

        MessageInput {
            name: self.name,
            email: self.email,
            message: body,
        }
    }
}

impl Validate for JoinForm {
    type Output = JoinApplication;

    fn validate(&self, _ctx: &ValidationContext) -> Result<JoinApplication, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", rules::required(&self.name, "Name"));
        errors.check("name", rules::max_length(&self.name, NAME_MAX, "Name"));
        errors.check("email", rules::required(&self.email, "Email"));
        errors.check("email", rules::valid_email(&self.email, "Email"));
        errors.check("phone", rules::required(&self.phone, "Phone"));
        errors.check("phone", rules::valid_phone(&self.phone, "Phone"));
        errors.check("department", rules::required(&self.department, "Department"));
        errors.check("message", rules::max_length(&self.message, TEXT_MAX, "Message"));

        let department_id = Uuid::parse_str(self.department.trim()).ok();
        if department_id.is_none() {
            errors.add("department", "Please choose a department");
        }

        errors.finish(|| JoinApplication {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            department_id: department_id.unwrap_or_default(),
            message: self.message.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    type Output = Credentials;

    fn validate(&self, _ctx: &ValidationContext) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("email", rules::required(&self.email, "Email"));
        errors.check("email", rules::valid_email(&self.email, "Email"));
        errors.check("password", rules::required(&self.password, "Password"));

        errors.finish(|| Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> ValidationContext {
        ValidationContext::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    fn event_form() -> EventForm {
        EventForm {
            title: "Echoes".to_string(),
            description: "A night of monologues".to_string(),
            date: "2025-07-01".to_string(),
            time: "19:30".to_string(),
            venue: "Hall A".to_string(),
            image_url: "https://x/y.png".to_string(),
            is_upcoming: true,
        }
    }

    #[test]
    fn test_valid_event_form() {
        let input = event_form().validate(&ctx()).unwrap();
        assert_eq!(input.title, "Echoes");
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn test_each_required_event_field_is_reported() {
        let fields = ["title", "description", "date", "time", "venue", "image_url"];
        for field in fields {
            let mut form = event_form();
            match field {
                "title" => form.title.clear(),
                "description" => form.description = "  ".to_string(),
                "date" => form.date.clear(),
                "time" => form.time.clear(),
                "venue" => form.venue.clear(),
                _ => form.image_url.clear(),
            }
            let errors = form.validate(&ctx()).unwrap_err();
            assert!(errors.contains(field), "missing error for {}", field);
            assert_eq!(errors.len(), 1, "unexpected errors for {}: {}", field, errors);
        }
    }

    #[test]
    fn test_upcoming_event_in_the_past_is_rejected() {
        let mut form = event_form();
        form.date = "2025-06-14".to_string();
        let errors = form.validate(&ctx()).unwrap_err();
        assert_eq!(errors.get("date"), Some("Upcoming events cannot have a past date"));

        form.is_upcoming = false;
        assert!(form.validate(&ctx()).is_ok());
    }

    #[test]
    fn test_event_today_is_still_upcoming() {
        let mut form = event_form();
        form.date = "2025-06-15".to_string();
        assert!(form.validate(&ctx()).is_ok());
    }

    #[test]
    fn test_core_member_requires_contact_details() {
        let form = TeamMemberForm {
            name: "Ada".to_string(),
            title: "Director".to_string(),
            is_core: true,
            ..Default::default()
        };
        let errors = form.validate(&ctx()).unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("phone"));
        assert!(errors.contains("photo_url"));

        let regular = TeamMemberForm { is_core: false, ..form };
        assert!(regular.validate(&ctx()).is_ok());
    }

    #[test]
    fn test_team_member_optional_fields_still_checked() {
        let form = TeamMemberForm {
            name: "Ada".to_string(),
            title: "Director".to_string(),
            email: Some("not-an-email".to_string()),
            photo_url: Some("   ".to_string()),
            ..Default::default()
        };
        let errors = form.validate(&ctx()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_gallery_form_rejects_bad_url() {
        let form = GalleryForm {
            title: "Opening night".to_string(),
            media_url: "youtube".to_string(),
            is_video: true,
        };
        let errors = form.validate(&ctx()).unwrap_err();
        assert_eq!(errors.get("media_url"), Some("Media URL must be a valid URL"));
    }

    #[test]
    fn test_admin_user_email_is_normalized() {
        let form = AdminUserForm {
            email: " Stage@Theatre.ORG ".to_string(),
            name: "Stage Manager".to_string(),
            is_active: true,
        };
        assert_eq!(form.validate(&ctx()).unwrap().email, "stage@theatre.org");
    }

    #[test]
    fn test_contact_form_message_length() {
        let form = ContactForm {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            message: "hi".to_string(),
        };
        let errors = form.validate(&ctx()).unwrap_err();
        assert!(errors.contains("message"));
    }

    #[test]
    fn test_join_form_and_message_rendering() {
        let department = Department {
            id: Uuid::new_v4(),
            name: "Lighting".to_string(),
            description: None,
            created_at: chrono::Utc::now(),
        };
        let form = JoinForm {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            department: department.id.to_string(),
            message: "I ran the board at school.".to_string(),
        };
        let application = form.validate(&ctx()).unwrap();
        assert_eq!(application.department_id, department.id);

        let message = application.into_message(&department);
        assert!(message.message.starts_with("Application to join Lighting"));
        assert!(message.message.ends_with("I ran the board at school."));

        let bad = JoinForm { department: "lighting".to_string(), ..form };
        assert!(bad.validate(&ctx()).unwrap_err().contains("department"));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm { email: "x".to_string(), password: String::new() };
        let errors = form.validate(&ctx()).unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_edit_form_prefill_round_trips() {
        let event = Event {
            id: Uuid::new_v4(),
            title: "Echoes".to_string(),
            description: "...".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            time: "19:30".to_string(),
            venue: "Hall A".to_string(),
            image_url: "https://x/y.png".to_string(),
            is_upcoming: true,
            created_at: chrono::Utc::now(),
        };
        let form = EventForm::from_record(&event);
        assert_eq!(form.date, "2025-07-01");
        assert_eq!(form.validate(&ctx()).unwrap().venue, "Hall A");
    }
}
