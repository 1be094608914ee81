//! Form validation
//!
//! Validation is synchronous and field-by-field. A form either turns into the
//! typed input the data layer writes, or into a [`ValidationErrors`] map with
//! one message per failing field. Nothing reaches the backend until a form
//! validates cleanly.

pub mod rules;
pub mod forms;

use std::collections::BTreeMap;
use std::fmt;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

pub use forms::{
    EventForm, GalleryForm, TeamMemberForm, AdminUserForm, ContactForm, JoinForm,
    JoinApplication, LoginForm, Credentials,
};

/// Field-scoped validation failures, at most one message per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already recorded
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record the outcome of a rule; `Ok` leaves the map untouched
    pub fn check(&mut self, field: &str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Finish validation: build the output only when no field failed
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(build())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Inputs that validation depends on besides the form itself
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Context for the current UTC date
    pub fn now() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

/// A form that validates into a typed output
pub trait Validate {
    type Output;

    fn validate(&self, ctx: &ValidationContext) -> Result<Self::Output, ValidationErrors>;
}

/// A form backing an admin add/edit modal
pub trait EditForm: Validate + Clone + Default + Send + Sync + 'static {
    type Record;

    /// Prefill the form from an existing record for editing
    fn from_record(record: &Self::Record) -> Self;
}
