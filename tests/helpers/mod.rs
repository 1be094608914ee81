//! Test helpers module
//!
//! This module provides utilities and helpers for testing the StageLight application.
//! It includes a mock auth server, database helpers, in-memory repositories and
//! test data builders.

#![allow(dead_code)]

pub mod auth_mock;
pub mod database_helper;
pub mod memory_repository;
pub mod test_data;

#[allow(unused_imports)]
pub use auth_mock::*;
#[allow(unused_imports)]
pub use database_helper::*;
#[allow(unused_imports)]
pub use memory_repository::*;
#[allow(unused_imports)]
pub use test_data::*;

use StageLight::config::Settings;

/// Settings for tests: in-memory sessions and a single allow-listed admin
pub fn test_settings(backend_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.backend.url = backend_url.to_string();
    settings.backend.anon_key = "test-anon-key".to_string();
    settings.backend.request_timeout_seconds = 5;
    settings.auth.admin_emails = vec![ADMIN_EMAIL.to_string()];
    settings.redis.url = String::new();
    settings
}

pub const ADMIN_EMAIL: &str = "director@stagelight.org";
pub const ADMIN_PASSWORD: &str = "curtain-call";
