pub mod bot;
pub mod config;
pub mod db;
pub mod handlers;
pub mod localization;
pub mod migrations;
pub mod onboarding;
pub mod subscription;
pub mod user_manager;
pub mod user_session;
