pub mod auth;
pub mod dashboard;
pub mod list_controller;
pub mod notify;
