pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod crud;
pub mod error;
pub mod expenses;
pub mod extract;
pub mod state;
pub mod users;
pub mod validation;
