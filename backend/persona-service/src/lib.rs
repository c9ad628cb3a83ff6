/// Persona Service Library
///
/// One account, several personas. Each profile publishes image posts,
/// follows its own interests feed, likes and comments on posts.
///
/// # Modules
///
/// - `app`: shared state and route table
/// - `handlers`: HTTP request handlers
/// - `models`: accounts, profiles, posts and their request bodies
/// - `services`: business logic layer
/// - `db`: storage traits with Postgres and in-memory backends
/// - `media`: image hosting (Cloudinary)
/// - `error`: error types and the JSON error envelope
/// - `config`: configuration management
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod models;
pub mod services;

pub use app::AppState;
pub use config::Config;
pub use error::{AppError, Result};
