pub mod app;
pub mod chat;
pub mod config;
pub mod consent;
pub mod contact;
pub mod errors;
pub mod feed;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod state;
pub mod ui;
pub mod webhooks;

pub use app::router;
pub use config::Config;
pub use state::AppState;
