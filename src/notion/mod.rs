//! # Notion Module
//!
//! The delegated-authorization flow:
//! - signed state token carrying the Telegram user id
//! - OAuth start and callback endpoints
//! - post-authorization database discovery hand-off

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::notion_routes;
