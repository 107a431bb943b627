//! # Users Module
//!
//! Persistence for Telegram users and their linked Notion credentials:
//! - TelegramUser / NotionAuth models
//! - repository functions over an explicit database connection

pub mod models;
pub mod repo;

#[cfg(test)]
mod tests;

pub use models::{NotionAuth, TelegramUser};
