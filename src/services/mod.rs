// Services module - external integrations and shared helpers

pub mod monitoring;
pub mod notion;
pub mod retry;
pub mod telegram;

pub use notion::{NotionError, NotionService};
pub use retry::RetryPolicy;
pub use telegram::{TelegramError, TelegramService};
