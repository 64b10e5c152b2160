//! Priority-queued, multi-bot delivery stage (spec §4.7, component C9).

mod bot_client;
mod dispatcher;
mod heap;
mod rate_limiter;

pub use bot_client::{ChatBotClient, HttpChatBotClient, SendOutcome};
pub use dispatcher::PriorityDispatcher;
pub use heap::DispatchEntry;
pub use rate_limiter::BotRateLimiter;
