pub mod bot;
pub mod store;

pub use bot::{Bot, BotInfo};
pub use store::SnippetStore;
