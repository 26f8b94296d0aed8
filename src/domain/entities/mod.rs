pub mod command;
pub mod message;
pub mod user;

pub use command::{Command, CommandContext, CommandRegistry, FnHandler, Handler};
pub use message::{Content, Message, MessageType};
pub use user::User;
