//! Message parsing, routing and operator interaction plumbing

pub mod dispatcher;
pub mod followup;
pub mod pagination;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use followup::FollowUpRouter;
pub use pagination::paginate;
pub use parser::MessageParser;
