pub mod content;
pub mod event;
pub mod request;

pub use content::{ContentPart, ContentType};
pub use event::{StreamEvent, ToolCallInfo};
pub use request::PromptRequest;
