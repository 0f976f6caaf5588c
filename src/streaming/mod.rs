pub mod accumulator;
pub mod dispatcher;
pub mod sse;

pub use accumulator::ResponseAccumulator;
pub use dispatcher::{DispatchStats, EventDispatcher, PromptCallbacks, StreamHandler};
pub use sse::{SseDecoder, SseFrame};
