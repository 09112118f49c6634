pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod responder;
pub mod sentiment;
pub mod session;
pub mod support;

pub use error::{GenerationError, MoodmateError, Result};
