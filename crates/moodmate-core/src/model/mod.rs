mod message;
mod mood;

pub use message::*;
pub use mood::*;
