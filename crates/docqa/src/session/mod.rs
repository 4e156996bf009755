//! Session orchestration: process documents, then answer questions about them

mod assistant;
mod state;

pub use assistant::{Assistant, AssistantBuilder};
pub use state::{Session, SessionState};
