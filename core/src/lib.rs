pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod tools;
pub mod traits;

pub use agent::{ContextBuilder, Orchestrator, ToolRegistry, compose};
pub use catalog::*;
pub use config::*;
pub use error::{BotError, Result};
pub use providers::*;
pub use session::SessionState;
pub use tools::*;
pub use traits::*;
