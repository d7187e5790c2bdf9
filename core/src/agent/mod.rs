pub mod context;
pub mod orchestrator;
pub mod registry;
pub mod tagged;

pub use context::{ContextBuilder, SYSTEM_PREAMBLE, compose};
pub use orchestrator::Orchestrator;
pub use registry::ToolRegistry;
