//! Routing core: classify a message, pick a route, run it, record each step.

pub mod agent;
pub mod classifier;
pub mod executor;
pub mod recorder;
pub mod responder;

pub use agent::ModelRouter;
pub use classifier::classify;
pub use executor::{describe, plan, ChainExecutor, Execution, RouteArgs};
pub use recorder::{InvocationRecorder, REPEAT_SUPPRESSED_MESSAGE};
pub use responder::{Responder, Response};
