//! Agent runtime: the coordinating loop, its builder, heartbeat timer and shutdown coordination.

mod agent;
mod builder;
mod heartbeat;
mod shutdown;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use shutdown::{ShutdownHandle, ShutdownPhase, wait_for_shutdown_signal};
