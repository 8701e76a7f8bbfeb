//! Gateway server, router and authorization gate

pub mod auth;
pub mod router;
pub mod server;

pub use auth::{REJECTION_BODY, ResolvedGate, gate_middleware};
pub use router::{AppState, create_router};
pub use server::Gateway;
