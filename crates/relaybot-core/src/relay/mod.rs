//! Reply routing: the forwarded-message registry and the service that uses it.

pub mod registry;
pub mod service;

pub use registry::{RelayRegistry, Resolved, MAX_HOPS};
pub use service::{RelayService, RouteOutcome};
