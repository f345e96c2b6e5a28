//! # formconfig-server
//!
//! The HTTP surface of formconfig. [`api`] holds the axum handlers and
//! routes, [`auth`] the bearer-token gate in front of the write routes,
//! [`sink`] the destinations for accepted submissions and [`server`] the
//! [`FormConfigApp`] builder that wires them to a store and runs the service.

pub mod api;
pub mod auth;
pub mod sink;
pub mod server;

pub use api::{api_router, ApiError, AppState};
pub use server::FormConfigApp;
pub use sink::{InMemorySubmissionSink, LoggingSubmissionSink, SubmissionRecord, SubmissionSink};
