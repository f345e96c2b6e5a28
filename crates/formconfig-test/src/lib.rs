//! # formconfig-test
//!
//! Testing utilities for formconfig applications.
//!
//! ## Modules
//!
//! - [`client`] - [`TestClient`] for making in-process requests against an
//!   axum router, and [`TestResponse`] for inspecting the results
//! - [`transport`] - [`RouterFormApi`], a [`FormApi`](formconfig_client::FormApi)
//!   over the same in-process router, with call counters

pub mod client;
pub mod transport;

pub use client::{TestClient, TestResponse};
pub use transport::RouterFormApi;
