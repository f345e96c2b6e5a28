//! # formconfig-client
//!
//! The renderer side of formconfig: fetch the public configuration once
//! ([`session`]), then fill, validate and submit one form type at a time
//! ([`pipeline`]) through a [`FormApi`](transport::FormApi) ([`transport`]).

pub mod pipeline;
pub mod session;
pub mod transport;

pub use pipeline::{Banner, PipelineState, SubmissionPipeline, SubmitOutcome, Transition};
pub use session::FormSession;
pub use transport::{FormApi, HttpFormApi, SubmitReceipt};
