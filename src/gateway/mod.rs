//! Client side of the local inference service.
//!
//! The pipelines treat every call here as best-effort: a [`GatewayError`] is
//! logged at the call site and the heuristic result is kept.

pub mod error;
pub mod http;
pub mod json;
pub mod r#trait;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::InferenceGateway;
pub use r#trait::{CompletionParams, CompletionProvider};
