//! Request and Response models for the proxy API
//!
//! Request parsing for `/api/*path` and the JSON bodies of the
//! stats and health endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ProxyRequest;
pub use responses::{HealthResponse, StatsResponse};
