//! Type definitions shared between the HTTP layer and its clients
//!
//! - `response` - Health checks, plain messages and info payloads

pub mod response;

pub use response::{
    ClientInfo, DatabaseInfo, HealthResponse, HealthStatus, MessageResponse, ServerInfo,
    ServiceHealth,
};
