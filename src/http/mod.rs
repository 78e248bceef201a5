//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request span, timeout)
//!     → request.rs (probe detection, X- header selection)
//!     → [routing layer resolves target]
//!     → forward.rs (re-send body to target)
//!     → response.rs (OK or 500 with diagnostic)
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use response::WebhookError;
pub use server::{AppState, HttpServer};
