//! Git webhook filter library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod template;

pub use config::schema::FilterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RuleSet;
