//! Configuration resolution for the API mirror reverse proxy.
//!
//! Finds a configuration document among ordered candidate sources, parses and
//! normalizes it, and derives the immutable route table the dispatch layer
//! serves traffic from.

pub mod config;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProjectConfig;
pub use lifecycle::{Startup, StartupOptions};
pub use routing::RouteTable;
