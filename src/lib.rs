// Library exports for carebook
// This allows integration tests and the binary to share the same modules

pub mod booking;
pub mod config;
pub mod error;
pub mod provider;
pub mod routes;
pub mod state;
pub mod store;
