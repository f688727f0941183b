//! HTTP surface: server assembly, shared state, and route handlers.

pub mod routes;
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
