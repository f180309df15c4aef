//! TNA Studio API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background jobs) so integration tests and the binary entrypoint can both
//! access them.

pub mod arquiteto_session;
pub mod audit;
pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod fx;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
