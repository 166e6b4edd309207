//! # Web Library
//!
//! HTTP handlers, middleware, services and server setup for the marketplace.
//!
//! - [`services`]: identity, authorization, catalog and ledger rules
//! - [`handlers`]: thin axum handlers over the services
//! - [`middleware`]: request stamping, logging, authentication, permission guards
//! - [`server`]: router assembly and startup

pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

#[cfg(test)]
pub(crate) mod test_utils;

pub use server::{create_router, start_server, AppState, ServerConfig};
