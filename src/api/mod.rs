//! Demo HTTP service that reports failures through [`crate::errors`]

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
