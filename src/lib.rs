//! mini-mvc: a component container with name-based wiring and a route
//! dispatcher, served over HTTP/1.1.

pub mod app;
pub mod config;
pub mod container;
pub mod demo;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
