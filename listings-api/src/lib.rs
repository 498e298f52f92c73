//! # Listings API Server Library
//!
//! This library provides the core functionality for the listings API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers middleware
//! - `routes`: API route handlers
//! - `storage`: Filesystem store for uploaded images

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod storage;
