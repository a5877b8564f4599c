//! REST API client module for the produce-trading backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend to authenticate and to fetch user recapitulations and
//! catalog (LOV) items.
//!
//! Every endpoint except `/login` requires JWT bearer authentication,
//! and every response body is wrapped in a `{status, message, data}`
//! envelope.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginData};
pub use error::ApiError;
