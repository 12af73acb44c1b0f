//! Refresh service wiring and admin surface.
//!
//! [`RefreshService`] wires the store, external clients and scheduler from
//! configuration and exposes the run entry points: synchronous runs with a
//! capped deadline, detached background runs, single-task generation and
//! status. The admin router and the periodic trigger sit on top of it.

#![warn(missing_docs)]

pub mod error;
pub mod auth;
pub mod service;
pub mod routes;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use error::{ApiError, Result};
pub use auth::{authorize, ADMIN_SECRET_HEADER};
pub use service::{
    open_store, GenerateRequest, GenerateResponse, RefreshService, RunAccepted, StatusResponse,
};
pub use routes::{router, serve};
pub use trigger::PeriodicTrigger;
