//! Core types for the Portal client.
//!
//! This crate is deliberately free of HTTP and terminal dependencies. It holds
//! the identity model returned by `GET /api/me`, the fetch state machine that
//! drives the identity view, and the presentation model both front-ends
//! render from.

pub mod error;
pub mod identity;
pub mod root;
pub mod session;
pub mod source;
pub mod view;

pub use error::{Error, Result};
