//! # vitrine-shared
//!
//! Types shared between the Vitrine messaging server and its clients:
//! identifier newtypes, the role tag, the HTTP API payloads, and the
//! constants that both sides must agree on (poll intervals, body limits).
//!
//! This crate is deliberately free of I/O so it can be pulled into any
//! frontend without dragging a runtime along.

pub mod constants;
pub mod protocol;
pub mod types;

pub use types::{MessageId, Role, UserId};
