//! Shared definitions for the Taskdeck task store contract.
//!
//! The task store itself lives outside this repository; this crate only
//! describes what travels over the wire and where it goes.

pub mod codec;
pub mod routes;
pub mod task;
