//! Taskdeck: a terminal task manager backed by a REST task store.
//!
//! The [`sync::Synchronizer`] owns the client-side state and talks to a
//! [`store::TaskStore`]; the [`worker`] runs it off the UI thread; [`app`]
//! and [`ui`] turn its snapshots into a ratatui interface.

pub mod app;
pub mod config;
pub mod store;
pub mod sync;
pub mod ui;
pub mod worker;
