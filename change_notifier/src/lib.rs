//! Change notification channel
//!
//! This crate provides the publish/subscribe channel carrying data-change
//! and query-timing events between repositories and their consumers in the
//! FacetHaus ecosystem.

pub mod event;
pub mod manager;
pub mod prelude;

pub use event::{ChangeEvent, EventKind};
pub use manager::{CallbackId, ChangeNotifier, EventCallback};
