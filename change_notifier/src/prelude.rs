//! Convenience re-exports for common change-notifier usage

pub use crate::event::{ChangeEvent, EventKind};
pub use crate::manager::{CallbackId, ChangeNotifier};
