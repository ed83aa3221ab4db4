pub mod hooks;
pub mod mirror;

pub use hooks::{AppEvent, EventHooks, EventKind, Hook};
pub use mirror::{Binding, StateMirror};
