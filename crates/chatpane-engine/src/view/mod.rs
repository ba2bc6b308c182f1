//! Chat view model.
//!
//! This module provides:
//! - [`MessageElement`], [`TypingIndicator`], [`Node`] - container children
//! - [`ChatContainer`] - ordered children plus mutation records
//! - [`Viewport`] - scroll position and smooth scrolling
//! - [`MutationWatcher`] - scrolls when content is inserted
//! - [`ChatView`] - the controller tying them together

mod container;
mod controller;
mod element;
mod viewport;
mod watcher;

pub use container::{ChatContainer, Child, MutationRecord, NodeId};
pub use controller::{ChatView, InputField, ViewOptions, ViewPhase, DEFAULT_ENTRY_FRAMES};
pub use element::{Class, ClassList, Entry, MessageElement, Node, TypingIndicator, TypingTemplate};
pub use viewport::{ScrollBehavior, ScrollRequest, Viewport};
pub use watcher::MutationWatcher;
