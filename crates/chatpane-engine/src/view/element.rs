//! Nodes held by the chat container.
//!
//! A node is either a message element (one chat turn) or the transient
//! typing placeholder. Both carry a class list whose names are the
//! contracted styling hooks (`message`, `user-message`, `show`, ...).

use crate::chat::{ChatMessage, Citation, Role};
use std::fmt;

/// Style classes a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// Every chat turn.
    Message,
    /// A turn typed by the user.
    UserMessage,
    /// A turn produced by the responder.
    BotMessage,
    /// A reply that reports a failed request.
    Error,
    /// Entry animation has been triggered.
    Show,
    /// The pending placeholder.
    TypingIndicator,
}

impl Class {
    /// The contracted class name.
    pub fn as_str(self) -> &'static str {
        match self {
            Class::Message => "message",
            Class::UserMessage => "user-message",
            Class::BotMessage => "bot-message",
            Class::Error => "error",
            Class::Show => "show",
            Class::TypingIndicator => "typing-indicator",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free list of classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<Class>);

impl ClassList {
    /// Build a class list from a slice, ignoring duplicates.
    pub fn from_slice(classes: &[Class]) -> Self {
        let mut list = Self::default();
        for class in classes {
            list.add(*class);
        }
        list
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add(&mut self, class: Class) -> bool {
        if self.contains(class) {
            return false;
        }
        self.0.push(class);
        true
    }

    /// Remove a class. Returns `false` if it was not present.
    pub fn remove(&mut self, class: Class) -> bool {
        let before = self.0.len();
        self.0.retain(|c| *c != class);
        self.0.len() != before
    }

    /// Check for a class.
    pub fn contains(&self, class: Class) -> bool {
        self.0.contains(&class)
    }

    /// Iterate classes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Class> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Class::as_str).collect();
        f.write_str(&names.join(" "))
    }
}

/// Entry animation state of a message element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Not shown yet (no `show` class).
    Hidden,
    /// Transition in progress; `frame` counts up from 0.
    Entering { frame: u8 },
    /// Fully shown.
    Visible,
}

/// One chat turn in the container.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageElement {
    role: Role,
    text: String,
    citations: Vec<Citation>,
    classes: ClassList,
    /// Whether a layout pass has seen this element since insertion.
    laid_out: bool,
    entry: Entry,
    /// Whether the sources list is folded.
    pub sources_collapsed: bool,
}

impl MessageElement {
    /// A user-originated element holding literal text.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, &[Class::Message, Class::UserMessage])
    }

    /// A responder-originated element.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, &[Class::Message, Class::BotMessage])
    }

    /// A responder element reporting a failed request.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(
            Role::Assistant,
            text,
            &[Class::Message, Class::BotMessage, Class::Error],
        )
    }

    /// An element for a message that was already on screen (history).
    ///
    /// History renders without an entry transition.
    pub fn from_history(message: &ChatMessage) -> Self {
        let mut element = match message.role {
            Role::User => Self::user(message.content.clone()),
            Role::Assistant | Role::System => Self::bot(message.content.clone()),
        }
        .with_citations(message.citations.clone());
        element.laid_out = true;
        element.classes.add(Class::Show);
        element.entry = Entry::Visible;
        element
    }

    fn new(role: Role, text: impl Into<String>, classes: &[Class]) -> Self {
        Self {
            role,
            text: text.into(),
            citations: Vec::new(),
            classes: ClassList::from_slice(classes),
            laid_out: false,
            entry: Entry::Hidden,
            sources_collapsed: true,
        }
    }

    /// Attach citations.
    #[must_use]
    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// Who produced this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Literal text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sources backing a reply.
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Class list.
    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    /// Current entry animation state.
    pub fn entry(&self) -> Entry {
        self.entry
    }

    /// Whether a layout pass has seen this element.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// Mark the element as laid out (its hidden style is now committed).
    pub(crate) fn lay_out(&mut self) {
        self.laid_out = true;
    }

    /// Add a class.
    ///
    /// Adding `show` to an element that has been laid out starts the entry
    /// transition. Without a prior layout the change is coalesced with the
    /// insertion and the element appears at once.
    pub fn add_class(&mut self, class: Class) {
        if !self.classes.add(class) {
            return;
        }
        if class == Class::Show {
            self.entry = if self.laid_out {
                Entry::Entering { frame: 0 }
            } else {
                Entry::Visible
            };
        }
    }

    /// Remove a class. Removing `show` hides the element again.
    pub fn remove_class(&mut self, class: Class) {
        if self.classes.remove(class) && class == Class::Show {
            self.entry = Entry::Hidden;
        }
    }

    /// Check for a class.
    pub fn has_class(&self, class: Class) -> bool {
        self.classes.contains(class)
    }

    /// Advance the entry transition by one frame.
    ///
    /// Returns `true` while the transition is still running.
    pub fn advance_entry(&mut self, total_frames: u8) -> bool {
        if let Entry::Entering { frame } = self.entry {
            let next = frame.saturating_add(1);
            if next >= total_frames {
                self.entry = Entry::Visible;
                return false;
            }
            self.entry = Entry::Entering { frame: next };
            return true;
        }
        false
    }

    /// Convert back to a history record.
    pub fn to_message(&self) -> ChatMessage {
        let message = match self.role {
            Role::User => ChatMessage::user(self.text.clone()),
            Role::Assistant | Role::System => ChatMessage::assistant(self.text.clone()),
        };
        message.with_citations(self.citations.clone())
    }
}

/// Markup the typing placeholder is instantiated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingTemplate {
    label: String,
}

impl TypingTemplate {
    /// Create a template with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Produce a fresh placeholder.
    pub fn instantiate(&self) -> TypingIndicator {
        TypingIndicator {
            label: self.label.clone(),
            classes: ClassList::from_slice(&[Class::TypingIndicator]),
            frame: 0,
        }
    }
}

impl Default for TypingTemplate {
    fn default() -> Self {
        Self::new("Assistant is typing")
    }
}

/// The transient "assistant is composing" element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingIndicator {
    label: String,
    classes: ClassList,
    frame: usize,
}

impl TypingIndicator {
    /// Label shown next to the dots.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Animation frame (advances every tick).
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub(crate) fn advance(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}

/// A child of the chat container.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A chat turn.
    Message(MessageElement),
    /// The pending placeholder.
    Typing(TypingIndicator),
}

impl Node {
    /// Class list of the node.
    pub fn classes(&self) -> &ClassList {
        match self {
            Node::Message(m) => &m.classes,
            Node::Typing(t) => &t.classes,
        }
    }

    /// Check for a class.
    pub fn has_class(&self, class: Class) -> bool {
        self.classes().contains(class)
    }

    /// The message element, if this node is one.
    pub fn as_message(&self) -> Option<&MessageElement> {
        match self {
            Node::Message(m) => Some(m),
            Node::Typing(_) => None,
        }
    }

    /// Mutable access to the message element.
    pub fn as_message_mut(&mut self) -> Option<&mut MessageElement> {
        match self {
            Node::Message(m) => Some(m),
            Node::Typing(_) => None,
        }
    }
}

impl From<MessageElement> for Node {
    fn from(element: MessageElement) -> Self {
        Node::Message(element)
    }
}

impl From<TypingIndicator> for Node {
    fn from(indicator: TypingIndicator) -> Self {
        Node::Typing(indicator)
    }
}
