//! Chat view controller.
//!
//! Owns the container, the viewport and the mutation watcher, and exposes
//! the four handlers of the page:
//! - [`ChatView::before_request`] - optimistic user message + typing placeholder
//! - [`ChatView::after_swap`] - drop the placeholder, animate the reply
//! - [`ChatView::deliver_mutations`] - feed the watcher, scroll on insertions
//! - [`ChatView::on_load`] - initial scroll for pre-existing history

use super::container::{ChatContainer, NodeId};
use super::element::{Class, MessageElement, Node, TypingTemplate};
use super::viewport::{ScrollBehavior, Viewport};
use super::watcher::MutationWatcher;
use crate::chat::{ChatMessage, Role};
use tracing::debug;

/// Frames an entry transition lasts by default.
pub const DEFAULT_ENTRY_FRAMES: u8 = 4;

/// The text field the user types into.
pub trait InputField {
    /// Current text.
    fn value(&self) -> &str;
    /// Reset to empty.
    fn clear(&mut self);
}

impl InputField for String {
    fn value(&self) -> &str {
        self.as_str()
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

/// Rendering options for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Ticks an entry transition lasts.
    pub entry_frames: u8,
    /// How scroll-to-last moves the viewport.
    pub scroll_behavior: ScrollBehavior,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            entry_frames: DEFAULT_ENTRY_FRAMES,
            scroll_behavior: ScrollBehavior::Smooth,
        }
    }
}

/// Per-turn state of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// User message shown, typing placeholder visible.
    Pending,
}

/// The chat view controller.
#[derive(Debug)]
pub struct ChatView {
    container: ChatContainer,
    viewport: Viewport,
    watcher: MutationWatcher,
    template: TypingTemplate,
    options: ViewOptions,
    phase: ViewPhase,
}

impl ChatView {
    /// Create an empty view.
    pub fn new(template: TypingTemplate, options: ViewOptions) -> Self {
        Self {
            container: ChatContainer::new(),
            viewport: Viewport::new(),
            watcher: MutationWatcher::new(),
            template,
            options,
            phase: ViewPhase::Idle,
        }
    }

    /// Create a view already holding `history`, as a page loaded with it.
    ///
    /// The history does not count as a mutation; call [`ChatView::on_load`]
    /// to bring the latest message into view.
    pub fn with_history(
        history: &[ChatMessage],
        template: TypingTemplate,
        options: ViewOptions,
    ) -> Self {
        let mut view = Self::new(template, options);
        for message in history.iter().filter(|m| m.role != Role::System) {
            view.container
                .append_child(MessageElement::from_history(message));
        }
        view.container.take_records();
        view
    }

    /// The chat container.
    pub fn container(&self) -> &ChatContainer {
        &self.container
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport (manual scrolling).
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// The mutation watcher.
    pub fn watcher(&self) -> &MutationWatcher {
        &self.watcher
    }

    /// Mutable watcher (disconnect).
    pub fn watcher_mut(&mut self) -> &mut MutationWatcher {
        &mut self.watcher
    }

    /// View options.
    pub fn options(&self) -> ViewOptions {
        self.options
    }

    /// Current phase.
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// Whether a reply is awaited.
    pub fn is_pending(&self) -> bool {
        self.phase == ViewPhase::Pending
    }

    /// Number of typing placeholders in the container.
    pub fn placeholder_count(&self) -> usize {
        self.container.count_class(Class::TypingIndicator)
    }

    /// Pre-request handler.
    ///
    /// Appends the input text as a user message, lays it out, adds `show`,
    /// clears the input and appends a typing placeholder. Empty text is not
    /// rejected here.
    pub fn before_request<I: InputField + ?Sized>(&mut self, input: &mut I) {
        let text = input.value().to_string();
        debug!(chars = text.chars().count(), "before request");

        let id = self.container.append_child(MessageElement::user(text));
        self.container.reflow();
        if let Some(element) = self.container.get_mut(id).and_then(Node::as_message_mut) {
            element.add_class(Class::Show);
        }

        input.clear();

        self.container.append_child(self.template.instantiate());
        self.phase = ViewPhase::Pending;
    }

    /// Post-swap handler.
    ///
    /// Removes the typing placeholder if present, then lays out and shows
    /// the last child. An empty container or a last child that is not a
    /// message is left alone.
    pub fn after_swap(&mut self) {
        if let Some(id) = self.container.query_selector(Class::TypingIndicator) {
            self.container.remove(id);
        }
        self.phase = ViewPhase::Idle;

        self.container.reflow();
        match self
            .container
            .last_child_mut()
            .and_then(|child| child.node.as_message_mut())
        {
            Some(element) => element.add_class(Class::Show),
            None => debug!("after swap: no message to show"),
        }

        self.viewport.clamp(self.container.len());
    }

    /// Deliver pending mutation records to the watcher as one batch.
    pub fn deliver_mutations(&mut self) {
        let batch = self.container.take_records();
        if self.watcher.observe(&batch) {
            self.scroll_to_last();
        }
    }

    /// Scroll action: align the last child to the top of the view.
    pub fn scroll_to_last(&mut self) {
        let Some(index) = self.container.len().checked_sub(1) else {
            return;
        };
        self.viewport
            .scroll_into_view(index, self.options.scroll_behavior);
    }

    /// Initial load handler.
    pub fn on_load(&mut self) {
        self.scroll_to_last();
    }

    /// Run the pre-request handler and deliver its mutations.
    pub fn submit<I: InputField + ?Sized>(&mut self, input: &mut I) {
        self.before_request(input);
        self.deliver_mutations();
    }

    /// Swap a reply element in at the end, run the post-swap handler and
    /// deliver the batch. Returns the reply's id.
    pub fn swap(&mut self, element: MessageElement) -> NodeId {
        let id = self.container.append_child(element);
        self.after_swap();
        self.deliver_mutations();
        id
    }

    /// Remove everything and return to idle.
    pub fn clear(&mut self) {
        self.container.clear();
        self.viewport.reset();
        self.phase = ViewPhase::Idle;
        self.deliver_mutations();
    }

    /// Fold or unfold the sources of a reply. Returns the new folded state.
    pub fn toggle_sources(&mut self, id: NodeId) -> Option<bool> {
        let element = self.container.get_mut(id).and_then(Node::as_message_mut)?;
        if element.citations().is_empty() {
            return None;
        }
        element.sources_collapsed = !element.sources_collapsed;
        Some(element.sources_collapsed)
    }

    /// The latest reply that carries sources.
    pub fn last_reply_with_sources(&self) -> Option<NodeId> {
        self.container
            .messages()
            .filter(|(_, m)| m.role() == Role::Assistant && !m.citations().is_empty())
            .map(|(id, _)| id)
            .last()
    }

    /// Advance animations by one tick. Returns `true` while anything moves.
    pub fn tick(&mut self) -> bool {
        let frames = self.options.entry_frames;
        let mut animating = false;
        for child in self.container.children_mut() {
            match &mut child.node {
                Node::Message(element) => animating |= element.advance_entry(frames),
                Node::Typing(indicator) => {
                    indicator.advance();
                    animating = true;
                }
            }
        }
        animating |= self.viewport.tick();
        animating
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new(TypingTemplate::default(), ViewOptions::default())
    }
}
