//! The chat container: an ordered list of nodes with mutation records.

use super::element::{Class, MessageElement, Node};

/// Identifier assigned to a node when it enters the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// A node together with its container-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub id: NodeId,
    pub node: Node,
}

/// One change to the container's child list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationRecord {
    /// Nodes inserted by this change.
    pub added: Vec<NodeId>,
    /// Nodes removed by this change.
    pub removed: Vec<NodeId>,
}

impl MutationRecord {
    /// Check if the record inserted anything.
    pub fn has_added(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Ordered sequence of chat nodes.
///
/// Insertion order is display order. Every insertion and removal is
/// recorded until [`ChatContainer::take_records`] drains them.
#[derive(Debug, Default)]
pub struct ChatContainer {
    children: Vec<Child>,
    next_id: u64,
    records: Vec<MutationRecord>,
}

impl ChatContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            next_id: 1,
            records: Vec::new(),
        }
    }

    /// All children in order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a node at the end. Returns its id.
    pub fn append_child(&mut self, node: impl Into<Node>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.children.push(Child {
            id,
            node: node.into(),
        });
        self.records.push(MutationRecord {
            added: vec![id],
            removed: Vec::new(),
        });
        id
    }

    /// Remove a node by id.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.index_of(id)?;
        let child = self.children.remove(idx);
        self.records.push(MutationRecord {
            added: Vec::new(),
            removed: vec![id],
        });
        Some(child.node)
    }

    /// Remove every child as a single change.
    pub fn clear(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let removed = self.children.drain(..).map(|c| c.id).collect();
        self.records.push(MutationRecord {
            added: Vec::new(),
            removed,
        });
    }

    /// Position of a node.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.children.iter().position(|c| c.id == id)
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.children.iter().find(|c| c.id == id).map(|c| &c.node)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| &mut c.node)
    }

    /// First node carrying `class`.
    pub fn query_selector(&self, class: Class) -> Option<NodeId> {
        self.children
            .iter()
            .find(|c| c.node.has_class(class))
            .map(|c| c.id)
    }

    /// Count the nodes carrying `class`.
    pub fn count_class(&self, class: Class) -> usize {
        self.children
            .iter()
            .filter(|c| c.node.has_class(class))
            .count()
    }

    /// The last child.
    pub fn last_child(&self) -> Option<&Child> {
        self.children.last()
    }

    /// Mutable access to the last child.
    pub fn last_child_mut(&mut self) -> Option<&mut Child> {
        self.children.last_mut()
    }

    /// Message elements in order, with ids.
    pub fn messages(&self) -> impl Iterator<Item = (NodeId, &MessageElement)> + '_ {
        self.children
            .iter()
            .filter_map(|c| c.node.as_message().map(|m| (c.id, m)))
    }

    /// Force a layout pass over every child.
    ///
    /// After this, elements have committed their current (hidden) style, so
    /// a following `show` class starts a transition.
    pub fn reflow(&mut self) {
        for child in &mut self.children {
            if let Node::Message(element) = &mut child.node {
                element.lay_out();
            }
        }
    }

    /// Drain the pending mutation records.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Check for undelivered mutation records.
    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Iterate children mutably (animation ticks).
    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut Child> + '_ {
        self.children.iter_mut()
    }
}
