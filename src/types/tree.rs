use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::error::{OperatorError, TreeError};
use super::event::Event;
use super::operator::{Node, Operator, OperatorId, Scope};
use super::options::TreeOptions;

/// Arena holding a predicate/expression tree.
///
/// Nodes are inserted bottom-up: a node may only name operands and
/// references that are already in the tree, and an operand belongs to at
/// most one parent. The tree therefore never contains a cycle, and a node
/// only ever reaches nodes inserted before it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_algebra::{BinaryOp, ComparisonOperation, Event, OperatorTree};
///
/// let mut tree = OperatorTree::new();
/// let hot = tree.insert(ComparisonOperation::greater_than("celsius", 30_i64)).unwrap();
/// let humid = tree.insert(ComparisonOperation::greater_than("humidity", 80_i64)).unwrap();
/// let alert = tree.insert(BinaryOp::and(vec![hot, humid])).unwrap();
///
/// let event = Arc::new(Event::new().set("celsius", 35_i64).set("humidity", 90_i64));
/// assert_eq!(tree.apply(alert, &event), Ok(true));
/// assert_eq!(tree.matching_event(hot), Some(&event));
/// ```
#[derive(Debug, Default)]
pub struct OperatorTree {
    nodes: Vec<Node>,
    owners: Vec<Option<OperatorId>>,
    options: TreeOptions,
}

impl OperatorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: TreeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Add a node and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the node names an id that is not in the tree,
    /// lists the same operand twice, claims an operand that already has a
    /// parent, or references a node that never records a matching event.
    pub fn insert(&mut self, node: impl Into<Node>) -> Result<OperatorId, TreeError> {
        let node = node.into();
        self.validate(&node)?;

        let id = OperatorId::new(self.nodes.len());
        for &operand in node.operands() {
            self.owners[operand.index()] = Some(id);
        }
        debug!(operator = %id, node = %node, "inserted operator");
        self.nodes.push(node);
        self.owners.push(None);
        Ok(id)
    }

    fn validate(&self, node: &Node) -> Result<(), TreeError> {
        let operands = node.operands();
        for (position, &operand) in operands.iter().enumerate() {
            let owner = self
                .owners
                .get(operand.index())
                .ok_or(TreeError::UnknownOperator { operator: operand })?;
            if operands[..position].contains(&operand) {
                return Err(TreeError::DuplicateOperand { operator: operand });
            }
            if let Some(owner) = *owner {
                return Err(TreeError::AlreadyOwned {
                    operator: operand,
                    owner,
                });
            }
        }

        for reference in node.references() {
            let target = self
                .nodes
                .get(reference.index())
                .ok_or(TreeError::UnknownOperator {
                    operator: reference,
                })?;
            if target.as_match().is_none() {
                return Err(TreeError::NotMatchable {
                    operator: reference,
                });
            }
        }
        Ok(())
    }

    /// Evaluate node `id` (and everything it owns) against `event`.
    ///
    /// # Errors
    ///
    /// Returns the first [`OperatorError`] raised anywhere in the subtree.
    /// Nodes applied before the failure keep whatever state they recorded.
    pub fn apply(&mut self, id: OperatorId, event: &Arc<Event>) -> Result<bool, OperatorError> {
        let mut scope = Scope::new(&mut self.nodes, &self.options);
        scope.apply(id, event)
    }

    /// Convenience wrapper around [`apply`](Self::apply) for an owned event.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn apply_event(&mut self, id: OperatorId, event: Event) -> Result<bool, OperatorError> {
        self.apply(id, &Arc::new(event))
    }

    /// Reset node `id` and its operands. Unknown ids are ignored.
    pub fn reset(&mut self, id: OperatorId) {
        trace!(operator = %id, "reset operator");
        let mut scope = Scope::new(&mut self.nodes, &self.options);
        scope.reset(id);
    }

    /// Reset every root, which reaches every node in the tree.
    pub fn reset_all(&mut self) {
        let roots = self.roots();
        debug!(roots = roots.len(), policy = ?self.options.reset_policy(), "reset tree");
        for root in roots {
            self.reset(root);
        }
    }

    #[must_use]
    pub fn get(&self, id: OperatorId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The event recorded by node `id` the last time it held.
    #[must_use]
    pub fn matching_event(&self, id: OperatorId) -> Option<&Arc<Event>> {
        self.get(id)?.as_match()?.matching_event()
    }

    /// The node that owns `id` as an operand, if any.
    #[must_use]
    pub fn owner(&self, id: OperatorId) -> Option<OperatorId> {
        self.owners.get(id.index()).copied().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that are not an operand of any other node, in insertion order.
    #[must_use]
    pub fn roots(&self) -> Vec<OperatorId> {
        self.owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(index, _)| OperatorId::new(index))
            .collect()
    }

    /// First node structurally equal to `node`.
    #[must_use]
    pub fn find(&self, node: &Node) -> Option<OperatorId> {
        self.nodes
            .iter()
            .position(|candidate| candidate == node)
            .map(OperatorId::new)
    }

    /// Display the subtree rooted at `id` with operator ids expanded.
    #[must_use]
    pub fn render(&self, id: OperatorId) -> Render<'_> {
        Render { tree: self, id }
    }
}

/// Recursive [`Display`](fmt::Display) of a subtree, see [`OperatorTree::render`].
#[derive(Debug, Clone, Copy)]
pub struct Render<'a> {
    tree: &'a OperatorTree,
    id: OperatorId,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        let expand = |f: &mut fmt::Formatter<'_>, id: OperatorId| write!(f, "{}", tree.render(id));
        match tree.get(self.id) {
            Some(Node::Logical(op)) => op.write_with(f, expand),
            Some(Node::Comparison(op)) => op.write_with(f, expand),
            Some(Node::Numeric(op)) => op.write_with(f, expand),
            Some(node @ Node::External(_)) => write!(f, "{node}"),
            None => write!(f, "{}", self.id),
        }
    }
}
