use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::comparison::ComparisonOperation;
use super::error::OperatorError;
use super::event::Event;
use super::logic::BinaryOp;
use super::numeric::NumericOperation;
use super::options::TreeOptions;

/// Non-owning handle to a node of an [`OperatorTree`](super::OperatorTree).
///
/// Ids are handed out by [`OperatorTree::insert`](super::OperatorTree::insert)
/// in insertion order. A node can only mention ids that existed before it
/// was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(usize);

impl OperatorId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in its tree.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the predicate/expression tree.
///
/// `apply` may record state (matching events, cached operands) even for
/// nodes that conceptually only compare values. Implementations reach other
/// nodes exclusively through the [`Scope`] they are handed.
pub trait Operator: fmt::Debug {
    /// Evaluate this node against `event`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError`] when a value the node needs is unavailable
    /// or unusable. The error aborts the whole evaluation.
    fn apply(&mut self, scope: &mut Scope<'_>, event: &Arc<Event>) -> Result<bool, OperatorError>;

    /// Discard accumulated state and propagate to owned operands.
    fn reset(&mut self, scope: &mut Scope<'_>);

    /// Operands owned by this node.
    fn operands(&self) -> &[OperatorId] {
        &[]
    }

    /// Nodes this node reads from without owning them.
    fn references(&self) -> Vec<OperatorId> {
        Vec::new()
    }

    /// Access to the matching event, for nodes that record one.
    fn as_match(&self) -> Option<&dyn Match> {
        None
    }
}

/// An operator that remembers the last event for which it held.
pub trait Match: Operator {
    /// The event recorded by the last successful evaluation, or `None` if
    /// the node has not held since it was created or reset.
    fn matching_event(&self) -> Option<&Arc<Event>>;
}

/// Matching-event slot shared by every [`Match`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MatchingEvent(Option<Arc<Event>>);

impl MatchingEvent {
    pub fn record(&mut self, event: Arc<Event>) {
        self.0 = Some(event);
    }

    #[must_use]
    pub fn get(&self) -> Option<&Arc<Event>> {
        self.0.as_ref()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// The part of a tree a node can reach while it is evaluated: every node
/// inserted before it.
///
/// Because operands and references always point backwards, the node being
/// applied and the nodes it reaches never alias.
pub struct Scope<'a> {
    nodes: &'a mut [Node],
    options: &'a TreeOptions,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(nodes: &'a mut [Node], options: &'a TreeOptions) -> Self {
        Self { nodes, options }
    }

    #[must_use]
    pub fn options(&self) -> &TreeOptions {
        self.options
    }

    /// Apply the node `id` to `event`.
    ///
    /// # Errors
    ///
    /// Propagates the node's error, or returns
    /// [`OperatorError::UnknownOperator`] if `id` is outside this scope.
    pub fn apply(&mut self, id: OperatorId, event: &Arc<Event>) -> Result<bool, OperatorError> {
        let (node, mut inner) = self
            .split(id)
            .ok_or(OperatorError::UnknownOperator { operator: id })?;
        node.apply(&mut inner, event)
    }

    /// Reset the node `id`. Ids outside this scope are ignored.
    pub fn reset(&mut self, id: OperatorId) {
        if let Some((node, mut inner)) = self.split(id) {
            node.reset(&mut inner);
        }
    }

    /// The matching event currently recorded by node `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::NoMatchingEvent`] if the node never held (or
    /// cannot hold), and [`OperatorError::UnknownOperator`] if `id` is
    /// outside this scope.
    pub fn matching_event(&self, id: OperatorId) -> Result<&Arc<Event>, OperatorError> {
        let node = self
            .nodes
            .get(id.index())
            .ok_or(OperatorError::UnknownOperator { operator: id })?;
        node.as_match()
            .and_then(|m| m.matching_event())
            .ok_or(OperatorError::NoMatchingEvent { operator: id })
    }

    fn split(&mut self, id: OperatorId) -> Option<(&mut Node, Scope<'_>)> {
        if id.index() >= self.nodes.len() {
            return None;
        }
        let (earlier, rest) = self.nodes.split_at_mut(id.index());
        let node = rest.first_mut()?;
        Some((
            node,
            Scope {
                nodes: earlier,
                options: self.options,
            },
        ))
    }
}

/// The concrete node kinds a tree is built from.
///
/// Equality and hashing cover construction-time state only (operation types,
/// attributes, literals, operand ids); matching events and cached operands are
/// ignored. [`Node::External`] nodes are only equal to themselves.
#[derive(Debug)]
pub enum Node {
    Logical(BinaryOp),
    Comparison(ComparisonOperation),
    Numeric(NumericOperation),
    /// An operator supplied by the surrounding engine.
    External(Box<dyn Operator + Send>),
}

impl Node {
    /// Wrap an engine-supplied operator.
    pub fn external(operator: impl Operator + Send + 'static) -> Self {
        Node::External(Box::new(operator))
    }

    fn as_operator(&self) -> &dyn Operator {
        match self {
            Node::Logical(op) => op,
            Node::Comparison(op) => op,
            Node::Numeric(op) => op,
            Node::External(op) => op.as_ref(),
        }
    }

    fn as_operator_mut(&mut self) -> &mut dyn Operator {
        match self {
            Node::Logical(op) => op,
            Node::Comparison(op) => op,
            Node::Numeric(op) => op,
            Node::External(op) => op.as_mut(),
        }
    }

    fn external_address(op: &(dyn Operator + Send)) -> usize {
        std::ptr::from_ref(op).cast::<()>() as usize
    }
}

impl Operator for Node {
    fn apply(&mut self, scope: &mut Scope<'_>, event: &Arc<Event>) -> Result<bool, OperatorError> {
        self.as_operator_mut().apply(scope, event)
    }

    fn reset(&mut self, scope: &mut Scope<'_>) {
        self.as_operator_mut().reset(scope);
    }

    fn operands(&self) -> &[OperatorId] {
        self.as_operator().operands()
    }

    fn references(&self) -> Vec<OperatorId> {
        self.as_operator().references()
    }

    fn as_match(&self) -> Option<&dyn Match> {
        self.as_operator().as_match()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Logical(a), Node::Logical(b)) => a == b,
            (Node::Comparison(a), Node::Comparison(b)) => a == b,
            (Node::Numeric(a), Node::Numeric(b)) => a == b,
            (Node::External(a), Node::External(b)) => {
                Self::external_address(a.as_ref()) == Self::external_address(b.as_ref())
            }
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Node::Logical(op) => op.hash(state),
            Node::Comparison(op) => op.hash(state),
            Node::Numeric(op) => op.hash(state),
            Node::External(op) => Self::external_address(op.as_ref()).hash(state),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Logical(op) => write!(f, "{op}"),
            Node::Comparison(op) => write!(f, "{op}"),
            Node::Numeric(op) => write!(f, "{op}"),
            Node::External(op) => write!(f, "{op:?}"),
        }
    }
}

impl From<BinaryOp> for Node {
    fn from(op: BinaryOp) -> Self {
        Node::Logical(op)
    }
}

impl From<ComparisonOperation> for Node {
    fn from(op: ComparisonOperation) -> Self {
        Node::Comparison(op)
    }
}

impl From<NumericOperation> for Node {
    fn from(op: NumericOperation) -> Self {
        Node::Numeric(op)
    }
}
