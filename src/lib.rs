//! Predicate and expression algebra for complex-event-processing rules.
//!
//! A rule condition is an [`OperatorTree`]: logical combinators
//! ([`BinaryOp`]) over attribute comparisons ([`ComparisonOperation`]) and
//! arithmetic resolvers ([`NumericOperation`]). Evaluating a node against an
//! [`Event`] returns whether it holds; comparison and arithmetic nodes also
//! remember the event they last matched so that later nodes can read from it.

mod error;
mod types;

pub use error::AlgebraError;
pub use types::{
    Attribute, BinaryOp, BinaryOperatorType, ComparisonMode, ComparisonOperand,
    ComparisonOperation, ComparisonOperationType, Event, Match, MatchingEvent, Node, NumericMode,
    NumericOperation, NumericOperationType, Operand, Operator, OperatorError, OperatorId,
    OperatorTree, Other, Render, ResetPolicy, ResolverCaching, Scope, TreeError, TreeOptions,
    Value,
};
