mod comparison;
mod error;
mod event;
mod logic;
mod numeric;
mod operator;
mod options;
mod tree;
mod value;

pub use comparison::{
    ComparisonMode, ComparisonOperand, ComparisonOperation, ComparisonOperationType, Other,
};
pub use error::{OperatorError, TreeError};
pub use event::{Attribute, Event};
pub use logic::{BinaryOp, BinaryOperatorType};
pub use numeric::{NumericMode, NumericOperation, NumericOperationType, Operand};
pub use operator::{Match, MatchingEvent, Node, Operator, OperatorId, Scope};
pub use options::{ResetPolicy, ResolverCaching, TreeOptions};
pub use tree::{OperatorTree, Render};
pub use value::Value;
