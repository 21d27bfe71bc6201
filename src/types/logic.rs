use std::fmt;
use std::sync::Arc;

use super::error::OperatorError;
use super::event::Event;
use super::operator::{Operator, OperatorId, Scope};

/// Boolean connectives a [`BinaryOp`] folds its operands with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOperatorType {
    And,
    Or,
    Xor,
}

impl BinaryOperatorType {
    /// The seed of the fold, returned as-is for an empty operand list.
    #[must_use]
    pub fn unit(self) -> bool {
        match self {
            Self::And => true,
            Self::Or | Self::Xor => false,
        }
    }

    /// Combine two boolean results. Associative and commutative.
    #[must_use]
    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
        }
    }
}

impl fmt::Display for BinaryOperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Xor => write!(f, "XOR"),
        }
    }
}

/// Logical combinator over an ordered list of operands it owns.
///
/// Every operand is applied on every evaluation, in list order, even once
/// the result is decided: operands record matching events that later
/// siblings may read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryOp {
    kind: BinaryOperatorType,
    operands: Vec<OperatorId>,
}

impl BinaryOp {
    #[must_use]
    pub fn new(kind: BinaryOperatorType, operands: Vec<OperatorId>) -> Self {
        Self { kind, operands }
    }

    #[must_use]
    pub fn and(operands: Vec<OperatorId>) -> Self {
        Self::new(BinaryOperatorType::And, operands)
    }

    #[must_use]
    pub fn or(operands: Vec<OperatorId>) -> Self {
        Self::new(BinaryOperatorType::Or, operands)
    }

    #[must_use]
    pub fn xor(operands: Vec<OperatorId>) -> Self {
        Self::new(BinaryOperatorType::Xor, operands)
    }

    #[must_use]
    pub fn kind(&self) -> BinaryOperatorType {
        self.kind
    }
}

impl Operator for BinaryOp {
    fn apply(&mut self, scope: &mut Scope<'_>, event: &Arc<Event>) -> Result<bool, OperatorError> {
        let mut result = self.kind.unit();
        for &operand in &self.operands {
            let held = scope.apply(operand, event)?;
            result = self.kind.combine(result, held);
        }
        Ok(result)
    }

    fn reset(&mut self, scope: &mut Scope<'_>) {
        for &operand in &self.operands {
            scope.reset(operand);
        }
    }

    fn operands(&self) -> &[OperatorId] {
        &self.operands
    }
}

impl BinaryOp {
    pub(crate) fn write_with<F>(&self, f: &mut fmt::Formatter<'_>, mut write_id: F) -> fmt::Result
    where
        F: FnMut(&mut fmt::Formatter<'_>, OperatorId) -> fmt::Result,
    {
        write!(f, "{}([", self.kind)?;
        for (i, &operand) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write_id(f, operand)?;
        }
        write!(f, "])")
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |f, id| write!(f, "{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperatorType::{And, Or, Xor};

    #[test]
    fn and_truth_table() {
        assert!(!And.combine(false, false));
        assert!(!And.combine(false, true));
        assert!(!And.combine(true, false));
        assert!(And.combine(true, true));
    }

    #[test]
    fn or_truth_table() {
        assert!(!Or.combine(false, false));
        assert!(Or.combine(false, true));
        assert!(Or.combine(true, false));
        assert!(Or.combine(true, true));
    }

    #[test]
    fn xor_truth_table() {
        assert!(!Xor.combine(false, false));
        assert!(Xor.combine(false, true));
        assert!(Xor.combine(true, false));
        assert!(!Xor.combine(true, true));
    }

    #[test]
    fn units() {
        assert!(And.unit());
        assert!(!Or.unit());
        assert!(!Xor.unit());
    }

    #[test]
    fn unit_is_neutral() {
        for kind in [And, Or, Xor] {
            for b in [false, true] {
                assert_eq!(kind.combine(kind.unit(), b), b, "{kind} with {b}");
            }
        }
    }

    #[test]
    fn display() {
        let op = BinaryOp::or(vec![OperatorId::new(0), OperatorId::new(2)]);
        assert_eq!(op.to_string(), "OR([#0, #2])");
        assert_eq!(BinaryOp::xor(vec![]).to_string(), "XOR([])");
    }

    #[test]
    fn equality_is_ordered_over_operands() {
        let a = BinaryOp::and(vec![OperatorId::new(0), OperatorId::new(1)]);
        let b = BinaryOp::and(vec![OperatorId::new(0), OperatorId::new(1)]);
        let swapped = BinaryOp::and(vec![OperatorId::new(1), OperatorId::new(0)]);
        let other_kind = BinaryOp::or(vec![OperatorId::new(0), OperatorId::new(1)]);
        assert_eq!(a, b);
        assert_ne!(a, swapped);
        assert_ne!(a, other_kind);
    }
}
