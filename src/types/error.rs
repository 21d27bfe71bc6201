use thiserror::Error;

use super::operator::OperatorId;

/// Failure of a single `apply()` call.
///
/// Every variant terminates the evaluation in progress; nothing is retried
/// or substituted. The surrounding engine decides whether to skip the event,
/// log and continue, or discard the rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    #[error("attribute '{attribute}' not found")]
    AttributeNotFound { attribute: String },

    #[error("operator {operator} has no matching event")]
    NoMatchingEvent { operator: OperatorId },

    #[error("cannot compare '{attribute}': {left} and {right} are incompatible")]
    IncompatibleTypes {
        attribute: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("value {value} is not numeric")]
    NotNumeric { value: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("operator {operator} is not reachable from here")]
    UnknownOperator { operator: OperatorId },
}

/// Failure to insert a node into an [`OperatorTree`](super::OperatorTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("operator {operator} does not exist in this tree")]
    UnknownOperator { operator: OperatorId },

    #[error("operator {operator} is already an operand of {owner}")]
    AlreadyOwned {
        operator: OperatorId,
        owner: OperatorId,
    },

    #[error("operator {operator} is listed twice as an operand")]
    DuplicateOperand { operator: OperatorId },

    #[error("operator {operator} cannot hold a matching event")]
    NotMatchable { operator: OperatorId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_not_found_message() {
        let err = OperatorError::AttributeNotFound {
            attribute: "temperature".into(),
        };
        assert_eq!(err.to_string(), "attribute 'temperature' not found");
    }

    #[test]
    fn no_matching_event_message() {
        let err = OperatorError::NoMatchingEvent {
            operator: OperatorId::new(3),
        };
        assert_eq!(err.to_string(), "operator #3 has no matching event");
    }

    #[test]
    fn incompatible_types_message() {
        let err = OperatorError::IncompatibleTypes {
            attribute: "city".into(),
            left: "string",
            right: "int",
        };
        assert_eq!(
            err.to_string(),
            "cannot compare 'city': string and int are incompatible"
        );
    }

    #[test]
    fn not_numeric_message() {
        let err = OperatorError::NotNumeric {
            value: "\"abc\"".into(),
        };
        assert_eq!(err.to_string(), "value \"abc\" is not numeric");
    }

    #[test]
    fn overflow_message() {
        let err = OperatorError::Overflow { operation: "ADD" };
        assert_eq!(err.to_string(), "integer overflow in ADD");
    }

    #[test]
    fn already_owned_message() {
        let err = TreeError::AlreadyOwned {
            operator: OperatorId::new(0),
            owner: OperatorId::new(2),
        };
        assert_eq!(err.to_string(), "operator #0 is already an operand of #2");
    }

    #[test]
    fn not_matchable_message() {
        let err = TreeError::NotMatchable {
            operator: OperatorId::new(1),
        };
        assert_eq!(err.to_string(), "operator #1 cannot hold a matching event");
    }

    #[test]
    fn unknown_operator_message() {
        let err = TreeError::UnknownOperator {
            operator: OperatorId::new(9),
        };
        assert_eq!(err.to_string(), "operator #9 does not exist in this tree");
    }
}
