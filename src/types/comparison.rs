use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::trace;

use super::error::OperatorError;
use super::event::Event;
use super::operator::{Match, MatchingEvent, Operator, OperatorId, Scope};
use super::value::Value;

/// Relational operations supported by [`ComparisonOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOperationType {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

/// The right-hand side handed to [`ComparisonOperationType::apply_to`].
#[derive(Debug, Clone, Copy)]
pub enum Other<'a> {
    /// A fixed event.
    Event(&'a Event),
    /// The matching event of a referenced operator.
    Operator(&'a Event),
    /// A literal value.
    Literal(&'a Value),
}

impl ComparisonOperationType {
    /// Compare `event[attribute]` against `other`.
    ///
    /// For event and operator sources the same attribute is looked up on the
    /// other event; a literal is used as-is.
    ///
    /// # Errors
    ///
    /// [`OperatorError::AttributeNotFound`] if either event lacks
    /// `attribute`, [`OperatorError::IncompatibleTypes`] if the two values
    /// cannot be compared.
    pub fn apply_to(
        self,
        attribute: &str,
        event: &Event,
        other: Other<'_>,
    ) -> Result<bool, OperatorError> {
        let left = lookup(event, attribute)?;
        let right = match other {
            Other::Event(other) | Other::Operator(other) => lookup(other, attribute)?,
            Other::Literal(value) => value,
        };
        left.compare(self, right)
            .ok_or_else(|| OperatorError::IncompatibleTypes {
                attribute: attribute.to_owned(),
                left: left.type_name(),
                right: right.type_name(),
            })
    }
}

fn lookup<'a>(event: &'a Event, attribute: &str) -> Result<&'a Value, OperatorError> {
    event
        .get(attribute)
        .ok_or_else(|| OperatorError::AttributeNotFound {
            attribute: attribute.to_owned(),
        })
}

impl fmt::Display for ComparisonOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        };
        f.write_str(name)
    }
}

/// Where a comparison takes its right-hand side from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonOperand {
    Event(Event),
    Operator(OperatorId),
    Literal(Value),
}

/// Which [`ComparisonOperand`] a comparison was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonMode {
    Event,
    Operator,
    Literal,
}

impl From<Event> for ComparisonOperand {
    fn from(event: Event) -> Self {
        ComparisonOperand::Event(event)
    }
}

impl From<OperatorId> for ComparisonOperand {
    fn from(id: OperatorId) -> Self {
        ComparisonOperand::Operator(id)
    }
}

impl From<Value> for ComparisonOperand {
    fn from(value: Value) -> Self {
        ComparisonOperand::Literal(value)
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ComparisonOperand {
                fn from(value: $ty) -> Self {
                    ComparisonOperand::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_operand!(i64, i32, f64, bool, &str, String);

impl fmt::Display for ComparisonOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperand::Event(event) => write!(f, "{event}"),
            ComparisonOperand::Operator(id) => write!(f, "{id}"),
            ComparisonOperand::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// Compares one attribute of the incoming event against another source.
///
/// When the comparison holds, the incoming event (not the other side) is
/// recorded as the matching event.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_algebra::{ComparisonOperation, Event, OperatorTree};
///
/// let mut tree = OperatorTree::new();
/// let warm = tree.insert(ComparisonOperation::greater_than("celsius", 20_i64)).unwrap();
///
/// let event = Arc::new(Event::new().set("celsius", 24_i64));
/// assert!(tree.apply(warm, &event).unwrap());
/// assert_eq!(tree.matching_event(warm), Some(&event));
/// ```
#[derive(Debug, Clone)]
pub struct ComparisonOperation {
    kind: ComparisonOperationType,
    attribute: String,
    other: ComparisonOperand,
    matching: MatchingEvent,
}

impl ComparisonOperation {
    #[must_use]
    pub fn new(
        kind: ComparisonOperationType,
        attribute: &str,
        other: impl Into<ComparisonOperand>,
    ) -> Self {
        Self {
            kind,
            attribute: attribute.to_owned(),
            other: other.into(),
            matching: MatchingEvent::default(),
        }
    }

    /// Compare against the same attribute of a fixed event.
    #[must_use]
    pub fn with_event(kind: ComparisonOperationType, attribute: &str, event: Event) -> Self {
        Self::new(kind, attribute, ComparisonOperand::Event(event))
    }

    /// Compare against the same attribute of another operator's matching event.
    #[must_use]
    pub fn with_operator(kind: ComparisonOperationType, attribute: &str, id: OperatorId) -> Self {
        Self::new(kind, attribute, ComparisonOperand::Operator(id))
    }

    /// Compare against a literal value.
    #[must_use]
    pub fn with_literal(kind: ComparisonOperationType, attribute: &str, value: Value) -> Self {
        Self::new(kind, attribute, ComparisonOperand::Literal(value))
    }

    #[must_use]
    pub fn equal(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::Equal, attribute, other)
    }

    #[must_use]
    pub fn not_equal(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::NotEqual, attribute, other)
    }

    #[must_use]
    pub fn greater_than(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::GreaterThan, attribute, other)
    }

    #[must_use]
    pub fn greater_than_or_equal(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::GreaterThanOrEqual, attribute, other)
    }

    #[must_use]
    pub fn less_than(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::LessThan, attribute, other)
    }

    #[must_use]
    pub fn less_than_or_equal(attribute: &str, other: impl Into<ComparisonOperand>) -> Self {
        Self::new(ComparisonOperationType::LessThanOrEqual, attribute, other)
    }

    #[must_use]
    pub fn kind(&self) -> ComparisonOperationType {
        self.kind
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[must_use]
    pub fn other(&self) -> &ComparisonOperand {
        &self.other
    }

    #[must_use]
    pub fn mode(&self) -> ComparisonMode {
        match self.other {
            ComparisonOperand::Event(_) => ComparisonMode::Event,
            ComparisonOperand::Operator(_) => ComparisonMode::Operator,
            ComparisonOperand::Literal(_) => ComparisonMode::Literal,
        }
    }
}

impl Operator for ComparisonOperation {
    fn apply(&mut self, scope: &mut Scope<'_>, event: &Arc<Event>) -> Result<bool, OperatorError> {
        let other = match &self.other {
            ComparisonOperand::Event(other) => Other::Event(other),
            ComparisonOperand::Operator(id) => Other::Operator(scope.matching_event(*id)?),
            ComparisonOperand::Literal(value) => Other::Literal(value),
        };
        let held = self.kind.apply_to(&self.attribute, event, other)?;
        trace!(kind = %self.kind, attribute = %self.attribute, held, "compared attribute");

        if held {
            self.matching.record(Arc::clone(event));
        }
        Ok(held)
    }

    fn reset(&mut self, scope: &mut Scope<'_>) {
        if scope.options().clears_on_reset() {
            self.matching.clear();
        }
    }

    fn references(&self) -> Vec<OperatorId> {
        match self.other {
            ComparisonOperand::Operator(id) => vec![id],
            ComparisonOperand::Event(_) | ComparisonOperand::Literal(_) => Vec::new(),
        }
    }

    fn as_match(&self) -> Option<&dyn Match> {
        Some(self)
    }
}

impl Match for ComparisonOperation {
    fn matching_event(&self) -> Option<&Arc<Event>> {
        self.matching.get()
    }
}

impl PartialEq for ComparisonOperation {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.attribute == other.attribute && self.other == other.other
    }
}

impl Eq for ComparisonOperation {}

impl Hash for ComparisonOperation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.attribute.hash(state);
        self.other.hash(state);
    }
}

impl ComparisonOperation {
    pub(crate) fn write_with<F>(&self, f: &mut fmt::Formatter<'_>, mut write_id: F) -> fmt::Result
    where
        F: FnMut(&mut fmt::Formatter<'_>, OperatorId) -> fmt::Result,
    {
        write!(f, "{}({}, ", self.kind, self.attribute)?;
        match &self.other {
            ComparisonOperand::Operator(id) => write_id(f, *id)?,
            other => write!(f, "{other}")?,
        }
        write!(f, ")")
    }
}

impl fmt::Display for ComparisonOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |f, id| write!(f, "{id}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use ComparisonOperationType as Op;

    fn hash_of(op: &ComparisonOperation) -> u64 {
        let mut hasher = DefaultHasher::new();
        op.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn apply_to_literal() {
        let event = Event::new().set("celsius", 30_i64);
        let result = Op::GreaterThan.apply_to("celsius", &event, Other::Literal(&Value::Int(25)));
        assert_eq!(result, Ok(true));
    }

    #[test]
    fn apply_to_event_reads_the_same_attribute() {
        let event = Event::new().set("celsius", 18_i64);
        let other = Event::new().set("celsius", 21_i64);
        assert_eq!(
            Op::LessThan.apply_to("celsius", &event, Other::Event(&other)),
            Ok(true)
        );
        assert_eq!(
            Op::Equal.apply_to("celsius", &event, Other::Operator(&other)),
            Ok(false)
        );
    }

    #[test]
    fn apply_to_missing_attribute_on_tested_event() {
        let event = Event::new().set("humidity", 40_i64);
        let result = Op::Equal.apply_to("celsius", &event, Other::Literal(&Value::Int(1)));
        assert_eq!(
            result,
            Err(OperatorError::AttributeNotFound {
                attribute: "celsius".into()
            })
        );
    }

    #[test]
    fn apply_to_missing_attribute_on_other_event() {
        let event = Event::new().set("celsius", 1_i64);
        let other = Event::new();
        let result = Op::Equal.apply_to("celsius", &event, Other::Event(&other));
        assert!(matches!(result, Err(OperatorError::AttributeNotFound { .. })));
    }

    #[test]
    fn apply_to_incompatible_types() {
        let event = Event::new().set("city", "Berlin");
        let result = Op::Equal.apply_to("city", &event, Other::Literal(&Value::Int(3)));
        assert_eq!(
            result,
            Err(OperatorError::IncompatibleTypes {
                attribute: "city".into(),
                left: "string",
                right: "int",
            })
        );
    }

    #[test]
    fn modes() {
        assert_eq!(
            ComparisonOperation::equal("x", 1_i64).mode(),
            ComparisonMode::Literal
        );
        assert_eq!(
            ComparisonOperation::equal("x", Event::new()).mode(),
            ComparisonMode::Event
        );
        assert_eq!(
            ComparisonOperation::equal("x", OperatorId::new(0)).mode(),
            ComparisonMode::Operator
        );
    }

    #[test]
    fn identical_construction_is_equal_and_hashes_identically() {
        let a = ComparisonOperation::with_literal(Op::GreaterThan, "celsius", Value::Int(20));
        let b = ComparisonOperation::greater_than("celsius", 20_i64);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn any_differing_field_breaks_equality() {
        let base = ComparisonOperation::greater_than("celsius", 20_i64);
        assert_ne!(base, ComparisonOperation::less_than("celsius", 20_i64));
        assert_ne!(base, ComparisonOperation::greater_than("fahrenheit", 20_i64));
        assert_ne!(base, ComparisonOperation::greater_than("celsius", 21_i64));
        assert_ne!(
            base,
            ComparisonOperation::greater_than("celsius", OperatorId::new(0))
        );
        assert_ne!(
            base,
            ComparisonOperation::greater_than("celsius", Event::single("celsius", 20_i64))
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            ComparisonOperation::greater_than("celsius", 20_i64).to_string(),
            "GREATER_THAN(celsius, 20)"
        );
        assert_eq!(
            ComparisonOperation::equal("city", "Berlin").to_string(),
            "EQUAL(city, \"Berlin\")"
        );
        assert_eq!(
            ComparisonOperation::not_equal("celsius", OperatorId::new(4)).to_string(),
            "NOT_EQUAL(celsius, #4)"
        );
        assert_eq!(
            ComparisonOperation::less_than_or_equal("celsius", Event::single("celsius", 3_i64))
                .to_string(),
            "LESS_THAN_OR_EQUAL(celsius, {celsius=3})"
        );
    }

    #[test]
    fn references_only_in_operator_mode() {
        let id = OperatorId::new(2);
        assert_eq!(
            ComparisonOperation::equal("x", id).references(),
            vec![id]
        );
        assert!(ComparisonOperation::equal("x", 2_i64).references().is_empty());
    }
}
