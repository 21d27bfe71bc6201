use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use super::error::OperatorError;
use super::event::Event;
use super::operator::{Match, MatchingEvent, Operator, OperatorId, Scope};
use super::options::ResolverCaching;
use super::value::Value;

/// Arithmetic performed by a [`NumericOperation`].
///
/// Two integers use checked 64-bit integer arithmetic: overflow is an
/// error and division truncates toward zero, failing on a zero divisor. As
/// soon as one side is a float, both sides are promoted to `f64` and IEEE-754
/// rules apply, so float division by zero yields an infinity or NaN. An
/// integer beyond 2^53 is rounded when promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericOperationType {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl NumericOperationType {
    /// Apply the operation to two numeric values.
    ///
    /// # Errors
    ///
    /// [`OperatorError::NotNumeric`] for booleans and strings,
    /// [`OperatorError::Overflow`] and [`OperatorError::DivisionByZero`] for
    /// integer operands.
    pub fn apply(self, first: &Value, second: &Value) -> Result<Value, OperatorError> {
        match (first, second) {
            (Value::Int(a), Value::Int(b)) => self.apply_int(*a, *b).map(Value::Int),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => Ok(
                Value::Float(self.apply_float(as_f64(first), as_f64(second))),
            ),
            _ => {
                let offending = if first.is_numeric() { second } else { first };
                Err(OperatorError::NotNumeric {
                    value: offending.to_string(),
                })
            }
        }
    }

    fn apply_int(self, a: i64, b: i64) -> Result<i64, OperatorError> {
        let overflow = OperatorError::Overflow {
            operation: self.name(),
        };
        match self {
            Self::Add => a.checked_add(b).ok_or(overflow),
            Self::Subtract => a.checked_sub(b).ok_or(overflow),
            Self::Multiply => a.checked_mul(b).ok_or(overflow),
            Self::Divide if b == 0 => Err(OperatorError::DivisionByZero),
            // i64::MIN / -1
            Self::Divide => a.checked_div(b).ok_or(overflow),
        }
    }

    fn apply_float(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        Value::Bool(_) | Value::String(_) => f64::NAN,
    }
}

impl fmt::Display for NumericOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One side of an arithmetic operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Literal(Value),
    /// Read the resolver's attribute from this operator's matching event.
    Operator(OperatorId),
}

impl Operand {
    fn is_operator(&self) -> bool {
        matches!(self, Operand::Operator(_))
    }

    fn id(&self) -> Option<OperatorId> {
        match self {
            Operand::Operator(id) => Some(*id),
            Operand::Literal(_) => None,
        }
    }

    fn resolve(&self, attribute: &str, scope: &Scope<'_>) -> Result<Value, OperatorError> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Operator(id) => scope
                .matching_event(*id)?
                .get(attribute)
                .cloned()
                .ok_or_else(|| OperatorError::AttributeNotFound {
                    attribute: attribute.to_owned(),
                }),
        }
    }
}

impl From<OperatorId> for Operand {
    fn from(id: OperatorId) -> Self {
        Operand::Operator(id)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_operand!(i64, i32, f64, bool, &str, String);

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{value}"),
            Operand::Operator(id) => write!(f, "{id}"),
        }
    }
}

/// Which operand representation a resolver currently works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericMode {
    OperatorOperator,
    LiteralOperator,
    OperatorLiteral,
    LiteralLiteral,
}

/// Arithmetic resolver: combines two operands and publishes the result as a
/// single-attribute event named after its attribute.
///
/// Operator operands are read from the referenced node's matching event,
/// using this node's attribute name. The resolver always holds.
///
/// With [`ResolverCaching::Sticky`] (the default) the first successful
/// evaluation caches both resolved operands and the mode collapses to
/// [`NumericMode::LiteralLiteral`]; later evaluations reuse the cached values
/// even if the referenced nodes have matched new events since. A reset under
/// [`ResetPolicy::ReleaseCaches`](super::ResetPolicy::ReleaseCaches) drops
/// the cache; the default reset only clears the matching event.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_algebra::{Event, NumericOperation, OperatorTree, Value};
///
/// let mut tree = OperatorTree::new();
/// let sum = tree.insert(NumericOperation::add("x", 5_i64, 3_i64)).unwrap();
///
/// assert!(tree.apply(sum, &Arc::new(Event::new())).unwrap());
/// let published = tree.matching_event(sum).unwrap();
/// assert_eq!(published.get("x"), Some(&Value::Int(8)));
/// ```
#[derive(Debug, Clone)]
pub struct NumericOperation {
    kind: NumericOperationType,
    attribute: String,
    first: Operand,
    second: Operand,
    cache: Option<(Value, Value)>,
    matching: MatchingEvent,
}

impl NumericOperation {
    #[must_use]
    pub fn new(
        kind: NumericOperationType,
        attribute: &str,
        first: impl Into<Operand>,
        second: impl Into<Operand>,
    ) -> Self {
        Self {
            kind,
            attribute: attribute.to_owned(),
            first: first.into(),
            second: second.into(),
            cache: None,
            matching: MatchingEvent::default(),
        }
    }

    #[must_use]
    pub fn add(attribute: &str, first: impl Into<Operand>, second: impl Into<Operand>) -> Self {
        Self::new(NumericOperationType::Add, attribute, first, second)
    }

    #[must_use]
    pub fn subtract(
        attribute: &str,
        first: impl Into<Operand>,
        second: impl Into<Operand>,
    ) -> Self {
        Self::new(NumericOperationType::Subtract, attribute, first, second)
    }

    #[must_use]
    pub fn multiply(
        attribute: &str,
        first: impl Into<Operand>,
        second: impl Into<Operand>,
    ) -> Self {
        Self::new(NumericOperationType::Multiply, attribute, first, second)
    }

    #[must_use]
    pub fn divide(attribute: &str, first: impl Into<Operand>, second: impl Into<Operand>) -> Self {
        Self::new(NumericOperationType::Divide, attribute, first, second)
    }

    #[must_use]
    pub fn kind(&self) -> NumericOperationType {
        self.kind
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The mode the resolver was built with.
    #[must_use]
    pub fn original_mode(&self) -> NumericMode {
        match (self.first.is_operator(), self.second.is_operator()) {
            (true, true) => NumericMode::OperatorOperator,
            (false, true) => NumericMode::LiteralOperator,
            (true, false) => NumericMode::OperatorLiteral,
            (false, false) => NumericMode::LiteralLiteral,
        }
    }

    /// The mode the resolver currently evaluates in.
    #[must_use]
    pub fn mode(&self) -> NumericMode {
        if self.cache.is_some() {
            NumericMode::LiteralLiteral
        } else {
            self.original_mode()
        }
    }

    /// The operand values cached by mode collapse, if any.
    #[must_use]
    pub fn cached_operands(&self) -> Option<(&Value, &Value)> {
        self.cache.as_ref().map(|(a, b)| (a, b))
    }
}

impl Operator for NumericOperation {
    fn apply(&mut self, scope: &mut Scope<'_>, _event: &Arc<Event>) -> Result<bool, OperatorError> {
        let sticky = scope.options().resolver_caching() == ResolverCaching::Sticky;
        let cached = if sticky { self.cache.as_ref() } else { None };
        let result = match cached {
            Some((first, second)) => self.kind.apply(first, second)?,
            None => {
                let first = self.first.resolve(&self.attribute, scope)?;
                let second = self.second.resolve(&self.attribute, scope)?;
                let result = self.kind.apply(&first, &second)?;
                if sticky {
                    if self.original_mode() != NumericMode::LiteralLiteral {
                        debug!(
                            kind = %self.kind,
                            attribute = %self.attribute,
                            %first,
                            %second,
                            "resolver operands collapsed to literals"
                        );
                    }
                    self.cache = Some((first, second));
                }
                result
            }
        };

        self.matching
            .record(Arc::new(Event::single(&self.attribute, result)));
        Ok(true)
    }

    fn reset(&mut self, scope: &mut Scope<'_>) {
        if scope.options().clears_on_reset() {
            self.matching.clear();
        }
        if scope.options().releases_caches_on_reset() {
            self.cache = None;
        }
    }

    fn references(&self) -> Vec<OperatorId> {
        self.first.id().into_iter().chain(self.second.id()).collect()
    }

    fn as_match(&self) -> Option<&dyn Match> {
        Some(self)
    }
}

impl Match for NumericOperation {
    fn matching_event(&self) -> Option<&Arc<Event>> {
        self.matching.get()
    }
}

impl PartialEq for NumericOperation {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.attribute == other.attribute
            && self.first == other.first
            && self.second == other.second
    }
}

impl Eq for NumericOperation {}

impl Hash for NumericOperation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.attribute.hash(state);
        self.first.hash(state);
        self.second.hash(state);
    }
}

impl NumericOperation {
    /// Operator-sourced operands are shown while both sides are operators;
    /// once a mixed resolver has collapsed, its cached values are shown.
    pub(crate) fn write_with<F>(&self, f: &mut fmt::Formatter<'_>, mut write_id: F) -> fmt::Result
    where
        F: FnMut(&mut fmt::Formatter<'_>, OperatorId) -> fmt::Result,
    {
        write!(f, "{}(", self.kind)?;
        match (&self.cache, self.original_mode()) {
            (_, NumericMode::OperatorOperator) | (None, _) => {
                for (i, operand) in [&self.first, &self.second].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match operand {
                        Operand::Operator(id) => write_id(f, *id)?,
                        Operand::Literal(value) => write!(f, "{value}")?,
                    }
                }
            }
            (Some((first, second)), _) => write!(f, "{first}, {second}")?,
        }
        write!(f, ")")
    }
}

impl fmt::Display for NumericOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |f, id| write!(f, "{id}"))
    }
}
