//! Validation actions and pipes.

use std::fmt;
use std::sync::Arc;

use valorm_core::Value;

use crate::annotation::PropertyAnnotation;

/// A single step in a schema's validation pipe.
#[derive(Clone)]
pub enum Action {
    /// Minimum length of a string, byte string or array.
    MinLength(usize),
    /// Maximum length of a string, byte string or array.
    MaxLength(usize),
    /// Minimum numeric value.
    MinValue(f64),
    /// Maximum numeric value.
    MaxValue(f64),
    /// Custom predicate with its failure message.
    Check {
        /// Message reported when the predicate fails.
        message: String,
        /// The predicate.
        predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    },
    /// Value transformation.
    Transform(Arc<dyn Fn(Value) -> Value + Send + Sync>),
    /// Inert ORM property metadata; never fails and never changes the value.
    Property(PropertyAnnotation),
}

impl Action {
    /// Discriminant of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::MinLength(_) => "min_length",
            Action::MaxLength(_) => "max_length",
            Action::MinValue(_) => "min_value",
            Action::MaxValue(_) => "max_value",
            Action::Check { .. } => "check",
            Action::Transform(_) => "transform",
            Action::Property(_) => PropertyAnnotation::KIND,
        }
    }

    /// Run the action against a value, returning the (possibly transformed) value
    /// or a failure message.
    pub fn run(&self, input: Value) -> Result<Value, String> {
        match self {
            Action::MinLength(min) => match input.length() {
                Some(len) if len >= *min => Ok(input),
                Some(len) => Err(format!("invalid length: expected >={min} but received {len}")),
                None => Err(format!("invalid type: expected length-bearing value but received {}", input.type_name())),
            },
            Action::MaxLength(max) => match input.length() {
                Some(len) if len <= *max => Ok(input),
                Some(len) => Err(format!("invalid length: expected <={max} but received {len}")),
                None => Err(format!("invalid type: expected length-bearing value but received {}", input.type_name())),
            },
            Action::MinValue(min) => match input.as_f64() {
                Some(v) if v >= *min => Ok(input),
                Some(v) => Err(format!("invalid value: expected >={min} but received {v}")),
                None => Err(format!("invalid type: expected number but received {}", input.type_name())),
            },
            Action::MaxValue(max) => match input.as_f64() {
                Some(v) if v <= *max => Ok(input),
                Some(v) => Err(format!("invalid value: expected <={max} but received {v}")),
                None => Err(format!("invalid type: expected number but received {}", input.type_name())),
            },
            Action::Check { message, predicate } => {
                if predicate(&input) {
                    Ok(input)
                } else {
                    Err(message.clone())
                }
            }
            Action::Transform(f) => Ok(f(input)),
            Action::Property(_) => Ok(input),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Action::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Action::MinValue(n) => f.debug_tuple("MinValue").field(n).finish(),
            Action::MaxValue(n) => f.debug_tuple("MaxValue").field(n).finish(),
            Action::Check { message, .. } => f.debug_struct("Check").field("message", message).finish(),
            Action::Transform(_) => f.write_str("Transform(..)"),
            Action::Property(p) => f.debug_tuple("Property").field(p).finish(),
        }
    }
}

/// Minimum length action.
pub fn min_length(min: usize) -> Action {
    Action::MinLength(min)
}

/// Maximum length action.
pub fn max_length(max: usize) -> Action {
    Action::MaxLength(max)
}

/// Minimum value action.
pub fn min_value(min: f64) -> Action {
    Action::MinValue(min)
}

/// Maximum value action.
pub fn max_value(max: f64) -> Action {
    Action::MaxValue(max)
}

/// Custom predicate action.
pub fn check(
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    message: impl Into<String>,
) -> Action {
    Action::Check {
        message: message.into(),
        predicate: Arc::new(predicate),
    }
}

/// Transformation action.
pub fn transform(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Action {
    Action::Transform(Arc::new(f))
}

/// Ordered list of validation actions attached to a schema node.
#[derive(Debug, Clone, Default)]
pub struct Pipe(Vec<Action>);

impl Pipe {
    /// Create an empty pipe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    pub fn with(mut self, action: Action) -> Self {
        self.0.push(action);
        self
    }

    /// Iterate over the actions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    /// Check if the pipe has no actions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Run every action in order, stopping at the first failure.
    pub fn run(&self, input: Value) -> Result<Value, (&'static str, String)> {
        let mut value = input;
        for action in &self.0 {
            value = action.run(value).map_err(|message| (action.kind(), message))?;
        }
        Ok(value)
    }
}

impl From<Vec<Action>> for Pipe {
    fn from(actions: Vec<Action>) -> Self {
        Pipe(actions)
    }
}

impl<const N: usize> From<[Action; N]> for Pipe {
    fn from(actions: [Action; N]) -> Self {
        Pipe(actions.into())
    }
}

impl<'a> IntoIterator for &'a Pipe {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_actions() {
        assert!(min_length(2).run(Value::from("ab")).is_ok());
        assert!(min_length(3).run(Value::from("ab")).is_err());
        assert!(max_length(1).run(Value::Array(vec![Value::Null, Value::Null])).is_err());
        assert!(min_length(1).run(Value::from(5)).is_err());
    }

    #[test]
    fn test_value_actions() {
        assert!(min_value(1.0).run(Value::from(1)).is_ok());
        assert!(max_value(10.0).run(Value::from(10.5)).is_err());
    }

    #[test]
    fn test_pipe_stops_at_first_failure() {
        let pipe = Pipe::from([
            transform(|v| match v {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            }),
            min_length(3),
            check(|_| false, "never reached"),
        ]);

        let (kind, message) = pipe.run(Value::from("  a  ")).unwrap_err();
        assert_eq!(kind, "min_length");
        assert!(message.contains("received 1"));
    }

    #[test]
    fn test_pipe_transforms() {
        let pipe = Pipe::new().with(transform(|v| match v {
            Value::Int(i) => Value::Int(i * 2),
            other => other,
        }));
        assert_eq!(pipe.run(Value::from(21)).unwrap(), Value::Int(42));
    }
}
