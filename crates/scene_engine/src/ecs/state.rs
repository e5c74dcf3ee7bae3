//! Reactive component state
//!
//! [`ReactiveState`] owns a [`CanonicalConfig`] and invokes its change
//! handler exactly once for every accepted write.

use crate::schema::{CanonicalConfig, Value};
use std::fmt;

/// A single accepted field write
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field that was written
    pub field: String,
    /// Value before the write
    pub previous: Value,
    /// Value after the write
    pub current: Value,
}

impl FieldChange {
    /// Create a change record
    pub fn new(field: impl Into<String>, previous: Value, current: Value) -> Self {
        Self {
            field: field.into(),
            previous,
            current,
        }
    }

    /// Whether the write left the value unchanged
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// Errors raised by state writes
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The configuration has no such field
    #[error("unknown field '{field}'")]
    UnknownField {
        /// Requested field
        field: String,
    },

    /// The entity has no component of the requested type
    #[error("no '{component}' component attached")]
    MissingComponent {
        /// Requested component type
        component: String,
    },
}

type ChangeHandler = Box<dyn FnMut(&FieldChange)>;

/// Live view over a canonical configuration
pub struct ReactiveState {
    values: CanonicalConfig,
    on_change: ChangeHandler,
}

impl ReactiveState {
    /// Wrap `values`, calling `on_change` after every accepted write
    pub fn wrap(values: CanonicalConfig, on_change: impl FnMut(&FieldChange) + 'static) -> Self {
        Self {
            values,
            on_change: Box::new(on_change),
        }
    }

    /// Read a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Write a field
    ///
    /// Equal writes are not suppressed; the handler still runs once.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let slot = self
            .values
            .get_mut(field)
            .ok_or_else(|| StateError::UnknownField {
                field: field.to_string(),
            })?;
        let current = value.into();
        let previous = std::mem::replace(slot, current.clone());
        (self.on_change)(&FieldChange::new(field, previous, current));
        Ok(())
    }

    /// All fields in declaration order
    pub fn values(&self) -> &CanonicalConfig {
        &self.values
    }

    /// Deep copy of the current values
    pub fn snapshot(&self) -> CanonicalConfig {
        self.values.clone()
    }
}

impl fmt::Debug for ReactiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveState")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn recording_state() -> (ReactiveState, Rc<RefCell<Vec<FieldChange>>>) {
        let mut values = CanonicalConfig::new();
        values.push("x", Value::Number(1.0));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let state = ReactiveState::wrap(values, move |change| sink.borrow_mut().push(change.clone()));
        (state, changes)
    }

    #[test]
    fn test_write_notifies_once() {
        let (mut state, changes) = recording_state();
        state.set("x", 2.0).expect("x exists");

        assert_eq!(
            *changes.borrow(),
            vec![FieldChange::new("x", Value::Number(1.0), Value::Number(2.0))]
        );
        assert_eq!(state.get("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_equal_write_still_notifies() {
        let (mut state, changes) = recording_state();
        state.set("x", 2.0).expect("x exists");
        state.set("x", 2.0).expect("x exists");

        let changes = changes.borrow();
        assert_eq!(changes.len(), 2);
        assert!(changes[1].is_noop());
        assert_eq!(changes[1], FieldChange::new("x", Value::Number(2.0), Value::Number(2.0)));
    }

    #[test]
    fn test_unknown_field_is_rejected_silently() {
        let (mut state, changes) = recording_state();
        let result = state.set("y", 1.0);

        assert_eq!(result, Err(StateError::UnknownField { field: "y".to_string() }));
        assert!(changes.borrow().is_empty());
        assert_eq!(state.values().len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let (mut state, _changes) = recording_state();
        let before = state.snapshot();
        state.set("x", 5.0).expect("x exists");
        assert_eq!(before.get("x"), Some(&Value::Number(1.0)));
    }
}
