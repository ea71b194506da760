//! Actions module
//!
//! Actions are opaque values routed through the middleware chain into the reducer.
//! The store never inspects them; middleware and reducers match on the concrete
//! type with [`downcast_ref`](dyn Action::downcast_ref) and fall through when the
//! type does not match.
//!
//! Two actions are reserved by the store itself:
//! - [`Init`] is reduced once at construction when no initial state is supplied
//! - [`NoOp`] lets middleware swallow an action while still calling `next`

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Value returned by a dispatch.
///
/// Normally this is the dispatched action itself, but middleware may substitute
/// any value. Use [`downcast_ref`](Any::downcast_ref) to inspect it.
pub type DispatchResult = Box<dyn Any + Send>;

/// Owned, type-erased action as it travels through the chain
pub type BoxedAction = Box<dyn Action>;

/// Conversion helpers every action gets for free.
///
/// Kept separate from [`Action`] so action types only have to write
/// `impl Action for MyAction {}`.
pub trait AsAny: Any + Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Any + Send> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Marker trait for values that can be dispatched to a store
///
/// # Example
///
/// ```
/// use statecraft::Action;
///
/// #[derive(Debug)]
/// struct SetValue(i32);
///
/// impl Action for SetValue {}
/// ```
pub trait Action: AsAny + fmt::Debug {}

impl dyn Action {
    /// Returns `true` if the concrete action type is `T`
    pub fn is<T: Action>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Action>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Action>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Take ownership of the concrete action, or get the box back on mismatch
    pub fn downcast<T: Action>(self: Box<Self>) -> Result<Box<T>, Box<Self>> {
        if self.is::<T>() {
            match AsAny::into_any(self).downcast::<T>() {
                Ok(action) => Ok(action),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }

    /// Turn the action into the value a dispatch hands back to its caller
    pub fn into_result(self: Box<Self>) -> DispatchResult {
        AsAny::into_any(self)
    }
}

/// Reserved action reduced once when a store is created without initial state.
///
/// Reducers can match on it to seed defaults on cold start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Init;

impl Action for Init {}

/// Reserved neutral action.
///
/// Middleware that wants to swallow an action but still call `next` forwards
/// this instead. Reducers should leave the state untouched when they see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoOp;

impl Action for NoOp {}

/// Generic string-tagged action with an optional JSON payload
///
/// Useful for applications that prefer a single serializable action type over
/// one Rust type per action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl StandardAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    /// Returns `true` if this action carries the given type tag
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl Action for StandardAction {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct SetValue(i32);
    impl Action for SetValue {}

    #[test]
    fn test_downcast_ref_matches_concrete_type() {
        let action: BoxedAction = Box::new(SetValue(3));
        assert!(action.is::<SetValue>());
        assert_eq!(action.downcast_ref::<SetValue>(), Some(&SetValue(3)));
        assert!(action.downcast_ref::<NoOp>().is_none());
    }

    #[test]
    fn test_downcast_mut_allows_rewriting() {
        let mut action: BoxedAction = Box::new(SetValue(3));
        if let Some(set) = action.downcast_mut::<SetValue>() {
            set.0 = 7;
        }
        assert_eq!(action.downcast_ref::<SetValue>(), Some(&SetValue(7)));
    }

    #[test]
    fn test_downcast_returns_box_on_mismatch() {
        let action: BoxedAction = Box::new(Init);
        let action = action.downcast::<SetValue>().unwrap_err();
        assert!(action.is::<Init>());
        assert_eq!(*action.downcast::<Init>().unwrap(), Init);
    }

    #[test]
    fn test_into_result_keeps_concrete_type() {
        let action: BoxedAction = Box::new(SetValue(10));
        let result = action.into_result();
        assert_eq!(result.downcast_ref::<SetValue>(), Some(&SetValue(10)));
    }

    #[test]
    fn test_standard_action_serialization() {
        let action = StandardAction::with_payload("set", serde_json::json!({ "value": 5 }));
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"type":"set","payload":{"value":5}}"#);

        let parsed: StandardAction = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert!(parsed.is_kind("reset"));
        assert_eq!(parsed.payload, None);
    }
}
