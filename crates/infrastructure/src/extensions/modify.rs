//! The `modify` extension: overwrite parts of a JSON response body before it
//! is asserted.
//!
//! ```ignore
//! register_modify(&registry)?;
//! let case = TestCase::new(app)
//!     .req(RequestSpec::get("/user"))
//!     .res(ResponseExpectation::new().data(json!({"id": 1, "createdAt": "fixed"})))
//!     .option(MODIFY_OPTION, json!({"createdAt": "fixed"}));
//! ```
//!
//! With [`register_modify_with`] the modifications are computed from the
//! body itself and the option only switches the extension on:
//!
//! ```ignore
//! register_modify_with(&registry, |body| json!({"total": body["items"].as_array().map_or(0, Vec::len)}))?;
//! let case = TestCase::new(app).req(RequestSpec::get("/cart")).option(MODIFY_OPTION, true);
//! ```

use async_trait::async_trait;
use loopcheck_application::{
    EachHook, ExtensionHooks, ExtensionRegistry, HookError, HookResult, RegistrationError,
};
use loopcheck_domain::{CapturedResponse, CaseOptions, RequestSpec, ResponseType};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Option name the extension is registered under.
pub const MODIFY_OPTION: &str = "modify";

/// Registers [`BodyModifier`] under [`MODIFY_OPTION`].
///
/// # Errors
///
/// Returns [`RegistrationError::DuplicateRegistration`] if `modify` is
/// already registered.
pub fn register_modify(registry: &ExtensionRegistry) -> Result<(), RegistrationError> {
    registry.register(MODIFY_OPTION, ExtensionHooks::new().each(BodyModifier::new()))
}

/// Registers a [`BodyModifier::computed`] under [`MODIFY_OPTION`].
///
/// # Errors
///
/// Returns [`RegistrationError::DuplicateRegistration`] if `modify` is
/// already registered.
pub fn register_modify_with<F>(
    registry: &ExtensionRegistry,
    compute: F,
) -> Result<(), RegistrationError>
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    registry.register(
        MODIFY_OPTION,
        ExtensionHooks::new().each(BodyModifier::computed(compute)),
    )
}

type ComputeFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Each hook rewriting the captured JSON body.
///
/// The case's `modify` option maps property paths (`a.b[0].c`) to
/// replacement values. A value is only replaced if it exists, is not null
/// and has the same JSON kind as its replacement.
///
/// A computed modifier builds that map from the response body instead, and
/// runs whenever the option is truthy.
#[derive(Clone, Default)]
pub struct BodyModifier {
    compute: Option<Arc<ComputeFn>>,
}

impl fmt::Debug for BodyModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyModifier")
            .field("computed", &self.compute.is_some())
            .finish()
    }
}

impl BodyModifier {
    /// A modifier reading its paths from the `modify` option.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A modifier deriving its paths from the body.
    ///
    /// `compute` receives the decoded body and returns the same kind of
    /// object the `modify` option holds. Its result goes through
    /// [`BodyModifier::apply`], so the same replacement rules hold.
    #[must_use]
    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            compute: Some(Arc::new(compute)),
        }
    }

    /// Applies `modifications` to `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `modifications` is not a JSON object.
    pub fn apply(modifications: &Value, data: &mut Value) -> HookResult {
        let Value::Object(modifications) = modifications else {
            return Err(HookError::new("Invalid type for modify object"));
        };

        for (path, replacement) in modifications {
            let Some(current) = lookup_mut(data, path) else {
                continue;
            };
            if current.is_null() || !same_kind(current, replacement) {
                continue;
            }
            *current = replacement.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl EachHook for BodyModifier {
    async fn each(
        &self,
        req: &RequestSpec,
        res: &mut CapturedResponse,
        opts: &mut CaseOptions,
    ) -> HookResult {
        if req.effective_response_type() != ResponseType::Json || !is_truthy(&res.data) {
            return Ok(());
        }
        let Some(option) = opts.option(MODIFY_OPTION) else {
            return Ok(());
        };
        match &self.compute {
            Some(compute) if is_truthy(option) => {
                let modifications = compute(&res.data);
                Self::apply(&modifications, &mut res.data)
            }
            Some(_) => Ok(()),
            None => Self::apply(option, &mut res.data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Split a path like `a.b[0].c` into its segments.
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    let mut flush = |current: &mut String, bracketed: bool| {
        if current.is_empty() {
            return;
        }
        let raw = std::mem::take(current);
        let segment = match raw.parse::<usize>() {
            Ok(index) if bracketed => Segment::Index(index),
            _ => Segment::Key(raw.trim_matches(['"', '\'']).to_string()),
        };
        segments.push(segment);
    };

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => flush(&mut current, false),
            '[' if !in_bracket => {
                flush(&mut current, false);
                in_bracket = true;
            }
            ']' if in_bracket => {
                flush(&mut current, true);
                in_bracket = false;
            }
            _ => current.push(ch),
        }
    }
    flush(&mut current, in_bracket);

    segments
}

fn lookup_mut<'a>(data: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    parse_path(path)
        .into_iter()
        .try_fold(data, |value, segment| match (value, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get_mut(&key),
            (Value::Object(map), Segment::Index(index)) => map.get_mut(&index.to_string()),
            (Value::Array(items), Segment::Index(index)) => items.get_mut(index),
            (Value::Array(items), Segment::Key(key)) => {
                key.parse::<usize>().ok().and_then(|index| items.get_mut(index))
            }
            _ => None,
        })
}

/// Arrays, objects and a null replacement all count as the object kind.
/// `a` is never null.
const fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (
                Value::Array(_) | Value::Object(_),
                Value::Array(_) | Value::Object(_) | Value::Null
            )
    )
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
