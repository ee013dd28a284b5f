//! The declarative part of a test case.
//!
//! [`CaseOptions`] is everything about a case except the application under
//! test and the case's own `before`/`after` callbacks. Hooks receive it
//! mutably and may rewrite any of it before the request goes out.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::request::RequestSpec;
use crate::response::ResponseExpectation;

/// A field every case must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// The application under test.
    App,
    /// The request description.
    Req,
    /// The response expectation.
    Res,
}

impl RequiredField {
    /// Names that extension options may never use.
    pub const RESERVED: [&'static str; 3] = ["app", "req", "res"];

    /// The option name of this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Req => "req",
            Self::Res => "res",
        }
    }

    /// Returns true if `name` is one of the reserved field names.
    #[must_use]
    pub fn is_reserved(name: &str) -> bool {
        Self::RESERVED.contains(&name)
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of a test case, as seen by hooks.
#[derive(Debug, Clone, Default)]
pub struct CaseOptions {
    /// Request to send
    pub req: Option<RequestSpec>,
    /// Expected response
    pub res: Option<ResponseExpectation>,
    /// Per-test timeout, e.g. `"5s"`
    pub timeout: Option<String>,
    /// Base request fields merged under `req`
    pub defaults: Option<RequestSpec>,
    /// Values of extension options, keyed by registered name
    pub extensions: IndexMap<String, Value>,
}

impl CaseOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of an extension option if the case supplied it.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Returns a mutable reference to an extension option.
    pub fn option_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.extensions.get_mut(name)
    }

    /// Returns true if the case supplied this extension option.
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Sets an extension option, returning the previous value.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.extensions.insert(name.into(), value.into())
    }
}
