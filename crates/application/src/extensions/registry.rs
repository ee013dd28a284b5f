//! Process-wide table of extension options.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::{IndexMap, IndexSet};
use loopcheck_domain::RequiredField;
use parking_lot::RwLock;
use thiserror::Error;

use super::hooks::{AfterHook, BeforeHook, EachHook, ExtensionHooks};

/// Registration was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name is empty or one of `app`, `req`, `res`.
    #[error("Invalid property name")]
    InvalidPropertyName(String),

    /// The name was registered before.
    #[error("Property \"{0}\" has already been registered")]
    DuplicateRegistration(String),
}

#[derive(Default)]
struct Registrations {
    names: IndexSet<String>,
    before: IndexMap<String, Arc<dyn BeforeHook>>,
    after: IndexMap<String, Arc<dyn AfterHook>>,
    each: IndexMap<String, Arc<dyn EachHook>>,
}

/// Hooks copied out of the registry for one run, in registration order.
#[derive(Clone, Default)]
pub struct HookSnapshot {
    /// `before` hooks by option name.
    pub before: Vec<(String, Arc<dyn BeforeHook>)>,
    /// `after` hooks by option name.
    pub after: Vec<(String, Arc<dyn AfterHook>)>,
    /// `each` hooks by option name.
    pub each: Vec<(String, Arc<dyn EachHook>)>,
}

impl fmt::Debug for HookSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSnapshot")
            .field("before", &names_of(&self.before))
            .field("after", &names_of(&self.after))
            .field("each", &names_of(&self.each))
            .finish()
    }
}

fn names_of<T: ?Sized>(entries: &[(String, Arc<T>)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

/// Append-only table mapping option names to hooks.
///
/// Registration must finish before any case runs; registering while cases
/// are executing is not supported. There is no way to unregister a name.
#[derive(Default)]
pub struct ExtensionRegistry {
    inner: RwLock<Registrations>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ExtensionRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Registers hooks under an option name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidPropertyName`] for an empty or
    /// reserved name and [`RegistrationError::DuplicateRegistration`] if the
    /// name is taken.
    pub fn register(&self, name: &str, hooks: ExtensionHooks) -> Result<(), RegistrationError> {
        if name.is_empty() || RequiredField::is_reserved(name) {
            return Err(RegistrationError::InvalidPropertyName(name.to_string()));
        }

        let mut inner = self.inner.write();
        if !inner.names.insert(name.to_string()) {
            return Err(RegistrationError::DuplicateRegistration(name.to_string()));
        }

        if let Some(hook) = hooks.before {
            inner.before.insert(name.to_string(), hook);
        }
        if let Some(hook) = hooks.after {
            inner.after.insert(name.to_string(), hook);
        }
        if let Some(hook) = hooks.each {
            inner.each.insert(name.to_string(), hook);
        }

        tracing::debug!(extension = name, "registered extension");
        Ok(())
    }

    /// Returns true if `name` was registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.read().names.contains(name)
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.read().names.iter().cloned().collect()
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().names.is_empty()
    }

    /// Copies the current hooks so a run never holds the lock across an
    /// await.
    #[must_use]
    pub fn snapshot(&self) -> HookSnapshot {
        let inner = self.inner.read();
        HookSnapshot {
            before: clone_entries(&inner.before),
            after: clone_entries(&inner.after),
            each: clone_entries(&inner.each),
        }
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

fn clone_entries<T: ?Sized>(map: &IndexMap<String, Arc<T>>) -> Vec<(String, Arc<T>)> {
    map.iter()
        .map(|(name, hook)| (name.clone(), Arc::clone(hook)))
        .collect()
}
