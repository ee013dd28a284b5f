//! Named extension options and the hooks they trigger.
//!
//! An extension is registered once under an option name. Whenever a case
//! carries that option, the extension's `before` hook runs ahead of the
//! request and its `after` hook runs once the response is in. `each` hooks
//! run on every case regardless of options.

mod hooks;
mod registry;

pub use hooks::{
    AfterHook, BeforeHook, CaseHook, CaseHookContext, EachHook, ExtensionHooks, FnHook,
    HookError, HookResult,
};
pub use registry::{ExtensionRegistry, HookSnapshot, RegistrationError};
