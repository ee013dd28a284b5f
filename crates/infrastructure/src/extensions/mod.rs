//! Ready-made extensions.

mod modify;

pub use modify::{BodyModifier, MODIFY_OPTION, register_modify, register_modify_with};
