//! Request models with validation at construction
//!
//! Path segments and bodies are validated before they reach the
//! repository. Invalid input returns ValidationError, not panic.

pub mod tab_order;
pub mod validation;

pub use tab_order::{PageName, TabOrder, UserId};
pub use validation::ValidationError;
