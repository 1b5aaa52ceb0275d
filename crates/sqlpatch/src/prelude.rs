//! Convenient re-exports for common sqlpatch usage.
//!
//! ```ignore
//! use sqlpatch::prelude::*;
//! ```

pub use crate::decode::DecodeSelf;
pub use crate::error::{PatchError, PatchResult};
pub use crate::fields::Fields;
pub use crate::param::{Param, as_sql_params};
pub use crate::params;
pub use crate::patcher::Patcher;
pub use crate::render::SetClause;
pub use crate::schema::{Describe, Schema};
pub use crate::widen::Widen;

#[cfg(feature = "derive")]
pub use sqlpatch_derive::Patch;
