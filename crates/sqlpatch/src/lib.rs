//! # sqlpatch
//!
//! Selective JSON decoding for SQL partial updates.
//!
//! ## Features
//!
//! - **Closed world**: properties the schema does not declare are rejected
//! - **Deterministic order**: fields come out in declaration order, whatever the input order
//! - **Aliasing**: JSON property names and SQL column names are independent
//! - **Typed values**: every field is decoded into its declared Rust type and bindable with `tokio-postgres`
//! - **Dialects**: `$n` and `?` placeholders with correct offsets around caller arguments
//!
//! ## Example
//!
//! ```ignore
//! use sqlpatch::{Patch, Patcher, params};
//!
//! #[derive(Patch)]
//! pub struct Post {
//!     pub id: i64,
//!     #[patch(column = "user_id")]
//!     pub author: i64,
//!     pub title: String,
//!     pub body: String,
//! }
//!
//! let patcher = Patcher::of::<Post>()?;
//! let mut clause = patcher.update(br#"{"title": "Space Gopher", "body": "The body"}"#)?;
//! let (set, args) = clause.render(params![947_i64]);
//! assert_eq!(set, "title=$2,body=$3");
//! let sql = format!("UPDATE posts SET {set} WHERE id = $1");
//! client.execute(&sql, &sqlpatch::as_sql_params(&args)).await?;
//! ```

macro_rules! debug_event {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sqlpatch", $($arg)*);
    }};
}

macro_rules! trace_event {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "sqlpatch", $($arg)*);
    }};
}

pub mod config;
pub mod decode;
pub mod dialect;
pub mod error;
pub mod fields;
pub mod param;
pub mod patcher;
pub mod prelude;
pub mod render;
pub mod schema;
pub mod widen;

pub use config::PatcherConfig;
pub use decode::{DecodeSelf, Decoder};
pub use dialect::{Dialect, DialectRegistry, Numbered, Positional, dialect};
pub use error::{BoxError, ErrorKind, PatchError, PatchResult};
pub use fields::{Field, Fields};
pub use param::{Param, PatchValue, as_sql_params};
pub use patcher::Patcher;
pub use render::{ColumnBinds, SetClause};
pub use schema::{
    Callback, Describe, Member, Schema, SchemaEntry, TypeDescription, TypeShape, Visibility,
};
pub use widen::Widen;

#[cfg(feature = "derive")]
pub use sqlpatch_derive::Patch;
