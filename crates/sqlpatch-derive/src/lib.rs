//! Derive macros for sqlpatch
//!
//! Provides `#[derive(Patch)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod patch;

/// Derive `Describe` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlpatch::Patch;
///
/// #[derive(Patch)]
/// #[serde(rename_all = "camelCase")]
/// pub struct User {
///     pub id: i64,
///     pub display_name: String,
///     #[patch(column = "email_address")]
///     pub email: String,
///     #[patch(decode_self)]
///     pub day: Weekday,
///     #[serde(skip)]
///     pub cached: i32,
///     password_hash: String,
/// }
/// ```
///
/// # Attributes
///
/// - Only `pub` fields are patchable
/// - `#[serde(rename = "name")]` - JSON property name
/// - `#[serde(skip)]` / `#[serde(skip_deserializing)]` - Exclude the field
/// - `#[serde(rename_all = "...")]` - Container-level property naming
/// - `#[patch(column = "name")]` - SQL column name (defaults to the property name)
/// - `#[patch(skip)]` - Exclude the field
/// - `#[patch(decode_self)]` - Decode via the field type's `DecodeSelf` impl instead of serde
#[proc_macro_derive(Patch, attributes(patch, serde))]
pub fn derive_patch(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    patch::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
