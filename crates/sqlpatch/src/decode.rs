//! Field decoding.
//!
//! A [`Decoder`] turns the raw JSON of one property into a [`Param`]. Types that
//! know how to read themselves implement [`DecodeSelf`] and are decoded with
//! [`Decoder::custom`]; everything else goes through serde via
//! [`Decoder::structural`].
//!
//! Decoded values must be bindable (`tokio-postgres` `ToSql`). Primitives
//! without a `ToSql` implementation (`u8`, `u16`, `u64`, `usize`, `i128`,
//! `u128`, `char`) are declared through [`Widen`](crate::Widen), either with
//! `Decoder::structural::<Widen<u64>>()` or implicitly by `#[derive(Patch)]`.

use crate::error::BoxError;
use crate::param::{Param, PatchValue};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::fmt;

/// Custom decoding from the raw JSON bytes of a single value.
///
/// # Example
/// ```ignore
/// impl DecodeSelf for Weekday {
///     fn decode_self(raw: &[u8]) -> Result<Self, BoxError> {
///         let s: &str = serde_json::from_slice(raw)?;
///         s.parse()
///     }
/// }
/// ```
pub trait DecodeSelf: Sized {
    fn decode_self(raw: &[u8]) -> Result<Self, BoxError>;
}

fn is_null(raw: &[u8]) -> bool {
    raw.trim_ascii() == b"null"
}

/// `null` decodes to `None`; anything else is handed to `T`.
impl<T: DecodeSelf> DecodeSelf for Option<T> {
    fn decode_self(raw: &[u8]) -> Result<Self, BoxError> {
        if is_null(raw) {
            return Ok(None);
        }
        T::decode_self(raw).map(Some)
    }
}

impl<T: DecodeSelf> DecodeSelf for Vec<T> {
    fn decode_self(raw: &[u8]) -> Result<Self, BoxError> {
        let items: Vec<&RawValue> = serde_json::from_slice(raw)?;
        items
            .into_iter()
            .map(|item| T::decode_self(item.get().as_bytes()))
            .collect()
    }
}

/// Fixed-size arrays require exactly `N` elements.
impl<T: DecodeSelf, const N: usize> DecodeSelf for [T; N] {
    fn decode_self(raw: &[u8]) -> Result<Self, BoxError> {
        let items = Vec::<T>::decode_self(raw)?;
        let len = items.len();
        items
            .try_into()
            .map_err(|_| format!("expected an array of length {N}, got {len}").into())
    }
}

type DecodeFn = fn(&[u8]) -> Result<Param, BoxError>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Custom,
    Structural,
}

/// Decoding strategy for one declared member type.
#[derive(Clone, Copy)]
pub struct Decoder {
    strategy: Strategy,
    type_name: &'static str,
    decode: DecodeFn,
}

fn decode_custom<T: DecodeSelf + PatchValue>(raw: &[u8]) -> Result<Param, BoxError> {
    T::decode_self(raw).map(Param::new)
}

fn decode_structural<T: DeserializeOwned + PatchValue>(raw: &[u8]) -> Result<Param, BoxError> {
    Ok(Param::new(serde_json::from_slice::<T>(raw)?))
}

impl Decoder {
    /// Decode through `T`'s [`DecodeSelf`] implementation.
    pub fn custom<T: DecodeSelf + PatchValue>() -> Self {
        Self {
            strategy: Strategy::Custom,
            type_name: std::any::type_name::<T>(),
            decode: decode_custom::<T>,
        }
    }

    /// Decode through `T`'s serde `Deserialize` implementation.
    pub fn structural<T: DeserializeOwned + PatchValue>() -> Self {
        Self {
            strategy: Strategy::Structural,
            type_name: std::any::type_name::<T>(),
            decode: decode_structural::<T>,
        }
    }

    /// Whether this decoder dispatches to a [`DecodeSelf`] implementation.
    pub fn is_custom(&self) -> bool {
        self.strategy == Strategy::Custom
    }

    /// Name of the declared Rust type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Decode one raw JSON value.
    pub fn decode(&self, raw: &RawValue) -> Result<Param, BoxError> {
        (self.decode)(raw.get().as_bytes())
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("custom", &self.is_custom())
            .field("type_name", &self.type_name)
            .finish()
    }
}
