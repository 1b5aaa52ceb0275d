//! Bindable wrappers for primitives `tokio-postgres` cannot bind directly.
//!
//! Postgres has no unsigned or 128-bit integer types, so `u8`, `u16`, `u64`,
//! `usize`, `i128`, `u128` and `char` have no `ToSql` implementation. Wrapping
//! them in [`Widen`] lets them be declared, decoded and bound: integers are
//! sent as the smallest signed Postgres integer that holds every value of the
//! source type (or `INT8` with a range check at bind time), `char` is sent as
//! text.

use bytes::BytesMut;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A primitive decoded as itself and bound as a wider Postgres type.
///
/// `#[derive(Patch)]` applies this automatically to fields of the types above
/// (and `Option`s of them); downcast the decoded value to `Widen<T>`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Widen<T>(pub T);

impl<T> Widen<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Widen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

macro_rules! widen_int {
    ($($src:ty => $dst:ty),* $(,)?) => {$(
        impl ToSql for Widen<$src> {
            fn to_sql(
                &self,
                ty: &Type,
                out: &mut BytesMut,
            ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
                let value = <$dst>::try_from(self.0).map_err(|_| {
                    format!(
                        "{} value {} does not fit in {}",
                        stringify!($src),
                        self.0,
                        stringify!($dst)
                    )
                })?;
                value.to_sql(ty, out)
            }

            fn accepts(ty: &Type) -> bool {
                <$dst as ToSql>::accepts(ty)
            }

            tokio_postgres::types::to_sql_checked!();
        }
    )*};
}

widen_int! {
    u8 => i16,
    u16 => i32,
    u64 => i64,
    usize => i64,
    i128 => i64,
    u128 => i64,
}

impl ToSql for Widen<char> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.0.to_string().to_sql(ty, out)
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}
