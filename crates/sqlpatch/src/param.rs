//! Type-erased decoded values.
//!
//! Every decoded field ends up as a [`Param`]: an `Arc` around a value that can be
//! bound as a `tokio-postgres` parameter, printed with `Debug` and downcast back
//! to its concrete type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A value that can travel through a patch: bindable, debuggable and shareable.
///
/// Implemented for every `ToSql + Debug + Send + Sync + 'static` type.
pub trait PatchValue: ToSql + fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn as_sql(&self) -> &(dyn ToSql + Sync);
}

impl<T> PatchValue for T
where
    T: ToSql + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        self
    }
}

/// A clone-friendly decoded value.
///
/// Cloning only bumps a reference count, so fields and argument lists can be
/// copied between renders without copying the values.
#[derive(Clone)]
pub struct Param(Arc<dyn PatchValue>);

impl Param {
    /// Wrap any bindable value.
    pub fn new<T: PatchValue>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        (*self.0).as_sql()
    }

    /// Borrow the inner value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the inner value has type `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.0).as_any().is::<T>()
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Borrow a list of params in the shape `tokio-postgres` expects for binding.
///
/// # Example
/// ```ignore
/// let (set, args) = clause.render(sqlpatch::params![id]);
/// client
///     .execute(&format!("UPDATE users SET {set} WHERE id = $1"), &sqlpatch::as_sql_params(&args))
///     .await?;
/// ```
pub fn as_sql_params(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(Param::as_sql).collect()
}

/// Build a `Vec<Param>` from heterogeneous values.
///
/// ```ignore
/// let args = sqlpatch::params![42_i64, "draft"];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Param::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_and_debug() {
        let p = Param::new(42_i32);
        assert_eq!(p.downcast_ref::<i32>(), Some(&42));
        assert!(p.downcast_ref::<i64>().is_none());
        assert!(p.is::<i32>());
        assert_eq!(format!("{p:?}"), "42");

        let none = Param::new(Option::<String>::None);
        assert_eq!(format!("{none:?}"), "None");
    }

    #[test]
    fn params_macro_wraps_each_value() {
        let args = crate::params![1_i64, "x", true];
        assert_eq!(args.len(), 3);
        assert_eq!(format!("{args:?}"), r#"[1, "x", true]"#);
        assert_eq!(as_sql_params(&args).len(), 3);
        assert!(crate::params![].is_empty());
    }
}
