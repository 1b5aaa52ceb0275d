//! SQL dialects: placeholder syntax and argument ordering.
//!
//! Dialects are looked up by name in a process-wide [`DialectRegistry`]. The
//! registry always contains the built-in dialects; applications that need more
//! install a registry once at startup, before the first lookup:
//!
//! ```ignore
//! DialectRegistry::with_builtins()
//!     .register("mssql", Numbered::new("@p"))
//!     .install()?;
//!
//! let d = sqlpatch::dialect("mssql")?;
//! ```

use crate::error::{PatchError, PatchResult};
use crate::param::Param;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Placeholder generation and argument merging for one SQL engine.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// `count` placeholders for fields, preceded by `offset` caller arguments.
    ///
    /// Must return exactly `count` entries, one per field in order.
    fn placeholders(&self, offset: usize, count: usize) -> Vec<String>;

    /// Merge caller arguments and field values into bind order.
    fn merge_args(&self, pre: &[Param], fields: &[Param], post: &[Param]) -> Vec<Param>;
}

/// Numbered placeholders (`$1, $2, ...`).
///
/// Field placeholders are numbered after every caller argument, so the bind
/// order is `pre ++ post ++ fields`.
#[derive(Debug, Clone)]
pub struct Numbered {
    sign: &'static str,
}

impl Numbered {
    pub const fn new(sign: &'static str) -> Self {
        Self { sign }
    }
}

impl Dialect for Numbered {
    fn placeholders(&self, offset: usize, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("{}{}", self.sign, offset + i + 1))
            .collect()
    }

    fn merge_args(&self, pre: &[Param], fields: &[Param], post: &[Param]) -> Vec<Param> {
        let mut args = Vec::with_capacity(pre.len() + fields.len() + post.len());
        args.extend_from_slice(pre);
        args.extend_from_slice(post);
        args.extend_from_slice(fields);
        args
    }
}

/// Unnumbered placeholders (`?`); bind order is `pre ++ fields ++ post`.
#[derive(Debug, Clone)]
pub struct Positional {
    marker: &'static str,
}

impl Positional {
    pub const fn new(marker: &'static str) -> Self {
        Self { marker }
    }
}

impl Dialect for Positional {
    fn placeholders(&self, _offset: usize, count: usize) -> Vec<String> {
        vec![self.marker.to_string(); count]
    }

    fn merge_args(&self, pre: &[Param], fields: &[Param], post: &[Param]) -> Vec<Param> {
        let mut args = Vec::with_capacity(pre.len() + fields.len() + post.len());
        args.extend_from_slice(pre);
        args.extend_from_slice(fields);
        args.extend_from_slice(post);
        args
    }
}

/// PostgreSQL (`$1`).
pub const POSTGRES: Numbered = Numbered::new("$");

/// MySQL / SQLite style (`?`).
pub const QUESTION_MARK: Positional = Positional::new("?");

/// Name of the default dialect.
pub const DEFAULT_DIALECT: &str = "postgres";

static GLOBAL: OnceLock<DialectRegistry> = OnceLock::new();

/// Dialects addressable by name.
#[derive(Clone, Debug, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// `postgres`, `mysql` and `sqlite`.
    pub fn with_builtins() -> Self {
        Self::new()
            .register("postgres", POSTGRES)
            .register("mysql", QUESTION_MARK)
            .register("sqlite", QUESTION_MARK)
    }

    /// Add (or replace) a dialect.
    pub fn register(mut self, name: impl Into<String>, dialect: impl Dialect + 'static) -> Self {
        self.dialects.insert(name.into(), Arc::new(dialect));
        self
    }

    pub fn get(&self, name: &str) -> PatchResult<Arc<dyn Dialect>> {
        self.dialects
            .get(name)
            .cloned()
            .ok_or_else(|| PatchError::configuration(format!("unsupported dialect: {name}")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }

    /// Make this registry the process-wide one.
    ///
    /// Built-ins missing from `self` are added. Fails once the global registry
    /// has been installed or read.
    pub fn install(mut self) -> PatchResult<()> {
        for (name, dialect) in Self::with_builtins().dialects {
            self.dialects.entry(name).or_insert(dialect);
        }
        GLOBAL.set(self).map_err(|_| {
            PatchError::configuration("dialect registry is already initialized")
        })?;
        debug_event!(
            dialects = Self::global().dialects.len(),
            "dialect registry installed"
        );
        Ok(())
    }

    /// The process-wide registry; initialized with the built-ins on first use.
    pub fn global() -> &'static DialectRegistry {
        GLOBAL.get_or_init(Self::with_builtins)
    }
}

/// Look up a dialect in the process-wide registry.
pub fn dialect(name: &str) -> PatchResult<Arc<dyn Dialect>> {
    DialectRegistry::global().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn numbered_placeholders_start_after_offset() {
        assert_eq!(POSTGRES.placeholders(0, 3), ["$1", "$2", "$3"]);
        assert_eq!(POSTGRES.placeholders(2, 2), ["$3", "$4"]);
        assert!(POSTGRES.placeholders(5, 0).is_empty());
        assert_eq!(Numbered::new("@p").placeholders(1, 1), ["@p2"]);
    }

    #[test]
    fn positional_placeholders_ignore_offset() {
        assert_eq!(QUESTION_MARK.placeholders(7, 2), ["?", "?"]);
    }

    #[test]
    fn merge_orders_differ() {
        let pre = params!["pre"];
        let fields = params![1_i32, 2_i32];
        let post = params!["post"];
        assert_eq!(
            format!("{:?}", POSTGRES.merge_args(&pre, &fields, &post)),
            r#"["pre", "post", 1, 2]"#
        );
        assert_eq!(
            format!("{:?}", QUESTION_MARK.merge_args(&pre, &fields, &post)),
            r#"["pre", 1, 2, "post"]"#
        );
    }

    #[test]
    fn registry_lookup() {
        let registry = DialectRegistry::with_builtins().register("mssql", Numbered::new("@p"));
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["mssql", "mysql", "postgres", "sqlite"]
        );
        let mssql = registry.get("mssql").unwrap();
        assert_eq!(mssql.placeholders(0, 1), ["@p1"]);

        let err = registry.get("oracle").unwrap_err();
        assert!(matches!(err, PatchError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: unsupported dialect: oracle"
        );
    }

    #[test]
    fn global_registry_has_builtins() {
        assert!(dialect("postgres").is_ok());
        assert!(dialect("mysql").is_ok());
        assert!(dialect("nope").is_err());
    }
}
