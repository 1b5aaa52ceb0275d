//! Schema registry: which JSON properties a patch may contain, and where they go.
//!
//! A [`Schema`] is built once from a [`TypeDescription`], usually produced by
//! `#[derive(Patch)]`, and shared read-only afterwards.

use crate::decode::Decoder;
use crate::error::{BoxError, PatchError, PatchResult};
use crate::param::Param;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Tag value that excludes a member, for both the rename and the column tag.
pub const SKIP: &str = "-";

/// Transform hook applied to a decoded value before it is stored.
pub type Callback = Arc<dyn Fn(Param) -> Result<Param, BoxError> + Send + Sync>;

/// Describes a record type for schema construction.
///
/// Implemented by `#[derive(Patch)]`.
pub trait Describe {
    fn describe() -> TypeDescription;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// One declared member of a record type.
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    visibility: Visibility,
    rename: Option<String>,
    exact_rename: bool,
    column: Option<String>,
    decoder: Option<Decoder>,
}

impl Member {
    /// A public member decoded with `decoder`.
    pub fn new(name: impl Into<String>, decoder: Decoder) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            rename: None,
            exact_rename: false,
            column: None,
            decoder: Some(decoder),
        }
    }

    /// A member that is never patchable. It still counts toward declaration
    /// indices, and its type needs no decoder.
    pub fn excluded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Private,
            rename: None,
            exact_rename: false,
            column: None,
            decoder: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the member private; private members never appear in a schema.
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Override the JSON property name (`"-"` excludes the member).
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self.exact_rename = false;
        self
    }

    /// Set the JSON property name verbatim; `"-"` is an ordinary name here.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self.exact_rename = true;
        self
    }

    /// Override the SQL column name (`"-"` excludes the member).
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    /// Resolve `(property, column, decoder)`, or `None` if the member is not patchable.
    fn resolve(&self) -> Option<(String, String, Decoder)> {
        if self.visibility == Visibility::Private {
            return None;
        }
        let decoder = self.decoder?;
        let prop = match self.rename.as_deref() {
            Some(SKIP) if !self.exact_rename => return None,
            Some(rename) if !rename.is_empty() => rename,
            _ => self.name.as_str(),
        };
        let column = match self.column.as_deref() {
            Some(SKIP) => return None,
            Some(column) if !column.is_empty() => column,
            _ => prop,
        };
        Some((prop.to_string(), column.to_string(), decoder))
    }
}

/// Shape of a described type.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// Named members in declaration order.
    Record(Vec<Member>),
    /// Anything that is not a record; rejected by [`Schema::from_description`].
    Opaque,
}

#[derive(Debug, Clone)]
pub struct TypeDescription {
    pub name: String,
    pub shape: TypeShape,
}

impl TypeDescription {
    pub fn record(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Record(members),
        }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Opaque,
        }
    }
}

/// A patchable property.
#[derive(Clone)]
pub struct SchemaEntry {
    column: String,
    decoder: Decoder,
    transform: Option<Callback>,
    index: isize,
}

impl SchemaEntry {
    /// SQL column the property is written to.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Declaration index of the member within its record.
    pub fn index(&self) -> isize {
        self.index
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub(crate) fn transform(&self) -> Option<&Callback> {
        self.transform.as_ref()
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("column", &self.column)
            .field("decoder", &self.decoder)
            .field("transform", &self.transform.is_some())
            .field("index", &self.index)
            .finish()
    }
}

/// Mapping from JSON property name to [`SchemaEntry`].
#[derive(Clone, Debug)]
pub struct Schema {
    type_name: String,
    entries: HashMap<String, SchemaEntry>,
    /// Property names in declaration order.
    order: Vec<String>,
}

impl Schema {
    /// Build the schema of a type implementing [`Describe`].
    pub fn of<T: Describe>() -> PatchResult<Self> {
        Self::from_description(T::describe())
    }

    /// Build a schema from an explicit description.
    ///
    /// Fails if the description is not a record, or if two members resolve to
    /// the same JSON property or the same SQL column.
    pub fn from_description(desc: TypeDescription) -> PatchResult<Self> {
        let members = match desc.shape {
            TypeShape::Record(members) => members,
            TypeShape::Opaque => {
                return Err(PatchError::construction(format!(
                    "`{}` is not a record type",
                    desc.name
                )));
            }
        };

        let mut entries = HashMap::with_capacity(members.len());
        let mut order = Vec::with_capacity(members.len());
        let mut columns = HashSet::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let Some((prop, column, decoder)) = member.resolve() else {
                continue;
            };
            if entries.contains_key(&prop) {
                return Err(PatchError::construction(format!(
                    "`{}` declares property '{}' more than once",
                    desc.name, prop
                )));
            }
            if !columns.insert(column.clone()) {
                return Err(PatchError::construction(format!(
                    "`{}` declares column '{}' more than once",
                    desc.name, column
                )));
            }
            order.push(prop.clone());
            entries.insert(
                prop,
                SchemaEntry {
                    column,
                    decoder,
                    transform: None,
                    index: index as isize,
                },
            );
        }

        debug_event!(
            type_name = %desc.name,
            properties = order.len(),
            "schema built"
        );

        Ok(Self {
            type_name: desc.name,
            entries,
            order,
        })
    }

    /// Register a transform hook for a JSON property.
    ///
    /// The hook receives the decoded value and returns the value to store; an
    /// error is reported as an unmarshal failure on that property.
    ///
    /// # Example
    /// ```ignore
    /// let schema = Schema::of::<User>()?.on("email", |v| {
    ///     let email = v.downcast_ref::<String>().ok_or("email must be a string")?;
    ///     Ok(Param::new(email.to_lowercase()))
    /// })?;
    /// ```
    pub fn on<F>(mut self, prop: &str, callback: F) -> PatchResult<Self>
    where
        F: Fn(Param) -> Result<Param, BoxError> + Send + Sync + 'static,
    {
        let Some(entry) = self.entries.get_mut(prop) else {
            return Err(PatchError::construction(format!(
                "cannot register a transform for unknown property '{}' on `{}`",
                prop, self.type_name
            )));
        };
        entry.transform = Some(Arc::new(callback));
        Ok(self)
    }

    pub fn get(&self, prop: &str) -> Option<&SchemaEntry> {
        self.entries.get(prop)
    }

    pub fn contains(&self, prop: &str) -> bool {
        self.entries.contains_key(prop)
    }

    /// JSON property names in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// SQL column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|p| self.entries[p].column.as_str())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> TypeDescription {
        TypeDescription::record(
            "User",
            vec![
                Member::new("id", Decoder::structural::<i64>()),
                Member::new("secret", Decoder::structural::<String>()).private(),
                Member::new("name", Decoder::structural::<String>()),
                Member::new("email", Decoder::structural::<String>()).column("email_address"),
                Member::new("ignored", Decoder::structural::<i32>()).rename(SKIP),
                Member::new("computed", Decoder::structural::<i32>()).column(SKIP),
                Member::new("Active", Decoder::structural::<bool>())
                    .rename("active")
                    .column("is_active"),
            ],
        )
    }

    #[test]
    fn resolves_names_and_indices() {
        let schema = Schema::from_description(user()).unwrap();
        assert_eq!(schema.type_name(), "User");
        assert_eq!(
            schema.properties().collect::<Vec<_>>(),
            ["id", "name", "email", "active"]
        );
        assert_eq!(
            schema.columns().collect::<Vec<_>>(),
            ["id", "name", "email_address", "is_active"]
        );
        assert_eq!(schema.get("email").unwrap().index(), 3);
        assert_eq!(schema.get("active").unwrap().index(), 6);
        assert!(!schema.contains("secret"));
        assert!(!schema.contains("ignored"));
        assert!(!schema.contains("computed"));
        assert!(!schema.contains("Active"));
    }

    #[test]
    fn opaque_types_are_rejected() {
        let err = Schema::from_description(TypeDescription::opaque("i32")).unwrap_err();
        assert!(matches!(err, PatchError::Construction(_)));
    }

    #[test]
    fn duplicate_properties_are_rejected() {
        let desc = TypeDescription::record(
            "Dup",
            vec![
                Member::new("a", Decoder::structural::<i32>()),
                Member::new("b", Decoder::structural::<i32>()).rename("a"),
            ],
        );
        let err = Schema::from_description(desc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema construction error: `Dup` declares property 'a' more than once"
        );
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let desc = TypeDescription::record(
            "Dup",
            vec![
                Member::new("a", Decoder::structural::<i32>()).column("x"),
                Member::new("b", Decoder::structural::<i32>()).column("x"),
            ],
        );
        let err = Schema::from_description(desc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema construction error: `Dup` declares column 'x' more than once"
        );

        // a property may not default onto another member's column either
        let desc = TypeDescription::record(
            "Dup",
            vec![
                Member::new("x", Decoder::structural::<i32>()),
                Member::new("b", Decoder::structural::<i32>()).column("x"),
            ],
        );
        assert!(matches!(
            Schema::from_description(desc),
            Err(PatchError::Construction(_))
        ));

        // excluded members do not claim their column
        let desc = TypeDescription::record(
            "Ok",
            vec![
                Member::new("a", Decoder::structural::<i32>()).column(SKIP),
                Member::excluded("x"),
                Member::new("b", Decoder::structural::<i32>()).column("x"),
            ],
        );
        assert_eq!(Schema::from_description(desc).unwrap().get("b").unwrap().index(), 2);
    }

    #[test]
    fn exact_property_names_are_not_tags() {
        let desc = TypeDescription::record(
            "Dash",
            vec![
                Member::new("dash", Decoder::structural::<i32>()).property(SKIP),
                Member::new("skipped", Decoder::structural::<i32>()).rename(SKIP),
            ],
        );
        let schema = Schema::from_description(desc).unwrap();
        assert_eq!(schema.properties().collect::<Vec<_>>(), ["-"]);
        assert_eq!(schema.get("-").unwrap().column(), "-");
    }

    #[test]
    fn excluded_members_keep_their_index() {
        let desc = TypeDescription::record(
            "Account",
            vec![
                Member::excluded("cache"),
                Member::excluded("secret").visibility(Visibility::Public),
                Member::new("name", Decoder::structural::<String>()),
            ],
        );
        let schema = Schema::from_description(desc).unwrap();
        assert_eq!(schema.properties().collect::<Vec<_>>(), ["name"]);
        assert_eq!(schema.get("name").unwrap().index(), 2);
        assert!(!schema.contains("secret"));
    }

    #[test]
    fn transform_requires_known_property() {
        let schema = Schema::from_description(user()).unwrap();
        let schema = schema.on("name", Ok).unwrap();
        assert!(schema.get("name").unwrap().has_transform());
        assert!(schema.on("nope", Ok).is_err());
    }
}
