//! Decoded fields of a patch.

use crate::dialect::Dialect;
use crate::param::{Param, PatchValue};
use crate::render::SetClause;
use std::collections::HashMap;
use std::sync::Arc;

/// A decoded `(column, value)` pair.
#[derive(Clone, Debug)]
pub struct Field {
    pub key: String,
    pub value: Param,
    index: isize,
}

impl Field {
    /// Declaration index of fields added after decoding.
    pub const APPENDED: isize = -1;

    pub fn new(key: impl Into<String>, value: Param, index: isize) -> Self {
        Self {
            key: key.into(),
            value,
            index,
        }
    }

    /// Position of the member in its record declaration, or [`Field::APPENDED`].
    pub fn index(&self) -> isize {
        self.index
    }
}

/// Ordered list of decoded fields with unique keys.
///
/// Produced by [`Patcher::unmarshal`](crate::Patcher::unmarshal) in declaration
/// order. Fields added later with [`Fields::set`] go to the end.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    items: Vec<Field>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, field: Field) {
        self.items.push(field);
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|f| f.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.items.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Typed access to a value.
    pub fn get_as<T: 'static>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(Param::downcast_ref::<T>)
    }

    pub fn has(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Overwrite the value of `key`, or append a new field at the end.
    ///
    /// An overwritten field keeps its position and declaration index.
    pub fn set<T: PatchValue>(&mut self, key: &str, value: T) {
        self.set_param(key, Param::new(value));
    }

    /// Like [`Fields::set`] for an already wrapped value.
    pub fn set_param(&mut self, key: &str, value: Param) {
        match self.position(key) {
            Some(i) => self.items[i].value = value,
            None => self.items.push(Field::new(key, value, Field::APPENDED)),
        }
    }

    /// Remove `key` and return its value.
    pub fn remove(&mut self, key: &str) -> Option<Param> {
        let i = self.position(key)?;
        Some(self.items.remove(i).value)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|f| f.key.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Param> {
        self.items.iter().map(|f| f.value.clone()).collect()
    }

    pub fn to_map(&self) -> HashMap<String, Param> {
        self.items
            .iter()
            .map(|f| (f.key.clone(), f.value.clone()))
            .collect()
    }

    /// Stable sort by declaration index.
    pub fn sort_by_index(&mut self) {
        self.items.sort_by_key(|f| f.index);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.items.iter()
    }

    /// Start rendering these fields for `dialect`.
    pub fn set_clause(self, dialect: Arc<dyn Dialect>) -> SetClause {
        SetClause::new(self, dialect)
    }
}

/// Later fields overwrite earlier ones with the same key.
impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for field in iter {
            match fields.position(&field.key) {
                Some(i) => fields.items[i].value = field.value,
                None => fields.items.push(field),
            }
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
