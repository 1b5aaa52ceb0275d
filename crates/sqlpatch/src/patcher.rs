//! Unmarshal engine: JSON object in, ordered [`Fields`] out.

use crate::config::PatcherConfig;
use crate::dialect::{Dialect, DialectRegistry};
use crate::error::{PatchError, PatchResult};
use crate::fields::{Field, Fields};
use crate::render::SetClause;
use crate::schema::{Describe, Schema};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

type RawObject = BTreeMap<String, Box<RawValue>>;

/// Decodes partial JSON objects against a [`Schema`].
///
/// A patcher is immutable and cheap to clone; build it once and share it.
///
/// # Example
/// ```ignore
/// #[derive(Patch)]
/// pub struct Post {
///     pub id: i64,
///     pub title: String,
///     pub body: String,
/// }
///
/// let patcher = Patcher::of::<Post>()?;
/// let fields = patcher.unmarshal(br#"{"body": "The body", "title": "Space Gopher"}"#)?;
/// assert_eq!(fields.keys(), ["title", "body"]);
/// ```
#[derive(Clone, Debug)]
pub struct Patcher {
    schema: Arc<Schema>,
    dialect: Arc<dyn Dialect>,
    config: PatcherConfig,
}

impl Patcher {
    /// Patcher with the default configuration.
    pub fn new(schema: impl Into<Arc<Schema>>) -> PatchResult<Self> {
        Self::with_config(schema, PatcherConfig::default())
    }

    /// Patcher for a type implementing [`Describe`], with the default configuration.
    pub fn of<T: Describe>() -> PatchResult<Self> {
        Self::new(Schema::of::<T>()?)
    }

    /// Resolve the configured dialect in the process-wide registry.
    pub fn with_config(schema: impl Into<Arc<Schema>>, config: PatcherConfig) -> PatchResult<Self> {
        let dialect = DialectRegistry::global().get(&config.dialect)?;
        Ok(Self {
            schema: schema.into(),
            dialect,
            config,
        })
    }

    /// Use an explicit dialect instead of a registered one.
    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Decode a JSON object into fields sorted by declaration order.
    pub fn unmarshal(&self, src: &[u8]) -> PatchResult<Fields> {
        let result = self
            .check_size(src.len())
            .and_then(|()| Ok(serde_json::from_slice::<RawObject>(src)?))
            .and_then(|values| self.parse_fields(values));
        log_outcome(&self.schema, &result);
        result
    }

    /// Like [`Patcher::unmarshal`], reading the object from a stream.
    pub fn decode<R: Read>(&self, reader: R) -> PatchResult<Fields> {
        let values = match self.config.max_input_bytes {
            Some(limit) => {
                let mut buf = Vec::new();
                reader
                    .take((limit as u64).saturating_add(1))
                    .read_to_end(&mut buf)
                    .map_err(|e| PatchError::invalid_format(e.to_string()))?;
                return self.unmarshal(&buf);
            }
            None => serde_json::from_reader::<_, RawObject>(reader),
        };
        let result = values
            .map_err(PatchError::from)
            .and_then(|values| self.parse_fields(values));
        log_outcome(&self.schema, &result);
        result
    }

    /// Decode and wrap the fields in a [`SetClause`] for the configured dialect.
    pub fn update(&self, src: &[u8]) -> PatchResult<SetClause> {
        let fields = self.unmarshal(src)?;
        Ok(fields.set_clause(self.dialect.clone()))
    }

    fn check_size(&self, len: usize) -> PatchResult<()> {
        match self.config.max_input_bytes {
            Some(limit) if len > limit => Err(PatchError::invalid_format(format!(
                "input exceeds {limit} bytes"
            ))),
            _ => Ok(()),
        }
    }

    fn parse_fields(&self, values: RawObject) -> PatchResult<Fields> {
        if values.is_empty() {
            return Err(PatchError::EmptyInput);
        }

        let mut fields = Fields::with_capacity(values.len());
        for (prop, raw) in values {
            let Some(entry) = self.schema.get(&prop) else {
                return Err(PatchError::unexpected_field(prop));
            };
            let mut value = match entry.decoder().decode(&raw) {
                Ok(value) => value,
                Err(e) => return Err(PatchError::unmarshal(prop, e)),
            };
            if let Some(transform) = entry.transform() {
                value = match transform(value) {
                    Ok(value) => value,
                    Err(e) => return Err(PatchError::unmarshal(prop, e)),
                };
            }
            fields.push(Field::new(entry.column(), value, entry.index()));
        }
        fields.sort_by_index();
        Ok(fields)
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_outcome(schema: &Schema, result: &PatchResult<Fields>) {
    match result {
        Ok(fields) => trace_event!(
            type_name = schema.type_name(),
            field_count = fields.len(),
            "patch decoded"
        ),
        Err(err) => debug_event!(
            type_name = schema.type_name(),
            kind = ?err.kind(),
            key = err.key().unwrap_or("-"),
            error = %err,
            "patch rejected"
        ),
    }
}
