//! Rendering decoded fields into a SET fragment.

use crate::dialect::Dialect;
use crate::fields::Fields;
use crate::param::Param;
use std::sync::Arc;

/// Comma-joined column names and their placeholders.
///
/// Useful for `INSERT INTO t (<columns>) VALUES (<binds>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinds {
    pub columns: String,
    pub binds: String,
}

/// Builds `col=$n,...` fragments and the matching argument list.
///
/// Arguments passed to [`SetClause::prepend`] and [`SetClause::render`]
/// accumulate on the clause, so a clause can be rendered more than once while
/// arguments are added. Use one clause per statement.
///
/// # Example
/// ```ignore
/// let mut clause = patcher.update(body)?;
/// let (set, args) = clause.render(sqlpatch::params![post_id]);
/// // set  == "title=$2,body=$3"
/// // args == [post_id, title, body]
/// let sql = format!("UPDATE posts SET {set} WHERE id = $1");
/// ```
#[derive(Clone, Debug)]
pub struct SetClause {
    fields: Fields,
    dialect: Arc<dyn Dialect>,
    pre: Vec<Param>,
    post: Vec<Param>,
}

impl SetClause {
    pub fn new(fields: Fields, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            fields,
            dialect,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Add arguments for placeholders that appear before the SET fragment.
    pub fn prepend(&mut self, args: impl IntoIterator<Item = Param>) -> &mut Self {
        self.pre.extend(args);
        self
    }

    /// Add `appends` and render the fragment with the full argument list.
    pub fn render(&mut self, appends: impl IntoIterator<Item = Param>) -> (String, Vec<Param>) {
        self.post.extend(appends);

        let holders = self.placeholders();
        let mut sql = String::new();
        for (i, (field, holder)) in self.fields.iter().zip(&holders).enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&field.key);
            sql.push('=');
            sql.push_str(holder);
        }

        let args = self.args();
        trace_event!(fragment = %sql, arg_count = args.len(), "rendered set clause");
        (sql, args)
    }

    /// Column list and placeholder list for the current state.
    pub fn columns(&self) -> ColumnBinds {
        ColumnBinds {
            columns: self.fields.keys().join(","),
            binds: self.placeholders().join(","),
        }
    }

    /// Arguments in bind order for the current state.
    pub fn args(&self) -> Vec<Param> {
        self.dialect
            .merge_args(&self.pre, &self.fields.values(), &self.post)
    }

    fn placeholders(&self) -> Vec<String> {
        let offset = self.pre.len() + self.post.len();
        let holders = self.dialect.placeholders(offset, self.fields.len());
        debug_assert_eq!(
            holders.len(),
            self.fields.len(),
            "{:?} returned the wrong number of placeholders",
            self.dialect
        );
        holders
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Mutate fields between renders.
    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

#[cfg(test)]
mod tests;
