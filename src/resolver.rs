//! Field-path resolution.
//!
//! A single-segment path names a column directly. A dotted path starts with
//! a namespace that selects one of the JSON columns and continues with the
//! keys to descend through; the last key is extracted as text.

use crate::ast::FieldPath;
use crate::schema::{Column, ColumnSource, ColumnType};
use sea_query::extension::postgres::PgBinOper;
use sea_query::{Alias, Expr, SimpleExpr};

/// DSL namespace -> JSON column. `metadata` is what stored filters use for
/// the column physically named `data`.
const JSON_NAMESPACES: &[(&str, &str)] = &[
    ("metadata", "data"),
    ("data", "data"),
    ("summary", "summary"),
];

/// The JSON column a namespace segment refers to.
pub fn json_column_for(namespace: &str) -> Option<&'static str> {
    JSON_NAMESPACES
        .iter()
        .find(|(alias, _)| *alias == namespace)
        .map(|(_, column)| *column)
}

/// A column handle produced by [`resolve_path`].
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    base: Column,
    /// Keys below `base`; empty for a direct column.
    keys: Vec<String>,
}

impl ResolvedColumn {
    fn direct(base: Column) -> Self {
        Self { base, keys: Vec::new() }
    }

    fn json_path(base: Column, keys: Vec<String>) -> Self {
        Self { base, keys }
    }

    pub fn is_json_path(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Type of [`value_expr`](Self::value_expr). JSON leaves are text.
    pub fn column_type(&self) -> ColumnType {
        if self.is_json_path() {
            ColumnType::Text
        } else {
            self.base.ty
        }
    }

    /// The form used for scalar comparison.
    pub fn value_expr(&self) -> SimpleExpr {
        match self.keys.split_last() {
            Some((leaf, parents)) => {
                json_text(json_descend(self.base.expr.clone(), parents), leaf)
            }
            None => self.base.expr.clone(),
        }
    }

    /// The JSON-typed form, for containment tests. `None` when the column
    /// does not hold JSON.
    pub fn json_node(&self) -> Option<SimpleExpr> {
        if self.is_json_path() {
            Some(json_descend(self.base.expr.clone(), &self.keys))
        } else if self.base.ty == ColumnType::Json {
            Some(self.base.expr.clone())
        } else {
            None
        }
    }

    /// The form used for pattern operators; identifiers are cast to text.
    pub fn text_expr(&self) -> SimpleExpr {
        if self.column_type() == ColumnType::Uuid {
            Expr::expr(self.value_expr()).cast_as(Alias::new("text"))
        } else {
            self.value_expr()
        }
    }

    /// A JSON leaf cast for numeric comparison.
    pub fn numeric_expr(&self) -> SimpleExpr {
        Expr::expr(self.value_expr()).cast_as(Alias::new("numeric"))
    }
}

/// Descends one JSON level per key, staying JSON-typed.
fn json_descend(node: SimpleExpr, keys: &[String]) -> SimpleExpr {
    keys.iter().fold(node, |node, key| {
        Expr::expr(node).binary(PgBinOper::GetJsonField, Expr::val(key.as_str()))
    })
}

/// Extracts `key` from a JSON node as text.
fn json_text(node: SimpleExpr, key: &str) -> SimpleExpr {
    Expr::expr(node).binary(PgBinOper::CastJsonField, Expr::val(key))
}

/// Resolves a parsed field path against an entity descriptor.
pub fn resolve_path(path: &FieldPath, source: &dyn ColumnSource) -> Option<ResolvedColumn> {
    match path.segments() {
        [name] => source.column(name).map(ResolvedColumn::direct),
        [namespace, keys @ ..] => {
            let column = source.column(json_column_for(namespace)?)?;
            if column.ty != ColumnType::Json {
                return None;
            }
            Some(ResolvedColumn::json_path(column, keys.to_vec()))
        }
        [] => None,
    }
}

/// Resolves a dotted field name, e.g. for grouping or ordering.
pub fn resolve(field: &str, source: &dyn ColumnSource) -> Option<ResolvedColumn> {
    resolve_path(&FieldPath::parse(field)?, source)
}
