//! Predicate builders that bypass scalar coercion: the exists operator and
//! operators over array-valued JSON fields.

use crate::ast::Operator;
use crate::coerce::is_truthy;
use crate::resolver::ResolvedColumn;
use sea_query::extension::postgres::PgBinOper;
use sea_query::{Alias, Expr, SimpleExpr};
use serde_json::Value as Json;

/// Separator for list-valued operands (`*` and array fields).
pub const LIST_SEPARATOR: char = ';';

/// Splits a list operand, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `@`: IS NOT NULL for truthy operands, IS NULL otherwise.
pub fn exists(column: &ResolvedColumn, raw: &str) -> SimpleExpr {
    let expr = Expr::expr(column.value_expr());
    if is_truthy(raw) {
        expr.is_not_null()
    } else {
        expr.is_null()
    }
}

/// Builds a predicate over an array-valued JSON field.
///
/// `=` requires every value to be present, `*` requires at least one. Other
/// operators have no meaning over arrays and yield `None`, as does a column
/// that is not JSON or an empty value list.
pub fn array_predicate(op: Operator, column: &ResolvedColumn, values: &[String]) -> Option<SimpleExpr> {
    let node = column.json_node()?;
    if values.is_empty() {
        return None;
    }
    match op {
        Operator::Eq => Some(json_contains(node, values)),
        Operator::In => values
            .iter()
            .map(|value| json_contains(node.clone(), std::slice::from_ref(value)))
            .reduce(|acc, expr| acc.or(expr)),
        _ => None,
    }
}

/// `node @> '[...]'::jsonb`
fn json_contains(node: SimpleExpr, values: &[String]) -> SimpleExpr {
    let array = Json::Array(values.iter().cloned().map(Json::String).collect());
    Expr::expr(node).binary(
        PgBinOper::Contains,
        Expr::val(array).cast_as(Alias::new("jsonb")),
    )
}
