//! SQL compiler that turns filter expressions into sea-query predicates.
//!
//! Compilation is fail-soft: [`FilterCompiler::compile`] returns `None` for
//! anything it cannot turn into a predicate, and [`FilterCompiler::apply`]
//! skips such expressions so the remaining ones still filter the query.

use crate::ast::{FilterExpression, Operator};
use crate::coerce::{coerce, Scalar};
use crate::config::FilterConfig;
use crate::parser::{parse_expression, ParseError};
use crate::predicate::{array_predicate, exists, split_list};
use crate::resolver::{resolve_path, ResolvedColumn};
use crate::schema::{ColumnSource, ColumnType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_query::extension::postgres::PgBinOper;
use sea_query::{ConditionalStatement, Expr, SimpleExpr, Value};
use thiserror::Error;
use tracing::{debug, trace};

/// Why an expression produced no predicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("malformed expression: {0}")]
    Parse(#[from] ParseError),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("operator '{op}' is not supported on array field '{field}'")]
    UnsupportedArrayOperator { field: String, op: Operator },

    #[error("operator '{op}' cannot be applied to {ty} field '{field}'")]
    OperatorMismatch { field: String, op: Operator, ty: ColumnType },

    #[error("'{value}' is not a valid {ty} value for field '{field}'")]
    InvalidValue { field: String, value: String, ty: ColumnType },

    #[error("empty value list for field '{0}'")]
    EmptyList(String),
}

/// An expression [`FilterCompiler::apply_with_report`] left out.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFilter {
    pub expression: String,
    pub error: CompileError,
}

/// Compiles filter expressions against entity descriptors.
///
/// Holds only immutable configuration, so one instance can be shared
/// across request handlers.
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: FilterConfig,
}

impl FilterCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Compiles one expression, or `None` if it cannot be compiled.
    pub fn compile(&self, expression: &str, source: &dyn ColumnSource) -> Option<SimpleExpr> {
        match self.try_compile(expression, source) {
            Ok(predicate) => Some(predicate),
            Err(error) => {
                debug!(expression, %error, "dropping filter expression");
                None
            }
        }
    }

    /// Like [`compile`](Self::compile), but says why compilation failed.
    pub fn try_compile(&self, expression: &str, source: &dyn ColumnSource) -> Result<SimpleExpr, CompileError> {
        let expression = parse_expression(expression)?;
        self.compile_expression(&expression, source)
    }

    /// Compiles an already parsed expression.
    pub fn compile_expression(
        &self,
        expression: &FilterExpression,
        source: &dyn ColumnSource,
    ) -> Result<SimpleExpr, CompileError> {
        let column = resolve_path(&expression.field, source)
            .ok_or_else(|| CompileError::UnknownField(expression.field.to_string()))?;

        if self.config.is_array_field(&expression.field) {
            let values = split_list(&expression.value);
            return array_predicate(expression.op, &column, &values).ok_or_else(|| {
                CompileError::UnsupportedArrayOperator {
                    field: expression.field.to_string(),
                    op: expression.op,
                }
            });
        }

        match expression.op {
            Operator::Exists => Ok(exists(&column, &expression.value)),
            Operator::In => self.compile_membership(expression, &column),
            Operator::Regex => self.compile_regex(expression, &column),
            Operator::Like => self.compile_like(expression, &column),
            _ => self.compile_comparison(expression, &column),
        }
    }

    /// ANDs every compilable expression onto `query`, in order.
    pub fn apply<Q, S>(&self, query: Q, expressions: &[S], source: &dyn ColumnSource) -> Q
    where
        Q: ConditionalStatement,
        S: AsRef<str>,
    {
        self.apply_with_report(query, expressions, source).0
    }

    /// Like [`apply`](Self::apply), also returning the skipped expressions.
    pub fn apply_with_report<Q, S>(
        &self,
        mut query: Q,
        expressions: &[S],
        source: &dyn ColumnSource,
    ) -> (Q, Vec<SkippedFilter>)
    where
        Q: ConditionalStatement,
        S: AsRef<str>,
    {
        let mut skipped = Vec::new();

        for expression in expressions {
            let expression = expression.as_ref();
            match self.try_compile(expression, source) {
                Ok(predicate) => {
                    trace!(expression, "applying filter expression");
                    query.and_where(predicate);
                }
                Err(error) => {
                    debug!(expression, %error, "skipping filter expression");
                    skipped.push(SkippedFilter {
                        expression: expression.to_string(),
                        error,
                    });
                }
            }
        }

        (query, skipped)
    }

    /// `= ! > < ) (`
    fn compile_comparison(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
    ) -> Result<SimpleExpr, CompileError> {
        let (target, values) = self.operands(expression, column, &[expression.value.clone()])?;
        let value = values
            .into_iter()
            .next()
            .ok_or_else(|| CompileError::EmptyList(expression.field.to_string()))?;
        let target = Expr::expr(target);

        let predicate = match expression.op {
            Operator::Eq => target.eq(value),
            Operator::NotEq => target.ne(value),
            Operator::Gt => target.gt(value),
            Operator::Lt => target.lt(value),
            Operator::Gte => target.gte(value),
            Operator::Lte => target.lte(value),
            op => {
                return Err(CompileError::OperatorMismatch {
                    field: expression.field.to_string(),
                    op,
                    ty: column.column_type(),
                })
            }
        };
        Ok(predicate)
    }

    /// `*`: each `;`-separated item coerced on its own
    fn compile_membership(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
    ) -> Result<SimpleExpr, CompileError> {
        let items = split_list(&expression.value);
        if items.is_empty() {
            return Err(CompileError::EmptyList(expression.field.to_string()));
        }
        let (target, values) = self.operands(expression, column, &items)?;
        Ok(Expr::expr(target).is_in(values))
    }

    /// `~`: the value is a regular expression, never coerced
    fn compile_regex(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
    ) -> Result<SimpleExpr, CompileError> {
        let target = self.pattern_target(expression, column)?;
        Ok(Expr::expr(target).binary(PgBinOper::Regex, Expr::val(expression.value.as_str())))
    }

    /// `%`: case-insensitive substring match
    fn compile_like(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
    ) -> Result<SimpleExpr, CompileError> {
        let target = self.pattern_target(expression, column)?;
        let pattern = format!("%{}%", expression.value);
        Ok(Expr::expr(target).binary(PgBinOper::ILike, Expr::val(pattern)))
    }

    /// Pattern operators only make sense on text; identifiers are cast.
    fn pattern_target(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
    ) -> Result<SimpleExpr, CompileError> {
        match column.column_type() {
            ColumnType::Text | ColumnType::Uuid => Ok(column.text_expr()),
            ty => Err(CompileError::OperatorMismatch {
                field: expression.field.to_string(),
                op: expression.op,
                ty,
            }),
        }
    }

    /// Picks the column form to compare against and converts each raw
    /// operand to a value of the matching type.
    fn operands(
        &self,
        expression: &FilterExpression,
        column: &ResolvedColumn,
        raws: &[String],
    ) -> Result<(SimpleExpr, Vec<Value>), CompileError> {
        let scalars: Vec<Scalar> = raws.iter().map(String::as_str).map(coerce).collect();

        if column.is_json_path() {
            // numbers compare numerically, anything else against the text leaf
            if let Some(numbers) = scalars.iter().map(number).collect::<Option<Vec<_>>>() {
                return Ok((column.numeric_expr(), numbers));
            }
            let texts = scalars.iter().map(|s| Value::from(s.raw())).collect();
            return Ok((column.value_expr(), texts));
        }

        let ty = column.column_type();
        if ty == ColumnType::Json {
            return Err(CompileError::OperatorMismatch {
                field: expression.field.to_string(),
                op: expression.op,
                ty,
            });
        }

        let values = scalars
            .iter()
            .map(|scalar| {
                typed_value(scalar, ty).ok_or_else(|| CompileError::InvalidValue {
                    field: expression.field.to_string(),
                    value: scalar.raw().to_string(),
                    ty,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((column.value_expr(), values))
    }
}

fn number(scalar: &Scalar) -> Option<Value> {
    match scalar {
        Scalar::Int(n, _) => Some(Value::from(*n)),
        Scalar::Float(f, _) => Some(Value::from(*f)),
        Scalar::Text(_) => None,
    }
}

/// Converts a coerced operand for a column of type `ty`.
fn typed_value(scalar: &Scalar, ty: ColumnType) -> Option<Value> {
    match ty {
        ColumnType::Text => Some(Value::from(scalar.raw())),
        ColumnType::Integer | ColumnType::Float => number(scalar),
        ColumnType::Uuid => uuid::Uuid::parse_str(scalar.raw()).ok().map(Value::from),
        ColumnType::Timestamp => parse_timestamp(scalar.raw()),
        ColumnType::Json => None,
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (space or `T`), or a bare date.
fn parse_timestamp(raw: &str) -> Option<Value> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(Value::from(datetime));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Value::from(datetime));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Value::from)
}
