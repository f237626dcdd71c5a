//! Filter expressions for the test-result store.
//!
//! Callers describe conditions as `{field}{operator}{value}` strings, e.g.
//! `result=failed`, `duration>10`, `metadata.tags*smoke;nightly`. A
//! [`FilterCompiler`] turns each one into a sea-query predicate against a
//! table or derived subquery, and [`FilterCompiler::apply`] ANDs a list of
//! them onto a statement, skipping the ones it cannot compile.
//!
//! ```
//! use result_filter::{entities, FilterCompiler};
//! use sea_query::PostgresQueryBuilder;
//!
//! let results = entities::results();
//! let query = FilterCompiler::new().apply(
//!     results.select_all(),
//!     &["result=failed", "duration>10", "not a filter"],
//!     &results,
//! );
//! assert_eq!(
//!     query.to_string(PostgresQueryBuilder),
//!     r#"SELECT * FROM "results" WHERE "results"."result" = 'failed' AND "results"."duration" > 10"#
//! );
//! ```

pub mod ast;
pub mod coerce;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod resolver;
pub mod schema;
pub mod scope;
pub mod sql_compiler;
pub mod token;

pub use ast::{FieldPath, FilterExpression, Operator};
pub use config::{ConfigError, FilterConfig};
pub use resolver::{resolve, ResolvedColumn};
pub use schema::{entities, ColumnSource, ColumnType, DerivedSubquery, MappedEntity};
pub use scope::has_project_scope;
pub use sql_compiler::{CompileError, FilterCompiler, SkippedFilter};
