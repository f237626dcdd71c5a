//! Entity descriptors the compiler resolves field names against.
//!
//! Two shapes are supported: a mapped table ([`MappedEntity`]) and an
//! anonymous derived subquery ([`DerivedSubquery`]). Both implement
//! [`ColumnSource`], so the resolver and compiler never branch on shape.

use sea_query::{Asterisk, Expr, Iden, Query, SelectStatement, SimpleExpr};
use std::fmt;

/// Table (or subquery alias) identifier for sea-query
#[derive(Debug, Clone)]
pub struct TableName(pub String);

impl Iden for TableName {
    fn unquoted(&self, s: &mut dyn fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Column identifier wrapper
#[derive(Debug, Clone)]
pub struct ColumnName(pub String);

impl Iden for ColumnName {
    fn unquoted(&self, s: &mut dyn fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Storage type of a column, as far as filtering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Uuid,
    Timestamp,
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Uuid => "uuid",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// An executable column expression and its type.
#[derive(Debug, Clone)]
pub struct Column {
    pub expr: SimpleExpr,
    pub ty: ColumnType,
}

/// Anything the compiler can look columns up on.
pub trait ColumnSource {
    /// Returns the directly addressable column with this name, if any.
    fn column(&self, name: &str) -> Option<Column>;
}

impl<T: ColumnSource + ?Sized> ColumnSource for &T {
    fn column(&self, name: &str) -> Option<Column> {
        (**self).column(name)
    }
}

#[derive(Debug, Clone)]
struct MappedColumn {
    attribute: String,
    column: String,
    ty: ColumnType,
}

/// A mapped table: attribute names resolve to physical columns.
#[derive(Debug, Clone)]
pub struct MappedEntity {
    table: String,
    columns: Vec<MappedColumn>,
}

impl MappedEntity {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column whose attribute and physical names are the same.
    pub fn with_column(self, name: &str, ty: ColumnType) -> Self {
        self.with_column_as(name, name, ty)
    }

    /// Adds a column exposed under a different attribute name.
    pub fn with_column_as(mut self, attribute: &str, column: &str, ty: ColumnType) -> Self {
        self.columns.push(MappedColumn {
            attribute: attribute.to_string(),
            column: column.to_string(),
            ty,
        });
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.attribute.as_str())
    }

    /// `SELECT * FROM <table>`, the usual base query for filters
    pub fn select_all(&self) -> SelectStatement {
        Query::select()
            .column(Asterisk)
            .from(TableName(self.table.clone()))
            .to_owned()
    }
}

impl ColumnSource for MappedEntity {
    fn column(&self, name: &str) -> Option<Column> {
        let mapped = self.columns.iter().find(|c| c.attribute == name)?;
        Some(Column {
            expr: Expr::col((TableName(self.table.clone()), ColumnName(mapped.column.clone()))).into(),
            ty: mapped.ty,
        })
    }
}

/// An ad-hoc subquery exposed as a flat namespace of output columns.
#[derive(Debug, Clone)]
pub struct DerivedSubquery {
    alias: String,
    query: SelectStatement,
    columns: Vec<(String, ColumnType)>,
}

impl DerivedSubquery {
    pub fn new(alias: impl Into<String>, query: SelectStatement) -> Self {
        Self {
            alias: alias.into(),
            query,
            columns: Vec::new(),
        }
    }

    /// Declares one output column of the subquery.
    pub fn with_column(mut self, name: &str, ty: ColumnType) -> Self {
        self.columns.push((name.to_string(), ty));
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `SELECT * FROM (<subquery>) AS <alias>`
    pub fn select_all(&self) -> SelectStatement {
        Query::select()
            .column(Asterisk)
            .from_subquery(self.query.clone(), TableName(self.alias.clone()))
            .to_owned()
    }
}

impl ColumnSource for DerivedSubquery {
    fn column(&self, name: &str) -> Option<Column> {
        let (_, ty) = self.columns.iter().find(|(column, _)| column == name)?;
        Some(Column {
            expr: Expr::col((TableName(self.alias.clone()), ColumnName(name.to_string()))).into(),
            ty: *ty,
        })
    }
}

/// Descriptors for the tables of the test-result store.
pub mod entities {
    use super::{ColumnType::*, MappedEntity};

    pub fn results() -> MappedEntity {
        MappedEntity::new("results")
            .with_column("id", Uuid)
            .with_column("component", Text)
            .with_column("env", Text)
            .with_column("result", Text)
            .with_column("source", Text)
            .with_column("duration", Float)
            .with_column("start_time", Timestamp)
            .with_column("run_id", Uuid)
            .with_column("project_id", Uuid)
            .with_column("data", Json)
            .with_column("params", Json)
    }

    pub fn runs() -> MappedEntity {
        MappedEntity::new("runs")
            .with_column("id", Uuid)
            .with_column("component", Text)
            .with_column("env", Text)
            .with_column("source", Text)
            .with_column("duration", Float)
            .with_column("start_time", Timestamp)
            .with_column("created", Timestamp)
            .with_column("project_id", Uuid)
            .with_column("data", Json)
            .with_column("summary", Json)
    }

    pub fn projects() -> MappedEntity {
        MappedEntity::new("projects")
            .with_column("id", Uuid)
            .with_column("name", Text)
            .with_column("title", Text)
            .with_column("owner_id", Uuid)
            .with_column("group_id", Uuid)
            .with_column("data", Json)
    }

    pub fn artifacts() -> MappedEntity {
        MappedEntity::new("artifacts")
            .with_column("id", Uuid)
            .with_column("filename", Text)
            .with_column("result_id", Uuid)
            .with_column("run_id", Uuid)
            .with_column("project_id", Uuid)
            .with_column("upload_date", Timestamp)
            .with_column_as("data", "additional_metadata", Json)
    }

    pub fn widget_configs() -> MappedEntity {
        MappedEntity::new("widget_configs")
            .with_column("id", Uuid)
            .with_column("type", Text)
            .with_column("widget", Text)
            .with_column("navigable", Text)
            .with_column("title", Text)
            .with_column("weight", Integer)
            .with_column("project_id", Uuid)
            .with_column("dashboard_id", Uuid)
            .with_column("params", Json)
    }

    /// Looks a built-in descriptor up by table name.
    pub fn by_name(name: &str) -> Option<MappedEntity> {
        match name {
            "results" | "result" => Some(results()),
            "runs" | "run" => Some(runs()),
            "projects" | "project" => Some(projects()),
            "artifacts" | "artifact" => Some(artifacts()),
            "widget_configs" | "widget-config" => Some(widget_configs()),
            _ => None,
        }
    }
}
