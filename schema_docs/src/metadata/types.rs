//! Type definitions for table metadata facets

use serde::{Deserialize, Serialize};

/// A column as reported by information_schema.columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub ordinal_position: i32,
    pub max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

/// Constraint kinds reported by pg_constraint.contype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Check,
    Unique,
    /// Any other contype code, carried verbatim
    Other(String),
}

impl ConstraintKind {
    /// Map a single-letter contype code to a constraint kind
    pub fn from_code(code: &str) -> Self {
        match code {
            "p" => ConstraintKind::PrimaryKey,
            "f" => ConstraintKind::ForeignKey,
            "c" => ConstraintKind::Check,
            "u" => ConstraintKind::Unique,
            other => ConstraintKind::Other(other.to_string()),
        }
    }

    /// Expanded display label; unknown codes pass through verbatim
    pub fn label(&self) -> &str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Check => "CHECK",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Other(code) => code,
        }
    }
}

/// A table constraint with its full definition text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub definition: String,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
}

/// A secondary index; the implicit primary-key index is excluded by the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub definition: String,
}

/// A trigger attached to the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub timing: String,
    pub event: String,
    pub enabled: bool,
    pub definition: String,
}

/// Row-level security status of the table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RlsStatus {
    pub enabled: bool,
    pub forced: bool,
}

/// A row-level security policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RlsPolicy {
    pub name: String,
    pub command: String,
    pub roles: Vec<String>,
    pub using_expr: Option<String>,
    pub check_expr: Option<String>,
}

/// A foreign-key relation from one column to another table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub constraint_name: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// A function or procedure related to the table by name or body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedFunction {
    pub name: String,
    pub kind: String,
    pub language: String,
    pub description: String,
}

/// Aggregate of all metadata facets fetched for one table in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
    pub triggers: Vec<Trigger>,
    pub rls: RlsStatus,
    pub policies: Vec<RlsPolicy>,
    pub foreign_keys: Vec<ForeignKey>,
    pub functions: Vec<RelatedFunction>,
}

impl TableMetadata {
    /// Create an empty bundle for the given table
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            triggers: Vec::new(),
            rls: RlsStatus::default(),
            policies: Vec::new(),
            foreign_keys: Vec::new(),
            functions: Vec::new(),
        }
    }
}
