//! SQL definition assembler
//!
//! Emits a complete CREATE TABLE statement (columns, inline constraints,
//! tablespace clause) followed by any secondary index definitions.

use chrono::Utc;

use crate::metadata::types::{Column, Constraint, ConstraintKind, TableMetadata};
use crate::render::format::normalize_type;

/// Assemble the CREATE TABLE definition for one table.
///
/// Columns keep the executor's ordinal order; constraints are grouped in the
/// fixed kind order (primary key, foreign key, check, unique) while preserving
/// the executor's order within each kind.
pub fn create_table_sql(meta: &TableMetadata) -> String {
    let mut sql = String::new();

    sql.push_str(&format!("-- Table: {}\n", meta.table));
    sql.push_str(&format!("-- Générée le: {}\n\n", Utc::now().to_rfc3339()));
    sql.push_str(&format!("CREATE TABLE public.\"{}\" (\n", meta.table));

    let mut lines: Vec<String> = meta.columns.iter().map(column_line).collect();
    for constraint in grouped_constraints(&meta.constraints) {
        lines.push(format!(
            "  CONSTRAINT {} {}",
            constraint.name, constraint.definition
        ));
    }
    sql.push_str(&lines.join(",\n"));
    sql.push_str("\n) TABLESPACE pg_default;\n");

    if !meta.indexes.is_empty() {
        sql.push_str("\n-- Index\n");
        for index in &meta.indexes {
            sql.push_str(&format!("{};\n", index.definition));
        }
    }

    sql
}

/// Column clause: name, display type, nullability, default
fn column_line(column: &Column) -> String {
    let mut line = format!(
        "  {} {}",
        column.name,
        normalize_type(
            &column.data_type,
            column.max_length,
            column.numeric_precision,
            column.numeric_scale
        )
    );

    line.push_str(if column.nullable { " NULL" } else { " NOT NULL" });

    if let Some(default) = &column.default {
        line.push_str(&format!(" DEFAULT {}", default));
    }

    line
}

/// Constraints in the fixed kind order, executor order preserved within a kind
fn grouped_constraints(constraints: &[Constraint]) -> Vec<&Constraint> {
    let kind_order = [
        ConstraintKind::PrimaryKey,
        ConstraintKind::ForeignKey,
        ConstraintKind::Check,
        ConstraintKind::Unique,
    ];

    let mut grouped: Vec<&Constraint> = Vec::with_capacity(constraints.len());
    for kind in &kind_order {
        grouped.extend(constraints.iter().filter(|c| &c.kind == kind));
    }
    grouped.extend(
        constraints
            .iter()
            .filter(|c| matches!(c.kind, ConstraintKind::Other(_))),
    );

    grouped
}
