//! Catalog introspection
//!
//! This module holds the fixed set of metadata queries and runs them against
//! the documented database. Table and schema names are always bound as query
//! parameters, never interpolated into the SQL text.

use async_trait::async_trait;
use futures::join;
use sqlx::{FromRow, PgPool};

use crate::error::{Error, Result};
use crate::metadata::types::{
    Column, Constraint, ConstraintKind, ForeignKey, Index, RelatedFunction, RlsPolicy, RlsStatus,
    TableMetadata, Trigger,
};

/// Introspection boundary: one method per metadata facet
#[async_trait]
pub trait Introspect {
    /// List all base tables of the documented schema
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column definitions, in ordinal order
    async fn columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Table constraints with their definition text
    async fn constraints(&self, table: &str) -> Result<Vec<Constraint>>;

    /// Secondary indexes, excluding the implicit primary-key index
    async fn indexes(&self, table: &str) -> Result<Vec<Index>>;

    /// Triggers attached to the table, internal triggers excluded
    async fn triggers(&self, table: &str) -> Result<Vec<Trigger>>;

    /// Row-level security status
    async fn rls_status(&self, table: &str) -> Result<RlsStatus>;

    /// Row-level security policies
    async fn rls_policies(&self, table: &str) -> Result<Vec<RlsPolicy>>;

    /// Foreign-key relations to other tables
    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>>;

    /// Functions related to the table by name or body
    async fn related_functions(&self, table: &str) -> Result<Vec<RelatedFunction>>;
}

/// Fetch every facet for one table concurrently and join the results.
///
/// The columns facet doubles as the existence probe: an empty result aborts
/// with `Error::TableNotFound`. Any other facet failure downgrades to a
/// warning and an empty section.
pub async fn fetch_table_metadata<I: Introspect + Sync>(
    introspector: &I,
    table: &str,
) -> Result<TableMetadata> {
    let (columns, constraints, indexes, triggers, rls, policies, foreign_keys, functions) = join!(
        introspector.columns(table),
        introspector.constraints(table),
        introspector.indexes(table),
        introspector.triggers(table),
        introspector.rls_status(table),
        introspector.rls_policies(table),
        introspector.foreign_keys(table),
        introspector.related_functions(table),
    );

    let columns = columns?;
    if columns.is_empty() {
        return Err(Error::TableNotFound(table.to_string()));
    }

    Ok(TableMetadata {
        table: table.to_string(),
        columns,
        constraints: or_empty(constraints, table, "constraints"),
        indexes: or_empty(indexes, table, "indexes"),
        triggers: or_empty(triggers, table, "triggers"),
        rls: match rls {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(table, facet = "rls_status", %error, "Metadata query failed, section will be empty");
                RlsStatus::default()
            }
        },
        policies: or_empty(policies, table, "rls_policies"),
        foreign_keys: or_empty(foreign_keys, table, "foreign_keys"),
        functions: or_empty(functions, table, "related_functions"),
    })
}

/// Downgrade a facet failure to a warning and an empty facet
fn or_empty<T>(result: Result<Vec<T>>, table: &str, facet: &'static str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(error) => {
            tracing::warn!(table, facet, %error, "Metadata query failed, section will be empty");
            Vec::new()
        }
    }
}

// Row types for the catalog queries
#[derive(FromRow)]
struct TableRow {
    table_name: String,
}

#[derive(FromRow)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    is_nullable: String,
    column_default: Option<String>,
    ordinal_position: i32,
    character_maximum_length: Option<i32>,
    numeric_precision: Option<i32>,
    numeric_scale: Option<i32>,
}

#[derive(FromRow)]
struct ConstraintRow {
    name: String,
    kind: String,
    definition: String,
    referenced_table: Option<String>,
    referenced_column: Option<String>,
}

#[derive(FromRow)]
struct IndexRow {
    name: String,
    definition: String,
}

#[derive(FromRow)]
struct TriggerRow {
    name: String,
    timing: String,
    event: String,
    enabled: bool,
    definition: String,
}

#[derive(FromRow)]
struct RlsStatusRow {
    enabled: bool,
    forced: bool,
}

#[derive(FromRow)]
struct RlsPolicyRow {
    name: String,
    command: String,
    roles: Vec<String>,
    using_expr: Option<String>,
    check_expr: Option<String>,
}

#[derive(FromRow)]
struct ForeignKeyRow {
    constraint_name: String,
    column_name: String,
    referenced_table: String,
    referenced_column: String,
}

#[derive(FromRow)]
struct RelatedFunctionRow {
    name: String,
    kind: String,
    language: String,
    description: String,
}

/// PostgreSQL catalog introspector
#[derive(Clone)]
pub struct PgIntrospector {
    pool: PgPool,
    schema: String,
}

impl PgIntrospector {
    /// Create a new introspector over a connection pool
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl Introspect for PgIntrospector {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let sql = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let rows = sqlx::query_as::<_, TableRow>(sql)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.table_name).collect())
    }

    async fn columns(&self, table: &str) -> Result<Vec<Column>> {
        let sql = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                is_nullable::text AS is_nullable,
                column_default::text AS column_default,
                ordinal_position::int AS ordinal_position,
                character_maximum_length::int AS character_maximum_length,
                numeric_precision::int AS numeric_precision,
                numeric_scale::int AS numeric_scale
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = sqlx::query_as::<_, ColumnRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Column {
                name: row.column_name,
                data_type: row.data_type,
                nullable: row.is_nullable == "YES",
                default: row.column_default,
                ordinal_position: row.ordinal_position,
                max_length: row.character_maximum_length,
                numeric_precision: row.numeric_precision,
                numeric_scale: row.numeric_scale,
            })
            .collect())
    }

    async fn constraints(&self, table: &str) -> Result<Vec<Constraint>> {
        let sql = r#"
            SELECT
                c.conname::text AS name,
                c.contype::text AS kind,
                pg_get_constraintdef(c.oid) AS definition,
                ref.relname::text AS referenced_table,
                att.attname::text AS referenced_column
            FROM pg_constraint c
            JOIN pg_class t ON c.conrelid = t.oid
            JOIN pg_namespace n ON t.relnamespace = n.oid
            LEFT JOIN pg_class ref ON c.confrelid = ref.oid
            LEFT JOIN pg_attribute att
                ON att.attrelid = c.confrelid AND att.attnum = c.confkey[1]
            WHERE n.nspname = $1 AND t.relname = $2
            ORDER BY c.contype, c.conname
        "#;

        let rows = sqlx::query_as::<_, ConstraintRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Constraint {
                name: row.name,
                kind: ConstraintKind::from_code(&row.kind),
                definition: row.definition,
                referenced_table: row.referenced_table,
                referenced_column: row.referenced_column,
            })
            .collect())
    }

    async fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        let sql = r#"
            SELECT
                indexname::text AS name,
                indexdef::text AS definition
            FROM pg_indexes
            WHERE schemaname = $1 AND tablename = $2
              AND indexname NOT LIKE '%_pkey'
            ORDER BY indexname
        "#;

        let rows = sqlx::query_as::<_, IndexRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Index {
                name: row.name,
                definition: row.definition,
            })
            .collect())
    }

    async fn triggers(&self, table: &str) -> Result<Vec<Trigger>> {
        // Timing and events are decoded from the tgtype bit field
        let sql = r#"
            SELECT
                t.tgname::text AS name,
                CASE
                    WHEN t.tgtype & 2 <> 0 THEN 'BEFORE'
                    WHEN t.tgtype & 64 <> 0 THEN 'INSTEAD OF'
                    ELSE 'AFTER'
                END AS timing,
                array_to_string(ARRAY[
                    CASE WHEN t.tgtype & 4 <> 0 THEN 'INSERT' END,
                    CASE WHEN t.tgtype & 8 <> 0 THEN 'DELETE' END,
                    CASE WHEN t.tgtype & 16 <> 0 THEN 'UPDATE' END,
                    CASE WHEN t.tgtype & 32 <> 0 THEN 'TRUNCATE' END
                ], ' OR ') AS event,
                t.tgenabled <> 'D' AS enabled,
                pg_get_triggerdef(t.oid) AS definition
            FROM pg_trigger t
            JOIN pg_class c ON t.tgrelid = c.oid
            JOIN pg_namespace n ON c.relnamespace = n.oid
            WHERE n.nspname = $1 AND c.relname = $2 AND NOT t.tgisinternal
            ORDER BY t.tgname
        "#;

        let rows = sqlx::query_as::<_, TriggerRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Trigger {
                name: row.name,
                timing: row.timing,
                event: row.event,
                enabled: row.enabled,
                definition: row.definition,
            })
            .collect())
    }

    async fn rls_status(&self, table: &str) -> Result<RlsStatus> {
        let sql = r#"
            SELECT
                c.relrowsecurity AS enabled,
                c.relforcerowsecurity AS forced
            FROM pg_class c
            JOIN pg_namespace n ON c.relnamespace = n.oid
            WHERE n.nspname = $1 AND c.relname = $2
        "#;

        let row = sqlx::query_as::<_, RlsStatusRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|row| RlsStatus {
                enabled: row.enabled,
                forced: row.forced,
            })
            .unwrap_or_default())
    }

    async fn rls_policies(&self, table: &str) -> Result<Vec<RlsPolicy>> {
        let sql = r#"
            SELECT
                policyname::text AS name,
                cmd::text AS command,
                roles::text[] AS roles,
                qual::text AS using_expr,
                with_check::text AS check_expr
            FROM pg_policies
            WHERE schemaname = $1 AND tablename = $2
            ORDER BY policyname
        "#;

        let rows = sqlx::query_as::<_, RlsPolicyRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RlsPolicy {
                name: row.name,
                command: row.command,
                roles: row.roles,
                using_expr: row.using_expr,
                check_expr: row.check_expr,
            })
            .collect())
    }

    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let sql = r#"
            SELECT
                tc.constraint_name::text AS constraint_name,
                kcu.column_name::text AS column_name,
                ccu.table_name::text AS referenced_table,
                ccu.column_name::text AS referenced_column
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON ccu.constraint_name = tc.constraint_name
                AND ccu.table_schema = tc.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
              AND tc.table_schema = $1
              AND tc.table_name = $2
            ORDER BY tc.constraint_name, kcu.ordinal_position
        "#;

        let rows = sqlx::query_as::<_, ForeignKeyRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ForeignKey {
                constraint_name: row.constraint_name,
                column: row.column_name,
                referenced_table: row.referenced_table,
                referenced_column: row.referenced_column,
            })
            .collect())
    }

    async fn related_functions(&self, table: &str) -> Result<Vec<RelatedFunction>> {
        let sql = r#"
            SELECT
                p.proname::text AS name,
                CASE p.prokind
                    WHEN 'f' THEN 'FUNCTION'
                    WHEN 'p' THEN 'PROCEDURE'
                    ELSE 'OTHER'
                END AS kind,
                l.lanname::text AS language,
                CASE
                    WHEN p.proname ILIKE '%' || $2 || '%' THEN 'Fonction spécifique à la table'
                    WHEN pg_get_functiondef(p.oid) ILIKE '%' || $2 || '%' THEN 'Utilise cette table'
                    ELSE 'Fonction liée'
                END AS description
            FROM pg_proc p
            JOIN pg_namespace n ON n.oid = p.pronamespace
            JOIN pg_language l ON l.oid = p.prolang
            WHERE n.nspname = $1
              AND p.prokind IN ('f', 'p')
              AND (p.proname ILIKE '%' || $2 || '%'
                   OR pg_get_functiondef(p.oid) ILIKE '%' || $2 || '%')
            ORDER BY p.proname
        "#;

        let rows = sqlx::query_as::<_, RelatedFunctionRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RelatedFunction {
                name: row.name,
                kind: row.kind,
                language: row.language,
                description: row.description,
            })
            .collect())
    }
}
