//! Tests for schema_docs
//!
//! This file contains unit tests for the formatting, rendering and output
//! layers, plus fan-in tests against a stub introspector.

use std::fs;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::tempdir;

use crate::config::{Config, OutputConfig};
use crate::error::{Error, Result};
use crate::metadata::fetcher::{fetch_table_metadata, Introspect};
use crate::metadata::types::{
    Column, Constraint, ConstraintKind, ForeignKey, Index, RelatedFunction, RlsPolicy, RlsStatus,
    TableMetadata, Trigger,
};
use crate::output;
use crate::render::format::{boolean_glyph, normalize_type, truncate, TRUNCATE_LIMIT};
use crate::render::markdown::{self, DocOptions};
use crate::render::sql;

// Helpers to build metadata fixtures

fn column(name: &str, data_type: &str, nullable: bool, position: i32) -> Column {
    Column {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable,
        default: None,
        ordinal_position: position,
        max_length: None,
        numeric_precision: None,
        numeric_scale: None,
    }
}

fn constraint(name: &str, code: &str, definition: &str) -> Constraint {
    Constraint {
        name: name.to_string(),
        kind: ConstraintKind::from_code(code),
        definition: definition.to_string(),
        referenced_table: None,
        referenced_column: None,
    }
}

/// Table `users` with two columns, a primary key, RLS enabled and one
/// SELECT policy for role `authenticated`
fn users_metadata() -> TableMetadata {
    let mut meta = TableMetadata::new("users");
    meta.columns = vec![
        column("id", "uuid", false, 1),
        column("email", "text", false, 2),
    ];
    meta.constraints = vec![constraint("users_pkey", "p", "PRIMARY KEY (id)")];
    meta.rls = RlsStatus {
        enabled: true,
        forced: false,
    };
    meta.policies = vec![RlsPolicy {
        name: "users_select_own".to_string(),
        command: "SELECT".to_string(),
        roles: vec!["authenticated".to_string()],
        using_expr: Some("auth.uid() = id".to_string()),
        check_expr: None,
    }];
    meta
}

#[rstest]
#[case("character varying", Some(255), None, None, "varchar(255)")]
#[case("character varying", None, None, None, "varchar")]
#[case("timestamp without time zone", None, None, None, "timestamp")]
#[case("timestamp with time zone", None, None, None, "timestamp with time zone")]
#[case("numeric", None, Some(10), Some(2), "numeric(10,2)")]
#[case("numeric", None, Some(10), Some(0), "numeric(10)")]
#[case("numeric", None, None, None, "numeric")]
#[case("uuid", None, None, None, "uuid")]
#[case("text", Some(42), None, None, "text")]
fn test_normalize_type(
    #[case] raw: &str,
    #[case] max_length: Option<i32>,
    #[case] precision: Option<i32>,
    #[case] scale: Option<i32>,
    #[case] expected: &str,
) {
    assert_eq!(normalize_type(raw, max_length, precision, scale), expected);
}

#[test]
fn test_truncate_within_bound() {
    assert_eq!(truncate("short", 100), "short");
    assert_eq!(truncate("", 100), "");

    let exactly = "x".repeat(100);
    assert_eq!(truncate(&exactly, 100), exactly);
}

#[test]
fn test_truncate_over_bound() {
    let long = "x".repeat(150);
    let truncated = truncate(&long, 100);

    assert_eq!(truncated.chars().count(), 103);
    assert!(truncated.ends_with("..."));
    assert!(truncated.starts_with(&"x".repeat(100)));
}

#[test]
fn test_truncate_counts_characters_not_bytes() {
    let long = "é".repeat(150);
    let truncated = truncate(&long, 100);

    assert_eq!(truncated.chars().count(), 103);
    assert!(truncated.starts_with(&"é".repeat(100)));
}

#[rstest]
#[case("abcdef")]
#[case("une définition de contrainte avec des accents répétés encore et encore")]
fn test_truncate_idempotent(#[case] seed: &str) {
    let text = seed.repeat(10);
    let once = truncate(&text, TRUNCATE_LIMIT);
    let twice = truncate(&once, TRUNCATE_LIMIT);

    assert_eq!(once, twice);
}

#[test]
fn test_boolean_glyph() {
    assert_eq!(boolean_glyph(true), "✅ OUI");
    assert_eq!(boolean_glyph(false), "❌ NON");
}

#[rstest]
#[case("p", ConstraintKind::PrimaryKey, "PRIMARY KEY")]
#[case("f", ConstraintKind::ForeignKey, "FOREIGN KEY")]
#[case("c", ConstraintKind::Check, "CHECK")]
#[case("u", ConstraintKind::Unique, "UNIQUE")]
fn test_constraint_kind_codes(
    #[case] code: &str,
    #[case] expected: ConstraintKind,
    #[case] label: &str,
) {
    let kind = ConstraintKind::from_code(code);
    assert_eq!(kind, expected);
    assert_eq!(kind.label(), label);
}

#[test]
fn test_constraint_kind_unknown_code_passes_through() {
    let kind = ConstraintKind::from_code("x");
    assert_eq!(kind, ConstraintKind::Other("x".to_string()));
    assert_eq!(kind.label(), "x");
}

#[test]
fn test_markdown_users_document() {
    let doc = markdown::assemble(&users_metadata(), &DocOptions::default());

    // Header
    assert!(doc.starts_with("# Documentation Table: users\n"));
    assert!(doc.contains("**Statut:** actif"));
    assert!(doc.contains("**Type:** stratégique"));

    // Two column rows
    assert!(doc.contains("| id | uuid | Non | Aucun | id |"));
    assert!(doc.contains("| email | text | Non | Aucun | email |"));

    // Primary key subsection with one entry
    assert!(doc.contains("### Clés primaires"));
    assert!(doc.contains("- **users_pkey**: PRIMARY KEY (id)"));

    // No trigger line
    assert!(doc.contains("Aucun trigger défini"));

    // RLS status and one numbered policy block for role authenticated
    assert!(doc.contains("**RLS Activée:** ✅ OUI"));
    assert!(doc.contains("**RLS Forcée:** ❌ NON"));
    assert!(doc.contains("#### 1. users_select_own"));
    assert!(doc.contains("- **Commande:** SELECT"));
    assert!(doc.contains("- **Rôles:** authenticated"));
    assert!(doc.contains("- **Condition:** `auth.uid() = id`"));
}

#[test]
fn test_markdown_empty_facets_render_none_sentences() {
    let doc = markdown::assemble(&TableMetadata::new("empty"), &DocOptions::default());

    assert!(doc.contains("Aucune colonne trouvée"));
    assert!(doc.contains("Aucune contrainte définie."));
    assert!(doc.contains("Aucun index défini"));
    assert!(doc.contains("Aucun trigger défini."));
    assert!(doc.contains("### Aucune policy RLS définie"));
    assert!(doc.contains("Aucune relation FK trouvée"));
    assert!(doc.contains("Aucune fonction liée trouvée"));
}

#[test]
fn test_markdown_constraint_grouping_is_a_partition() {
    let mut meta = users_metadata();
    meta.constraints = vec![
        constraint("users_check_age", "c", "CHECK (age >= 0)"),
        constraint("users_pkey", "p", "PRIMARY KEY (id)"),
        constraint("users_email_key", "u", "UNIQUE (email)"),
        constraint("users_org_fkey", "f", "FOREIGN KEY (org_id) REFERENCES orgs(id)"),
        constraint("users_excl", "x", "EXCLUDE USING gist (range WITH &&)"),
    ];

    let doc = markdown::assemble(&meta, &DocOptions::default());
    let start = doc.find("## 3. CONTRAINTES").unwrap();
    let end = doc.find("## 4. INDEX").unwrap();
    let section = &doc[start..end];

    // Every input row lands in exactly one group
    assert_eq!(section.matches("- **").count(), meta.constraints.len());
    for c in &meta.constraints {
        assert_eq!(section.matches(&format!("- **{}**", c.name)).count(), 1);
    }

    assert!(section.contains("### Clés primaires"));
    assert!(section.contains("### Clés étrangères"));
    assert!(section.contains("### Contraintes CHECK"));
    assert!(section.contains("### Contraintes UNIQUE"));
    assert!(section.contains("### Autres contraintes"));
}

#[test]
fn test_markdown_long_definitions_are_truncated() {
    let mut meta = users_metadata();
    let long_check = format!("CHECK ({})", "a".repeat(200));
    meta.constraints.push(constraint("users_long_check", "c", &long_check));
    meta.triggers = vec![Trigger {
        name: "users_audit".to_string(),
        timing: "AFTER".to_string(),
        event: "UPDATE".to_string(),
        enabled: true,
        definition: "t".repeat(300),
    }];

    let doc = markdown::assemble(&meta, &DocOptions::default());

    // Only the truncated forms appear in the constraint and trigger sections
    // (the SQL definition block keeps the full text)
    let section = &doc[doc.find("## 3. CONTRAINTES").unwrap()..];
    assert!(!section.contains(&long_check));
    assert!(section.contains(&format!(
        "- **users_long_check**: {}",
        truncate(&long_check, TRUNCATE_LIMIT)
    )));
    assert!(section.contains(&format!("- **Définition:** {}...", "t".repeat(TRUNCATE_LIMIT))));
    assert!(section.contains("- **Activé:** ✅ OUI"));
}

#[test]
fn test_sql_definition_layout() {
    let mut meta = TableMetadata::new("users");
    meta.columns = vec![
        Column {
            default: Some("gen_random_uuid()".to_string()),
            ..column("id", "uuid", false, 1)
        },
        Column {
            max_length: Some(80),
            ..column("name", "character varying", true, 2)
        },
    ];
    // Deliberately shuffled input order
    meta.constraints = vec![
        constraint("users_check_name", "c", "CHECK (length(name) > 0)"),
        constraint("users_name_key", "u", "UNIQUE (name)"),
        constraint("users_org_fkey", "f", "FOREIGN KEY (org_id) REFERENCES orgs(id)"),
        constraint("users_pkey", "p", "PRIMARY KEY (id)"),
    ];
    meta.indexes = vec![Index {
        name: "users_name_idx".to_string(),
        definition: "CREATE INDEX users_name_idx ON public.users USING btree (name)".to_string(),
    }];

    let ddl = sql::create_table_sql(&meta);

    assert!(ddl.contains("-- Table: users"));
    assert!(ddl.contains("CREATE TABLE public.\"users\" (\n"));
    assert!(ddl.contains("  id uuid NOT NULL DEFAULT gen_random_uuid(),\n"));
    assert!(ddl.contains("  name varchar(80) NULL,\n"));
    assert!(ddl.contains(") TABLESPACE pg_default;\n"));

    // Constraints are grouped in the fixed kind order
    let pk = ddl.find("CONSTRAINT users_pkey").unwrap();
    let fk = ddl.find("CONSTRAINT users_org_fkey").unwrap();
    let check = ddl.find("CONSTRAINT users_check_name").unwrap();
    let unique = ddl.find("CONSTRAINT users_name_key").unwrap();
    assert!(pk < fk && fk < check && check < unique);

    // Grouping is a partition of the input constraints
    assert_eq!(ddl.matches("  CONSTRAINT ").count(), meta.constraints.len());

    // Secondary indexes come after the CREATE TABLE statement
    let tablespace = ddl.find(") TABLESPACE pg_default;").unwrap();
    let index = ddl.find("-- Index\nCREATE INDEX users_name_idx").unwrap();
    assert!(tablespace < index);
    assert!(ddl.ends_with("USING btree (name);\n"));
}

#[test]
fn test_sql_definition_without_constraints_or_indexes() {
    let mut meta = TableMetadata::new("plain");
    meta.columns = vec![column("id", "bigint", false, 1)];

    let ddl = sql::create_table_sql(&meta);

    assert!(ddl.contains("CREATE TABLE public.\"plain\" (\n  id bigint NOT NULL\n) TABLESPACE pg_default;\n"));
    assert!(!ddl.contains("-- Index"));
    assert!(!ddl.contains("CONSTRAINT"));
}

#[test]
fn test_output_writer_creates_directories_and_files() {
    let dir = tempdir().unwrap();
    let config = OutputConfig {
        docs_dir: dir.path().join("nested/docs").to_string_lossy().into_owned(),
        sql_dir: dir.path().join("nested/sql").to_string_lossy().into_owned(),
    };

    let batch = output::write_batch_doc(&config, "users", "# doc").unwrap();
    let single = output::write_table_doc(&config, "users", "# single").unwrap();
    let ddl = output::write_sql_definition(&config, "users", "CREATE TABLE ...").unwrap();

    assert!(batch.ends_with("TABLE-users.md"));
    assert!(single.ends_with("users.md"));
    assert!(ddl.ends_with("users.sql"));
    assert_eq!(fs::read_to_string(&batch).unwrap(), "# doc");
    assert_eq!(fs::read_to_string(&single).unwrap(), "# single");
    assert_eq!(fs::read_to_string(&ddl).unwrap(), "CREATE TABLE ...");
}

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.output.docs_dir, "docs/tables");
    assert_eq!(config.output.sql_dir, "docs/sql");
    assert_eq!(config.database.schema_name(), "public");
    assert!(config.logging.is_none());
}

#[test]
fn test_config_loading() {
    let config_str = r#"
        [database]
        pool_size = 5
        timeout_seconds = 10
        schema = "app"

        [output]
        docs_dir = "out/docs"
        sql_dir = "out/sql"

        [logging]
        level = "debug"
        format = "text"
        stdout = true
    "#;

    let config: Config = toml::from_str(config_str).expect("Failed to parse test config");

    assert_eq!(config.database.pool_size, Some(5));
    assert_eq!(config.database.timeout_seconds, Some(10));
    assert_eq!(config.database.schema_name(), "app");
    assert_eq!(config.output.docs_dir, "out/docs");
    assert_eq!(config.logging.unwrap().level, "debug");
}

// Stub introspector for fan-in behavior tests

struct StubIntrospector {
    columns: Vec<Column>,
    fail_policies: bool,
}

#[async_trait]
impl Introspect for StubIntrospector {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(vec!["users".to_string()])
    }

    async fn columns(&self, _table: &str) -> Result<Vec<Column>> {
        Ok(self.columns.clone())
    }

    async fn constraints(&self, _table: &str) -> Result<Vec<Constraint>> {
        Ok(Vec::new())
    }

    async fn indexes(&self, _table: &str) -> Result<Vec<Index>> {
        Ok(Vec::new())
    }

    async fn triggers(&self, _table: &str) -> Result<Vec<Trigger>> {
        Ok(Vec::new())
    }

    async fn rls_status(&self, _table: &str) -> Result<RlsStatus> {
        Ok(RlsStatus::default())
    }

    async fn rls_policies(&self, _table: &str) -> Result<Vec<RlsPolicy>> {
        if self.fail_policies {
            Err(Error::SqlxError(sqlx::Error::RowNotFound))
        } else {
            Ok(Vec::new())
        }
    }

    async fn foreign_keys(&self, _table: &str) -> Result<Vec<ForeignKey>> {
        Ok(Vec::new())
    }

    async fn related_functions(&self, _table: &str) -> Result<Vec<RelatedFunction>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_facet_failure_downgrades_to_empty_section() {
    let stub = StubIntrospector {
        columns: vec![column("id", "uuid", false, 1)],
        fail_policies: true,
    };

    let meta = fetch_table_metadata(&stub, "users").await.unwrap();

    assert_eq!(meta.columns.len(), 1);
    assert!(meta.policies.is_empty());

    // The failed facet renders its none sentence, the document never fails
    let doc = markdown::assemble(&meta, &DocOptions::default());
    assert!(doc.contains("### Aucune policy RLS définie"));
}

#[tokio::test]
async fn test_missing_table_aborts_generation() {
    let stub = StubIntrospector {
        columns: Vec::new(),
        fail_policies: false,
    };

    let error = fetch_table_metadata(&stub, "missing").await.unwrap_err();

    assert!(matches!(error, Error::TableNotFound(name) if name == "missing"));
}
