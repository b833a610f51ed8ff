//! Markdown document assembler
//!
//! Builds the per-table markdown documentation from a metadata bundle. The
//! section layout and wording are fixed; every section renders a "none found"
//! sentence when its facet is empty.

use chrono::Utc;

use crate::metadata::types::{Constraint, ConstraintKind, TableMetadata};
use crate::render::format::{boolean_glyph, normalize_type, truncate, TRUNCATE_LIMIT};
use crate::render::sql;

/// Presentation options for the document header
#[derive(Debug, Clone)]
pub struct DocOptions {
    pub status: String,
    pub kind: String,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self {
            status: "actif".to_string(),
            kind: "stratégique".to_string(),
        }
    }
}

impl DocOptions {
    /// Header values used by the full-schema batch run
    pub fn batch() -> Self {
        Self {
            status: "✅ ACTIVE".to_string(),
            kind: "Table métier".to_string(),
        }
    }
}

/// Assemble the markdown document for one table
pub fn assemble(meta: &TableMetadata, options: &DocOptions) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Documentation Table: {}\n\n", meta.table));
    md.push_str(&format!(
        "**Date de génération:** {}  \n",
        Utc::now().format("%d/%m/%Y")
    ));
    md.push_str(&format!("**Statut:** {}  \n", options.status));
    md.push_str(&format!("**Type:** {}\n\n---\n\n", options.kind));

    push_sql_definition(&mut md, meta);
    push_columns(&mut md, meta);
    push_constraints(&mut md, meta);
    push_indexes(&mut md, meta);
    push_triggers(&mut md, meta);
    push_rls(&mut md, meta);
    push_foreign_keys(&mut md, meta);
    push_functions(&mut md, meta);
    push_notes(&mut md);

    md
}

fn push_sql_definition(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 1. DÉFINITION SQL\n\n");
    md.push_str("```sql\n");
    md.push_str(&sql::create_table_sql(meta));
    md.push_str("```\n\n---\n\n");
}

fn push_columns(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 2. STRUCTURE DE LA TABLE\n\n");

    if meta.columns.is_empty() {
        md.push_str("Aucune colonne trouvée\n\n---\n\n");
        return;
    }

    md.push_str("| Colonne | Type | Nullable | Défaut | Description |\n");
    md.push_str("|---------|------|----------|--------|-------------|\n");
    for column in &meta.columns {
        let icon = if column.name.contains("_id") { "🔑 " } else { "" };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {}{} |\n",
            column.name,
            normalize_type(
                &column.data_type,
                column.max_length,
                column.numeric_precision,
                column.numeric_scale
            ),
            if column.nullable { "Oui" } else { "Non" },
            column.default.as_deref().unwrap_or("Aucun"),
            icon,
            column.name.replace('_', " "),
        ));
    }
    md.push_str("\n---\n\n");
}

fn push_constraints(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 3. CONTRAINTES\n\n");

    if meta.constraints.is_empty() {
        md.push_str("Aucune contrainte définie.\n\n---\n\n");
        return;
    }

    push_constraint_group(
        md,
        "Clés primaires",
        &meta.constraints,
        &ConstraintKind::PrimaryKey,
        false,
    );
    push_constraint_group(
        md,
        "Clés étrangères",
        &meta.constraints,
        &ConstraintKind::ForeignKey,
        true,
    );
    push_constraint_group(
        md,
        "Contraintes CHECK",
        &meta.constraints,
        &ConstraintKind::Check,
        true,
    );
    push_constraint_group(
        md,
        "Contraintes UNIQUE",
        &meta.constraints,
        &ConstraintKind::Unique,
        false,
    );

    // Kinds outside the four standard groups, carried verbatim
    let others: Vec<&Constraint> = meta
        .constraints
        .iter()
        .filter(|c| matches!(c.kind, ConstraintKind::Other(_)))
        .collect();
    if !others.is_empty() {
        md.push_str("### Autres contraintes\n");
        for constraint in others {
            md.push_str(&format!(
                "- **{}** ({}): {}\n",
                constraint.name,
                constraint.kind.label(),
                truncate(&constraint.definition, TRUNCATE_LIMIT)
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
}

fn push_constraint_group(
    md: &mut String,
    title: &str,
    constraints: &[Constraint],
    kind: &ConstraintKind,
    truncated: bool,
) {
    let group: Vec<&Constraint> = constraints.iter().filter(|c| &c.kind == kind).collect();
    if group.is_empty() {
        return;
    }

    md.push_str(&format!("### {}\n", title));
    for constraint in group {
        let definition = if truncated {
            truncate(&constraint.definition, TRUNCATE_LIMIT)
        } else {
            constraint.definition.clone()
        };
        md.push_str(&format!("- **{}**: {}\n", constraint.name, definition));
    }
    md.push('\n');
}

fn push_indexes(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 4. INDEX\n\n");

    if meta.indexes.is_empty() {
        md.push_str("Aucun index défini\n");
    } else {
        for index in &meta.indexes {
            md.push_str(&format!("- **{}**: {}\n", index.name, index.definition));
        }
    }
    md.push_str("\n---\n\n");
}

fn push_triggers(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 5. TRIGGERS\n\n");

    if meta.triggers.is_empty() {
        md.push_str("Aucun trigger défini.\n\n---\n\n");
        return;
    }

    for trigger in &meta.triggers {
        md.push_str(&format!("### {}\n", trigger.name));
        md.push_str(&format!("- **Timing:** {}\n", trigger.timing));
        md.push_str(&format!("- **Événement:** {}\n", trigger.event));
        md.push_str(&format!("- **Activé:** {}\n", boolean_glyph(trigger.enabled)));
        md.push_str(&format!(
            "- **Définition:** {}\n\n",
            truncate(&trigger.definition, TRUNCATE_LIMIT)
        ));
    }
    md.push_str("---\n\n");
}

fn push_rls(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 6. SÉCURITÉ RLS\n\n");
    md.push_str(&format!(
        "**RLS Activée:** {}\n",
        boolean_glyph(meta.rls.enabled)
    ));
    md.push_str(&format!(
        "**RLS Forcée:** {}\n\n",
        boolean_glyph(meta.rls.forced)
    ));

    if meta.policies.is_empty() {
        md.push_str("### Aucune policy RLS définie\n\n---\n\n");
        return;
    }

    md.push_str("### Policies RLS\n\n");
    for (index, policy) in meta.policies.iter().enumerate() {
        md.push_str(&format!("#### {}. {}\n", index + 1, policy.name));
        md.push_str(&format!("- **Commande:** {}\n", policy.command));
        let roles = if policy.roles.is_empty() {
            "Tous".to_string()
        } else {
            policy.roles.join(", ")
        };
        md.push_str(&format!("- **Rôles:** {}\n", roles));
        if let Some(using_expr) = &policy.using_expr {
            md.push_str(&format!("- **Condition:** `{}`\n", using_expr));
        }
        if let Some(check_expr) = &policy.check_expr {
            md.push_str(&format!("- **Vérification:** `{}`\n", check_expr));
        }
        md.push('\n');
    }
    md.push_str("---\n\n");
}

fn push_foreign_keys(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 7. RELATIONS ENTRE TABLES (FK)\n\n");

    if meta.foreign_keys.is_empty() {
        md.push_str("Aucune relation FK trouvée\n");
    } else {
        for fk in &meta.foreign_keys {
            md.push_str(&format!(
                "- **{}**: {} → {}.{}\n",
                fk.constraint_name, fk.column, fk.referenced_table, fk.referenced_column
            ));
        }
    }
    md.push_str("\n---\n\n");
}

fn push_functions(md: &mut String, meta: &TableMetadata) {
    md.push_str("## 8. FONCTIONS LIÉES\n\n");
    md.push_str("**Fonctions utilisant cette table**\n\n");

    if meta.functions.is_empty() {
        md.push_str("Aucune fonction liée trouvée\n");
    } else {
        for function in &meta.functions {
            md.push_str(&format!(
                "- **{}()** ({}, {}): {}\n",
                function.name, function.kind, function.language, function.description
            ));
        }
    }
    md.push_str("\n---\n\n");
}

fn push_notes(md: &mut String) {
    md.push_str("## 9. NOTES TECHNIQUES\n\n");
    md.push_str("- **Source:** catalogue PostgreSQL (temps réel)\n");
    md.push_str("- **Générateur:** schema_docs\n\n");
    md.push_str(&format!(
        "*Documentation générée automatiquement le {}*\n",
        Utc::now().to_rfc3339()
    ));
}
