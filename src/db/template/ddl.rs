//! Builders for guarded DDL effects.
//!
//! Table and column bodies are written with a literal `{schema}` token which is
//! replaced by the quoted namespace; catalog lookups use the bare name.

use crate::db::namespace::Namespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Extension,
    EnumType,
    EnumValue,
    Table,
    Columns,
    Constraint,
    Index,
    Function,
    Trigger,
}

#[derive(Debug, Clone)]
pub struct SchemaEffect {
    /// Stable identifier used in logs and failure reports, e.g. `table:patients`.
    pub name: String,
    pub kind: EffectKind,
    pub sql: String,
}

impl SchemaEffect {
    /// Whether the statement carries the existence check its kind requires.
    pub fn is_guarded(&self) -> bool {
        let sql = self.sql.trim_start();
        match self.kind {
            EffectKind::Extension => sql.starts_with("CREATE EXTENSION IF NOT EXISTS"),
            EffectKind::EnumType | EffectKind::Constraint | EffectKind::Trigger => {
                sql.starts_with("DO $$") && sql.contains("IF NOT EXISTS (")
            }
            EffectKind::EnumValue => sql.contains("ADD VALUE IF NOT EXISTS"),
            EffectKind::Table => sql.starts_with("CREATE TABLE IF NOT EXISTS"),
            EffectKind::Columns => {
                sql.matches("ADD COLUMN").count() > 0
                    && sql.matches("ADD COLUMN").count()
                        == sql.matches("ADD COLUMN IF NOT EXISTS").count()
            }
            EffectKind::Index => {
                sql.starts_with("CREATE INDEX IF NOT EXISTS")
                    || sql.starts_with("CREATE UNIQUE INDEX IF NOT EXISTS")
            }
            EffectKind::Function => sql.starts_with("CREATE OR REPLACE FUNCTION"),
        }
    }
}

pub struct Ddl<'a> {
    ns: &'a Namespace,
}

impl<'a> Ddl<'a> {
    pub fn new(ns: &'a Namespace) -> Self {
        Self { ns }
    }

    fn render(&self, sql: &str) -> String {
        sql.replace("{schema}", &self.ns.quoted())
    }

    /// Extensions are database-wide; they always live in the shared schema.
    pub fn extension(&self, name: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("extension:{name}"),
            kind: EffectKind::Extension,
            sql: format!("CREATE EXTENSION IF NOT EXISTS {name} WITH SCHEMA public"),
        }
    }

    pub fn enum_type(&self, name: &str, variants: &[&str]) -> SchemaEffect {
        let schema = self.ns.as_str();
        let quoted = self.ns.quoted();
        let values = variants
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(",");
        SchemaEffect {
            name: format!("type:{name}"),
            kind: EffectKind::EnumType,
            sql: format!(
                "DO $$ BEGIN
                   IF NOT EXISTS (
                     SELECT 1 FROM pg_type t
                     JOIN pg_namespace n ON n.oid = t.typnamespace
                     WHERE t.typname = '{name}' AND n.nspname = '{schema}'
                   ) THEN
                     CREATE TYPE {quoted}.{name} AS ENUM ({values});
                   END IF;
                 END $$"
            ),
        }
    }

    pub fn enum_value(&self, type_name: &str, value: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("type:{type_name}+{value}"),
            kind: EffectKind::EnumValue,
            sql: format!(
                "ALTER TYPE {}.{type_name} ADD VALUE IF NOT EXISTS '{value}'",
                self.ns.quoted()
            ),
        }
    }

    pub fn table(&self, name: &str, body: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("table:{name}"),
            kind: EffectKind::Table,
            sql: format!(
                "CREATE TABLE IF NOT EXISTS {}.{name} ({})",
                self.ns.quoted(),
                self.render(body)
            ),
        }
    }

    /// Additive column patch for tables created by an earlier template revision.
    pub fn columns(&self, table: &str, columns: &[&str]) -> SchemaEffect {
        let clauses = columns
            .iter()
            .map(|c| format!("ADD COLUMN IF NOT EXISTS {}", self.render(c)))
            .collect::<Vec<_>>()
            .join(",\n  ");
        SchemaEffect {
            name: format!("columns:{table}"),
            kind: EffectKind::Columns,
            sql: format!("ALTER TABLE {}.{table}\n  {clauses}", self.ns.quoted()),
        }
    }

    /// Named table constraint (CHECK, UNIQUE or FOREIGN KEY), created only if no
    /// constraint of that name exists in the namespace.
    pub fn constraint(&self, table: &str, name: &str, definition: &str) -> SchemaEffect {
        let schema = self.ns.as_str();
        let quoted = self.ns.quoted();
        let definition = self.render(definition);
        SchemaEffect {
            name: format!("constraint:{table}.{name}"),
            kind: EffectKind::Constraint,
            sql: format!(
                "DO $$ BEGIN
                   IF NOT EXISTS (
                     SELECT 1 FROM pg_constraint c
                     JOIN pg_namespace n ON n.oid = c.connamespace
                     WHERE c.conname = '{name}' AND n.nspname = '{schema}'
                   ) THEN
                     ALTER TABLE {quoted}.{table} ADD CONSTRAINT {name} {definition};
                   END IF;
                 END $$"
            ),
        }
    }

    pub fn index(&self, name: &str, table: &str, definition: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("index:{name}"),
            kind: EffectKind::Index,
            sql: format!(
                "CREATE INDEX IF NOT EXISTS {name} ON {}.{table} {definition}",
                self.ns.quoted()
            ),
        }
    }

    pub fn unique_index(&self, name: &str, table: &str, definition: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("index:{name}"),
            kind: EffectKind::Index,
            sql: format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON {}.{table} {definition}",
                self.ns.quoted()
            ),
        }
    }

    pub fn function(&self, name: &str, definition: &str) -> SchemaEffect {
        SchemaEffect {
            name: format!("function:{name}"),
            kind: EffectKind::Function,
            sql: format!(
                "CREATE OR REPLACE FUNCTION {}.{name} {definition}",
                self.ns.quoted()
            ),
        }
    }

    /// `BEFORE UPDATE` row trigger named `<table>_<function>`.
    pub fn update_trigger(&self, table: &str, function: &str) -> SchemaEffect {
        let schema = self.ns.as_str();
        let quoted = self.ns.quoted();
        let trigger = format!("{table}_{function}");
        SchemaEffect {
            name: format!("trigger:{trigger}"),
            kind: EffectKind::Trigger,
            sql: format!(
                "DO $$ BEGIN
                   IF NOT EXISTS (
                     SELECT 1 FROM pg_trigger t
                     JOIN pg_class c ON c.oid = t.tgrelid
                     JOIN pg_namespace n ON n.oid = c.relnamespace
                     WHERE t.tgname = '{trigger}' AND c.relname = '{table}' AND n.nspname = '{schema}'
                   ) THEN
                     CREATE TRIGGER {trigger}
                       BEFORE UPDATE ON {quoted}.{table}
                       FOR EACH ROW EXECUTE FUNCTION {quoted}.{function}();
                   END IF;
                 END $$"
            ),
        }
    }
}
