// Copyright (C) 2024-2026 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation and Infrastructure Orchestration
//!
//! Marquee runs on `SQLite` by default and on `PostgreSQL` when the
//! `postgres` feature is enabled. Standard `cargo test` only touches
//! `SQLite`; everything that needs a real `PostgreSQL` server lives here.
//!
//! ### Backend Commands
//!
//! - `cargo xtask test-postgres` starts a throwaway `PostgreSQL` container
//!   and runs the ignored backend validation tests against it.
//! - `cargo xtask verify-migrations` applies both migration sets and fails
//!   when the resulting schemas differ.
//!
//! Containers are always removed afterwards, even when tests fail.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Bool, Integer, Text};
use diesel::{PgConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// Throwaway `PostgreSQL` server settings.
struct PostgresContainer {
    name: &'static str,
    db_name: &'static str,
    user: &'static str,
    password: &'static str,
    port: &'static str,
}

impl PostgresContainer {
    fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.db_name
        )
    }

    /// Starts the container and waits up to 30 seconds for it to accept
    /// connections. Removes it again if it never becomes ready.
    fn start(&self) -> Result<()> {
        use std::thread::sleep;
        use std::time::Duration;

        tracing::info!("Checking Docker availability");
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        tracing::info!("Cleaning up any existing container");
        self.remove();

        tracing::info!("Starting PostgreSQL container: {}", self.name);
        cmd!(
            "docker",
            "run",
            "--name",
            self.name,
            "-e",
            format!("POSTGRES_DB={}", self.db_name),
            "-e",
            format!("POSTGRES_USER={}", self.user),
            "-e",
            format!("POSTGRES_PASSWORD={}", self.password),
            "-p",
            format!("{}:5432", self.port),
            "-d",
            "postgres:16"
        )
        .run_with_trace()
        .wrap_err("Failed to start PostgreSQL container")?;

        tracing::info!("Waiting for PostgreSQL to be ready...");
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {}/{}", attempt, max_attempts);

            let result = cmd!(
                "docker",
                "exec",
                self.name,
                "pg_isready",
                "-U",
                self.user,
                "-d",
                self.db_name
            )
            .stdout_null()
            .run();

            if result.is_ok() {
                tracing::info!("PostgreSQL is ready");
                return Ok(());
            }
        }

        self.remove();
        Err(color_eyre::eyre::eyre!(
            "PostgreSQL did not become ready within timeout"
        ))
    }

    fn remove(&self) {
        let _ = cmd!("docker", "stop", self.name).stdout_null().run();
        let _ = cmd!("docker", "rm", self.name).stdout_null().run();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Run `PostgreSQL` backend validation tests
    #[command(visible_alias = "tp")]
    TestPostgres,

    /// Verify schema parity between `SQLite` and `PostgreSQL` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::TestPostgres => test_postgres(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    test_postgres()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("known issue: markdownlint is currently noisy and can be ignored: {err}");
    }
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target").run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Run `PostgreSQL` backend validation tests
///
/// 1. Starts a `PostgreSQL` 16 container on port 5433
/// 2. Waits for it to accept connections (up to 30 seconds)
/// 3. Runs the ignored `backend_validation_tests` from `marquee-persistence`
///    with `DATABASE_URL` and `MARQUEE_TEST_BACKEND=postgres` set
/// 4. Removes the container, whatever the outcome
///
/// Requires Docker, a free port 5433, and libpq for the `postgres` feature.
fn test_postgres() -> Result<()> {
    tracing::info!("Starting PostgreSQL backend validation");

    let container = PostgresContainer {
        name: "marquee-test-postgres",
        db_name: "marquee_test",
        user: "marquee",
        password: "test_password",
        port: "5433",
    };
    container.start()?;

    tracing::info!("Running PostgreSQL backend validation tests");
    let test_result = cmd!(
        "cargo",
        "test",
        "--package",
        "marquee-persistence",
        "--features",
        "postgres",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.database_url())
    .env("MARQUEE_TEST_BACKEND", "postgres")
    .run_with_trace();

    tracing::info!("Stopping PostgreSQL container");
    container.remove();

    test_result.wrap_err("PostgreSQL backend validation tests failed")?;

    tracing::info!("PostgreSQL backend validation completed successfully");
    Ok(())
}

/// Verify schema parity between `SQLite` and `PostgreSQL` migrations
///
/// Applies `migrations/` to an in-memory `SQLite` database and
/// `migrations_postgres/` to a throwaway `PostgreSQL` container, introspects
/// both (tables, columns, types, nullability, keys, unique constraints and
/// indexes), normalizes backend-specific types, and fails on any
/// difference. The container is removed whatever the outcome.
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    tracing::info!("Starting schema parity verification");

    let container = PostgresContainer {
        name: "marquee-verify-migrations",
        db_name: "marquee_verify",
        user: "marquee",
        password: "verify_password",
        port: "5434",
    };
    container.start()?;

    let verification_result = (|| -> Result<()> {
        tracing::info!("Applying SQLite migrations");
        #[allow(clippy::items_after_statements)]
        const SQLITE_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations");

        let mut sqlite_conn = SqliteConnection::establish(":memory:")
            .wrap_err("Failed to create SQLite in-memory database")?;

        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut sqlite_conn)
            .wrap_err("Failed to enable foreign keys on SQLite")?;

        sqlite_conn
            .run_pending_migrations(SQLITE_MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;

        tracing::info!("Applying PostgreSQL migrations");
        #[allow(clippy::items_after_statements)]
        const POSTGRES_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations_postgres");

        let mut pg_conn = PgConnection::establish(&container.database_url())
            .wrap_err("Failed to connect to PostgreSQL")?;

        pg_conn
            .run_pending_migrations(POSTGRES_MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to apply PostgreSQL migrations: {}", e))?;

        tracing::info!("Introspecting schemas");
        let sqlite_schema = introspect_sqlite_schema(&mut sqlite_conn)?;
        let postgres_schema = introspect_postgres_schema(&mut pg_conn)?;

        tracing::info!("Comparing schemas");
        compare_schemas(&sqlite_schema, &postgres_schema)?;

        tracing::info!("✓ Schema parity verification passed");
        Ok(())
    })();

    container.remove();

    verification_result
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<Vec<String>>,
    indexes: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

/// Introspect `SQLite` schema
///
/// Unique indexes count as unique constraints whether they came from a
/// `UNIQUE` column or a `CREATE UNIQUE INDEX`, matching how `PostgreSQL`
/// reports them.
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    // SQLite reports INTEGER PRIMARY KEY as nullable.
                    nullable: col.notnull == 0 && col.pk == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            if idx.origin == "pk" {
                continue;
            }

            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            if idx.unique == 1 {
                table_info.unique_constraints.insert(column_names);
            } else {
                table_info.indexes.insert(column_names);
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Introspect `PostgreSQL` schema in the `public` namespace
fn introspect_postgres_schema(conn: &mut PgConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        table_name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
    }

    #[derive(QueryableByName)]
    struct KeyColumn {
        #[diesel(sql_type = Text)]
        column_name: String,
    }

    #[derive(QueryableByName)]
    #[allow(clippy::struct_field_names)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        referenced_table_name: String,
        #[diesel(sql_type = Text)]
        referenced_column_name: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Bool)]
        is_unique: bool,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT table_name::text AS table_name FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
         AND table_name != '__diesel_schema_migrations' ORDER BY table_name",
    )
    .load(conn)
    .wrap_err("Failed to query PostgreSQL tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(
            "SELECT column_name::text AS column_name, data_type::text AS data_type, \
             is_nullable::text AS is_nullable FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to get columns for table {}", table.table_name))?;

        for col in columns {
            table_info.columns.insert(
                col.column_name,
                Column {
                    normalized_type: normalize_postgres_type(&col.data_type),
                    nullable: col.is_nullable == "YES",
                },
            );
        }

        let primary_keys: Vec<KeyColumn> = diesel::sql_query(
            "SELECT kcu.column_name::text AS column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
               AND tc.table_schema = kcu.table_schema \
             WHERE tc.constraint_type = 'PRIMARY KEY' \
               AND tc.table_schema = 'public' AND tc.table_name = $1",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get primary key for table {}",
            table.table_name
        ))?;
        table_info.primary_keys = primary_keys.into_iter().map(|k| k.column_name).collect();

        let fks: Vec<ForeignKeyInfo> = diesel::sql_query(
            "SELECT kcu.column_name::text AS column_name, \
                    ccu.table_name::text AS referenced_table_name, \
                    ccu.column_name::text AS referenced_column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
               AND tc.table_schema = kcu.table_schema \
             JOIN information_schema.constraint_column_usage ccu \
               ON tc.constraint_name = ccu.constraint_name \
               AND tc.table_schema = ccu.table_schema \
             WHERE tc.constraint_type = 'FOREIGN KEY' \
               AND tc.table_schema = 'public' AND tc.table_name = $1",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get foreign keys for table {}",
            table.table_name
        ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.column_name,
                to_table: fk.referenced_table_name,
                to_column: fk.referenced_column_name,
            });
        }

        // UNIQUE constraints are backed by unique indexes, so one query
        // covers both.
        let indexes: Vec<IndexInfo> = diesel::sql_query(
            "SELECT i.relname::text AS index_name, a.attname::text AS column_name, \
                    ix.indisunique AS is_unique \
             FROM pg_class t \
             JOIN pg_namespace n ON n.oid = t.relnamespace \
             JOIN pg_index ix ON ix.indrelid = t.oid \
             JOIN pg_class i ON i.oid = ix.indexrelid \
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey) \
             WHERE n.nspname = 'public' AND t.relname = $1 AND NOT ix.indisprimary \
             ORDER BY i.relname, array_position(ix.indkey::int2[], a.attnum)",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get indexes for table {}",
            table.table_name
        ))?;

        let mut index_map: BTreeMap<String, (bool, Vec<String>)> = BTreeMap::new();
        for idx in indexes {
            index_map
                .entry(idx.index_name)
                .or_insert_with(|| (idx.is_unique, Vec::new()))
                .1
                .push(idx.column_name);
        }

        for (_name, (is_unique, columns)) in index_map {
            if is_unique {
                table_info.unique_constraints.insert(columns);
            } else {
                table_info.indexes.insert(columns);
            }
        }

        schema.tables.insert(table.table_name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Normalize `PostgreSQL` type to common representation
#[allow(clippy::match_same_arms)]
fn normalize_postgres_type(postgres_type: &str) -> String {
    match postgres_type.to_lowercase().as_str() {
        "smallint" | "integer" | "bigint" => "integer".to_string(),
        "real" | "double precision" | "numeric" => "real".to_string(),
        "bytea" => "blob".to_string(),
        "text" | "character varying" | "character" => "text".to_string(),
        _ => "text".to_string(),
    }
}

/// Compare schemas and fail on the first mismatch
fn compare_schemas(sqlite_schema: &Schema, postgres_schema: &Schema) -> Result<()> {
    let sqlite_tables: BTreeSet<_> = sqlite_schema.tables.keys().collect();
    let postgres_tables: BTreeSet<_> = postgres_schema.tables.keys().collect();

    if sqlite_tables != postgres_tables {
        let mut errors = Vec::new();

        for table in sqlite_tables.difference(&postgres_tables) {
            errors.push(format!(
                "  - Table '{table}' exists in SQLite but not in PostgreSQL"
            ));
        }

        for table in postgres_tables.difference(&sqlite_tables) {
            errors.push(format!(
                "  - Table '{table}' exists in PostgreSQL but not in SQLite"
            ));
        }

        return Err(color_eyre::eyre::eyre!(
            "❌ Schema parity check FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for table_name in sqlite_tables {
        let sqlite_table = &sqlite_schema.tables[table_name];
        let postgres_table = &postgres_schema.tables[table_name];

        let sqlite_columns: BTreeSet<_> = sqlite_table.columns.keys().collect();
        let postgres_columns: BTreeSet<_> = postgres_table.columns.keys().collect();

        if sqlite_columns != postgres_columns {
            let mut errors = Vec::new();

            for col in sqlite_columns.difference(&postgres_columns) {
                errors.push(format!(
                    "    - Column '{col}' exists in SQLite but not in PostgreSQL"
                ));
            }

            for col in postgres_columns.difference(&sqlite_columns) {
                errors.push(format!(
                    "    - Column '{col}' exists in PostgreSQL but not in SQLite"
                ));
            }

            return Err(color_eyre::eyre::eyre!(
                "❌ Schema parity check FAILED: Column mismatch in table '{}'\n{}",
                table_name,
                errors.join("\n")
            ));
        }

        for col_name in sqlite_columns {
            let sqlite_col = &sqlite_table.columns[col_name];
            let postgres_col = &postgres_table.columns[col_name];

            if sqlite_col != postgres_col {
                return Err(color_eyre::eyre::eyre!(
                    "❌ Schema parity check FAILED: Column '{}.{}' differs\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                    table_name,
                    col_name,
                    sqlite_col,
                    postgres_col
                ));
            }
        }

        let checks = [
            (
                "Primary key",
                format!("{:?}", sqlite_table.primary_keys),
                format!("{:?}", postgres_table.primary_keys),
            ),
            (
                "Foreign key",
                format!("{:?}", sqlite_table.foreign_keys),
                format!("{:?}", postgres_table.foreign_keys),
            ),
            (
                "Unique constraint",
                format!("{:?}", sqlite_table.unique_constraints),
                format!("{:?}", postgres_table.unique_constraints),
            ),
            (
                "Index",
                format!("{:?}", sqlite_table.indexes),
                format!("{:?}", postgres_table.indexes),
            ),
        ];

        for (what, sqlite, postgres) in checks {
            if sqlite != postgres {
                return Err(color_eyre::eyre::eyre!(
                    "❌ Schema parity check FAILED: {} mismatch in table '{}'\n  SQLite: {}\n  PostgreSQL: {}",
                    what,
                    table_name,
                    sqlite,
                    postgres
                ));
            }
        }
    }

    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
