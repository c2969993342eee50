// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lucid-schema - MySQL Schema Compiler CLI
///
/// Compiles a declarative schema definition into MySQL DDL.
#[derive(Parser, Debug)]
#[command(name = "lucid-schema")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Declarative schema to MySQL DDL compiler")]
#[command(long_about = "lucid-schema - MySQL Schema Compiler

Compiles a declarative schema definition (YAML or JSON) into an ordered MySQL DDL script.

lucid-schema helps you:
  • Resolve primary keys, foreign keys and many-to-many pivot tables
  • Persist the compiled schema for later re-import
  • Import the schema into a configured database namespace
  • Export the DDL script as a SQL dump")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Write .lucid-schema.yaml and db/schema.yaml
  2. Build the schema:              lucid-schema build
  3. Preview the SQL:               lucid-schema sql
  4. Import into the database:      lucid-schema import
  5. Write a SQL dump:              lucid-schema export

For detailed help on each command, use: lucid-schema <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the schema and write the build artifact
    ///
    /// Writes db/build/schema.<namespace>.yaml.
    ///
    /// EXAMPLES:
    ///   # Build for the default namespace
    ///   lucid-schema build
    ///
    ///   # Build for another namespace and keep a backup copy
    ///   lucid-schema build --namespace sample --backup
    Build {
        /// Database namespace
        #[arg(short, long, value_name = "NAMESPACE")]
        namespace: Option<String>,

        /// Also write a ~schema.<namespace>.yaml backup
        #[arg(short, long)]
        backup: bool,
    },

    /// Import the compiled schema into the database
    ///
    /// Drops and recreates every table, then applies the foreign key constraints.
    /// Stops at the first failing statement.
    ///
    /// EXAMPLES:
    ///   lucid-schema import
    ///   lucid-schema import --namespace sample
    Import {
        /// Database namespace
        #[arg(short, long, value_name = "NAMESPACE")]
        namespace: Option<String>,
    },

    /// Export the DDL script as a SQL dump
    ///
    /// Writes db/generated/schema.<namespace>.sql.
    ///
    /// EXAMPLES:
    ///   lucid-schema export
    Export {
        /// Database namespace
        #[arg(short, long, value_name = "NAMESPACE")]
        namespace: Option<String>,
    },

    /// Print the DDL script to standard output
    ///
    /// EXAMPLES:
    ///   lucid-schema sql
    Sql {
        /// Database namespace
        #[arg(short, long, value_name = "NAMESPACE")]
        namespace: Option<String>,
    },
}
