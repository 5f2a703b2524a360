//! aisqlite CLI: raw SQL, schema inspection and natural-language queries.

use aisqlite::otel::{init_logging, LogFormat};
use aisqlite::{row_to_json, Config, Database, ExecutionOutcome, FetchMode, ResultSet, SqlAssistant};
use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aisqlite")]
#[command(about = "SQLite with natural-language queries", long_about = None)]
struct Cli {
    /// Database name or path (`.db` appended when missing)
    #[arg(long, short, global = true, env = "AISQLITE_DATABASE")]
    db: Option<String>,

    /// YAML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Completion service API key
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, short, global = true)]
    model: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tables and columns
    Schema {
        /// Include declared column types
        #[arg(long)]
        types: bool,

        /// Print JSON instead of the prompt rendering
        #[arg(long)]
        json: bool,
    },

    /// Execute raw SQL and print rows
    Exec {
        /// SQL statement
        sql: String,

        /// Rows to fetch: -1 all, 0 none, 1 one, N at most N
        #[arg(long, short, default_value = "-1", allow_negative_numbers = true)]
        num: i64,
    },

    /// Generate SQL from natural language without running it
    Generate {
        /// Natural language query
        query: String,
    },

    /// Generate SQL from natural language and run it
    Ask {
        /// Natural language query
        query: String,

        /// Rows to fetch: -1 all, 0 none, 1 one, N at most N
        #[arg(long, short, default_value = "-1", allow_negative_numbers = true)]
        num: i64,

        /// Run generated statements that modify the database
        #[arg(long)]
        allow_modify: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env()?;
            config
        }
        None => Config::from_env()?,
    };

    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn print_rows(rows: &ResultSet) -> anyhow::Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(&row_to_json(row))?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format)?;

    let db = Database::at_path(config.database_path()?, true)
        .with_context(|| format!("Failed to open database '{}'", config.database))?;

    match cli.command {
        Commands::Schema { types, json } => {
            let schema = db.schema(types)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                println!("{}", schema);
            }
        }

        Commands::Exec { sql, num } => {
            let rows = db.execute_and_fetch(&sql, &[], FetchMode::from_count(num))?;
            print_rows(&rows)?;
        }

        Commands::Generate { query } => {
            let assistant = SqlAssistant::new(db, &config)?;
            eprintln!("{} {}", "→".cyan(), query);
            let sql = assistant.generate_query(&query, &config.model).await?;
            println!("{}", sql);
        }

        Commands::Ask {
            query,
            num,
            allow_modify,
        } => {
            let assistant = SqlAssistant::new(db, &config)?;
            eprintln!("{} {}", "→".cyan(), query);

            let outcome = assistant
                .run(&query, &config.model, FetchMode::from_count(num), allow_modify)
                .await?;

            match &outcome {
                ExecutionOutcome::Executed { sql, rows } => {
                    eprintln!("{} {}", "✓".green(), sql.cyan());
                    print_rows(rows)?;
                }
                ExecutionOutcome::Blocked { sql, keyword } => {
                    eprintln!(
                        "{} Query BLOCKED: contains '{}' and may modify the database. \
                         Pass --allow-modify if this is your intention. Query: '''{}'''",
                        "✗".red(),
                        keyword.yellow(),
                        sql
                    );
                    print_rows(&outcome.clone().into_rows())?;
                }
            }
        }
    }

    Ok(())
}
