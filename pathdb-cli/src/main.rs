use clap::{Parser, Subcommand, ValueEnum};
use pathdb::predicate::{self, Predicate};
use pathdb::{PathDbError, Store, StoreOptions};
use std::path::PathBuf;
use std::process;

/// pathdb CLI — read and write a pathdb database file from the command line
#[derive(Parser)]
#[command(name = "pathdb", version, about)]
struct Cli {
    /// YAML options file (dir, name, filename, raw); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the database file
    #[arg(long, env = "PATHDB_DIR")]
    dir: Option<PathBuf>,

    /// Database name
    #[arg(long, env = "PATHDB_NAME")]
    name: Option<String>,

    /// Override the database file's base name
    #[arg(long)]
    filename: Option<String>,

    /// Return plain values instead of live objects
    #[arg(long)]
    raw: bool,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Command {
    /// Print the whole document
    All,

    /// Get the value at an ID
    Get {
        /// Dot-separated ID (e.g. users.0001.name)
        id: String,
    },

    /// Set the value at an ID, overwriting what is there
    Set {
        id: String,
        /// Value as JSON; anything that isn't valid JSON is stored as a string
        value: String,
    },

    /// Set the value at an ID only if nothing truthy is stored there yet
    Create {
        id: String,
        /// Value as JSON; anything that isn't valid JSON is stored as a string
        value: String,
    },

    /// Delete the value at an ID
    Delete {
        id: String,
        /// Show what would be deleted without actually deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a truthy value is stored at an ID
    Exists { id: String },

    /// Print the first entry matching every predicate
    Find {
        /// ID to scan under (default: the whole document)
        #[arg(long)]
        from: Option<String>,
        /// Predicate: field=value, field!=value, field~regex or field?
        #[arg(long = "where", required = true)]
        predicates: Vec<String>,
    },

    /// Print every entry matching every predicate
    Filter {
        /// ID to scan under (default: the whole document)
        #[arg(long)]
        from: Option<String>,
        /// Predicate: field=value, field!=value, field~regex or field?
        #[arg(long = "where")]
        predicates: Vec<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{}: {e}", e.kind());
        process::exit(1);
    }
}

fn resolve_options(cli: &Cli) -> pathdb::Result<StoreOptions> {
    let mut options = match &cli.config {
        Some(path) => StoreOptions::from_file(path)?,
        None => {
            let dir = cli.dir.clone().ok_or_else(|| {
                PathDbError::InvalidOptions("The directory path is required (--dir)".into())
            })?;
            let name = cli.name.clone().ok_or_else(|| {
                PathDbError::InvalidOptions("The name of the database is required (--name)".into())
            })?;
            StoreOptions::new(dir, name)
        }
    };

    if cli.config.is_some() {
        if let Some(dir) = &cli.dir {
            options.directory = dir.clone();
        }
        if let Some(name) = &cli.name {
            options.name = name.clone();
        }
    }
    if let Some(filename) = &cli.filename {
        options.filename = Some(filename.clone());
    }
    if cli.raw {
        options.raw = true;
    }
    Ok(options)
}

fn run(cli: Cli) -> pathdb::Result<()> {
    let options = resolve_options(&cli)?;
    log::debug!("Opening database at {}", options.file_path().display());
    let store = Store::open(options)?;

    match cli.command {
        Command::All => {
            let all = store.all()?;
            print_output(&serde_json::to_value(&all)?, &cli.format)?;
        }

        Command::Get { id } => {
            let item = store.get(&id)?;
            print_output(&serde_json::to_value(&item)?, &cli.format)?;
        }

        Command::Set { id, value } => {
            let stored = store.set(&id, predicate::parse_literal(&value))?;
            print_output(&stored.to_json(), &cli.format)?;
        }

        Command::Create { id, value } => {
            let stored = store.create(&id, predicate::parse_literal(&value))?;
            print_output(&stored.to_json(), &cli.format)?;
        }

        Command::Delete { id, dry_run } => {
            if dry_run {
                if !store.exists(&id)? {
                    return Err(PathDbError::NotFound { id });
                }
                let item = store.get(&id)?;
                print_output(
                    &serde_json::json!({
                        "dry_run": true,
                        "would_delete": id,
                        "value": item,
                    }),
                    &cli.format,
                )?;
            } else {
                let previous = store.delete(&id)?;
                print_output(&previous.to_json(), &cli.format)?;
            }
        }

        Command::Exists { id } => {
            let exists = store.exists(&id)?;
            print_output(&serde_json::json!(exists), &cli.format)?;
        }

        Command::Find { from, predicates } => {
            let predicates = parse_predicates(&predicates)?;
            let found = store.find(|v| predicate::all_match(&predicates, v), from.as_deref())?;
            print_output(&serde_json::to_value(&found)?, &cli.format)?;
        }

        Command::Filter { from, predicates } => {
            let predicates = parse_predicates(&predicates)?;
            let filtered =
                store.filter(|v| predicate::all_match(&predicates, v), from.as_deref())?;
            print_output(&serde_json::to_value(&filtered)?, &cli.format)?;
        }
    }

    Ok(())
}

fn parse_predicates(texts: &[String]) -> pathdb::Result<Vec<Predicate>> {
    texts.iter().map(|t| Predicate::parse(t)).collect()
}

fn print_output(value: &serde_json::Value, format: &OutputFormat) -> pathdb::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
        }
    }
    Ok(())
}
