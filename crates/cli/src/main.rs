//! ClassKeeper command-line management tool.
//!
//! Provides subcommands for generating and validating configuration
//! files, previewing derived logins, decoding account-control values, and
//! inspecting the encrypted credential history.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::style;
use tracing_subscriber::EnvFilter;

use classkeeper_core::config::AppConfig;
use classkeeper_core::flags;
use classkeeper_core::naming;
use classkeeper_core::store::HistoryDatabase;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// ClassKeeper command-line management tool.
#[derive(Parser, Debug)]
#[command(
    name = "classkeeper",
    version,
    about = "Manage and inspect a ClassKeeper identity bridge"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        short,
        long,
        global = true,
        default_value = "/etc/classkeeper/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./classkeeper.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,

    /// Preview the login and principal name derived for a person.
    Identify {
        /// Surname, as recorded in the catalog.
        surname: String,

        /// Given name, as recorded in the catalog.
        given_name: String,

        /// Collision-attempt counter (0 = first attempt).
        #[arg(short, long, default_value = "0")]
        attempt: u32,
    },

    /// Decode an account-control value into its flags.
    Flags {
        /// The numeric value, as read from the directory.
        value: String,
    },

    /// Inspect the credential history store.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List logins with stored history, or the versions of one login.
    List {
        /// Login to list versions for.
        login: Option<String>,
    },
    /// Show one stored version of a login.
    Show {
        /// Login to inspect.
        login: String,

        /// Version timestamp (RFC 3339). Latest when omitted.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Minimal logging for CLI
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { output } => cmd_init(&output),
        Commands::Validate => cmd_validate(&cli.config),
        Commands::Flags { value } => cmd_flags(&value),
        Commands::Identify {
            surname,
            given_name,
            attempt,
        } => {
            let config = load_config(&cli.config)?;
            cmd_identify(&config, &surname, &given_name, attempt)
        }
        Commands::History { action } => {
            let config = load_config(&cli.config)?;
            cmd_history(&config, action)
        }
    }
}

fn load_config(path: &PathBuf) -> Result<AppConfig> {
    let mut config =
        AppConfig::load_from_file(path).context("failed to load configuration file")?;
    config
        .resolve_env_vars()
        .context("failed to resolve environment variables")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &PathBuf) -> Result<()> {
    let default_config = r#"# ClassKeeper Configuration
# See documentation for all available options.

[general]
log_level = "info"
data_dir = "/var/lib/classkeeper"

[catalog]
host = "db.school.example"
database = "bakalari"
username = "keeper"
password_env = "CATALOG_PASSWORD"

[directory]
host = "dc.school.example"
domain = "school.example"
base_dn = "OU=Uzivatele,DC=school,DC=local"
username = "keeper@school.local"
password_env = "DIRECTORY_PASSWORD"

[store]
file = "users.dat"
passphrase_env = "CLASSKEEPER_STORE_PASSPHRASE"
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the config file with your catalog and directory details");
    println!("  2. Set the referenced environment variables (CATALOG_PASSWORD, etc.)");
    println!(
        "  3. Validate with: classkeeper validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &PathBuf) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    let _ = config.resolve_env_vars();
    println!("  [OK] Environment variable references processed");

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All required fields are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Catalog host    : {}", config.catalog.host);
    println!("  Catalog database: {}", config.catalog.database);
    println!(
        "  Catalog password: {}",
        if config.catalog.password.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!("  Directory host  : {}", config.directory.host);
    println!("  Base DN         : {}", config.directory.base_dn);
    println!(
        "  Bind password   : {}",
        if config.directory.password.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!("  History file    : {}", config.store_path().display());
    println!(
        "  Store passphrase: {}",
        if config.store.passphrase.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );

    Ok(())
}

fn cmd_identify(config: &AppConfig, surname: &str, given_name: &str, attempt: u32) -> Result<()> {
    let login = naming::login(surname, given_name, attempt);
    let principal = naming::principal_name(surname, given_name, &config.directory.domain, attempt);

    println!();
    println!("{}", style("Derived identifiers").bold());
    println!();
    println!("  Logon name    : {}", login);
    println!("  Principal name: {}", principal);
    println!();

    Ok(())
}

fn cmd_flags(value: &str) -> Result<()> {
    let state = flags::parse_state(value).context("could not parse account-control value")?;

    println!();
    println!(
        "{}",
        style(format!("Account control {} (0x{:08X})", state, state)).bold()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Flag", "Value", "Set"]);

    for flag in flags::AccountFlag::ALL {
        let set = flags::has_flag(state, flag);
        let set_cell = if set {
            Cell::new("yes").fg(comfy_table::Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(flag.name()),
            Cell::new(format!("0x{:08X}", flag as u32)),
            set_cell,
        ]);
    }

    println!("{}", table);
    println!();
    let set: Vec<_> = flags::decode(state).iter().map(|f| f.name()).collect();
    if set.is_empty() {
        println!("No flags set.");
    } else {
        println!("Set flags: {}", set.join(" | "));
    }
    println!();

    Ok(())
}

fn cmd_history(config: &AppConfig, action: HistoryAction) -> Result<()> {
    let passphrase = config
        .store
        .passphrase
        .as_deref()
        .context("store passphrase is not set; export the configured environment variable")?;
    let db = HistoryDatabase::load(&config.store_path(), passphrase)
        .context("failed to read the credential history file")?;

    match action {
        HistoryAction::List { login: None } => {
            let logins: Vec<_> = db.logins().collect();
            if logins.is_empty() {
                println!("No credential history stored yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Login", "Versions", "Latest"]);
            for login in logins {
                let versions = db.versions(login);
                let latest = versions
                    .last()
                    .map(|(ts, _)| ts.to_rfc3339())
                    .unwrap_or_default();
                table.add_row(vec![
                    Cell::new(login),
                    Cell::new(versions.len()),
                    Cell::new(latest),
                ]);
            }
            println!("{}", table);
        }
        HistoryAction::List { login: Some(login) } => {
            let versions = db.versions(&login);
            if versions.is_empty() {
                println!("No stored versions for '{}'.", login);
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "Timestamp", "Modified by", "Update type"]);
            for (index, (ts, snapshot)) in versions.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(index),
                    Cell::new(ts.to_rfc3339()),
                    Cell::new(&snapshot.modified_by),
                    Cell::new(&snapshot.update_type),
                ]);
            }
            println!("{}", table);
        }
        HistoryAction::Show { login, at } => {
            let versions = db.versions(&login);
            let snapshot = match at {
                Some(at) => db.find_at(&login, at),
                None => versions.last().map(|(_, snapshot)| snapshot),
            };
            let Some(snapshot) = snapshot else {
                anyhow::bail!("no stored version found for '{}'", login);
            };

            println!();
            println!("{}", style(format!("Credential version for {}", login)).bold());
            println!();
            println!("  Internal id  : {}", snapshot.internal_id);
            println!("  Account type : {}", snapshot.account_type);
            println!("  Permissions  : {}", snapshot.permission_code);
            println!("  Update type  : {}", snapshot.update_type);
            println!("  Modified at  : {}", snapshot.modified_at.to_rfc3339());
            println!("  Modified by  : {}", snapshot.modified_by);
            println!(
                "  Password     : {}",
                match &snapshot.password_method {
                    Some(method) => format!("stored ({})", method),
                    None => "not set".into(),
                }
            );
            println!();
        }
    }

    Ok(())
}
