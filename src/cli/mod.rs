//! Command-line front end: loads account rows, aggregates them and prints the
//! result.

pub mod output;
pub mod render;

use std::{env, path::PathBuf};

use thiserror::Error;

use crate::config::{Config, ConfigError, ConfigManager};
use crate::core::services::{HierarchyService, ServiceError};
use crate::currency::Currency;
use crate::domain::{account::validate_account_type, Displayable};
use crate::errors::{CurrencyError, StorageError};
use crate::storage::load_accounts_from_path;
use crate::utils::build_info;

use output::OutputPreferences;
use render::{render_totals, render_tree, RenderOptions};

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Currency(#[from] CurrencyError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0} account(s) failed balance validation")]
    InvalidAccounts(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Tree,
    Validate,
}

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    command: Command,
    input: PathBuf,
    currency: Option<Currency>,
    config: Option<PathBuf>,
    json: bool,
    no_color: bool,
}

const USAGE: &str = "Usage: budget_accounts_cli <command> <accounts.json> [options]\n\
     Commands:\n  \
     tree       print the rolled-up account tree\n  \
     validate   check balances against account kind rules\n\
     Options:\n  \
     --currency <USD|VND>   display currency (default from config)\n  \
     --config <path>        config file (default ~/.budget_accounts/config/config.json)\n  \
     --json                 print the report as JSON\n  \
     --no-color             disable coloured output\n  \
     --version              print build information";

/// Entry point used by the `budget_accounts_cli` binary.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--version") {
        println!("{}", build_info::current().summary());
        return Ok(());
    }
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    let invocation = parse_args(&args)?;
    run(invocation)
}

fn parse_args(args: &[String]) -> Result<Invocation, CliError> {
    let mut iter = args.iter();
    let command = match iter.next().map(String::as_str) {
        Some("tree") => Command::Tree,
        Some("validate") => Command::Validate,
        Some(other) => return Err(usage(format!("unknown command `{}`", other))),
        None => return Err(usage("missing command")),
    };

    let mut input = None;
    let mut currency = None;
    let mut config = None;
    let mut json = false;
    let mut no_color = false;
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--currency" => {
                let value = iter.next().ok_or_else(|| usage("--currency needs a value"))?;
                currency = Some(value.parse::<Currency>().map_err(|err| usage(err))?);
            }
            "--config" => {
                let value = iter.next().ok_or_else(|| usage("--config needs a path"))?;
                config = Some(PathBuf::from(value));
            }
            "--json" => json = true,
            "--no-color" => no_color = true,
            flag if flag.starts_with("--") => {
                return Err(usage(format!("unknown option `{}`", flag)))
            }
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => return Err(usage(format!("unexpected argument `{}`", extra))),
        }
    }

    Ok(Invocation {
        command,
        input: input.ok_or_else(|| usage("missing accounts file"))?,
        currency,
        config,
        json,
        no_color,
    })
}

fn usage(message: impl Into<String>) -> CliError {
    CliError::Usage(format!("{}\n{}", message.into(), USAGE))
}

fn load_config(path: Option<PathBuf>) -> Result<Config, CliError> {
    let manager = match path {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::from_env()?,
    };
    Ok(manager.load()?)
}

fn run(invocation: Invocation) -> Result<(), CliError> {
    let config = load_config(invocation.config.clone())?;
    output::set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled && !invocation.no_color && !invocation.json,
        quiet_mode: invocation.json,
    });

    let accounts = load_accounts_from_path(&invocation.input)?;
    match invocation.command {
        Command::Validate => {
            let invalid: Vec<_> = accounts
                .iter()
                .filter(|account| {
                    !validate_account_type(account.kind, account.balance, account.limit)
                })
                .collect();
            for account in &invalid {
                output::warning(format!(
                    "{} [{}]: {}",
                    account.display_label(),
                    account.id,
                    account.kind.balance_rule()
                ));
            }
            if invalid.is_empty() {
                output::success(format!("{} account(s) valid", accounts.len()));
                Ok(())
            } else {
                Err(CliError::InvalidAccounts(invalid.len()))
            }
        }
        Command::Tree => {
            let display = invocation.currency.unwrap_or(config.display_currency);
            let rates = config.rate_table()?;
            let report = HierarchyService::summarize(&accounts, display, &rates)?;

            if invocation.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            for id in &report.dangling {
                output::warning(format!("account `{}` has an unknown parent; shown as root", id));
            }
            let options = RenderOptions {
                locale: config.locale.clone(),
                negative_style: config.negative_style,
            };
            output::section(format!("Accounts ({})", display));
            for root in &report.roots {
                for line in render_tree(root, display, &options) {
                    println!("{}", line);
                }
            }
            output::section("Totals");
            for line in render_totals(&report, &options) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}
