// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! # jact — Jira activity report
//!
//! Pulls one user's activity stream for one day, groups the entries by ticket,
//! looks up each ticket's topix and job numbers (walking up to parent tickets
//! when the topix field is empty) and prints a plain-text report.
//!
//! ## Options
//!
//! | Option            | Description |
//! |-------------------|-------------|
//! | `-u <user>`       | User whose activity is reported (default: `J_DEFAULT_USER`). |
//! | `-d <DD-MM[-YYYY]>` | Day to report (default: today). `DD-MM` means the current year. |
//! | `-v`              | Debug logging on stderr (`RUST_LOG` overrides). |
//!
//! Settings come from the environment; see [`config`] for the variable list.
//!
//! ## Report layout
//!
//! A date line starts each new day. Each ticket gets a block with its browse URL,
//! topix/job numbers, and every activity title and body converted to plain text.

mod config;
mod error;
mod feed;
mod grouping;
mod jira;
mod report;

use std::io::{self, Write};
use std::process;

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::jira::{FieldResolver, JiraClient, QueryWindow};

#[derive(Debug, Parser)]
#[command(name = "jact", version, about = "Daily Jira activity report grouped by ticket")]
struct Cli {
    /// User name (default: J_DEFAULT_USER)
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// Day to report, DD-MM-YYYY or DD-MM (default: today)
    #[arg(short = 'd', long = "date")]
    date: Option<String>,

    /// Log requests and parent-chain walks to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,jact=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .init();
}

/// Parses `DD-MM-YYYY`, or `DD-MM` in the year of `today`.
fn parse_date_arg(arg: &str, today: NaiveDate) -> Result<NaiveDate> {
    let arg = arg.trim();
    let full = if arg.matches('-').count() == 1 {
        format!("{}-{}", arg, today.year())
    } else {
        arg.to_string()
    };
    NaiveDate::parse_from_str(&full, "%d-%m-%Y").map_err(|_| {
        Error::Argument(format!(
            "invalid date \"{}\": expected DD-MM or DD-MM-YYYY",
            arg
        ))
    })
}

/// The `-u` value if given, else the configured default. Empty is an error.
fn effective_user(arg: Option<&str>, config: &Config) -> Result<String> {
    let user = arg.unwrap_or(&config.default_user).trim();
    if user.is_empty() {
        return Err(Error::Argument("username can't be empty".to_string()));
    }
    Ok(user.to_string())
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?;
    let user = effective_user(cli.user.as_deref(), &config)?;
    let today = Local::now().date_naive();
    let date = match cli.date.as_deref() {
        Some(d) => parse_date_arg(d, today)?,
        None => today,
    };
    let window = QueryWindow::for_date(date, config.utc_offset_hours);
    tracing::debug!(%user, %date, from = %window.from, to = %window.to, "query window");

    let client = JiraClient::new(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_banner(&mut out, &user, &window)?;

    let body = client.fetch_activity(&user, &window)?;
    let feed = feed::parse_feed(&body)?;
    let groups = grouping::group_entries(&feed.entries);
    tracing::debug!(
        feed = %feed.title,
        id = %feed.id,
        entries = feed.entries.len(),
        groups = groups.len(),
        skipped = groups.skipped.len(),
        "feed grouped"
    );

    let resolver = FieldResolver::new(&client, &config);
    report::write_report(&mut out, &groups, &resolver, &config)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(()) => {}
        Err(e) if e.is_broken_pipe() => {}
        Err(e) => {
            eprintln!("jact: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use clap::CommandFactory;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_short_flags() {
        let cli = Cli::try_parse_from(["jact", "-u", "jdoe", "-d", "05-03", "-v"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("jdoe"));
        assert_eq!(cli.date.as_deref(), Some("05-03"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["jact"]).unwrap();
        assert!(cli.user.is_none());
        assert!(cli.date.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_date_arg_full() {
        let today = day(2026, 10, 16);
        assert_eq!(parse_date_arg("05-03-2024", today).unwrap(), day(2024, 3, 5));
    }

    #[test]
    fn test_parse_date_arg_uses_current_year() {
        let today = day(2026, 10, 16);
        assert_eq!(parse_date_arg("05-03", today).unwrap(), day(2026, 3, 5));
        assert_eq!(parse_date_arg(" 31-12 ", today).unwrap(), day(2026, 12, 31));
    }

    #[test]
    fn test_parse_date_arg_invalid() {
        let today = day(2026, 10, 16);
        for bad in ["", "tomorrow", "32-01", "05-13-2024", "2024-03-05", "05/03"] {
            let err = parse_date_arg(bad, today).unwrap_err();
            assert!(matches!(err, Error::Argument(_)), "{}: {:?}", bad, err);
        }
    }

    #[test]
    fn test_effective_user() {
        let cfg = sample_config();
        assert_eq!(effective_user(None, &cfg).unwrap(), "jdoe");
        assert_eq!(effective_user(Some("asmith"), &cfg).unwrap(), "asmith");
        assert!(matches!(effective_user(Some("  "), &cfg), Err(Error::Argument(_))));
    }
}
