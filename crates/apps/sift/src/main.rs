//! sift - read-only Gmail fetch client
//!
//! Authenticates once, then lists labels, fetches messages or collects
//! senders and prints the result.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};
use std::collections::BTreeSet;
use std::process::ExitCode;

use cli::{Cli, Command};
use mail::{
    CredentialManager, EmailAddress, FileTokenStore, GmailClient, GoogleOAuth, LabelId,
    MailFetcher, MailPaths, Message, Session,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let paths = MailPaths::resolve(cli.token_file, cli.credentials_file)?;
    debug!("Using token file {}", paths.token_file.display());

    let oauth = if cli.no_browser {
        GoogleOAuth::new().without_browser()
    } else {
        GoogleOAuth::new()
    };
    let manager = CredentialManager::new(FileTokenStore::new(&paths.token_file), oauth)
        .with_client_secret_file(&paths.credentials_file);

    if let Command::Logout = cli.command {
        manager.logout()?;
        println!("Removed {}", paths.token_file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let session = manager.open_session().context("Authentication failed")?;
    let fetcher = MailFetcher::new(GmailClient::new());

    match cli.command {
        Command::Labels => {
            for label in fetcher.try_list_labels(&session)? {
                println!("{}\t{}", label.id, label.name);
            }
        }
        Command::LabelId { name } => match fetcher.try_find_label_id_by_name(&session, &name)? {
            Some(id) => println!("{}", id),
            None => {
                eprintln!("No label named {:?}", name);
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Messages { query, label, json } => {
            let messages = fetch_messages(&fetcher, &session, query, label)?;
            print_messages(&messages, json)?;
        }
        Command::Senders { label, emails_only } => {
            let label_ids = to_label_ids(label);
            let senders = fetcher.try_fetch_senders_by_labels(&session, &label_ids)?;
            let senders = if emails_only {
                bare_addresses(&senders)
            } else {
                senders
            };
            for sender in senders {
                println!("{}", sender);
            }
        }
        Command::Logout => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn fetch_messages(
    fetcher: &MailFetcher<GmailClient>,
    session: &Session,
    query: Option<String>,
    label: Vec<String>,
) -> Result<Vec<Message>> {
    let messages = if label.is_empty() {
        fetcher.try_fetch_messages_by_query(session, query.as_deref().unwrap_or(""))?
    } else {
        fetcher.try_fetch_messages_by_labels(session, &to_label_ids(label))?
    };
    Ok(messages)
}

fn print_messages(messages: &[Message], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(messages)?);
        return Ok(());
    }
    for message in messages {
        println!(
            "{}\t{}\t{}",
            message.id,
            message.sender().unwrap_or("-"),
            message.subject().unwrap_or("(no subject)")
        );
    }
    Ok(())
}

fn to_label_ids(labels: Vec<String>) -> Vec<LabelId> {
    labels.into_iter().map(LabelId::from).collect()
}

/// Collapse `Name <addr>` senders to distinct lowercased addresses
fn bare_addresses(senders: &BTreeSet<String>) -> BTreeSet<String> {
    senders
        .iter()
        .map(|s| EmailAddress::parse(s).normalized())
        .collect()
}
