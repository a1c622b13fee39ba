use clap::{Parser, Subcommand};
use mail::LabelId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Read-only Gmail fetch client", long_about = None)]
pub struct Cli {
    /// Token file (default: ~/.config/sift/token.json)
    #[clap(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// OAuth client secret file (default: ~/.config/sift/credentials.json)
    #[clap(long, global = true)]
    pub credentials_file: Option<PathBuf>,

    /// Print the consent URL instead of opening a browser
    #[clap(long, global = true)]
    pub no_browser: bool,

    /// Enable debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List labels as `id<TAB>name`
    Labels,

    /// Resolve a label name (case-insensitive) to its id
    LabelId {
        name: String,
    },

    /// Fetch full messages by search query and/or labels
    Messages {
        /// Gmail search query, e.g. "from:shop.example newer_than:7d"
        #[clap(short, long, conflicts_with = "label")]
        query: Option<String>,

        /// Label id filter; repeat for several labels
        #[clap(short, long)]
        label: Vec<String>,

        /// Print messages as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the distinct senders of messages carrying the given labels
    Senders {
        /// Label id filter; repeat for several labels
        #[clap(short, long, default_value = LabelId::CATEGORY_PROMOTIONS)]
        label: Vec<String>,

        /// Reduce senders to bare, lowercased email addresses
        #[clap(long)]
        emails_only: bool,
    },

    /// Delete the stored token
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_senders_default_label() {
        let cli = Cli::parse_from(["sift", "senders"]);
        match cli.command {
            Command::Senders { label, emails_only } => {
                assert_eq!(label, vec!["CATEGORY_PROMOTIONS".to_string()]);
                assert!(!emails_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_repeated_labels_and_global_flags() {
        let cli = Cli::parse_from([
            "sift",
            "messages",
            "-l",
            "INBOX",
            "-l",
            "UNREAD",
            "--token-file",
            "/tmp/token.json",
        ]);
        assert_eq!(cli.token_file, Some(PathBuf::from("/tmp/token.json")));
        match cli.command {
            Command::Messages { query, label, json } => {
                assert_eq!(query, None);
                assert_eq!(label, vec!["INBOX", "UNREAD"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_query_conflicts_with_label() {
        let result = Cli::try_parse_from(["sift", "messages", "-q", "is:unread", "-l", "INBOX"]);
        assert!(result.is_err());
    }
}
