use clap::{Parser, Subcommand};
use scv::model::CardKind;

#[derive(Parser, Debug)]
#[command(name = "scv", bin_name = "scv", version)]
#[command(about = "Search and sutta note cards from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a card and select it
    #[command(alias = "n")]
    New {
        /// Kind of card (search or sutta); defaults to the configured kind
        #[arg(value_parser = parse_kind)]
        kind: Option<CardKind>,

        /// Search query or sutta reference
        #[arg(short, long)]
        text: Option<String>,

        /// Custom card name (default: kind label and id)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List cards, oldest first
    #[command(alias = "ls")]
    List {
        /// Only cards of this kind (search or sutta)
        #[arg(value_parser = parse_kind)]
        kind: Option<CardKind>,
    },

    /// Show a card (the selected one by default)
    #[command(alias = "v")]
    Show {
        /// Card reference, e.g. search:2
        key: Option<String>,
    },

    /// Select a card
    #[command(alias = "sel")]
    Select {
        /// Card reference, e.g. sutta:1
        key: String,
    },

    /// Remove cards (the selected one when no reference is given)
    #[command(alias = "rm")]
    Remove {
        /// Card references, e.g. search:1 search:3
        #[arg(num_args = 0..)]
        keys: Vec<String>,
    },

    /// Rename a card; an empty name restores the default title
    Rename {
        /// Card reference
        key: String,

        /// New name
        name: String,
    },

    /// Set the query of a search card or the reference of a sutta card
    Set {
        /// Card reference
        key: String,

        /// Query or reference text
        text: String,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (default-kind, labels-file)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

fn parse_kind(s: &str) -> Result<CardKind, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_with_kind_and_text() {
        let cli = Cli::try_parse_from(["scv", "new", "sutta", "--text", "mn1"]).unwrap();
        match cli.command {
            Some(Commands::New { kind, text, name }) => {
                assert_eq!(kind, Some(CardKind::Sutta));
                assert_eq!(text.as_deref(), Some("mn1"));
                assert_eq!(name, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["scv", "new", "note"]).is_err());
    }

    #[test]
    fn list_takes_an_optional_kind() {
        let cli = Cli::try_parse_from(["scv", "ls", "sutta"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                kind: Some(CardKind::Sutta)
            })
        ));
        let cli = Cli::try_parse_from(["scv", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { kind: None })));
    }

    #[test]
    fn rm_accepts_no_keys() {
        let cli = Cli::try_parse_from(["scv", "rm"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Remove { keys }) if keys.is_empty()));
    }
}
