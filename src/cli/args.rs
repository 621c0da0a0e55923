//! Command-line argument parsing for the fbot CLI.
//!
//! ```text
//! fbot [--debug] [command] [args...]
//! ```
//!
//! With no command the interactive chat starts.

use thiserror::Error;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List conversations
    List,
    /// Create a conversation and print its id
    New,
    /// Print a conversation's history
    History(String),
    /// Send one message and print the reply
    Send { id: String, message: String },
    Rename { id: String, title: String },
    Delete(String),
    /// Purge conversations without messages
    Cleanup,
    /// Interactive chat (default)
    Chat,
}

/// Everything parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Verbose logging on stderr
    pub debug: bool,
    pub command: CliCommand,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown flag '{0}'")]
    UnknownFlag(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
}

/// Usage text printed by `fbot --help`.
pub const USAGE: &str = "\
Usage: fbot [--debug] [command]

Commands:
  list                     List your conversations
  new                      Start a conversation and print its id
  history <id>             Show a conversation
  send <id> <message...>   Send a message and print the reply
  rename <id> <title...>   Rename a conversation
  delete <id>              Delete a conversation
  cleanup                  Remove conversations without messages
  chat                     Interactive chat (default)

Flags:
  --debug                  Verbose logging (overridden by FBOT_LOG)
  -V, --version            Print the version
  -h, --help               Print this help

Environment:
  FBOT_API_URL, FBOT_TOKEN, FBOT_USER_NAME, FBOT_HISTORY_WINDOW, FBOT_LOG";

/// Parse command-line arguments.
///
/// `args` includes the program name, as `std::env::args()` does.
/// `--version` and `--help` win wherever they appear.
///
/// # Examples
///
/// ```
/// use fbot::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["fbot".to_string(), "history".to_string(), "42".to_string()];
/// let parsed = parse_args(args.into_iter()).unwrap();
/// assert_eq!(parsed.command, CliCommand::History("42".to_string()));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut debug = false;
    let mut positional = Vec::new();

    // Skip the program name
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                return Ok(CliArgs {
                    debug,
                    command: CliCommand::Version,
                })
            }
            "--help" | "-h" => {
                return Ok(CliArgs {
                    debug,
                    command: CliCommand::Help,
                })
            }
            "--debug" => debug = true,
            flag if flag.starts_with("--") && positional.is_empty() => {
                return Err(ArgsError::UnknownFlag(flag.to_string()))
            }
            _ => positional.push(arg),
        }
    }

    let command = parse_command(positional)?;
    Ok(CliArgs { debug, command })
}

fn parse_command(positional: Vec<String>) -> Result<CliCommand, ArgsError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(CliCommand::Chat);
    };

    let command = match name.as_str() {
        "list" => CliCommand::List,
        "new" => CliCommand::New,
        "cleanup" => CliCommand::Cleanup,
        "chat" => CliCommand::Chat,
        "help" => CliCommand::Help,
        "history" => CliCommand::History(required(words.next(), "history", "a conversation id")?),
        "delete" => CliCommand::Delete(required(words.next(), "delete", "a conversation id")?),
        "send" => {
            let id = required(words.next(), "send", "a conversation id")?;
            let message = required(joined(words), "send", "a message")?;
            CliCommand::Send { id, message }
        }
        "rename" => {
            let id = required(words.next(), "rename", "a conversation id")?;
            let title = required(joined(words), "rename", "a title")?;
            CliCommand::Rename { id, title }
        }
        _ => return Err(ArgsError::UnknownCommand(name)),
    };
    Ok(command)
}

fn required(
    value: Option<String>,
    command: &'static str,
    what: &'static str,
) -> Result<String, ArgsError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ArgsError::MissingArgument { command, what })
}

/// Remaining words joined with spaces, so quoting is optional.
fn joined(words: impl Iterator<Item = String>) -> Option<String> {
    let text = words.collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
