//! CLI module for fbot.
//!
//! One-shot commands (`list`, `send`, ...) and the interactive chat loop,
//! all driven through a [`ChatSession`].
//!
//! ```ignore
//! use fbot::cli::{parse_args, run_cli_command};
//!
//! let args = parse_args(std::env::args())?;
//! run_cli_command(args.command, config).await?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ArgsError, CliArgs, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::chat::{ChatSession, SendOutcome};
use crate::cli_output::{
    icons, print_header, print_notices, print_prompt, print_separator, print_status_line,
    render_conversation_list, TerminalRenderer,
};
use crate::config::ClientConfig;
use crate::traits::HttpClient;

/// Run a parsed command against the configured backend.
pub async fn run_cli_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let http = ReqwestHttpClient::with_connect_timeout(config.request_timeout())?;
    let mut chat = ChatSession::new(http, &config);
    let mut renderer = TerminalRenderer::default();

    let result = match command {
        CliCommand::Chat => run_interactive(&mut chat, &mut renderer).await,
        other => execute(&mut chat, &mut renderer, other).await,
    };
    flush_notices(&mut chat);
    result
}

/// Execute a one-shot command.
pub async fn execute<C: HttpClient>(
    chat: &mut ChatSession<C>,
    renderer: &mut TerminalRenderer,
    command: CliCommand,
) -> Result<()> {
    debug!(?command, "executing command");
    match command {
        CliCommand::List => {
            if !chat.load_conversations().await {
                bail!("could not load conversations");
            }
            println!("{}", render_conversation_list(chat.conversations()));
        }
        CliCommand::New => {
            let id = chat
                .create_conversation()
                .await
                .ok_or_else(|| eyre!("could not create a conversation"))?;
            println!("{}", id);
        }
        CliCommand::History(id) => {
            open(chat, &id).await?;
            println!("{}", renderer.render_transcript(chat.transcript()));
        }
        CliCommand::Send { id, message } => {
            open(chat, &id).await?;
            send_and_print(chat, renderer, &message).await?;
        }
        CliCommand::Rename { id, title } => {
            if !chat.track_conversation(&id) {
                bail!("conversation {} no longer exists", id);
            }
            if !chat.rename_conversation(&id, &title).await {
                bail!("title was not saved");
            }
            print_status_line(icons::SUCCESS, "Conversation renamed.");
        }
        CliCommand::Delete(id) => {
            if !chat.track_conversation(&id) {
                bail!("conversation {} no longer exists", id);
            }
            if !chat.delete_conversation(&id).await {
                bail!("could not delete conversation {}", id);
            }
        }
        CliCommand::Cleanup => {
            if chat.cleanup_empty_conversations().await.is_none() {
                bail!("cleanup failed");
            }
        }
        CliCommand::Chat | CliCommand::Version | CliCommand::Help => {}
    }
    Ok(())
}

async fn open<C: HttpClient>(chat: &mut ChatSession<C>, id: &str) -> Result<()> {
    if !chat.open_conversation(id).await {
        bail!("conversation {} no longer exists", id);
    }
    Ok(())
}

/// Send one message, letting Ctrl-C abandon the reply, and print what was
/// appended for it.
async fn send_and_print<C: HttpClient>(
    chat: &mut ChatSession<C>,
    renderer: &mut TerminalRenderer,
    message: &str,
) -> Result<()> {
    let handle = chat.cancellation_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    let result = chat.send_message(message).await;
    watcher.abort();

    match result? {
        SendOutcome::Cancelled => print_status_line(icons::WARNING, "Reply cancelled."),
        SendOutcome::Replied { .. } | SendOutcome::Apologized { .. } => {
            if let Some(reply) = chat.transcript().last() {
                println!("{}", renderer.render_message(reply));
            }
        }
    }
    Ok(())
}

fn flush_notices<C: HttpClient>(chat: &mut ChatSession<C>) {
    print_notices(&chat.notices_mut().drain());
}

/// Slash commands understood by the interactive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    Quit,
    New,
    List,
    Select(String),
    Rename(String),
    Delete,
    More,
    Search(String),
    Help,
    Message(String),
    Empty,
}

const CHAT_HELP: &str = "\
/new              start a conversation
/list             list conversations
/select <id>      switch conversation
/rename <title>   rename this conversation
/delete           delete this conversation
/more             show older messages
/search <text>    find messages in this conversation
/quit             leave";

fn parse_chat_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    match name {
        "quit" | "exit" | "q" => ChatInput::Quit,
        "new" => ChatInput::New,
        "list" => ChatInput::List,
        "select" if !rest.is_empty() => ChatInput::Select(rest.to_string()),
        "rename" if !rest.is_empty() => ChatInput::Rename(rest.to_string()),
        "delete" => ChatInput::Delete,
        "more" => ChatInput::More,
        "search" if !rest.is_empty() => ChatInput::Search(rest.to_string()),
        "help" => ChatInput::Help,
        _ => ChatInput::Message(line.to_string()),
    }
}

/// Interactive chat on stdin/stdout until `/quit`, EOF or Ctrl-C at the
/// prompt. Ctrl-C while a reply is streaming only abandons that reply.
async fn run_interactive<C: HttpClient>(
    chat: &mut ChatSession<C>,
    renderer: &mut TerminalRenderer,
) -> Result<()> {
    print_header(&format!("FBOT {}", VERSION));
    chat.load_conversations().await;
    println!("{}", renderer.render_transcript(chat.transcript()));
    flush_notices(chat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt("\n> ");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_chat_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Empty => {}
            ChatInput::Help => println!("{}", CHAT_HELP),
            ChatInput::New => {
                if let Some(id) = chat.create_conversation().await {
                    print_status_line(icons::SUCCESS, &format!("Started conversation {}", id));
                }
            }
            ChatInput::List => {
                chat.refresh_conversations().await;
                println!("{}", render_conversation_list(chat.conversations()));
            }
            ChatInput::Select(id) => {
                if chat.open_conversation(&id).await {
                    print_separator();
                    println!("{}", renderer.render_transcript(chat.transcript()));
                }
            }
            ChatInput::Rename(title) => match chat.selected_id().map(str::to_string) {
                Some(id) => {
                    chat.rename_conversation(&id, &title).await;
                }
                None => print_status_line(icons::WARNING, "No conversation selected."),
            },
            ChatInput::Delete => match chat.selected_id().map(str::to_string) {
                Some(id) => {
                    chat.delete_conversation(&id).await;
                }
                None => print_status_line(icons::WARNING, "No conversation selected."),
            },
            ChatInput::More => {
                let step = chat.transcript().visible_messages().len().max(1);
                if chat.transcript_mut().load_older(step) == 0 {
                    print_status_line(icons::INFO, "No older messages.");
                } else {
                    print_separator();
                    println!("{}", renderer.render_transcript(chat.transcript()));
                }
            }
            ChatInput::Search(query) => {
                let hits: Vec<_> = chat.transcript().search(&query).into_iter().cloned().collect();
                if hits.is_empty() {
                    print_status_line(icons::INFO, "No matching messages.");
                }
                for message in &hits {
                    print_separator();
                    println!("{}", renderer.render_message(message));
                }
            }
            ChatInput::Message(text) => {
                if let Err(err) = send_and_print(chat, renderer, &text).await {
                    print_status_line(icons::FAILURE, &err.to_string());
                }
            }
        }
        flush_notices(chat);
    }

    chat.logout();
    Ok(())
}
