//! `grammar` CLI: mixed Tamil–English correction and friends.
//!
//! Prints the transformed text on stdout. Failures go to stderr with a stable
//! exit code per failure kind (see [`grammar::exit_codes`]).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use grammar::commands::{key_delete, key_set, key_show, read_text, run_operation};
use grammar::exit_codes;
use grammar::io::credentials::API_KEY_ENV;
use grammar::io::paths::{DEFAULT_STATE_DIR, GrammarPaths};
use grammar::{Operation, SuggestLanguage, TransformRequest};

#[derive(Parser)]
#[command(
    name = "grammar",
    version,
    about = "Mixed Tamil-English text correction backed by a generative model"
)]
struct Cli {
    /// Directory holding config.toml and credentials.json.
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    /// Abort the operation after this many seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert phonetic Tamil to Tamil script, then correct grammar.
    Correct {
        /// Text to transform (`-` reads stdin).
        text: String,
        /// Free-text instruction that shapes the output (e.g. "formal tone").
        #[arg(short, long)]
        context: Option<String>,
    },
    /// Reshape mixed text according to a context instruction.
    Augment {
        text: String,
        #[arg(short, long)]
        context: String,
    },
    /// Summarize text in a target language.
    Summarize {
        text: String,
        /// Source language (leave blank to auto-detect).
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Translate text into a target language.
    Translate {
        text: String,
        #[arg(long, default_value = "Tamil")]
        to: String,
    },
    /// Write a longer version of the text in the same language.
    Elaborate { text: String },
    /// Suggest the sentence that should follow the text.
    Suggest {
        text: String,
        #[arg(long, value_enum, default_value_t = LangArg::Tamil)]
        lang: LangArg,
    },
    /// Manage the stored API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key.
    Set { key: String },
    /// Show whether a key is configured (masked).
    Show,
    /// Delete the stored key.
    Delete,
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    Tamil,
    English,
}

impl From<LangArg> for SuggestLanguage {
    fn from(lang: LangArg) -> Self {
        match lang {
            LangArg::Tamil => SuggestLanguage::Tamil,
            LangArg::English => SuggestLanguage::English,
        }
    }
}

#[tokio::main]
async fn main() {
    grammar::logging::init();
    let code = match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let paths = GrammarPaths::new(&cli.state_dir);
    let env_key = std::env::var(API_KEY_ENV).ok();

    let operation = match cli.command {
        Command::Key { action } => return run_key(&paths, action, env_key),
        Command::Correct { text, context } => Operation::Correct(
            TransformRequest::new(read_text(&text)?).with_optional_context(context.as_deref()),
        ),
        Command::Augment { text, context } => Operation::Augment {
            text: read_text(&text)?,
            context,
        },
        Command::Summarize { text, from, to } => Operation::Summarize {
            text: read_text(&text)?,
            from_lang: from,
            to_lang: to,
        },
        Command::Translate { text, to } => Operation::Translate {
            text: read_text(&text)?,
            to_lang: to,
        },
        Command::Elaborate { text } => Operation::Elaborate {
            text: read_text(&text)?,
        },
        Command::Suggest { text, lang } => Operation::SuggestNext {
            text: read_text(&text)?,
            language: lang.into(),
        },
    };

    let timeout = cli.timeout.map(Duration::from_secs);
    match run_operation(&paths, env_key, operation, timeout).await? {
        Ok(text) => {
            println!("{text}");
            Ok(exit_codes::OK)
        }
        Err(err) => {
            eprintln!("error ({}): {}", err.kind(), err);
            Ok(exit_codes::for_kind(err.kind()))
        }
    }
}

fn run_key(paths: &GrammarPaths, action: KeyAction, env_key: Option<String>) -> Result<i32> {
    match action {
        KeyAction::Set { key } => {
            key_set(paths, &key)?;
            println!("API key saved");
        }
        KeyAction::Show => println!("{}", key_show(paths, env_key)?),
        KeyAction::Delete => {
            if key_delete(paths)? {
                println!("API key deleted");
            } else {
                println!("No API key stored");
            }
        }
    }
    Ok(exit_codes::OK)
}
