//! Command handlers for the `weft` CLI.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use weft_ir::LanguageError;
use weft_langs::{markup, sample_manager, script};
use weft_lexer::{LexerConfig, TokenHierarchy, TokenList, TokenListError};

/// Failures of a `weft` command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Language(#[from] LanguageError),
    #[error(transparent)]
    TokenList(#[from] TokenListError),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("invalid value '{value}' for {option}")]
    InvalidValue { option: &'static str, value: String },
}

/// Options of `weft lex`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexOptions {
    /// MIME type of the input; guessed from the file extension when unset.
    pub mime_type: Option<String>,
    /// Print the tokens of embedded languages under their host token.
    pub embedded: bool,
    pub config: LexerConfig,
}

/// Parse `weft lex` flags on top of `config`.
pub fn parse_lex_options(args: &[String], config: LexerConfig) -> Result<LexOptions, CommandError> {
    let mut options = LexOptions {
        config,
        ..LexOptions::default()
    };
    for arg in args {
        if let Some(mime) = arg.strip_prefix("--lang=") {
            options.mime_type = Some(mime.to_owned());
        } else if let Some(max) = arg.strip_prefix("--max-fly-sequence=") {
            let max = max.parse().map_err(|_| CommandError::InvalidValue {
                option: "--max-fly-sequence",
                value: max.to_owned(),
            })?;
            options.config = options.config.with_max_fly_sequence(max);
        } else {
            match arg.as_str() {
                "--embedded" | "-e" => options.embedded = true,
                "--maintain-la-state" => {
                    options.config = options.config.with_maintain_la_state(true);
                }
                "--no-flyweights" => options.config = options.config.with_flyweight_tokens(false),
                _ => return Err(CommandError::UnknownOption(arg.clone())),
            }
        }
    }
    Ok(options)
}

/// MIME type of a sample-language file, by extension.
pub fn mime_type_for_path(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("wm" | "markup") => markup::MIME_TYPE,
        _ => script::MIME_TYPE,
    }
}

/// Lex `text` and render one line per token.
pub fn render_tokens(
    text: &str,
    mime_type: &str,
    options: &LexOptions,
) -> Result<String, CommandError> {
    let (manager, _) = sample_manager()?;
    let mut hierarchy =
        TokenHierarchy::for_mime_type(text, mime_type, manager, options.config, false)?;
    let root = hierarchy.root();
    let count = root.token_count();
    tracing::debug!(mime_type, count, "lexed input");

    let mut out = String::new();
    let _ = writeln!(out, "{} ({count} tokens)", root.language_path().mime_path());
    render_list(&mut out, root, options.embedded, 1);
    Ok(out)
}

fn render_list(out: &mut String, list: &mut dyn TokenList, embedded: bool, depth: usize) {
    let language = Arc::clone(list.language());
    let pad = "  ".repeat(depth);
    for i in 0..list.token_count() {
        let offset = list.token_offset(i);
        let text = list.token_text(i).unwrap_or_default();
        let Some(token) = list.token(i) else {
            break;
        };
        let name = language.token_ids().name(token.id());
        let _ = writeln!(out, "{pad}{offset} {name} {text:?}");
        if embedded {
            if let Some(inner) = list.embedded(i) {
                render_list(out, inner, true, depth + 1);
            }
        }
    }
    for error in list.preprocess_errors() {
        let _ = writeln!(out, "{pad}error: {error}");
    }
}

/// Render every language path reachable from the language of `mime_type`.
pub fn render_language_paths(mime_type: &str) -> Result<String, CommandError> {
    let (manager, _) = sample_manager()?;
    let language = manager
        .find_language(mime_type)
        .ok_or_else(|| TokenListError::LanguageNotFound {
            mime: mime_type.to_owned(),
        })?;
    let mut out = String::new();
    for path in manager.language_paths(&language).iter() {
        let _ = writeln!(out, "{}", path.mime_path());
    }
    Ok(out)
}

/// Lex the file at `path` and print its tokens.
pub fn lex_file(path: &str, options: &LexOptions) -> Result<(), CommandError> {
    let content = read_file(path);
    let mime_type = options
        .mime_type
        .as_deref()
        .unwrap_or_else(|| mime_type_for_path(path));
    print!("{}", render_tokens(&content, mime_type, options)?);
    Ok(())
}

/// Print the language paths of `mime_type`.
pub fn print_language_paths(mime_type: &str) -> Result<(), CommandError> {
    print!("{}", render_language_paths(mime_type)?);
    Ok(())
}

fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
