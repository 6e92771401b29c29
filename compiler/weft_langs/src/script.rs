//! `text/x-script`: a small C-like language read through `\uXXXX` escapes.

use logos::Logos;
use weft_ir::{EmbeddingQuery, EmbeddingSpec, LanguageHierarchy, TokenIdDef};
use weft_lexer_core::{
    CharPreprocessor, LexedToken, Lexer, LexerInput, LexerState, TokenId, UnicodeEscapes,
};

pub const MIME_TYPE: &str = "text/x-script";

pub const WHITESPACE: TokenId = TokenId(0);
pub const IDENTIFIER: TokenId = TokenId(1);
pub const NUMBER: TokenId = TokenId(2);
pub const STRING: TokenId = TokenId(3);
pub const LINE_COMMENT: TokenId = TokenId(4);
pub const BLOCK_COMMENT: TokenId = TokenId(5);
pub const LET: TokenId = TokenId(6);
pub const FN: TokenId = TokenId(7);
pub const IF: TokenId = TokenId(8);
pub const ELSE: TokenId = TokenId(9);
pub const RETURN: TokenId = TokenId(10);
pub const WHILE: TokenId = TokenId(11);
pub const LPAREN: TokenId = TokenId(12);
pub const RPAREN: TokenId = TokenId(13);
pub const LBRACE: TokenId = TokenId(14);
pub const RBRACE: TokenId = TokenId(15);
pub const SEMICOLON: TokenId = TokenId(16);
pub const COMMA: TokenId = TokenId(17);
pub const DOT: TokenId = TokenId(18);
pub const EQ: TokenId = TokenId(19);
pub const PLUS: TokenId = TokenId(20);
pub const MINUS: TokenId = TokenId(21);
pub const STAR: TokenId = TokenId(22);
pub const SLASH: TokenId = TokenId(23);
pub const ERROR: TokenId = TokenId(24);

/// Lexer state inside a block comment that reached the end of its input.
pub const IN_BLOCK_COMMENT: i32 = 1;

const TOKEN_IDS: [TokenIdDef; 25] = [
    TokenIdDef::new("whitespace", WHITESPACE.0).with_category("whitespace"),
    TokenIdDef::new("identifier", IDENTIFIER.0),
    TokenIdDef::new("number", NUMBER.0).with_category("literal"),
    TokenIdDef::new("string", STRING.0).with_category("literal"),
    TokenIdDef::new("line-comment", LINE_COMMENT.0).with_category("comment"),
    TokenIdDef::new("block-comment", BLOCK_COMMENT.0).with_category("comment"),
    TokenIdDef::new("let", LET.0).with_category("keyword"),
    TokenIdDef::new("fn", FN.0).with_category("keyword"),
    TokenIdDef::new("if", IF.0).with_category("keyword"),
    TokenIdDef::new("else", ELSE.0).with_category("keyword"),
    TokenIdDef::new("return", RETURN.0).with_category("keyword"),
    TokenIdDef::new("while", WHILE.0).with_category("keyword"),
    TokenIdDef::new("lparen", LPAREN.0).with_category("separator"),
    TokenIdDef::new("rparen", RPAREN.0).with_category("separator"),
    TokenIdDef::new("lbrace", LBRACE.0).with_category("separator"),
    TokenIdDef::new("rbrace", RBRACE.0).with_category("separator"),
    TokenIdDef::new("semicolon", SEMICOLON.0).with_category("separator"),
    TokenIdDef::new("comma", COMMA.0).with_category("separator"),
    TokenIdDef::new("dot", DOT.0).with_category("separator"),
    TokenIdDef::new("eq", EQ.0).with_category("operator"),
    TokenIdDef::new("plus", PLUS.0).with_category("operator"),
    TokenIdDef::new("minus", MINUS.0).with_category("operator"),
    TokenIdDef::new("star", STAR.0).with_category("operator"),
    TokenIdDef::new("slash", SLASH.0).with_category("operator"),
    TokenIdDef::new("error", ERROR.0).with_category("error"),
];

/// Words of the script language.
///
/// Logos picks the longest match, so `letter` is an identifier and not
/// `let` followed by `ter`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    #[token("let")]
    Let,
    #[token("fn")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
    #[token("while")]
    While,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
}

impl Word {
    /// Classify a whole identifier-shaped word. Non-ASCII words are
    /// identifiers.
    fn classify(text: &str) -> Word {
        let mut lexer = Word::lexer(text);
        match lexer.next() {
            Some(Ok(word)) if lexer.remainder().is_empty() => word,
            _ => Word::Identifier,
        }
    }

    fn keyword(self) -> Option<(TokenId, &'static str)> {
        match self {
            Word::Let => Some((LET, "let")),
            Word::Function => Some((FN, "fn")),
            Word::If => Some((IF, "if")),
            Word::Else => Some((ELSE, "else")),
            Word::Return => Some((RETURN, "return")),
            Word::While => Some((WHILE, "while")),
            Word::Identifier => None,
        }
    }
}

pub struct ScriptLanguage;

impl LanguageHierarchy for ScriptLanguage {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    fn token_ids(&self) -> Vec<TokenIdDef> {
        TOKEN_IDS.to_vec()
    }

    fn create_lexer(&self, state: Option<LexerState>) -> Box<dyn Lexer> {
        Box::new(ScriptLexer {
            in_comment: state.and_then(|state| state.as_int()) == Some(IN_BLOCK_COMMENT),
        })
    }

    fn preprocessor(&self) -> Option<&dyn CharPreprocessor> {
        Some(&UnicodeEscapes)
    }

    /// String literals embed their content without the quotes.
    fn embedding(&self, query: &EmbeddingQuery<'_>) -> Option<EmbeddingSpec> {
        if query.id != STRING {
            return None;
        }
        Some(
            EmbeddingSpec::new(crate::string_escapes::MIME_TYPE)
                .with_skips(1, u32::from(is_closed_string(query.text))),
        )
    }

    fn embedding_depends_on_text(&self, id: TokenId) -> bool {
        id == STRING
    }
}

/// Whether a string literal token ends with its closing quote.
fn is_closed_string(text: &str) -> bool {
    let mut chars = text.chars();
    if chars.next() != Some('"') {
        return false;
    }
    let mut escaped = false;
    let mut closed = false;
    for ch in chars {
        closed = ch == '"' && !escaped;
        escaped = ch == '\\' && !escaped;
    }
    closed
}

struct ScriptLexer {
    in_comment: bool,
}

impl ScriptLexer {
    /// Rest of a block comment after its opening `/*`, or after a section
    /// break inside one.
    fn block_comment(&mut self, input: &mut LexerInput<'_>) -> LexedToken {
        let mut star = false;
        loop {
            match input.read() {
                Some('/') if star => {
                    self.in_comment = false;
                    break;
                }
                Some(ch) => star = ch == '*',
                None => {
                    self.in_comment = true;
                    break;
                }
            }
        }
        input.token(BLOCK_COMMENT)
    }
}

impl Lexer for ScriptLexer {
    fn next_token(&mut self, input: &mut LexerInput<'_>) -> Option<LexedToken> {
        let first = input.read()?;
        if self.in_comment {
            input.backup(1);
            return Some(self.block_comment(input));
        }
        let token = match first {
            c if c.is_whitespace() => {
                while input.read().is_some_and(char::is_whitespace) {}
                input.backup(1);
                input.token(WHITESPACE)
            }
            c if c.is_alphabetic() || c == '_' => {
                while input.read().is_some_and(|c| c.is_alphanumeric() || c == '_') {}
                input.backup(1);
                match Word::classify(&input.read_text()).keyword() {
                    Some((id, text)) => input.fly_token(id, text),
                    None => input.token(IDENTIFIER),
                }
            }
            c if c.is_ascii_digit() => {
                while input.read().is_some_and(|c| c.is_ascii_digit()) {}
                input.backup(1);
                input.token(NUMBER)
            }
            '"' => {
                let mut escaped = false;
                loop {
                    match input.read() {
                        Some('"') if !escaped => break,
                        Some('\n') => {
                            input.backup(1);
                            break;
                        }
                        Some(ch) => escaped = ch == '\\' && !escaped,
                        None => break,
                    }
                }
                input.token(STRING)
            }
            '/' => match input.read() {
                Some('/') => {
                    while !matches!(input.read(), Some('\n') | None) {}
                    input.backup(1);
                    input.token(LINE_COMMENT)
                }
                Some('*') => self.block_comment(input),
                _ => {
                    input.backup(1);
                    input.fly_token(SLASH, "/")
                }
            },
            '(' => input.fly_token(LPAREN, "("),
            ')' => input.fly_token(RPAREN, ")"),
            '{' => input.fly_token(LBRACE, "{"),
            '}' => input.fly_token(RBRACE, "}"),
            ';' => input.fly_token(SEMICOLON, ";"),
            ',' => input.fly_token(COMMA, ","),
            '.' => input.fly_token(DOT, "."),
            '=' => input.fly_token(EQ, "="),
            '+' => input.fly_token(PLUS, "+"),
            '-' => input.fly_token(MINUS, "-"),
            '*' => input.fly_token(STAR, "*"),
            _ => input.token(ERROR),
        };
        Some(token)
    }

    fn state(&self) -> Option<LexerState> {
        self.in_comment.then_some(LexerState::Int(IN_BLOCK_COMMENT))
    }
}
