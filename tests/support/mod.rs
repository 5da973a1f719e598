//! Minimal reference implementations of the external collaborators
//! `cfg_lexer`'s core treats as consumed interfaces: a regex-driven
//! tokenizer, an `@version` pragma handler, and a call-argument-list
//! block-reference parser. None of this ships in the library itself —
//! it exists only to drive `LexerEngine` end-to-end in tests.

use once_cell::sync::Lazy;
use regex::Regex;

use cfg_lexer::{
    ArgScope, BlockRefParser, ContextKind, LanguageVersion, LexError, LexerEngine, PragmaHandler, ScanMode,
    ScanOutcome, Token, TokenScanner,
};

static WHITESPACE_OR_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[ \t\r\n]+|#[^\n]*)*").expect("valid regex"));
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?").expect("valid regex"));
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"([^"\\]|\\.)*""#).expect("valid regex"));

const PUNCT: &[u8] = b"(){};,";

struct Buffer {
    content: Vec<u8>,
    pos: usize,
}

/// Character-level tokenizer standing in for the real DFA-driven scanner.
/// Good enough to recognize identifiers, strings, numbers, punctuation and
/// `@` pragmas, plus brace/paren-balanced raw capture — not a production
/// config-language tokenizer.
#[derive(Default)]
pub struct RegexScanner {
    buffers: Vec<Buffer>,
    active: Option<usize>,
}

impl RegexScanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&mut self) -> &mut Buffer {
        let idx = self.active.expect("scanner used before switch_to");
        &mut self.buffers[idx]
    }

    fn remaining(content: &[u8], pos: usize) -> &str {
        // Buffer content is plain UTF-8 source text, double-NUL terminated
        // for in-memory levels; NUL bytes never appear inside valid source.
        let end = content[pos..].iter().position(|&b| b == 0).map_or(content.len(), |i| pos + i);
        std::str::from_utf8(&content[pos..end]).expect("source content is valid UTF-8")
    }

    fn consume_pretext(content: &[u8], pos: &mut usize) -> String {
        let text = Self::remaining(content, *pos);
        let m = WHITESPACE_OR_COMMENT.find(text).expect("matches at least empty string");
        let matched = m.as_str().to_string();
        *pos += matched.len();
        matched
    }

    fn capture_balanced(content: &[u8], pos: &mut usize, open: u8, close: u8) -> Result<String, LexError> {
        if content.get(*pos) != Some(&open) {
            return Err(LexError::UnexpectedToken(format!(
                "expected '{}' to start balanced capture",
                open as char
            )));
        }
        let start = *pos + 1;
        let mut depth = 1usize;
        let mut i = start;
        let mut in_string = false;
        while i < content.len() {
            match content[i] {
                b'"' => in_string = !in_string,
                b if !in_string && b == open => depth += 1,
                b if !in_string && b == close => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = std::str::from_utf8(&content[start..i]).unwrap_or_default().to_string();
                        *pos = i + 1;
                        return Ok(inner);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Err(LexError::UnexpectedToken("unterminated balanced capture".to_string()))
    }
}

impl TokenScanner for RegexScanner {
    type Buffer = usize;

    fn create_file_buffer(&mut self, content: &[u8]) -> Self::Buffer {
        self.buffers.push(Buffer {
            content: content.to_vec(),
            pos: 0,
        });
        self.buffers.len() - 1
    }

    fn create_scan_buffer(&mut self, content: &[u8]) -> Self::Buffer {
        self.create_file_buffer(content)
    }

    fn switch_to(&mut self, buffer: &Self::Buffer) {
        self.active = Some(*buffer);
    }

    fn delete_buffer(&mut self, _buffer: Self::Buffer) {}

    fn next(&mut self, mode: ScanMode) -> Result<ScanOutcome, LexError> {
        let buffer = self.active();
        let pretext = Self::consume_pretext(&buffer.content, &mut buffer.pos);

        let at_end = buffer.pos >= buffer.content.len() || buffer.content[buffer.pos] == 0;
        if at_end {
            return Ok(ScanOutcome::new(Token::Eof, pretext, ""));
        }

        match mode {
            ScanMode::BraceCapture => {
                let start = buffer.pos;
                let inner = Self::capture_balanced(&buffer.content, &mut buffer.pos, b'{', b'}')?;
                let text = std::str::from_utf8(&buffer.content[start..buffer.pos]).unwrap_or_default().to_string();
                return Ok(ScanOutcome::new(Token::String(inner), pretext, text));
            }
            ScanMode::ParenCapture => {
                let start = buffer.pos;
                let inner = Self::capture_balanced(&buffer.content, &mut buffer.pos, b'(', b')')?;
                let text = std::str::from_utf8(&buffer.content[start..buffer.pos]).unwrap_or_default().to_string();
                return Ok(ScanOutcome::new(Token::String(inner), pretext, text));
            }
            ScanMode::Normal => {}
        }

        let text = Self::remaining(&buffer.content, buffer.pos).to_string();
        let ch = buffer.content[buffer.pos];

        if ch == b'@' {
            buffer.pos += 1;
            return Ok(ScanOutcome::new(Token::Pragma, pretext, "@"));
        }

        if PUNCT.contains(&ch) {
            buffer.pos += 1;
            return Ok(ScanOutcome::new(Token::Punct(ch as char), pretext, (ch as char).to_string()));
        }

        if let Some(m) = STRING.find(&text) {
            let matched = m.as_str();
            buffer.pos += matched.len();
            let inner = &matched[1..matched.len() - 1];
            return Ok(ScanOutcome::new(Token::String(inner.to_string()), pretext, matched.to_string()));
        }

        if let Some(m) = NUMBER.find(&text) {
            let matched = m.as_str();
            buffer.pos += matched.len();
            let n: f64 = matched.parse().unwrap_or(0.0);
            return Ok(ScanOutcome::new(Token::Number(n), pretext, matched.to_string()));
        }

        if let Some(m) = IDENT.find(&text) {
            let matched = m.as_str();
            buffer.pos += matched.len();
            return Ok(ScanOutcome::new(Token::Identifier(matched.to_string()), pretext, matched.to_string()));
        }

        Err(LexError::UnexpectedToken(format!("unrecognized input near {text:?}")))
    }
}

/// Recognizes `@version: <major>.<minor>` and nothing else.
pub struct VersionPragmaHandler;

impl PragmaHandler<RegexScanner> for VersionPragmaHandler {
    fn handle(&mut self, lexer: &mut LexerEngine<RegexScanner>) -> Result<(), LexError> {
        let (tok, _) = lexer.lex()?;
        if tok.as_identifier() != Some("version") {
            return Err(LexError::PragmaParseFailed("expected 'version'".to_string()));
        }
        let (tok, _) = lexer.lex()?;
        if !matches!(tok, Token::Punct(':')) {
            return Err(LexError::PragmaParseFailed("expected ':'".to_string()));
        }
        let (tok, _) = lexer.lex()?;
        let Token::Number(n) = tok else {
            return Err(LexError::PragmaParseFailed("expected a version number".to_string()));
        };
        let major = n.trunc() as u8;
        let minor = ((n - n.trunc()) * 10.0).round() as u8;
        lexer.version_state().set_version(LanguageVersion::new(major, minor));
        Ok(())
    }
}

/// Recognizes the `(name(value) name2(value2) ...);` call-argument-list
/// syntax surrounding a block reference, relying on `ParenCapture` raw
/// capture for each value so nested parentheses and backtick references
/// inside values are carried through verbatim.
pub struct CallArgsBlockRefParser;

impl BlockRefParser<RegexScanner> for CallArgsBlockRefParser {
    fn parse(&mut self, lexer: &mut LexerEngine<RegexScanner>) -> Result<ArgScope, LexError> {
        let mut args = ArgScope::new();
        lexer.push_context(ContextKind::BlockRef, None, "block reference arguments");
        let result = (|| -> Result<(), LexError> {
            let (open, _) = lexer.lex()?;
            if !matches!(open, Token::Punct('(')) {
                return Err(LexError::BlockArgParseFailed(format!("expected '(', found {open}")));
            }
            loop {
                let (tok, _) = lexer.lex()?;
                let name = match tok {
                    Token::Identifier(name) => name,
                    Token::Punct(')') => break,
                    other => return Err(LexError::BlockArgParseFailed(format!("unexpected token {other}"))),
                };
                lexer.push_context(ContextKind::BlockArg, None, "block argument value");
                let (value_tok, _) = lexer.lex()?;
                lexer.pop_context();
                let Token::String(value) = value_tok else {
                    return Err(LexError::BlockArgParseFailed(format!(
                        "expected a parenthesized value for argument {name}"
                    )));
                };
                args.set(&name, value);
            }
            let (semi, _) = lexer.lex()?;
            if !matches!(semi, Token::Punct(';')) {
                return Err(LexError::BlockArgParseFailed(format!("expected ';', found {semi}")));
            }
            Ok(())
        })();
        lexer.pop_context();
        result?;
        Ok(args)
    }
}
