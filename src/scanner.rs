use crate::error::LexError;
use crate::token::Token;

/// Scanning mode a [`TokenScanner`] operates in, selected by
/// [`crate::LexerEngine`] based on the current context kind (spec.md
/// §4.I step 2).
///
/// In `BraceCapture`/`ParenCapture` mode the scanner must return a single
/// [`Token::String`] whose content is the verbatim inner text between a
/// balanced pair of delimiters, treating string literals within as
/// transparent (their own delimiters don't count toward the balance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Normal,
    BraceCapture,
    ParenCapture,
}

/// One raw result from the external tokenizer: the classified token, the
/// pretext (whitespace/comments consumed before the token started) and the
/// text (the token's own matched bytes), both needed to reconstruct
/// `preprocess_output` byte-for-byte (spec.md §3, round-trip invariant).
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub token: Token,
    pub pretext: String,
    pub text: String,
}

impl ScanOutcome {
    pub fn new(token: Token, pretext: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            token,
            pretext: pretext.into(),
            text: text.into(),
        }
    }
}

/// Contract for the character-level tokenizer that [`crate::LexerEngine`]
/// drives as an external collaborator (spec.md §6).
///
/// This crate defines the contract only — no DFA/regex scanner is shipped
/// against it, per the "implementing the tokenizer DFA itself" non-goal.
/// `create_file_buffer`/`create_scan_buffer`/`switch_to`/`delete_buffer`
/// name the same lifecycle the original flex-generated scanner exposes
/// (`create_buffer`/`scan_buffer`/`switch_to_buffer`/`delete_buffer`); a
/// `TokenScanner` implementation is expected to honor the same double-NUL
/// end-of-input discipline spec.md §3/§9 describe for scan buffers, however
/// it implements that internally.
pub trait TokenScanner {
    /// Opaque handle to one scan buffer. The scanner implementation decides
    /// what this is; the lexer only ever stores and passes it back.
    type Buffer: Clone;

    /// Build a scan buffer over already-read file content.
    fn create_file_buffer(&mut self, content: &[u8]) -> Self::Buffer;

    /// Build a scan buffer directly over in-memory bytes (expected to
    /// already be double-NUL terminated, per the include buffer contract).
    fn create_scan_buffer(&mut self, content: &[u8]) -> Self::Buffer;

    /// Make `buffer` the active buffer for subsequent [`TokenScanner::next`]
    /// calls.
    fn switch_to(&mut self, buffer: &Self::Buffer);

    /// Release a buffer's resources.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Produce the next token from the active buffer in the given mode.
    fn next(&mut self, mode: ScanMode) -> Result<ScanOutcome, LexError>;
}
