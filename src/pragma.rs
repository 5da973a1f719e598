use crate::error::LexError;
use crate::lexer::LexerEngine;
use crate::scanner::TokenScanner;

/// Contract for the `@pragma` grammar sub-parser spec.md §6 names as an
/// external collaborator (`pragma_parser` in the original implementation).
///
/// A `PragmaHandler` is invoked by [`LexerEngine::lex`] right after it scans
/// a [`crate::Token::Pragma`]; it pulls whatever tokens it needs via nested
/// calls to `lexer.lex()` and may itself push/pop context, set the
/// configuration version, set globals, or trigger further includes, all
/// through `lexer`'s public surface.
pub trait PragmaHandler<S: TokenScanner> {
    fn handle(&mut self, lexer: &mut LexerEngine<S>) -> Result<(), LexError>;
}
