use crate::arg_scope::ArgScope;
use crate::error::LexError;
use crate::lexer::LexerEngine;
use crate::scanner::TokenScanner;

/// Contract for the block-reference call-argument grammar sub-parser
/// spec.md §6 names as an external collaborator (`block_ref_parser` in the
/// original implementation).
///
/// Invoked by [`LexerEngine::lex`] when an identifier resolves to a
/// registered [`crate::BlockGenerator`] in the current context; pulls
/// tokens via nested `lexer.lex()` calls and returns the parsed call
/// arguments as an [`ArgScope`].
pub trait BlockRefParser<S: TokenScanner> {
    fn parse(&mut self, lexer: &mut LexerEngine<S>) -> Result<ArgScope, LexError>;
}
