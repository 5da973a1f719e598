use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use tracing::warn;

use crate::arg_scope::ArgScope;
use crate::block_registry::{BlockGenerator, BlockRegistry};
use crate::block_ref::BlockRefParser;
use crate::config::{LanguageVersion, SharedVersionState, VersionState};
use crate::context::{ContextFrame, ContextKind, ContextStack};
use crate::error::LexError;
use crate::include::IncludeStack;
use crate::keyword::{Keyword, KeywordResolver};
use crate::location::Location;
use crate::pragma::PragmaHandler;
use crate::scanner::{ScanMode, TokenScanner};
use crate::token::Token;
use crate::token_block::TokenBlock;

/// Reserved token id a context's keyword table must use for its `include`
/// entry for [`LexerEngine::lex`] to recognize and handle the directive.
/// Grounded on `LL_CONTEXT_ROOT`'s `include` keyword dispatch in
/// `cfg_lexer_lex`, which singles the token out by its grammar constant
/// rather than by name.
pub const INCLUDE_TOKEN: u32 = u32::MAX;

/// Language version assumed once the first non-pragma token is lexed
/// without an `@version` directive ever having been seen. The original
/// implementation's default is a build-time constant tracking the daemon's
/// oldest supported syntax; `3.0` stands in for that default here.
pub const DEFAULT_LEGACY_VERSION: LanguageVersion = LanguageVersion::new(3, 0);

/// Orchestrator that produces the next token by consulting injected tokens,
/// the keyword resolver, the block registry, and the external tokenizer, in
/// that order, while transparently handling pragmas, includes and block
/// expansions. Grounded 1:1 on `CfgLexer`/`cfg_lexer_lex`/`cfg_lexer_new`/
/// `cfg_lexer_new_buffer`/`cfg_lexer_free`/`cfg_lexer_unput_token`.
pub struct LexerEngine<S: TokenScanner> {
    scanner: S,
    buffers: Vec<S::Buffer>,
    include_stack: IncludeStack,
    context_stack: ContextStack,
    injected: VecDeque<TokenBlock>,
    registry: BlockRegistry,
    globals: ArgScope,
    version_state: Rc<dyn VersionState>,
    pragma_handler: Option<Box<dyn PragmaHandler<S>>>,
    block_ref_parser: Option<Box<dyn BlockRefParser<S>>>,
    suppress_tokens: u32,
    preprocess_output: String,
}

impl<S: TokenScanner> LexerEngine<S> {
    fn bare(scanner: S) -> Self {
        Self {
            scanner,
            buffers: Vec::new(),
            include_stack: IncludeStack::new(),
            context_stack: ContextStack::new(),
            injected: VecDeque::new(),
            registry: BlockRegistry::new(),
            globals: ArgScope::new(),
            version_state: Rc::new(SharedVersionState::new()),
            pragma_handler: None,
            block_ref_parser: None,
            suppress_tokens: 0,
            preprocess_output: String::new(),
        }
    }

    pub fn new_from_file(scanner: S, path: impl AsRef<Path>) -> Result<Self, LexError> {
        let mut engine = Self::bare(scanner);
        engine.push_file_level(path.as_ref())?;
        Ok(engine)
    }

    pub fn new_from_buffer(scanner: S, name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, LexError> {
        let mut engine = Self::bare(scanner);
        engine.push_buffer_level(name, bytes)?;
        Ok(engine)
    }

    pub fn set_pragma_handler(&mut self, handler: Box<dyn PragmaHandler<S>>) {
        self.pragma_handler = Some(handler);
    }

    pub fn set_block_ref_parser(&mut self, parser: Box<dyn BlockRefParser<S>>) {
        self.block_ref_parser = Some(parser);
    }

    pub fn set_version_state(&mut self, state: Rc<dyn VersionState>) {
        self.version_state = state;
    }

    pub fn version_state(&self) -> &Rc<dyn VersionState> {
        &self.version_state
    }

    pub fn globals(&self) -> &ArgScope {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut ArgScope {
        &mut self.globals
    }

    pub fn preprocess_output(&self) -> &str {
        &self.preprocess_output
    }

    pub fn push_context(&mut self, kind: ContextKind, keywords: Option<Rc<[Keyword]>>, description: impl Into<String>) {
        self.context_stack.push(kind, keywords, description);
    }

    pub fn pop_context(&mut self) -> Option<ContextFrame> {
        self.context_stack.pop()
    }

    pub fn context_kind(&self) -> ContextKind {
        self.context_stack.current_kind()
    }

    pub fn context_desc(&self) -> &str {
        self.context_stack.current_desc()
    }

    pub fn lookup_context_kind_by_name(name: &str) -> ContextKind {
        ContextKind::by_name(name).unwrap_or(ContextKind::Root)
    }

    pub fn lookup_context_name(kind: ContextKind) -> &'static str {
        kind.name()
    }

    pub fn register_block_generator(
        &mut self,
        context: Option<ContextKind>,
        name: impl Into<String>,
        generator: Box<dyn BlockGenerator>,
    ) {
        self.registry.register(context, name, generator);
    }

    pub fn inject_token_block(&mut self, block: TokenBlock) {
        self.injected.push_back(block);
    }

    /// Wrap `token` in a one-element [`TokenBlock`] and enqueue it ahead of
    /// anything already pending injection, so it is the very next token
    /// [`LexerEngine::lex`] delivers.
    pub fn unput(&mut self, token: Token) {
        let mut block = TokenBlock::new();
        block.add(token);
        self.injected.push_front(block);
    }

    pub fn include_file(&mut self, path: impl AsRef<Path>) -> Result<(), LexError> {
        self.push_file_level(path.as_ref())
    }

    pub fn include_buffer(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<(), LexError> {
        self.push_buffer_level(name, bytes)
    }

    fn push_file_level(&mut self, path: impl AsRef<Path>) -> Result<(), LexError> {
        self.include_stack.push_file(path)?;
        let content = self.include_stack.top().expect("just pushed").content().to_vec();
        let buffer = self.scanner.create_file_buffer(&content);
        self.scanner.switch_to(&buffer);
        self.buffers.push(buffer);
        Ok(())
    }

    fn push_buffer_level(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<(), LexError> {
        self.include_stack.push_buffer(name, bytes)?;
        let content = self.include_stack.top().expect("just pushed").content().to_vec();
        let buffer = self.scanner.create_scan_buffer(&content);
        self.scanner.switch_to(&buffer);
        self.buffers.push(buffer);
        Ok(())
    }

    fn pop_level(&mut self) {
        if let Some(buffer) = self.buffers.pop() {
            self.scanner.delete_buffer(buffer);
        }
        self.include_stack.pop();
        if let Some(buffer) = self.buffers.last() {
            self.scanner.switch_to(buffer);
        }
    }

    fn current_location(&self) -> Location {
        self.include_stack
            .top()
            .map(|level| level.location().clone())
            .unwrap_or_else(|| Location::start("<eof>", 0))
    }

    fn drain_injected(&mut self) -> Option<Token> {
        while let Some(block) = self.injected.front_mut() {
            if let Some(token) = block.next() {
                return Some(token);
            }
            self.injected.pop_front();
        }
        None
    }

    /// Produce the next token, handling injection, includes, pragmas, and
    /// block expansion transparently. Grounded 1:1 on `cfg_lexer_lex`.
    pub fn lex(&mut self) -> Result<(Token, Location), LexError> {
        'relex: loop {
            if let Some(token) = self.drain_injected() {
                return Ok((token, self.current_location()));
            }

            if self.include_stack.is_empty() {
                return Ok((Token::Eof, Location::start("<eof>", 0)));
            }

            let mode = match self.context_stack.current_kind() {
                ContextKind::BlockContent => ScanMode::BraceCapture,
                ContextKind::BlockArg => ScanMode::ParenCapture,
                _ => ScanMode::Normal,
            };

            let outcome = self.scanner.next(mode)?;

            if let Some(loc) = self.include_stack.current_location_mut() {
                loc.advance(&outcome.pretext);
                loc.advance(&outcome.text);
            }

            if matches!(outcome.token, Token::Eof) {
                self.pop_level();
                if self.include_stack.is_empty() {
                    return Ok((Token::Eof, Location::start("<eof>", 0)));
                }
                continue 'relex;
            }

            let location = self.current_location();

            if matches!(outcome.token, Token::Pragma) {
                self.preprocess_output.push('@');
                self.dispatch_pragma()?;
                continue 'relex;
            }

            if mode != ScanMode::Normal {
                let classified = outcome.token.clone();
                if self.suppress_tokens == 0 {
                    self.preprocess_output.push_str(&outcome.pretext);
                    self.preprocess_output.push_str(&outcome.text);
                }
                return Ok((classified, location));
            }

            // Version must be settled before keyword resolution consults it,
            // so a version-changing pragma takes effect starting with the
            // very next token (spec scenario 2).
            self.settle_version();

            let classified = match &outcome.token {
                Token::Identifier(text) => {
                    KeywordResolver::resolve(text, &location, &self.context_stack, self.version_state.version())
                }
                other => other.clone(),
            };

            if let Token::Keyword(id) = classified {
                if id == INCLUDE_TOKEN && self.context_stack.current_kind() != ContextKind::Pragma {
                    self.handle_include_directive()?;
                    continue 'relex;
                }
            }

            if let Token::Identifier(name) = &classified {
                if self.registry.find(self.context_stack.current_kind(), name).is_some() {
                    self.handle_block_reference(name.clone())?;
                    continue 'relex;
                }
            }

            if self.suppress_tokens == 0 {
                self.preprocess_output.push_str(&outcome.pretext);
                self.preprocess_output.push_str(&outcome.text);
            }

            return Ok((classified, location));
        }
    }

    fn dispatch_pragma(&mut self) -> Result<(), LexError> {
        let mut handler = self
            .pragma_handler
            .take()
            .ok_or_else(|| LexError::PragmaParseFailed("no pragma handler installed".to_string()))?;
        let result = handler.handle(self);
        self.pragma_handler = Some(handler);
        result
    }

    fn handle_include_directive(&mut self) -> Result<(), LexError> {
        self.suppress_tokens += 1;
        let result = self.read_include_directive();
        self.suppress_tokens -= 1;
        result
    }

    fn read_include_directive(&mut self) -> Result<(), LexError> {
        let (name_token, _) = self.lex()?;
        let name = match name_token {
            Token::String(s) | Token::Identifier(s) => s,
            _ => return Err(LexError::IncludeNotAString),
        };
        let (semi_token, _) = self.lex()?;
        if !matches!(semi_token, Token::Punct(';')) {
            return Err(LexError::IncludeMissingSemicolon);
        }
        self.push_file_level(&name)
    }

    fn handle_block_reference(&mut self, name: String) -> Result<(), LexError> {
        self.suppress_tokens += 1;
        let result = self.expand_block_reference(&name);
        self.suppress_tokens -= 1;
        result
    }

    fn expand_block_reference(&mut self, name: &str) -> Result<(), LexError> {
        let mut parser = self
            .block_ref_parser
            .take()
            .ok_or_else(|| LexError::BlockArgParseFailed("no block-reference parser installed".to_string()))?;
        let args = parser.parse(self);
        self.block_ref_parser = Some(parser);
        let args = args?;

        let context = self.context_stack.current_kind();
        let bytes = {
            let generator = self.registry.find(context, name).ok_or_else(|| LexError::BlockExpansionFailed {
                name: name.to_string(),
                reason: "generator no longer registered".to_string(),
            })?;
            generator.generate(context, name, &args, Some(&self.globals))?
        };

        let source_name = format!("{} block {}", context.name(), name);
        self.push_buffer_level(source_name, bytes)
    }

    /// Commit a language version once the first substantive token is seen,
    /// matching the fallback chain spec.md §4.I describes: a parsed-but-
    /// uncommitted version wins silently; otherwise a default is assumed
    /// with a warning, unless we are still inside pragma processing.
    fn settle_version(&mut self) {
        if self.version_state.version().is_some() {
            return;
        }
        if let Some(parsed) = self.version_state.parsed_version() {
            self.version_state.set_version(parsed);
            return;
        }
        if self.context_stack.current_kind() != ContextKind::Pragma {
            warn!(
                default_version = %DEFAULT_LEGACY_VERSION,
                "no @version pragma seen before the first token, defaulting to the legacy version"
            );
            self.version_state.set_version(DEFAULT_LEGACY_VERSION);
        }
    }
}
