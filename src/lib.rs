//! Lexical preprocessor for a declarative configuration language used by a
//! logging daemon.
//!
//! This crate turns a configuration source (file or in-memory buffer) into a
//! stream of tokens for a downstream grammar parser, while transparently
//! handling the facilities that make the configuration language more than a
//! flat token syntax:
//!
//! - nested `include` of other files, with source-location tracking
//! - textual argument substitution via backtick references (`` `name` ``)
//!   resolved against layered scopes
//! - user-defined parameterized blocks expanded lazily when referenced
//! - pragmas (leading `@` directives) that can change lexer/version state
//! - a context stack that changes keyword resolution and error framing
//! - injection of pre-fabricated token sequences into the stream
//!
//! # Example
//!
//! ```
//! use cfg_lexer::{ArgScope, BacktickSubstitutor};
//!
//! let mut args = ArgScope::new();
//! args.set("name", "world");
//!
//! let subst = BacktickSubstitutor::new(None, None, Some(&args));
//! assert_eq!(subst.expand("hello `name`").unwrap(), "hello world");
//! ```
//!
//! The raw character-level tokenizer (the regex/DFA scanner that splits
//! source bytes into lexemes) is treated as an external collaborator: this
//! crate defines its contract ([`TokenScanner`]) but does not implement a
//! scanner. Likewise the grammar sub-parsers invoked for `@pragma` lines and
//! block-reference argument lists are traits ([`PragmaHandler`],
//! [`BlockRefParser`]) with no bundled production implementation. See the
//! crate's test suite for minimal reference implementations of both, used to
//! exercise [`LexerEngine`] end-to-end.

mod arg_scope;
mod backtick;
mod block_ref;
mod block_registry;
mod config;
mod context;
mod error;
mod include;
mod keyword;
mod lexer;
mod location;
mod pragma;
mod scanner;
mod token;
mod token_block;
mod user_block;

pub use arg_scope::ArgScope;
pub use backtick::BacktickSubstitutor;
pub use block_ref::BlockRefParser;
pub use block_registry::{BlockGenerator, BlockRegistry};
pub use config::{LanguageVersion, SharedVersionState, VersionState};
pub use context::{ContextFrame, ContextKind, ContextStack};
pub use error::LexError;
pub use include::{IncludeStack, MAX_INCLUDE_DEPTH};
pub use keyword::{Keyword, KeywordResolver, KeywordStatus, CFG_KEYWORD_STOP};
pub use lexer::{LexerEngine, DEFAULT_LEGACY_VERSION, INCLUDE_TOKEN};
pub use location::Location;
pub use pragma::PragmaHandler;
pub use scanner::{ScanMode, ScanOutcome, TokenScanner};
pub use token::Token;
pub use token_block::TokenBlock;
pub use user_block::UserBlock;
