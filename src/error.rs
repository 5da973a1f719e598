use thiserror::Error;

/// Fatal lexing errors. A [`crate::LexerEngine`] surfaces these to its
/// caller as a hard parse failure, matching `LL_ERROR` in the original
/// implementation.
///
/// Non-fatal conditions (reserved-word warnings, obsolete-keyword use,
/// duplicate generator registration, missing-version defaulting) are not
/// represented here — they are emitted as `tracing` warnings and do not
/// interrupt lexing.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("unterminated backtick reference in `{context}`")]
    UnterminatedBacktick { context: String },

    #[error("include target must be a string or identifier")]
    IncludeNotAString,

    #[error("include directive missing terminating ';'")]
    IncludeMissingSemicolon,

    #[error("failed to open include file {path:?}: {source}")]
    IncludeOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("include depth exceeds the maximum of {max}")]
    IncludeTooDeep { max: usize },

    #[error("pragma parsing failed: {0}")]
    PragmaParseFailed(String),

    #[error("block reference argument parsing failed: {0}")]
    BlockArgParseFailed(String),

    #[error("expansion of block `{name}` failed: {reason}")]
    BlockExpansionFailed { name: String, reason: String },

    #[error("unknown argument `{key}` = {value:?} in context `{context}`")]
    UnknownArgument {
        context: String,
        key: String,
        value: String,
    },

    #[error("unexpected token while scanning: {0}")]
    UnexpectedToken(String),
}
