use std::cell::Cell;

use tracing::warn;

use crate::config::LanguageVersion;
use crate::context::ContextStack;
use crate::location::Location;
use crate::token::Token;

/// Sentinel keyword name that, when encountered while walking a context
/// frame's keyword table, aborts the entire stack walk (including frames
/// below the one holding the sentinel) and forces identifier
/// classification. Matches `CFG_KEYWORD_STOP` in the original
/// implementation; spec.md §9 leaves "should frames below still be
/// consulted" ambiguous but directs preserving the stop-the-walk behavior,
/// which is what this resolver does.
pub const CFG_KEYWORD_STOP: &str = "CFG_KEYWORD_STOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordStatus {
    Normal,
    Obsolete,
}

/// One entry of a context's keyword table.
#[derive(Debug)]
pub struct Keyword {
    pub name: &'static str,
    pub token: u32,
    pub required_version: LanguageVersion,
    pub status: Cell<KeywordStatus>,
    pub explain: &'static str,
}

impl Keyword {
    pub const fn new(name: &'static str, token: u32) -> Self {
        Self {
            name,
            token,
            required_version: LanguageVersion::new(0, 0),
            status: Cell::new(KeywordStatus::Normal),
            explain: "",
        }
    }

    pub const fn with_required_version(mut self, version: LanguageVersion) -> Self {
        self.required_version = version;
        self
    }

    pub const fn obsolete(mut self, explain: &'static str) -> Self {
        self.status = Cell::new(KeywordStatus::Obsolete);
        self.explain = explain;
        self
    }
}

/// Dash/underscore-insensitive equality between a scanned candidate and a
/// keyword table entry's name: either side's `-`/`_` is accepted where the
/// keyword table spells `_`. Note the asymmetry preserved from the original
/// implementation (spec.md §9): `candidate` may use `-` or `_` freely, but
/// `keyword_name` must already be written with `_`.
fn keyword_eq(candidate: &str, keyword_name: &str) -> bool {
    let mut c = candidate.chars();
    let mut k = keyword_name.chars();
    loop {
        match (c.next(), k.next()) {
            (None, None) => return true,
            (Some(cc), Some(kc)) => {
                let matches = if cc == '-' || cc == '_' {
                    kc == '_'
                } else {
                    cc == kc
                };
                if !matches {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Given a candidate identifier and the current context stack, returns a
/// keyword token (after applying version/obsolescence diagnostics) or falls
/// back to a plain identifier. Grounded 1:1 on `cfg_lexer_lookup_keyword`.
pub struct KeywordResolver;

impl KeywordResolver {
    /// Resolve `candidate` against `stack`, using `current_version` (the
    /// currently selected/committed language version, if any) to decide
    /// whether a version-gated keyword should still be treated as reserved.
    pub fn resolve(
        candidate: &str,
        location: &Location,
        stack: &ContextStack,
        current_version: Option<LanguageVersion>,
    ) -> Token {
        'frames: for frame in stack.iter_top_down() {
            let Some(keywords) = frame.keywords.as_deref() else {
                continue;
            };
            for kw in keywords {
                if kw.name == CFG_KEYWORD_STOP {
                    return Token::Identifier(candidate.to_string());
                }
                if !keyword_eq(candidate, kw.name) {
                    continue;
                }

                let current = current_version.unwrap_or(LanguageVersion::new(0, 0));
                if current < kw.required_version {
                    warn!(
                        keyword = kw.name,
                        file = %location.file,
                        line = location.first_line,
                        column = location.first_col,
                        current_version = %current,
                        required_version = %kw.required_version,
                        "configuration uses a newly introduced reserved word as identifier"
                    );
                    // Matches the original's `break` out of the keyword-table
                    // loop on a too-new keyword: the rest of *this* frame's
                    // table is abandoned, but the walk continues into the
                    // next (outer) context frame.
                    continue 'frames;
                }

                if kw.status.get() == KeywordStatus::Obsolete {
                    warn!(
                        keyword = kw.name,
                        explain = kw.explain,
                        "configuration uses an obsoleted keyword"
                    );
                    kw.status.set(KeywordStatus::Normal);
                }

                return Token::Keyword(kw.token);
            }
        }
        Token::Identifier(candidate.to_string())
    }
}
