use std::cell::RefCell;
use std::rc::Rc;

/// A packed `major.minor` language version, comparable the way the original
/// implementation packs `maj << 8 | min` into a single integer
/// (`cfg_check_current_config_version`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageVersion {
    pub major: u8,
    pub minor: u8,
}

impl LanguageVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Injectable seam standing in for the C implementation's process-wide
/// `configuration` object. [`crate::LexerEngine`] reads and writes it only
/// from `lex()`, on its owning thread (spec.md §5), so no synchronization is
/// required beyond the interior mutability needed to share one instance
/// across nested lexer re-entry.
pub trait VersionState {
    fn version(&self) -> Option<LanguageVersion>;
    fn set_version(&self, version: LanguageVersion);
    fn parsed_version(&self) -> Option<LanguageVersion>;
    fn set_parsed_version(&self, version: LanguageVersion);
}

#[derive(Debug, Default)]
struct Inner {
    version: Option<LanguageVersion>,
    parsed_version: Option<LanguageVersion>,
}

/// Default [`VersionState`] implementation: a reference-counted, interior
/// mutable cell. Clone it to share the same version state across multiple
/// [`crate::LexerEngine`] instances, or construct a fresh one per lexer to
/// keep compilations independent (spec.md §5's "independent lexers" model).
#[derive(Debug, Default, Clone)]
pub struct SharedVersionState(Rc<RefCell<Inner>>);

impl SharedVersionState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionState for SharedVersionState {
    fn version(&self) -> Option<LanguageVersion> {
        self.0.borrow().version
    }

    fn set_version(&self, version: LanguageVersion) {
        self.0.borrow_mut().version = Some(version);
    }

    fn parsed_version(&self) -> Option<LanguageVersion> {
        self.0.borrow().parsed_version
    }

    fn set_parsed_version(&self, version: LanguageVersion) {
        self.0.borrow_mut().parsed_version = Some(version);
    }
}
