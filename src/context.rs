use std::rc::Rc;

use crate::keyword::Keyword;

/// The closed set of grammar phases that parameterize keyword resolution
/// and diagnostics, matching the `LL_CONTEXT_*` enumeration of the original
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Root,
    Source,
    Destination,
    Parser,
    Rewrite,
    Filter,
    Log,
    BlockDef,
    BlockRef,
    BlockContent,
    BlockArg,
    Pragma,
    Format,
    TemplateFunc,
    InnerDest,
    InnerSrc,
    ClientProto,
    ServerProto,
}

impl ContextKind {
    const ALL: &'static [(ContextKind, &'static str)] = &[
        (ContextKind::Root, "root"),
        (ContextKind::Source, "source"),
        (ContextKind::Destination, "destination"),
        (ContextKind::Parser, "parser"),
        (ContextKind::Rewrite, "rewrite"),
        (ContextKind::Filter, "filter"),
        (ContextKind::Log, "log"),
        (ContextKind::BlockDef, "block-def"),
        (ContextKind::BlockRef, "block-ref"),
        (ContextKind::BlockContent, "block-content"),
        (ContextKind::BlockArg, "block-arg"),
        (ContextKind::Pragma, "pragma"),
        (ContextKind::Format, "format"),
        (ContextKind::TemplateFunc, "template-func"),
        (ContextKind::InnerDest, "inner-dest"),
        (ContextKind::InnerSrc, "inner-src"),
        (ContextKind::ClientProto, "client-proto"),
        (ContextKind::ServerProto, "server-proto"),
    ];

    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("root")
    }

    pub fn by_name(name: &str) -> Option<ContextKind> {
        Self::ALL
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(kind, _)| *kind)
    }
}

/// One frame of the [`ContextStack`]: a context kind, an optional keyword
/// table consulted by [`crate::KeywordResolver`], and a description used in
/// error framing.
#[derive(Debug, Clone)]
pub struct ContextFrame {
    pub kind: ContextKind,
    pub keywords: Option<Rc<[Keyword]>>,
    pub description: String,
}

/// LIFO of context frames controlling keyword resolution and error text.
///
/// Context frames are pushed by the grammar parser on entry into a
/// sub-grammar and popped on its unwind; [`crate::LexerEngine`]'s
/// re-entrant `lex()` calls (from pragma/block-ref sub-parsers) rely on this
/// living on the lexer rather than as a local variable, per spec.md §9.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<ContextFrame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ContextKind, keywords: Option<Rc<[Keyword]>>, description: impl Into<String>) {
        self.frames.push(ContextFrame {
            kind,
            keywords,
            description: description.into(),
        });
    }

    pub fn pop(&mut self) -> Option<ContextFrame> {
        self.frames.pop()
    }

    pub fn current_kind(&self) -> ContextKind {
        self.frames.last().map_or(ContextKind::Root, |f| f.kind)
    }

    pub fn current_desc(&self) -> &str {
        self.frames
            .last()
            .map_or("configuration", |f| f.description.as_str())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Iterate frames top (most recently pushed) to bottom, the order
    /// [`crate::KeywordResolver`] walks the stack in.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &ContextFrame> {
        self.frames.iter().rev()
    }
}

/// RAII guard that pops its frame on drop, so a sub-parser pushing a
/// context on entry releases it on every exit path (early return, `?`,
/// panic-driven unwind), per spec.md §9's "scoped guard" design note.
pub struct ContextGuard<'a> {
    stack: &'a mut ContextStack,
}

impl<'a> ContextGuard<'a> {
    pub fn new(
        stack: &'a mut ContextStack,
        kind: ContextKind,
        keywords: Option<Rc<[Keyword]>>,
        description: impl Into<String>,
    ) -> Self {
        stack.push(kind, keywords, description);
        Self { stack }
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
