use tracing::debug;

use crate::arg_scope::ArgScope;
use crate::context::ContextKind;
use crate::error::LexError;

/// A callback invoked when a registered block name is referenced in a
/// matching context. Grounded on `CfgBlockGeneratorFunc`; the C
/// implementation's `generator_data`/`generator_data_free` pair collapses
/// into a plain trait object here — `Drop` replaces the manual destructor
/// (spec.md §9's cyclic-ownership design note).
///
/// `generate` returns the synthetic buffer content to be pushed as a new
/// include level by the caller, rather than performing the push itself, so
/// this trait stays decoupled from `LexerEngine`'s generic scanner
/// parameter.
pub trait BlockGenerator {
    fn generate(
        &self,
        context: ContextKind,
        name: &str,
        args: &ArgScope,
        globals: Option<&ArgScope>,
    ) -> Result<Vec<u8>, LexError>;
}

struct Entry {
    context: Option<ContextKind>,
    name: String,
    generator: Box<dyn BlockGenerator>,
}

/// Registered block generators keyed by `(context, name)`, with at most one
/// registration per effective key (`None`/"any" collides with every
/// concrete context). Grounded on `cfg_lexer_register_block_generator`/
/// `cfg_lexer_find_generator`.
#[derive(Default)]
pub struct BlockRegistry {
    entries: Vec<Entry>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_index(&self, context: Option<ContextKind>, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| {
            (e.context.is_none() || e.context == context) && e.name == name
        })
    }

    /// Register `generator` under `(context, name)`. `context = None` means
    /// "any context". If an entry already exists for this effective key,
    /// the new registration is silently dropped (after a debug log),
    /// matching the original's idempotent-duplicate behavior.
    pub fn register(&mut self, context: Option<ContextKind>, name: impl Into<String>, generator: Box<dyn BlockGenerator>) {
        let name = name.into();
        if self.find_index(context, &name).is_some() {
            debug!(
                context = context.map(ContextKind::name).unwrap_or("any"),
                name = %name,
                "attempted to register the same generator multiple times, ignoring"
            );
            return;
        }
        self.entries.push(Entry {
            context,
            name,
            generator,
        });
    }

    /// Find the first registration matching `context`/`name`, in
    /// registration order, where `any`-context entries match every
    /// concrete context.
    pub fn find(&self, context: ContextKind, name: &str) -> Option<&dyn BlockGenerator> {
        self.entries
            .iter()
            .find(|e| (e.context.is_none() || e.context == Some(context)) && e.name == name)
            .map(|e| e.generator.as_ref())
    }
}
