use std::fmt::Write as _;

use tracing::debug;

use crate::arg_scope::ArgScope;
use crate::backtick::BacktickSubstitutor;
use crate::block_registry::BlockGenerator;
use crate::context::ContextKind;
use crate::error::LexError;

/// A named, parameterized template: raw content plus declared argument
/// defaults, expanded via [`crate::BacktickSubstitutor`] into fresh include
/// buffer bytes when referenced. Grounded 1:1 on `CfgBlock`/`cfg_block_new`/
/// `cfg_block_generate` in the original implementation.
pub struct UserBlock {
    content: String,
    arg_defs: ArgScope,
}

impl UserBlock {
    pub fn new(content: impl Into<String>, arg_defs: ArgScope) -> Self {
        Self {
            content: content.into(),
            arg_defs,
        }
    }

    /// Build the `__VARARGS__` pass-through value: `key(value) ` for every
    /// key in `call_args` not declared in `arg_defs`, in iteration order
    /// (unspecified, as in the original's hash table walk). Grounded on
    /// `_resolve_unknown_blockargs_as_varargs`.
    fn varargs(&self, call_args: &ArgScope) -> String {
        let mut out = String::new();
        call_args.foreach(|key, value| {
            if key == "__VARARGS__" || self.arg_defs.contains(key) {
                return;
            }
            let _ = write!(out, "{key}({value}) ");
        });
        out
    }
}

impl BlockGenerator for UserBlock {
    fn generate(
        &self,
        context: ContextKind,
        name: &str,
        call_args: &ArgScope,
        globals: Option<&ArgScope>,
    ) -> Result<Vec<u8>, LexError> {
        let mut args = call_args.clone();
        args.set("__VARARGS__", self.varargs(call_args));

        let subst = BacktickSubstitutor::new(globals, Some(&self.arg_defs), Some(&args));
        let block_context = format!("{} block {name}", context.name());
        let expanded = subst.expand_named(&self.content, &block_context).map_err(|err| {
            debug!(block = name, context = context.name(), error = %err, "block expansion failed");
            match err {
                LexError::UnterminatedBacktick { context } => LexError::BlockExpansionFailed {
                    name: name.to_string(),
                    reason: context,
                },
                other => other,
            }
        })?;

        Ok(expanded.into_bytes())
    }
}
