use crate::arg_scope::ArgScope;
use crate::error::LexError;

/// Escape a value sourced from the process environment for inclusion in a
/// path-sensitive context on platforms whose paths need shell-unsafe
/// characters escaped. On non-Windows targets this is the identity
/// function, matching the original implementation's `#ifdef _WIN32` guard
/// around `escape_windows_path`.
#[cfg(windows)]
fn escape_env_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

#[cfg(not(windows))]
fn escape_env_value(value: &str) -> String {
    value.to_string()
}

/// Expands `` `name` `` references in a string against three chained scopes
/// plus the process environment, in `args → defs → globals → environment`
/// resolution order. Grounded 1:1 on `cfg_lexer_subst_args`.
pub struct BacktickSubstitutor<'a> {
    globals: Option<&'a ArgScope>,
    defs: Option<&'a ArgScope>,
    args: Option<&'a ArgScope>,
    /// When set, an unresolved reference (matching neither scope nor the
    /// environment) is an error instead of expanding to the empty string.
    /// Off by default, preserving the original's silent-empty behavior
    /// (spec.md §9 Open Question) while giving new callers an opt-in.
    strict: bool,
}

impl<'a> BacktickSubstitutor<'a> {
    pub fn new(
        globals: Option<&'a ArgScope>,
        defs: Option<&'a ArgScope>,
        args: Option<&'a ArgScope>,
    ) -> Self {
        Self {
            globals,
            defs,
            args,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(v) = self.args.and_then(|s| s.get(name)) {
            return Some(v.to_string());
        }
        if let Some(v) = self.defs.and_then(|s| s.get(name)) {
            return Some(v.to_string());
        }
        if let Some(v) = self.globals.and_then(|s| s.get(name)) {
            return Some(v.to_string());
        }
        std::env::var(name).ok().map(|v| escape_env_value(&v))
    }

    /// Expand all backtick references in `input`. An empty reference
    /// (` `` `) emits a literal backtick. An unterminated reference is an
    /// error naming the substitution site.
    pub fn expand(&self, input: &str) -> Result<String, LexError> {
        self.expand_named(input, "substitution")
    }

    pub fn expand_named(&self, input: &str, context: &str) -> Result<String, LexError> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars();

        while let Some(ch) = chars.next() {
            if ch == '`' {
                let mut name = String::new();
                let mut terminated = false;
                for next in chars.by_ref() {
                    if next == '`' {
                        terminated = true;
                        break;
                    }
                    name.push(next);
                }
                if !terminated {
                    return Err(LexError::UnterminatedBacktick {
                        context: context.to_string(),
                    });
                }
                if name.is_empty() {
                    result.push('`');
                } else {
                    match self.resolve(&name) {
                        Some(value) => result.push_str(&value),
                        None if self.strict => {
                            return Err(LexError::UnterminatedBacktick {
                                context: format!("{context}: unknown reference `{name}`"),
                            });
                        }
                        None => {}
                    }
                }
            } else {
                result.push(ch);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backticks_round_trips() {
        let subst = BacktickSubstitutor::new(None, None, None);
        assert_eq!(subst.expand("plain text; no refs").unwrap(), "plain text; no refs");
    }

    #[test]
    fn empty_reference_emits_literal_backtick() {
        let subst = BacktickSubstitutor::new(None, None, None);
        assert_eq!(subst.expand("a``b").unwrap(), "a`b");
    }

    #[test]
    fn resolution_order_args_then_defs_then_globals() {
        let mut globals = ArgScope::new();
        globals.set("x", "G");
        let mut defs = ArgScope::new();
        defs.set("x", "D");
        let mut args = ArgScope::new();
        args.set("x", "A");

        let subst = BacktickSubstitutor::new(Some(&globals), Some(&defs), Some(&args));
        assert_eq!(subst.expand("`x`-`x`-`x`").unwrap(), "A-A-A");

        let subst = BacktickSubstitutor::new(Some(&globals), Some(&defs), None);
        assert_eq!(subst.expand("`x`-`x`-`x`").unwrap(), "D-D-D");

        let subst = BacktickSubstitutor::new(Some(&globals), None, None);
        assert_eq!(subst.expand("`x`-`x`-`x`").unwrap(), "G-G-G");
    }

    #[test]
    fn unresolved_reference_is_empty_by_default() {
        std::env::remove_var("CFG_LEXER_TEST_UNSET_VAR");
        let subst = BacktickSubstitutor::new(None, None, None);
        assert_eq!(subst.expand("`CFG_LEXER_TEST_UNSET_VAR`-`CFG_LEXER_TEST_UNSET_VAR`").unwrap(), "--");
    }

    #[test]
    fn unterminated_backtick_is_error() {
        let subst = BacktickSubstitutor::new(None, None, None);
        assert!(matches!(
            subst.expand("x(`unclosed"),
            Err(LexError::UnterminatedBacktick { .. })
        ));
    }

    #[test]
    fn strict_mode_errors_on_unresolved_reference() {
        let subst = BacktickSubstitutor::new(None, None, None).strict(true);
        assert!(subst.expand("`CFG_LEXER_TEST_UNSET_VAR_2`").is_err());
    }
}
