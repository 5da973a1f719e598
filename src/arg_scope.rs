use std::collections::HashMap;

use crate::error::LexError;

/// Normalize a key the way the original implementation's `normalize_key`
/// does for storage: `-` becomes `_`, everything else is left untouched
/// (normalization is otherwise case-sensitive).
fn normalize(key: &str) -> String {
    key.chars()
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

/// A mapping from normalized argument name to owned string value, used to
/// carry `globals`, block parameter defaults (`defs`), and call-site
/// arguments (`args`) through [`crate::BacktickSubstitutor`] and
/// [`crate::UserBlock`].
///
/// Scopes are chained only at the use site (globals ← defs ← args); there is
/// no parent pointer on `ArgScope` itself, matching `CfgArgs` in the
/// original implementation.
#[derive(Debug, Default, Clone)]
pub struct ArgScope {
    values: HashMap<String, String>,
}

impl ArgScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under the normalized form of `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(normalize(name), value.into());
    }

    /// Look up `name` as-is first, retrying with its normalized form if
    /// that misses — so a table storing `foo_bar` is found by a caller
    /// asking for either `foo_bar` or `foo-bar`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .or_else(|| self.values.get(&normalize(name)))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn foreach(&self, mut f: impl FnMut(&str, &str)) {
        for (k, v) in &self.values {
            f(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Report the first key not present in `defs` (if given), naming
    /// `context` in the resulting error, matching `cfg_args_validate`'s
    /// "first bad key wins" behavior (iteration order is otherwise
    /// unspecified, as it is over a hash table in the original).
    pub fn validate(&self, defs: Option<&ArgScope>, context: &str) -> Result<(), LexError> {
        for (key, value) in &self.values {
            let known = defs.map_or(false, |defs| defs.contains(key));
            if !known {
                return Err(LexError::UnknownArgument {
                    context: context.to_string(),
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}
