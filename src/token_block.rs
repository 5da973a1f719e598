use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Writing,
    Reading,
    Drained,
}

/// An append-only then drain-only queue of pre-built tokens, injected ahead
/// of freshly scanned ones by [`crate::LexerEngine`].
///
/// `TokenBlock` enforces the write-then-drain discipline spec.md requires:
/// [`TokenBlock::add`] panics once [`TokenBlock::next`] has been called, and
/// tokens come back in insertion order. This mirrors `CfgTokenBlock`'s
/// `pos`-over-`GArray` cursor in the original implementation, expressed as a
/// small state machine instead of an assertion on a raw index.
#[derive(Debug, Default)]
pub struct TokenBlock {
    tokens: Vec<Token>,
    pos: usize,
    state: BlockStateCell,
}

#[derive(Debug, Default)]
struct BlockStateCell(std::cell::Cell<Option<BlockState>>);

impl TokenBlock {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> BlockState {
        self.state.0.get().unwrap_or(BlockState::Writing)
    }

    /// Add `token` to the block. Ownership of the token (and any string
    /// payload it carries) transfers into the block.
    ///
    /// # Panics
    /// Panics if a token has already been drained from this block —
    /// `add` is illegal outside the `Writing` state.
    pub fn add(&mut self, token: Token) {
        assert_eq!(
            self.state(),
            BlockState::Writing,
            "TokenBlock::add called after the first TokenBlock::next"
        );
        self.tokens.push(token);
    }

    /// Return the next token, transitioning to `Reading` on the first call.
    /// Returns `None` once exhausted (state `Drained`).
    pub fn next(&mut self) -> Option<Token> {
        if self.state() == BlockState::Writing {
            self.state.0.set(Some(BlockState::Reading));
        }
        if self.pos < self.tokens.len() {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            if self.pos == self.tokens.len() {
                self.state.0.set(Some(BlockState::Drained));
            }
            Some(tok)
        } else {
            self.state.0.set(Some(BlockState::Drained));
            None
        }
    }

    pub fn is_drained(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
