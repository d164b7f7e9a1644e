//! Per-slot dirty bitmask

use smallvec::SmallVec;

const WORD_BITS: usize = u32::BITS as usize;

/// Which slots changed since the last patch.
///
/// An empty mask means the instance is clean and not queued. Any marked mask
/// has at least one bit set, so "queued" and "non-empty" are the same thing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyMask {
    words: SmallVec<[u32; 1]>,
}

impl DirtyMask {
    pub fn clean() -> Self {
        Self::default()
    }

    /// Mask with every listed slot set
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::clean();
        for index in indices {
            mask.mark(index);
        }
        mask
    }

    pub fn is_clean(&self) -> bool {
        self.words.is_empty()
    }

    /// Set the bit for `index`. Returns `true` when the mask was clean before.
    pub fn mark(&mut self, index: usize) -> bool {
        let was_clean = self.is_clean();
        let word = index / WORD_BITS;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % WORD_BITS);
        was_clean
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|word| word & (1 << (index % WORD_BITS)) != 0)
    }

    /// Whether any of the given slots is set
    pub fn any(&self, indices: &[usize]) -> bool {
        indices.iter().any(|index| self.is_dirty(*index))
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Set slot indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, word)| {
            (0..WORD_BITS)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| w * WORD_BITS + bit)
        })
    }

    /// Take the current bits, leaving the mask clean
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
