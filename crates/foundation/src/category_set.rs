/// Deterministic set of category indices backed by a bitset.
///
/// The cell-type encoder codes each distinct cluster label once and keeps
/// the selected codes here, so the per-point test is a bit lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    words: Vec<u64>,
    len: usize,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, index: u32) -> bool {
        let (word, bit) = word_bit(index);
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Returns `true` if the set changed.
    pub fn insert(&mut self, index: u32) -> bool {
        let (word, bit) = word_bit(index);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }
}

impl FromIterator<u32> for CategorySet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut s = CategorySet::new();
        for i in iter {
            s.insert(i);
        }
        s
    }
}

fn word_bit(index: u32) -> (usize, u32) {
    ((index / 64) as usize, index % 64)
}

#[cfg(test)]
mod tests {
    use super::CategorySet;

    #[test]
    fn insert_contains_and_len() {
        let mut s = CategorySet::new();
        assert!(s.is_empty());
        assert!(!s.contains(1));

        assert!(s.insert(1));
        assert!(s.contains(1));
        assert_eq!(s.len(), 1);
        assert!(!s.insert(1));
        assert_eq!(s.len(), 1);
        assert!(!s.contains(500));
    }

    #[test]
    fn collects_across_words() {
        let s: CategorySet = [10, 2, 65, 2].into_iter().collect();
        assert_eq!(s.len(), 3);
        assert!(s.contains(65));
        assert!(!s.contains(64));
    }
}
