// =============================================================================
// NIBBLES: Half-byte path representation
// =============================================================================

/// Nibble path for trie traversal.
///
/// Keys are split into half-bytes (0-15), high nibble first, so walking the
/// 16-way branches in index order visits keys in byte-lexicographic order.
/// A key of `n` bytes becomes `2n` nibbles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Create nibbles from arbitrary key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        Nibbles(nibbles)
    }

    /// Pack an even-length nibble path back into bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        pack(&self.0)
    }

    /// Concatenate two paths.
    pub fn join(prefix: &[u8], suffix: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(prefix.len() + suffix.len());
        nibbles.extend_from_slice(prefix);
        nibbles.extend_from_slice(suffix);
        Nibbles(nibbles)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get nibble at index.
    pub fn at(&self, index: usize) -> u8 {
        self.0[index]
    }
}

impl From<&[u8]> for Nibbles {
    fn from(nibbles: &[u8]) -> Self {
        Nibbles(nibbles.to_vec())
    }
}

/// Length of the common prefix of two nibble paths.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Pack nibbles into bytes; a trailing odd nibble becomes a high half-byte.
pub fn pack(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}
