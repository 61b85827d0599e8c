use super::{keccak256, CodecError, Hash, Nibbles};

// =============================================================================
// NODE ENCODING
// =============================================================================
//
// Every node starts with a tag byte. Paths and values are framed with a
// big-endian u32 length, so no two distinct nodes share an encoding:
//
//   Leaf:      0x00 | path | value
//   Extension: 0x01 | path | child_hash(32)
//   Branch:    0x02 | bitmap(u16) | child_hash(32) per set bit | flag(u8) [| value]
//
// The node digest is keccak256 over this encoding.

pub const LEAF_TAG: u8 = 0x00;
pub const EXTENSION_TAG: u8 = 0x01;
pub const BRANCH_TAG: u8 = 0x02;

/// Encoding of the empty trie; its digest is `EMPTY_TRIE_ROOT`.
pub const EMPTY_NODE: [u8; 1] = [0x80];

fn put_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

pub fn encode_leaf(path: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(9 + path.len() + value.len());
    out.push(LEAF_TAG);
    put_bytes(&mut out, path);
    put_bytes(&mut out, value);
    out
}

pub fn encode_extension(path: &[u8], child: &Hash) -> Vec<u8> {
    let mut out = Vec::with_capacity(37 + path.len());
    out.push(EXTENSION_TAG);
    put_bytes(&mut out, path);
    out.extend_from_slice(child);
    out
}

pub fn encode_branch<'a>(
    children: impl IntoIterator<Item = Option<&'a Hash>>,
    value: Option<&[u8]>,
) -> Vec<u8> {
    let mut bitmap: u16 = 0;
    let mut hashes = Vec::with_capacity(16 * 32);
    for (i, child) in children.into_iter().enumerate() {
        if let Some(hash) = child {
            bitmap |= 1 << i;
            hashes.extend_from_slice(hash);
        }
    }

    let mut out = Vec::with_capacity(8 + hashes.len() + value.map_or(0, <[u8]>::len));
    out.push(BRANCH_TAG);
    out.extend_from_slice(&bitmap.to_be_bytes());
    out.extend_from_slice(&hashes);
    match value {
        Some(v) => {
            out.push(1);
            put_bytes(&mut out, v);
        }
        None => out.push(0),
    }
    out
}

/// A decoded node whose children are referenced by digest.
///
/// This is the form that travels in proofs and lives in a `TrieDatabase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedNode {
    Leaf {
        path: Nibbles,
        value: Vec<u8>,
    },
    Extension {
        path: Nibbles,
        child: Hash,
    },
    Branch {
        children: Box<[Option<Hash>; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl EncodedNode {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            EncodedNode::Leaf { path, value } => encode_leaf(path.as_slice(), value),
            EncodedNode::Extension { path, child } => encode_extension(path.as_slice(), child),
            EncodedNode::Branch { children, value } => {
                encode_branch(children.iter().map(Option::as_ref), value.as_deref())
            }
        }
    }

    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader { data, pos: 0 };
        let node = match reader.u8()? {
            LEAF_TAG => {
                let path = reader.path()?;
                let value = reader.framed()?.to_vec();
                EncodedNode::Leaf { path, value }
            }
            EXTENSION_TAG => {
                let path = reader.path()?;
                let child = reader.hash()?;
                EncodedNode::Extension { path, child }
            }
            BRANCH_TAG => {
                let bitmap = reader.u16()?;
                let mut children: Box<[Option<Hash>; 16]> = Box::default();
                for (i, slot) in children.iter_mut().enumerate() {
                    if bitmap & (1 << i) != 0 {
                        *slot = Some(reader.hash()?);
                    }
                }
                let value = match reader.u8()? {
                    0 => None,
                    1 => Some(reader.framed()?.to_vec()),
                    flag => return Err(CodecError::InvalidFlag(flag)),
                };
                EncodedNode::Branch { children, value }
            }
            tag => return Err(CodecError::UnknownTag(tag)),
        };

        let remaining = data.len() - reader.pos;
        if remaining != 0 {
            return Err(CodecError::TrailingBytes(remaining));
        }
        Ok(node)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.data.len() - self.pos;
        if n > remaining {
            return Err(CodecError::Truncated {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn hash(&mut self) -> Result<Hash, CodecError> {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(self.take(32)?);
        Ok(hash)
    }

    fn framed(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.take(4)?;
        let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        self.take(len)
    }

    fn path(&mut self) -> Result<Nibbles, CodecError> {
        let raw = self.framed()?;
        if let Some(bad) = raw.iter().find(|n| **n > 0x0F) {
            return Err(CodecError::InvalidNibble(*bad));
        }
        Ok(Nibbles(raw.to_vec()))
    }
}
