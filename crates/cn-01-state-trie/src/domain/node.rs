use super::codec::{encode_branch, encode_extension, encode_leaf, EncodedNode};
use super::nibbles::Nibbles;
use super::{keccak256, Hash};

// =============================================================================
// TRIE NODE: The three stored node kinds of the trie
// =============================================================================

/// Sixteen child slots of a branch, one per nibble value.
pub type Children = Box<[Option<Box<Node>>; 16]>;

pub fn empty_children() -> Children {
    Box::default()
}

/// Node kinds in the Patricia Merkle Trie.
///
/// The empty trie is represented by the absence of a root node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf node: remaining key path and the stored value.
    Leaf { path: Nibbles, value: Vec<u8> },

    /// Extension node: non-empty shared prefix with a single branch child.
    Extension { path: Nibbles, child: Box<Node> },

    /// Branch node: 16-way fan-out plus the value of a key ending here.
    Branch {
        children: Children,
        value: Option<Vec<u8>>,
    },
}

/// A trie node together with its cached digest.
///
/// The digest is computed once on construction; mutations build new nodes
/// along the changed path, so a cached digest is never stale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    digest: Hash,
}

impl Node {
    fn new(kind: NodeKind) -> Box<Node> {
        let digest = keccak256(&encode_kind(&kind));
        Box::new(Node { kind, digest })
    }

    /// Reassemble a node whose content is unchanged.
    pub fn from_parts(kind: NodeKind, digest: Hash) -> Box<Node> {
        Box::new(Node { kind, digest })
    }

    pub fn leaf(path: Nibbles, value: Vec<u8>) -> Box<Node> {
        Self::new(NodeKind::Leaf { path, value })
    }

    pub fn extension(path: Nibbles, child: Box<Node>) -> Box<Node> {
        debug_assert!(!path.is_empty(), "extension with empty path");
        Self::new(NodeKind::Extension { path, child })
    }

    pub fn branch(children: Children, value: Option<Vec<u8>>) -> Box<Node> {
        Self::new(NodeKind::Branch { children, value })
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn into_parts(self) -> (NodeKind, Hash) {
        (self.kind, self.digest)
    }

    pub fn digest(&self) -> Hash {
        self.digest
    }

    /// Serialized form, children referenced by digest.
    pub fn encode(&self) -> Vec<u8> {
        encode_kind(&self.kind)
    }

    /// Digest-referenced view of this node.
    pub fn to_encoded(&self) -> EncodedNode {
        match &self.kind {
            NodeKind::Leaf { path, value } => EncodedNode::Leaf {
                path: path.clone(),
                value: value.clone(),
            },
            NodeKind::Extension { path, child } => EncodedNode::Extension {
                path: path.clone(),
                child: child.digest,
            },
            NodeKind::Branch { children, value } => {
                let mut hashes: Box<[Option<Hash>; 16]> = Box::default();
                for (slot, child) in hashes.iter_mut().zip(children.iter()) {
                    *slot = child.as_ref().map(|c| c.digest);
                }
                EncodedNode::Branch {
                    children: hashes,
                    value: value.clone(),
                }
            }
        }
    }
}

fn encode_kind(kind: &NodeKind) -> Vec<u8> {
    match kind {
        NodeKind::Leaf { path, value } => encode_leaf(path.as_slice(), value),
        NodeKind::Extension { path, child } => encode_extension(path.as_slice(), &child.digest),
        NodeKind::Branch { children, value } => encode_branch(
            children.iter().map(|c| c.as_ref().map(|c| &c.digest)),
            value.as_deref(),
        ),
    }
}
