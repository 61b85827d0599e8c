use super::codec::EncodedNode;
use super::nibbles::{common_prefix_len, pack, Nibbles};
use super::node::{empty_children, Children, Node, NodeKind};
use super::proofs::StateProof;
use super::{keccak256, Hash, StoreError, EMPTY_TRIE_ROOT};
use crate::ports::{AuthenticatedStore, KvIter, KvReader, KvWriter, TrieDatabase};
use tracing::debug;

/// Maximum number of nodes on a root-to-leaf path accepted when loading.
///
/// A key of `n` bytes needs at most `2n + 1` branch levels plus as many
/// extensions; this bound admits keys of up to 1 KiB.
pub const MAX_TRIE_DEPTH: usize = 4096;

/// Incremental Patricia Merkle Trie over raw key bytes.
///
/// ## Shape
///
/// The trie is kept in canonical form: a branch always holds at least two
/// entries (children or value), an extension always points at a branch, and
/// adjacent path segments are merged. The shape is therefore a function of
/// the key set alone, and so is the root digest.
///
/// ## Cost
///
/// `set`/`del` rebuild and rehash only the nodes on the path to the changed
/// key. `root_hash` reads the cached digest of the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatriciaTrie {
    root: Option<Box<Node>>,
    len: usize,
}

impl PatriciaTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_hash(&self) -> Hash {
        self.root.as_ref().map_or(EMPTY_TRIE_ROOT, |n| n.digest())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let nibbles = Nibbles::from_bytes(key);
        let mut path = nibbles.as_slice();
        let mut node = self.root.as_deref()?;
        loop {
            match node.kind() {
                NodeKind::Leaf { path: leaf, value } => {
                    return (leaf.as_slice() == path).then_some(value.as_slice());
                }
                NodeKind::Extension { path: ext, child } => {
                    path = path.strip_prefix(ext.as_slice())?;
                    node = &**child;
                }
                NodeKind::Branch { children, value } => match path.split_first() {
                    None => return value.as_deref(),
                    Some((first, rest)) => {
                        node = children[*first as usize].as_deref()?;
                        path = rest;
                    }
                },
            }
        }
    }

    /// Insert or overwrite; returns the previous value.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) -> Option<Vec<u8>> {
        let path = Nibbles::from_bytes(key);
        let mut replaced = None;
        let root = self.root.take();
        self.root = Some(insert_at(root, path.as_slice(), value, &mut replaced));
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    /// Remove a key; returns the removed value.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        let path = Nibbles::from_bytes(key);
        let mut removed = None;
        if let Some(root) = self.root.take() {
            self.root = remove_at(root, path.as_slice(), &mut removed);
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Lazy traversal of all pairs under `prefix`, ascending key order.
    pub fn iter(&self, prefix: &[u8]) -> TrieIter<'_> {
        let mut stack = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push(Frame::Node(root, Vec::new()));
        }
        TrieIter {
            stack,
            prefix: Nibbles::from_bytes(prefix).0,
        }
    }

    /// Collect the encoded nodes on the path from the root towards `key`.
    ///
    /// The proof shows either the value stored under `key` or, for an
    /// absent key, the node where the path diverges.
    pub fn prove(&self, key: &[u8]) -> StateProof {
        let nibbles = Nibbles::from_bytes(key);
        let mut path = nibbles.as_slice();
        let mut nodes = Vec::new();
        let mut next = self.root.as_deref();

        while let Some(node) = next {
            nodes.push(node.encode());
            next = match node.kind() {
                NodeKind::Leaf { .. } => None,
                NodeKind::Extension { path: ext, child } => match path.strip_prefix(ext.as_slice()) {
                    Some(rest) => {
                        path = rest;
                        Some(&**child)
                    }
                    None => None,
                },
                NodeKind::Branch { children, .. } => match path.split_first() {
                    Some((first, rest)) => {
                        path = rest;
                        children[*first as usize].as_deref()
                    }
                    None => None,
                },
            };
        }

        StateProof {
            key: key.to_vec(),
            value: self.get(key).map(<[u8]>::to_vec),
            nodes,
            root: self.root_hash(),
        }
    }

    /// Write every node of the trie to `db`, keyed by digest.
    ///
    /// Returns the number of nodes written.
    pub fn commit<D: TrieDatabase + ?Sized>(&self, db: &D) -> Result<usize, StoreError> {
        let mut batch = Vec::with_capacity(self.len * 2);
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            batch.push((node.digest(), node.encode()));
            match node.kind() {
                NodeKind::Leaf { .. } => {}
                NodeKind::Extension { child, .. } => stack.push(child),
                NodeKind::Branch { children, .. } => {
                    stack.extend(children.iter().filter_map(|c| c.as_deref()));
                }
            }
        }

        let written = batch.len();
        db.batch_put(batch)?;
        debug!(
            root = %hex::encode(self.root_hash()),
            nodes = written,
            "Trie committed"
        );
        Ok(written)
    }

    /// Rebuild the trie with root digest `root` from `db`.
    ///
    /// Every node is checked against the digest it is stored under.
    pub fn load<D: TrieDatabase + ?Sized>(db: &D, root: &Hash) -> Result<Self, StoreError> {
        if *root == EMPTY_TRIE_ROOT {
            return Ok(Self::new());
        }
        let mut len = 0;
        let node = load_node(db, root, 0, &mut len)?;
        debug!(root = %hex::encode(root), keys = len, "Trie loaded");
        Ok(Self {
            root: Some(node),
            len,
        })
    }
}

impl KvReader for PatriciaTrie {
    fn get(&self, key: &[u8]) -> Option<&[u8]> {
        PatriciaTrie::get(self, key)
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        Box::new(self.iter(prefix))
    }
}

impl KvWriter for PatriciaTrie {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.insert(key, value.to_vec());
    }

    fn del(&mut self, key: &[u8]) {
        self.remove(key);
    }
}

impl AuthenticatedStore for PatriciaTrie {
    fn root_hash(&self) -> Hash {
        PatriciaTrie::root_hash(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// MUTATION
// =============================================================================

fn insert_at(
    node: Option<Box<Node>>,
    path: &[u8],
    value: Vec<u8>,
    replaced: &mut Option<Vec<u8>>,
) -> Box<Node> {
    let Some(node) = node else {
        return Node::leaf(Nibbles::from(path), value);
    };
    let (kind, _) = node.into_parts();

    match kind {
        NodeKind::Leaf {
            path: leaf_path,
            value: leaf_value,
        } => {
            if leaf_path.as_slice() == path {
                *replaced = Some(leaf_value);
                return Node::leaf(leaf_path, value);
            }
            let common = common_prefix_len(leaf_path.as_slice(), path);
            let mut children = empty_children();
            let mut branch_value = None;
            place(
                &mut children,
                &mut branch_value,
                &leaf_path.as_slice()[common..],
                leaf_value,
            );
            place(&mut children, &mut branch_value, &path[common..], value);
            wrap(&path[..common], Node::branch(children, branch_value))
        }

        NodeKind::Extension {
            path: ext_path,
            child,
        } => {
            let common = common_prefix_len(ext_path.as_slice(), path);
            if common == ext_path.len() {
                let child = insert_at(Some(child), &path[common..], value, replaced);
                return Node::extension(ext_path, child);
            }

            let mut children = empty_children();
            let mut branch_value = None;
            let rest = &ext_path.as_slice()[common + 1..];
            children[ext_path.at(common) as usize] = Some(if rest.is_empty() {
                child
            } else {
                Node::extension(Nibbles::from(rest), child)
            });
            place(&mut children, &mut branch_value, &path[common..], value);
            wrap(&path[..common], Node::branch(children, branch_value))
        }

        NodeKind::Branch {
            mut children,
            value: branch_value,
        } => match path.split_first() {
            None => {
                *replaced = branch_value;
                Node::branch(children, Some(value))
            }
            Some((first, rest)) => {
                let slot = *first as usize;
                let child = children[slot].take();
                children[slot] = Some(insert_at(child, rest, value, replaced));
                Node::branch(children, branch_value)
            }
        },
    }
}

/// Put `value` into a fresh branch at the remaining path.
fn place(
    children: &mut Children,
    branch_value: &mut Option<Vec<u8>>,
    remaining: &[u8],
    value: Vec<u8>,
) {
    match remaining.split_first() {
        None => *branch_value = Some(value),
        Some((first, rest)) => {
            children[*first as usize] = Some(Node::leaf(Nibbles::from(rest), value));
        }
    }
}

fn wrap(prefix: &[u8], node: Box<Node>) -> Box<Node> {
    if prefix.is_empty() {
        node
    } else {
        Node::extension(Nibbles::from(prefix), node)
    }
}

fn remove_at(
    node: Box<Node>,
    path: &[u8],
    removed: &mut Option<Vec<u8>>,
) -> Option<Box<Node>> {
    let (kind, digest) = node.into_parts();

    match kind {
        NodeKind::Leaf {
            path: leaf_path,
            value,
        } => {
            if leaf_path.as_slice() == path {
                *removed = Some(value);
                None
            } else {
                Some(Node::from_parts(
                    NodeKind::Leaf {
                        path: leaf_path,
                        value,
                    },
                    digest,
                ))
            }
        }

        NodeKind::Extension {
            path: ext_path,
            child,
        } => {
            let Some(rest) = path.strip_prefix(ext_path.as_slice()) else {
                return Some(Node::from_parts(
                    NodeKind::Extension {
                        path: ext_path,
                        child,
                    },
                    digest,
                ));
            };
            let child = remove_at(child, rest, removed);
            match child {
                Some(child) if removed.is_none() => Some(Node::from_parts(
                    NodeKind::Extension {
                        path: ext_path,
                        child,
                    },
                    digest,
                )),
                Some(child) => Some(join(ext_path.as_slice(), child)),
                None => None,
            }
        }

        NodeKind::Branch {
            mut children,
            value,
        } => match path.split_first() {
            None => {
                if value.is_none() {
                    return Some(Node::from_parts(
                        NodeKind::Branch { children, value },
                        digest,
                    ));
                }
                *removed = value;
                collapse(children, None)
            }
            Some((first, rest)) => {
                let slot = *first as usize;
                let Some(child) = children[slot].take() else {
                    return Some(Node::from_parts(
                        NodeKind::Branch { children, value },
                        digest,
                    ));
                };
                children[slot] = remove_at(child, rest, removed);
                if removed.is_none() {
                    return Some(Node::from_parts(
                        NodeKind::Branch { children, value },
                        digest,
                    ));
                }
                collapse(children, value)
            }
        },
    }
}

/// Restore canonical form of a branch that just lost an entry.
fn collapse(mut children: Children, value: Option<Vec<u8>>) -> Option<Box<Node>> {
    let mut occupied = children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_some())
        .map(|(i, _)| i);
    let first = occupied.next();
    let more = occupied.next().is_some();

    match (first, more, value) {
        (None, _, None) => None,
        (None, _, Some(value)) => Some(Node::leaf(Nibbles::default(), value)),
        (Some(slot), false, None) => {
            let child = children[slot].take()?;
            Some(join(&[slot as u8], child))
        }
        (_, _, value) => Some(Node::branch(children, value)),
    }
}

/// Prepend `prefix` to `child`, merging consecutive path segments.
fn join(prefix: &[u8], child: Box<Node>) -> Box<Node> {
    if prefix.is_empty() {
        return child;
    }
    let (kind, digest) = child.into_parts();
    match kind {
        NodeKind::Leaf { path, value } => Node::leaf(Nibbles::join(prefix, path.as_slice()), value),
        NodeKind::Extension { path, child } => {
            Node::extension(Nibbles::join(prefix, path.as_slice()), child)
        }
        branch @ NodeKind::Branch { .. } => {
            Node::extension(Nibbles::from(prefix), Node::from_parts(branch, digest))
        }
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

fn load_node<D: TrieDatabase + ?Sized>(
    db: &D,
    hash: &Hash,
    depth: usize,
    len: &mut usize,
) -> Result<Box<Node>, StoreError> {
    if depth > MAX_TRIE_DEPTH {
        return Err(StoreError::TrieDepthExceeded {
            max: MAX_TRIE_DEPTH,
        });
    }
    let data = db
        .get_node(hash)?
        .ok_or(StoreError::MissingNode { hash: *hash })?;
    if keccak256(&data) != *hash {
        return Err(StoreError::CorruptNode {
            hash: *hash,
            reason: "digest mismatch".to_string(),
        });
    }
    let encoded = EncodedNode::decode(&data).map_err(|e| StoreError::CorruptNode {
        hash: *hash,
        reason: e.to_string(),
    })?;

    let node = match encoded {
        EncodedNode::Leaf { path, value } => {
            *len += 1;
            Node::leaf(path, value)
        }
        EncodedNode::Extension { path, child } => {
            let child = load_node(db, &child, depth + 1, len)?;
            Node::extension(path, child)
        }
        EncodedNode::Branch {
            children: hashes,
            value,
        } => {
            let mut children = empty_children();
            for (slot, child) in children.iter_mut().zip(hashes.iter()) {
                if let Some(child) = child {
                    *slot = Some(load_node(db, child, depth + 1, len)?);
                }
            }
            if value.is_some() {
                *len += 1;
            }
            Node::branch(children, value)
        }
    };
    Ok(node)
}

// =============================================================================
// ITERATION
// =============================================================================

enum Frame<'a> {
    Node(&'a Node, Vec<u8>),
    Entry(Vec<u8>, &'a [u8]),
}

/// Depth-first, in-order walk: a branch's own value precedes its children,
/// children are visited by ascending nibble. Subtrees that cannot contain
/// the prefix are skipped.
pub struct TrieIter<'a> {
    stack: Vec<Frame<'a>>,
    prefix: Vec<u8>,
}

impl<'a> TrieIter<'a> {
    /// One of the two paths is a prefix of the other.
    fn reachable(&self, path: &[u8]) -> bool {
        path.starts_with(&self.prefix) || self.prefix.starts_with(path)
    }
}

impl<'a> Iterator for TrieIter<'a> {
    type Item = (Vec<u8>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let (node, path) = match frame {
                Frame::Entry(path, value) => return Some((pack(&path), value)),
                Frame::Node(node, path) => (node, path),
            };

            match node.kind() {
                NodeKind::Leaf { path: rest, value } => {
                    let full = Nibbles::join(&path, rest.as_slice()).0;
                    if full.starts_with(&self.prefix) {
                        return Some((pack(&full), value.as_slice()));
                    }
                }
                NodeKind::Extension { path: rest, child } => {
                    let full = Nibbles::join(&path, rest.as_slice()).0;
                    if self.reachable(&full) {
                        self.stack.push(Frame::Node(child, full));
                    }
                }
                NodeKind::Branch { children, value } => {
                    for (slot, child) in children.iter().enumerate().rev() {
                        let Some(child) = child.as_deref() else {
                            continue;
                        };
                        let mut child_path = path.clone();
                        child_path.push(slot as u8);
                        if self.reachable(&child_path) {
                            self.stack.push(Frame::Node(child, child_path));
                        }
                    }
                    if let Some(value) = value {
                        if path.starts_with(&self.prefix) {
                            self.stack.push(Frame::Entry(path, value));
                        }
                    }
                }
            }
        }
        None
    }
}
