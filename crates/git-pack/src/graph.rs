//! The delta graph built by [`crate::parser::Parser`] and walked by
//! [`crate::resolver::Resolver`].
//!
//! Nodes are owned by a flat slab indexed by pack offset; `parent` and
//! `children` are indices into that slab, not owning references, so the
//! forest of delta chains needs no reference counting — a base's children
//! borrow it by index and the slab itself owns everything.

use std::collections::HashMap;

use git_hash::collections::OidMap;
use git_hash::ObjectId;
use git_object::ObjectType;

use crate::entry::RecordType;

/// Index of a node within [`Graph::nodes`].
pub type NodeIndex = usize;

/// A single record's metadata as tracked through resolution.
pub struct ObjectInfo {
    pub offset: u64,
    /// Declared inflated payload size.
    pub length: usize,
    /// Compressed bytes consumed by this record (header + zlib stream).
    pub pack_size: u64,
    pub crc32: u32,
    /// The type as it appeared on disk — may be a delta type.
    pub disk_type: RecordType,
    /// The base type inherited through the delta chain. Set once resolved.
    pub resolved_type: Option<ObjectType>,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    /// Content hash, valid only once resolved.
    pub hash: Option<ObjectId>,
    /// Transient inflated content, released once every child has consumed it.
    pub content: Option<Vec<u8>>,
}

impl ObjectInfo {
    pub fn is_delta(&self) -> bool {
        self.disk_type.is_delta()
    }
}

/// The graph built by one forward pass over a pack: every record as a node,
/// indexed both by offset and (once known) by content hash, plus the
/// pending-reference-delta bucket and the non-seekable delta payload buffer.
#[derive(Default)]
pub struct Graph {
    pub nodes: Vec<ObjectInfo>,
    pub by_offset: HashMap<u64, NodeIndex>,
    pub by_hash: OidMap<NodeIndex>,
    /// Hash-deltas seen before their base, keyed by the base's hash.
    pub pending: OidMap<Vec<NodeIndex>>,
    /// Delta payload bytes retained for non-seekable sources, keyed by offset.
    pub deltas: HashMap<u64, Vec<u8>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, info: ObjectInfo) -> NodeIndex {
        let offset = info.offset;
        let idx = self.nodes.len();
        self.nodes.push(info);
        self.by_offset.insert(offset, idx);
        idx
    }

    /// Number of hash-delta buckets that never found their base.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(|v| v.len()).sum()
    }
}
