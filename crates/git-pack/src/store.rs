//! The external object-store collaborator.
//!
//! Narrow on purpose: the resolver only ever needs to fetch a hash-delta's
//! base when it isn't in the pack, and optionally persist each object it
//! reconstructs. Everything else an on-disk object database does (loose
//! objects, alternates, prefix lookup) is a concern of whatever implements
//! this trait, not of this crate.

use git_hash::ObjectId;
use git_object::ObjectType;

/// An object as the store hands it back: typed, inflated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedObject {
    pub obj_type: ObjectType,
    pub data: Vec<u8>,
}

/// Read/write access to previously known objects, keyed by content hash.
pub trait ObjectStore {
    fn get(&self, hash: &ObjectId) -> Option<EncodedObject>;
    fn put(&mut self, hash: ObjectId, object: EncodedObject);
}

/// A minimal in-memory store, useful for tests and for callers that don't
/// need persistence across process runs.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: std::collections::HashMap<ObjectId, EncodedObject>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, hash: &ObjectId) -> Option<EncodedObject> {
        self.objects.get(hash).cloned()
    }

    fn put(&mut self, hash: ObjectId, object: EncodedObject) {
        self.objects.insert(hash, object);
    }
}
