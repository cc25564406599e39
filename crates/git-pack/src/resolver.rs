//! Walks the delta graph built by [`crate::parser::Parser`] in pack order,
//! applying patches as needed to reconstruct every object's full content,
//! and notifies an [`Observer`] of each one.
//!
//! `materialize` is the single entry point objects go through to get their
//! inflated bytes, whether that's a plain field read (content still held),
//! an LRU hit, a delta patch against a recursively materialized parent, or
//! — for a base whose bytes were released early and then evicted — a
//! re-read from the scanner (seekable sources) or the store (non-seekable).

use git_hash::hasher::Hasher;
use git_hash::{HashAlgorithm, ObjectId};

use crate::cache::ObjectCache;
use crate::delta::apply::apply_delta;
use crate::entry::RecordType;
use crate::graph::{Graph, NodeIndex};
use crate::observer::Observer;
use crate::scanner::Scanner;
use crate::source::PackSource;
use crate::store::{EncodedObject, ObjectStore};
use crate::PackError;

pub struct Resolver<'a, S> {
    graph: Graph,
    scanner: Scanner<S>,
    cache: ObjectCache,
    store: Option<&'a mut dyn ObjectStore>,
    /// How many of each node's children have consumed its content so far.
    /// Content is released once this reaches `children.len()`.
    consumed: Vec<usize>,
}

impl<'a, S: PackSource> Resolver<'a, S> {
    pub fn new(
        graph: Graph,
        scanner: Scanner<S>,
        cache: ObjectCache,
        store: Option<&'a mut dyn ObjectStore>,
    ) -> Self {
        let consumed = vec![0; graph.nodes.len()];
        Self {
            graph,
            scanner,
            cache,
            store,
            consumed,
        }
    }

    /// Resolves every record in pack order and reports it to `observer`.
    /// Forward hash-delta references that can't be satisfied on the first
    /// pass (their base resolves later in the pack, or not at all) are
    /// retried once their dependency becomes available; any still
    /// unresolved once no further progress is possible fail the whole
    /// operation with [`PackError::UnresolvedReferenceDelta`].
    pub fn run(mut self, observer: &mut dyn Observer) -> Result<(), PackError> {
        self.reconcile_pending_against_known_bases();

        let mut deferred = Vec::new();
        for idx in 0..self.graph.nodes.len() {
            if !self.try_process(idx, observer)? {
                deferred.push(idx);
            }
        }

        loop {
            let mut still_deferred = Vec::new();
            let mut progressed = false;
            for idx in deferred.drain(..) {
                if self.try_process(idx, observer)? {
                    progressed = true;
                } else {
                    still_deferred.push(idx);
                }
            }
            deferred = still_deferred;
            if !progressed || deferred.is_empty() {
                break;
            }
        }

        let remaining = self.graph.pending_count();
        if remaining > 0 {
            return Err(PackError::UnresolvedReferenceDelta { count: remaining });
        }

        Ok(())
    }

    /// Attempts to materialize and emit `idx`. Returns `Ok(false)` (rather
    /// than an error) when the node is a hash-delta whose base isn't
    /// resolvable yet — the caller retries these later instead of aborting
    /// the whole parse on the first one.
    fn try_process(&mut self, idx: NodeIndex, observer: &mut dyn Observer) -> Result<bool, PackError> {
        let content = match self.materialize(idx) {
            Ok(content) => content,
            Err(PackError::UnresolvedReferenceDelta { .. }) => return Ok(false),
            Err(other) => return Err(other),
        };

        let (resolved_type, length, offset, crc32, hash) = {
            let node = &self.graph.nodes[idx];
            (
                node.resolved_type
                    .expect("resolved_type is set by the time materialize succeeds"),
                node.length,
                node.offset,
                node.crc32,
                node.hash
                    .clone()
                    .expect("hash is set by the time materialize succeeds"),
            )
        };

        observer.on_inflated_object_header(resolved_type, length, offset)?;
        observer.on_inflated_object_content(hash.clone(), offset, crc32, &content)?;
        self.store_put(
            hash,
            EncodedObject {
                obj_type: resolved_type,
                data: content.clone(),
            },
        );

        self.try_release(idx);
        Ok(true)
    }

    /// Returns `idx`'s inflated content, computing it if necessary.
    fn materialize(&mut self, idx: NodeIndex) -> Result<Vec<u8>, PackError> {
        if let Some(content) = self.graph.nodes[idx].content.clone() {
            self.ensure_cached(idx, &content);
            return Ok(content);
        }

        if let Some(hash) = self.graph.nodes[idx].hash.clone() {
            if let Some(cached) = self.cache.get(&hash).cloned() {
                self.graph.nodes[idx].content = Some(cached.clone());
                return Ok(cached);
            }
        }

        let content = if self.graph.nodes[idx].is_delta() {
            self.materialize_delta(idx)?
        } else {
            self.materialize_base(idx)?
        };

        self.graph.nodes[idx].content = Some(content.clone());
        self.ensure_cached(idx, &content);

        let hash = self.graph.nodes[idx]
            .hash
            .clone()
            .expect("materialize_base/materialize_delta always set hash");
        self.attach_pending(hash, idx);

        Ok(content)
    }

    /// A base object's content is already known from the parser's single
    /// pass, unless it was released after its last (known-at-the-time)
    /// child consumed it and then evicted from cache — at which point it
    /// must be recovered from the store (non-seekable sources) or by
    /// seeking back and re-reading the raw record (seekable sources).
    fn materialize_base(&mut self, idx: NodeIndex) -> Result<Vec<u8>, PackError> {
        if !self.scanner.is_seekable() {
            let hash = self.graph.nodes[idx]
                .hash
                .clone()
                .expect("base hash is known from the parser's first pass");
            return match self.store.as_ref() {
                Some(_) => self
                    .store_get(&hash)
                    .map(|obj| obj.data)
                    .ok_or(PackError::BaseNotInStore { hash }),
                None => Err(PackError::NotSeekableWithoutStore),
            };
        }
        self.read_record_payload(idx)
    }

    /// Applies `idx`'s delta instructions against its base, which is either
    /// a parent already linked in the graph or — for a ref-delta whose base
    /// lives outside the pack — fetched from the object store.
    fn materialize_delta(&mut self, idx: NodeIndex) -> Result<Vec<u8>, PackError> {
        let parent_idx = self.graph.nodes[idx].parent;

        let (base_content, base_type) = match parent_idx {
            Some(parent_idx) => {
                let content = self.materialize(parent_idx)?;
                self.note_consumed(parent_idx);
                let base_type = self.graph.nodes[parent_idx]
                    .resolved_type
                    .expect("a materialized parent has a resolved type");
                (content, base_type)
            }
            None => {
                let base_hash = match self.graph.nodes[idx].disk_type {
                    RecordType::RefDelta { base_hash } => base_hash,
                    _ => {
                        unreachable!("only a ref-delta can be unresolved when materialize is called")
                    }
                };
                match self.store_get(&base_hash) {
                    Some(obj) => (obj.data, obj.obj_type),
                    None => return Err(PackError::UnresolvedReferenceDelta { count: 1 }),
                }
            }
        };

        let delta_bytes = self.read_record_payload(idx)?;
        let patched = apply_delta(&base_content, &delta_bytes)?;
        let hash = Hasher::hash_object(HashAlgorithm::Sha1, &base_type.to_string(), &patched)?;

        let node = &mut self.graph.nodes[idx];
        node.resolved_type = Some(base_type);
        node.hash = Some(hash);

        Ok(patched)
    }

    /// Reads a record's raw inflated payload: the delta instruction buffer
    /// for a delta (from the non-seekable buffer, or by re-reading), or the
    /// base content itself, by seeking back to `offset` and reading through
    /// the scanner. Never used for an already-materialized delta's content.
    fn read_record_payload(&mut self, idx: NodeIndex) -> Result<Vec<u8>, PackError> {
        let (offset, is_delta) = {
            let node = &self.graph.nodes[idx];
            (node.offset, node.is_delta())
        };

        if is_delta && !self.scanner.is_seekable() {
            return self
                .graph
                .deltas
                .get(&offset)
                .cloned()
                .ok_or(PackError::DeltaNotCached(offset));
        }

        self.scanner.seek_from_start(offset)?;
        self.scanner.next_record_header()?;
        let mut payload = Vec::new();
        self.scanner.next_record_payload(&mut payload)?;
        Ok(payload)
    }

    /// Before the main pass, any pending hash-delta whose base is a base
    /// object is resolvable immediately: the full graph (and therefore the
    /// complete offset/hash index) already exists, regardless of whether
    /// the base appeared before or after its referencing delta in the pack.
    fn reconcile_pending_against_known_bases(&mut self) {
        let hashes: Vec<ObjectId> = self.graph.pending.keys().copied().collect();
        for hash in hashes {
            if let Some(&base_idx) = self.graph.by_hash.get(&hash) {
                self.attach_pending(hash, base_idx);
            }
        }
    }

    /// Relinks any hash-deltas waiting on `hash` as children of `parent_idx`,
    /// now that `hash` is known (a base from parsing, or a delta just
    /// resolved). A no-op if nothing was pending on this hash.
    fn attach_pending(&mut self, hash: ObjectId, parent_idx: NodeIndex) {
        if let Some(children) = self.graph.pending.remove(&hash) {
            for child_idx in children {
                self.graph.nodes[child_idx].parent = Some(parent_idx);
                self.graph.nodes[parent_idx].children.push(child_idx);
            }
        }
    }

    /// Inserts `content` into the LRU cache if `idx` has (or has gained)
    /// children that may need it again after its own content is released.
    fn ensure_cached(&mut self, idx: NodeIndex, content: &[u8]) {
        if self.graph.nodes[idx].children.is_empty() {
            return;
        }
        if let Some(hash) = self.graph.nodes[idx].hash.clone() {
            self.cache.put(hash, content.to_vec());
        }
    }

    fn note_consumed(&mut self, parent_idx: NodeIndex) {
        self.consumed[parent_idx] += 1;
        self.try_release(parent_idx);
    }

    /// Clears `idx`'s retained content once every known child has consumed
    /// it, and — for a non-seekable source — drops its raw delta buffer.
    fn try_release(&mut self, idx: NodeIndex) {
        let children_len = self.graph.nodes[idx].children.len();
        if self.consumed[idx] < children_len {
            return;
        }
        self.graph.nodes[idx].content = None;
        let (offset, is_delta) = {
            let node = &self.graph.nodes[idx];
            (node.offset, node.is_delta())
        };
        if is_delta && !self.scanner.is_seekable() {
            self.graph.deltas.remove(&offset);
        }
    }

    fn store_get(&self, hash: &ObjectId) -> Option<EncodedObject> {
        self.store.as_ref().and_then(|store| store.get(hash))
    }

    fn store_put(&mut self, hash: ObjectId, object: EncodedObject) {
        if let Some(store) = self.store.as_mut() {
            store.put(hash, object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::source::{SeekableSource, StreamSource};
    use crate::store::InMemoryObjectStore;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use git_object::ObjectType;
    use std::io::{Cursor, Write};

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn base_header(type_num: u8, size: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        let mut s = size as u64;
        let mut c = (type_num << 4) | (s & 0x0f) as u8;
        s >>= 4;
        while s > 0 {
            buf.push(c | 0x80);
            c = (s & 0x7f) as u8;
            s >>= 7;
        }
        buf.push(c);
        buf
    }

    fn ofs_delta_header(size: usize, back_distance: u64) -> Vec<u8> {
        let mut buf = base_header(6, size);
        // Offset-adjusted backward varint, big-endian, continuation bit set
        // on every byte but the last.
        let mut bytes = Vec::new();
        let mut v = back_distance;
        bytes.push((v & 0x7f) as u8);
        v >>= 7;
        while v > 0 {
            v -= 1;
            bytes.push(((v & 0x7f) as u8) | 0x80);
            v >>= 7;
        }
        bytes.reverse();
        buf.extend_from_slice(&bytes);
        buf
    }

    fn ref_delta_header(size: usize, base_hash: &ObjectId) -> Vec<u8> {
        let mut buf = base_header(7, size);
        buf.extend_from_slice(base_hash.as_bytes());
        buf
    }

    fn write_varint(mut value: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(5);
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value > 0 {
                byte |= 0x80;
            }
            buf.push(byte);
            if value == 0 {
                break;
            }
        }
        buf
    }

    fn encode_insert(data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + data.len());
        buf.push(data.len() as u8);
        buf.extend_from_slice(data);
        buf
    }

    /// A delta that rewrites the whole base to `new_content` via one insert
    /// instruction (no copies) — enough for these tests' purposes.
    fn full_rewrite_delta(source_size: usize, new_content: &[u8]) -> Vec<u8> {
        let mut delta = Vec::new();
        delta.extend_from_slice(&write_varint(source_size));
        delta.extend_from_slice(&write_varint(new_content.len()));
        for chunk in new_content.chunks(127) {
            delta.extend_from_slice(&encode_insert(chunk));
        }
        delta
    }

    struct Recording {
        headers: Vec<(ObjectType, usize, u64)>,
        contents: Vec<(ObjectId, Vec<u8>)>,
        footer: Option<ObjectId>,
    }

    impl Default for Recording {
        fn default() -> Self {
            Self {
                headers: Vec::new(),
                contents: Vec::new(),
                footer: None,
            }
        }
    }

    impl Observer for Recording {
        fn on_inflated_object_header(
            &mut self,
            obj_type: ObjectType,
            size: usize,
            offset: u64,
        ) -> Result<(), PackError> {
            self.headers.push((obj_type, size, offset));
            Ok(())
        }

        fn on_inflated_object_content(
            &mut self,
            hash: ObjectId,
            _offset: u64,
            _crc32: u32,
            content: &[u8],
        ) -> Result<(), PackError> {
            self.contents.push((hash, content.to_vec()));
            Ok(())
        }

        fn on_footer(&mut self, pack_hash: ObjectId) -> Result<(), PackError> {
            self.footer = Some(pack_hash);
            Ok(())
        }
    }

    fn finish_pack(mut body: Vec<u8>) -> Vec<u8> {
        let mut h = Hasher::new(HashAlgorithm::Sha1);
        h.update(&body);
        let trailer = h.finalize().unwrap();
        body.extend_from_slice(trailer.as_bytes());
        body
    }

    fn pack_prelude(count: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"PACK");
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&count.to_be_bytes());
        body
    }

    #[test]
    fn two_base_blobs_emit_in_order() {
        let mut body = pack_prelude(2);
        for payload in [&b"a"[..], &b"b"[..]] {
            body.extend_from_slice(&base_header(3, payload.len()));
            body.extend_from_slice(&zlib(payload));
        }
        let pack = finish_pack(body);

        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, pack_hash) = parser.parse(&mut recording).unwrap();

        let cache = ObjectCache::default();
        let resolver = Resolver::new(graph, scanner, cache, None);
        resolver.run(&mut recording).unwrap();
        recording.on_footer(pack_hash).unwrap();

        assert_eq!(recording.contents.len(), 2);
        assert_eq!(recording.contents[0].1, b"a");
        assert_eq!(recording.contents[1].1, b"b");
        assert_eq!(
            recording.contents[0].0,
            Hasher::hash_object(HashAlgorithm::Sha1, "blob", b"a").unwrap()
        );
        assert!(recording.footer.is_some());
    }

    #[test]
    fn offset_delta_rewrites_base_content() {
        let base_payload = b"hello world";
        let target = b"HELLO WORLD";
        let delta = full_rewrite_delta(base_payload.len(), target);

        let mut body = pack_prelude(2);
        let base_offset = body.len() as u64;
        body.extend_from_slice(&base_header(3, base_payload.len()));
        body.extend_from_slice(&zlib(base_payload));

        let delta_offset = body.len() as u64;
        body.extend_from_slice(&ofs_delta_header(delta.len(), delta_offset - base_offset));
        body.extend_from_slice(&zlib(&delta));

        let pack = finish_pack(body);

        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut recording).unwrap();

        assert_eq!(recording.contents.len(), 2);
        assert_eq!(recording.contents[0].1, base_payload);
        assert_eq!(recording.contents[1].1, target);
        assert!(recording
            .headers
            .iter()
            .all(|(t, _, _)| *t == ObjectType::Blob));
    }

    #[test]
    fn hash_delta_against_in_pack_commit() {
        let commit_payload = b"tree 0000000000000000000000000000000000000000\n";
        let commit_hash = Hasher::hash_object(HashAlgorithm::Sha1, "commit", commit_payload).unwrap();
        let target = b"tree 1111111111111111111111111111111111111111\n";
        let delta = full_rewrite_delta(commit_payload.len(), target);

        let mut body = pack_prelude(2);
        body.extend_from_slice(&base_header(1, commit_payload.len()));
        body.extend_from_slice(&zlib(commit_payload));
        body.extend_from_slice(&ref_delta_header(delta.len(), &commit_hash));
        body.extend_from_slice(&zlib(&delta));

        let pack = finish_pack(body);

        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut recording).unwrap();

        assert_eq!(recording.contents.len(), 2);
        assert!(recording
            .headers
            .iter()
            .all(|(t, _, _)| *t == ObjectType::Commit));
        assert_eq!(recording.contents[1].1, target);
    }

    #[test]
    fn hash_delta_against_external_base_uses_store() {
        let external_payload = b"external base content";
        let external_hash =
            Hasher::hash_object(HashAlgorithm::Sha1, "blob", external_payload).unwrap();
        let target = b"patched external content";
        let delta = full_rewrite_delta(external_payload.len(), target);

        let mut body = pack_prelude(1);
        body.extend_from_slice(&ref_delta_header(delta.len(), &external_hash));
        body.extend_from_slice(&zlib(&delta));
        let pack = finish_pack(body);

        let mut store = InMemoryObjectStore::new();
        store.put(
            external_hash,
            EncodedObject {
                obj_type: ObjectType::Blob,
                data: external_payload.to_vec(),
            },
        );

        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), Some(&mut store));
        resolver.run(&mut recording).unwrap();

        assert_eq!(recording.contents.len(), 1);
        assert_eq!(recording.contents[0].1, target);
    }

    #[test]
    fn missing_external_base_without_store_is_unresolved() {
        let unknown_hash = ObjectId::from_hex("1111111111111111111111111111111111111111").unwrap();
        let delta = full_rewrite_delta(5, b"xxxxx");

        let mut body = pack_prelude(1);
        body.extend_from_slice(&ref_delta_header(delta.len(), &unknown_hash));
        body.extend_from_slice(&zlib(&delta));
        let pack = finish_pack(body);

        let mut store = InMemoryObjectStore::new();
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), Some(&mut store));
        let err = resolver.run(&mut recording).unwrap_err();
        assert!(matches!(err, PackError::UnresolvedReferenceDelta { count: 1 }));
    }

    #[test]
    fn deep_offset_delta_chain_appends_incrementally() {
        let mut contents = vec![b"x".to_vec()];
        for _ in 0..4 {
            let mut next = contents.last().unwrap().clone();
            next.push(b'x');
            contents.push(next);
        }
        // contents[0] = "x", contents[1] = "xx", ..., contents[4] = "xxxxx"

        let mut body = pack_prelude(5);
        let mut offsets = Vec::new();

        offsets.push(body.len() as u64);
        body.extend_from_slice(&base_header(3, contents[0].len()));
        body.extend_from_slice(&zlib(&contents[0]));

        for i in 1..contents.len() {
            let delta = full_rewrite_delta(contents[i - 1].len(), &contents[i]);
            let this_offset = body.len() as u64;
            offsets.push(this_offset);
            let back_distance = this_offset - offsets[i - 1];
            body.extend_from_slice(&ofs_delta_header(delta.len(), back_distance));
            body.extend_from_slice(&zlib(&delta));
        }

        let pack = finish_pack(body);
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut recording).unwrap();

        assert_eq!(recording.contents.len(), 5);
        for (i, (_, content)) in recording.contents.iter().enumerate() {
            assert_eq!(content, &contents[i]);
        }
    }

    #[test]
    fn seekable_source_matches_non_seekable_for_same_pack() {
        let base_payload = b"hello world";
        let target = b"HELLO WORLD";
        let delta = full_rewrite_delta(base_payload.len(), target);

        let mut body = pack_prelude(2);
        let base_offset = body.len() as u64;
        body.extend_from_slice(&base_header(3, base_payload.len()));
        body.extend_from_slice(&zlib(base_payload));
        let delta_offset = body.len() as u64;
        body.extend_from_slice(&ofs_delta_header(delta.len(), delta_offset - base_offset));
        body.extend_from_slice(&zlib(&delta));
        let pack = finish_pack(body);

        // Non-seekable.
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut non_seekable_recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut non_seekable_recording).unwrap();
        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut non_seekable_recording).unwrap();

        // Seekable.
        let scanner = Scanner::new(SeekableSource(Cursor::new(pack.clone())));
        let parser = Parser::new(scanner);
        let mut seekable_recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut seekable_recording).unwrap();
        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut seekable_recording).unwrap();

        assert_eq!(non_seekable_recording.contents, seekable_recording.contents);
    }

    #[test]
    fn empty_pack_emits_no_objects() {
        let body = pack_prelude(0);
        let pack = finish_pack(body);

        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut recording = Recording::default();
        let (graph, scanner, _hash) = parser.parse(&mut recording).unwrap();

        let resolver = Resolver::new(graph, scanner, ObjectCache::default(), None);
        resolver.run(&mut recording).unwrap();

        assert!(recording.contents.is_empty());
        assert!(recording.headers.is_empty());
    }

    /// A graph holding a single base node whose `content` has already been
    /// released (as if by `try_release` after its last known child), for
    /// exercising `materialize_base`'s re-fetch path directly.
    fn released_base_graph(hash: &ObjectId) -> Graph {
        use crate::entry::RecordType;

        let mut graph = Graph::new();
        graph.push(crate::graph::ObjectInfo {
            offset: 0,
            length: 4,
            pack_size: 4,
            crc32: 0,
            disk_type: RecordType::Blob,
            resolved_type: Some(ObjectType::Blob),
            parent: None,
            children: Vec::new(),
            hash: Some(hash.clone()),
            content: None,
        });
        graph
    }

    #[test]
    fn materialize_base_distinguishes_missing_store_from_store_without_base() {
        let hash = Hasher::hash_object(HashAlgorithm::Sha1, "blob", b"gone").unwrap();

        // No store attached at all: the source can't re-read (non-seekable)
        // and there's nowhere else to look.
        let scanner = Scanner::new(StreamSource(&b""[..]));
        let mut resolver = Resolver::new(released_base_graph(&hash), scanner, ObjectCache::default(), None);
        let err = resolver.materialize_base(0).unwrap_err();
        assert!(matches!(err, PackError::NotSeekableWithoutStore));

        // A store is attached but simply doesn't carry this hash: a
        // different, more specific error than "no store at all".
        let scanner = Scanner::new(StreamSource(&b""[..]));
        let mut store = InMemoryObjectStore::new();
        let mut resolver = Resolver::new(
            released_base_graph(&hash),
            scanner,
            ObjectCache::default(),
            Some(&mut store),
        );
        let err = resolver.materialize_base(0).unwrap_err();
        assert!(matches!(err, PackError::BaseNotInStore { hash: h } if h == hash));
    }
}
