//! Builds the delta graph in a single forward pass over the pack.

use git_hash::hasher::Hasher;
use git_hash::{HashAlgorithm, ObjectId};

use crate::entry::RecordType;
use crate::graph::{Graph, ObjectInfo};
use crate::observer::Observer;
use crate::scanner::Scanner;
use crate::source::PackSource;
use crate::PackError;

pub struct Parser<S> {
    scanner: Scanner<S>,
}

impl<S: PackSource> Parser<S> {
    /// Wraps `scanner`. A non-seekable source with no object store attached
    /// is not rejected here: a pack whose deltas only ever reference other
    /// in-pack objects parses and resolves fine either way. The resolver
    /// raises [`PackError::NotSeekableWithoutStore`] only at the point it
    /// actually needs to recover a released base and has neither capability.
    pub fn new(scanner: Scanner<S>) -> Self {
        Self { scanner }
    }

    /// Runs the forward pass: classifies every record as base or delta,
    /// links deltas to their bases, records pending hash-delta references,
    /// and verifies the trailing checksum. Returns the built graph, the
    /// scanner (now positioned right after the trailer, ready for the
    /// resolver to seek backward), and the verified pack hash.
    pub fn parse(
        mut self,
        observer: &mut dyn Observer,
    ) -> Result<(Graph, Scanner<S>, ObjectId), PackError> {
        let (_version, count) = self.scanner.read_header()?;
        observer.on_header(count)?;

        let seekable = self.scanner.is_seekable();
        let mut graph = Graph::new();

        for _ in 0..count {
            let hdr = self.scanner.next_record_header()?;
            let mut payload = Vec::with_capacity(hdr.size);
            let (pack_size, crc32) = self.scanner.next_record_payload(&mut payload)?;

            match hdr.record_type {
                RecordType::Commit | RecordType::Tree | RecordType::Blob | RecordType::Tag => {
                    let obj_type = hdr.record_type.to_object_type().unwrap();
                    let hash = Hasher::hash_object(
                        HashAlgorithm::Sha1,
                        &obj_type.to_string(),
                        &payload,
                    )?;
                    let idx = graph.push(ObjectInfo {
                        offset: hdr.offset,
                        length: hdr.size,
                        pack_size,
                        crc32,
                        disk_type: hdr.record_type,
                        resolved_type: Some(obj_type),
                        parent: None,
                        children: Vec::new(),
                        hash: Some(hash.clone()),
                        content: Some(payload),
                    });
                    graph.by_hash.insert(hash, idx);
                }
                RecordType::OfsDelta { base_offset } => {
                    let parent_idx = *graph.by_offset.get(&base_offset).ok_or(
                        PackError::MalformedReference {
                            offset: hdr.offset,
                            back_distance: hdr.offset - base_offset,
                        },
                    )?;
                    let idx = graph.push(ObjectInfo {
                        offset: hdr.offset,
                        length: hdr.size,
                        pack_size,
                        crc32,
                        disk_type: hdr.record_type,
                        resolved_type: None,
                        parent: Some(parent_idx),
                        children: Vec::new(),
                        hash: None,
                        content: None,
                    });
                    graph.nodes[parent_idx].children.push(idx);
                    if !seekable {
                        graph.deltas.insert(hdr.offset, payload);
                    }
                }
                RecordType::RefDelta { base_hash } => {
                    let existing_parent = graph.by_hash.get(&base_hash).copied();
                    let idx = graph.push(ObjectInfo {
                        offset: hdr.offset,
                        length: hdr.size,
                        pack_size,
                        crc32,
                        disk_type: hdr.record_type,
                        resolved_type: None,
                        parent: existing_parent,
                        children: Vec::new(),
                        hash: None,
                        content: None,
                    });
                    match existing_parent {
                        Some(parent_idx) => graph.nodes[parent_idx].children.push(idx),
                        None => match graph.pending.get_mut(&base_hash) {
                            Some(bucket) => bucket.push(idx),
                            None => {
                                graph.pending.insert(base_hash, vec![idx]);
                            }
                        },
                    }
                    if !seekable {
                        graph.deltas.insert(hdr.offset, payload);
                    }
                }
            }
        }

        let pack_hash = self.scanner.checksum()?;
        Ok((graph, self.scanner, pack_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::ObserverDispatcher;
    use crate::source::StreamSource;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn entry_header(type_num: u8, size: u64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        let mut s = size;
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

    fn build_pack(records: &[(u8, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"PACK");
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&(records.len() as u32).to_be_bytes());
        for (type_num, payload) in records {
            body.extend_from_slice(&entry_header(*type_num, payload.len() as u64));
            body.extend_from_slice(&zlib(payload));
        }
        let mut h = git_hash::hasher::Hasher::new(HashAlgorithm::Sha1);
        h.update(&body);
        let trailer = h.finalize().unwrap();
        body.extend_from_slice(trailer.as_bytes());
        body
    }

    #[test]
    fn two_base_blobs_index_by_offset_and_hash() {
        let pack = build_pack(&[(3, b"a"), (3, b"b")]);
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut dispatcher = ObserverDispatcher::new();
        let (graph, _scanner, _hash) = parser.parse(&mut dispatcher).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.by_offset.len(), 2);
        assert_eq!(graph.by_hash.len(), 2);
        assert!(graph.pending.is_empty());
    }

    #[test]
    fn empty_pack_has_no_nodes() {
        let pack = build_pack(&[]);
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut dispatcher = ObserverDispatcher::new();
        let (graph, _scanner, _hash) = parser.parse(&mut dispatcher).unwrap();
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn non_seekable_without_store_still_parses_pure_in_pack_pack() {
        // A non-seekable source with no object store is only a problem if
        // resolution ends up needing one; parsing itself never requires it.
        let pack = build_pack(&[(3, b"a")]);
        let scanner = Scanner::new(StreamSource(&pack[..]));
        let parser = Parser::new(scanner);
        let mut dispatcher = ObserverDispatcher::new();
        let (graph, _scanner, _hash) = parser.parse(&mut dispatcher).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }
}
