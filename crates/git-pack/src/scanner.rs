//! Frames pack records, inflates their payloads, and verifies the trailing
//! whole-pack checksum.
//!
//! The same [`Scanner::next_record_header`] / [`Scanner::next_record_payload`]
//! pair serves two callers: the parser's single forward pass (while the
//! running whole-pack hash is still being accumulated) and the resolver's
//! later re-reads after [`Scanner::seek_from_start`] (once the hash has
//! already been verified by [`Scanner::checksum`] and is no longer fed).

use std::io::Read;

use flate2::{Decompress, FlushDecompress, Status};
use git_hash::hasher::Hasher;
use git_hash::{HashAlgorithm, ObjectId};

use crate::entry::{RecordHeader, RecordType};
use crate::source::PackSource;
use crate::{PackError, PACK_HEADER_SIZE, PACK_SIGNATURE, PACK_SUPPORTED_VERSIONS};

const BUF_CAP: usize = 8192;

pub struct Scanner<S> {
    source: S,
    algo: HashAlgorithm,
    /// `None` once [`Scanner::checksum`] has run: the whole-pack hash is
    /// final and later re-reads (resolver seeks) must not perturb it.
    hasher: Option<Hasher>,
    buf: Vec<u8>,
    buf_pos: usize,
    position: u64,
    /// CRC accumulated by `next_record_header`, consumed by the paired
    /// `next_record_payload` call.
    pending_crc: Option<crc32fast::Hasher>,
}

impl<S: PackSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_algorithm(source, HashAlgorithm::Sha1)
    }

    pub fn with_algorithm(source: S, algo: HashAlgorithm) -> Self {
        Self {
            source,
            algo,
            hasher: Some(Hasher::new(algo)),
            buf: Vec::new(),
            buf_pos: 0,
            position: 0,
            pending_crc: None,
        }
    }

    pub fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seek_from_start(&mut self, offset: u64) -> Result<(), PackError> {
        self.source.seek_from_start(offset).map_err(PackError::Io)?;
        self.buf.clear();
        self.buf_pos = 0;
        self.position = offset;
        Ok(())
    }

    /// Reads the 12-byte pack header: magic, version (2 or 3), object count.
    pub fn read_header(&mut self) -> Result<(u32, u32), PackError> {
        let mut buf = [0u8; PACK_HEADER_SIZE];
        let mut discard = crc32fast::Hasher::new();
        self.read_tracked(&mut buf, &mut discard)?;

        if &buf[0..4] != PACK_SIGNATURE {
            return Err(PackError::MalformedHeader(format!(
                "bad magic: {:?}",
                &buf[0..4]
            )));
        }
        let version = u32::from_be_bytes(buf[4..8].try_into().unwrap());
        if !PACK_SUPPORTED_VERSIONS.contains(&version) {
            return Err(PackError::UnsupportedVersion(version));
        }
        let count = u32::from_be_bytes(buf[8..12].try_into().unwrap());
        Ok((version, count))
    }

    /// Reads one record's variable-length header (type, declared size,
    /// back-reference). Starts a fresh per-record CRC that
    /// `next_record_payload` continues and finalizes.
    pub fn next_record_header(&mut self) -> Result<RecordHeader, PackError> {
        let mut crc = crc32fast::Hasher::new();
        let record_offset = self.position;

        let mut byte = [0u8; 1];
        self.read_tracked(&mut byte, &mut crc)?;
        let c = byte[0];
        let type_num = (c >> 4) & 0x07;
        let mut size: u64 = (c & 0x0f) as u64;
        let mut shift = 4;
        let mut cont = c & 0x80 != 0;
        while cont {
            self.read_tracked(&mut byte, &mut crc)?;
            size |= ((byte[0] & 0x7f) as u64) << shift;
            shift += 7;
            cont = byte[0] & 0x80 != 0;
        }

        let record_type = match type_num {
            1 => RecordType::Commit,
            2 => RecordType::Tree,
            3 => RecordType::Blob,
            4 => RecordType::Tag,
            6 => {
                self.read_tracked(&mut byte, &mut crc)?;
                let mut c = byte[0];
                let mut back_distance = (c & 0x7f) as u64;
                while c & 0x80 != 0 {
                    back_distance += 1;
                    self.read_tracked(&mut byte, &mut crc)?;
                    c = byte[0];
                    back_distance = (back_distance << 7) + (c & 0x7f) as u64;
                }
                if back_distance > record_offset {
                    return Err(PackError::MalformedReference {
                        offset: record_offset,
                        back_distance,
                    });
                }
                RecordType::OfsDelta {
                    base_offset: record_offset - back_distance,
                }
            }
            7 => {
                let mut hash_buf = vec![0u8; self.algo.digest_len()];
                self.read_tracked(&mut hash_buf, &mut crc)?;
                let base_hash =
                    ObjectId::from_bytes(&hash_buf, self.algo).map_err(PackError::Hash)?;
                RecordType::RefDelta { base_hash }
            }
            other => {
                return Err(PackError::CorruptEntry(
                    record_offset,
                    format!("unknown record type {other}"),
                ))
            }
        };

        let header_len = (self.position - record_offset) as usize;
        self.pending_crc = Some(crc);
        Ok(RecordHeader {
            record_type,
            size: size as usize,
            offset: record_offset,
            header_len,
        })
    }

    /// Inflates the zlib-compressed payload following the most recent
    /// `next_record_header` call, appending inflated bytes to `sink`.
    /// Returns `(compressed_bytes_consumed, crc32_of_header_and_payload)`.
    pub fn next_record_payload(&mut self, sink: &mut Vec<u8>) -> Result<(u64, u32), PackError> {
        let mut crc = self.pending_crc.take().unwrap_or_default();
        let mut decompress = Decompress::new(true);
        let mut out_buf = [0u8; BUF_CAP];
        let mut compressed_consumed: u64 = 0;

        loop {
            let consumed_in;
            let produced_out;
            let status;
            {
                let avail = self.fill_buf()?;
                if avail.is_empty() {
                    return Err(PackError::UnexpectedEof(
                        "pack stream ended mid zlib record".into(),
                    ));
                }
                let before_in = decompress.total_in();
                let before_out = decompress.total_out();
                status = decompress
                    .decompress(avail, &mut out_buf, FlushDecompress::None)
                    .map_err(|e| PackError::UnexpectedEof(format!("corrupt zlib stream: {e}")))?;
                consumed_in = (decompress.total_in() - before_in) as usize;
                produced_out = (decompress.total_out() - before_out) as usize;
            }

            self.consume_tracked(consumed_in, &mut crc);
            sink.extend_from_slice(&out_buf[..produced_out]);
            compressed_consumed += consumed_in as u64;

            match status {
                Status::StreamEnd => break,
                Status::Ok if consumed_in == 0 && produced_out == 0 => {
                    return Err(PackError::UnexpectedEof("zlib stream stalled".into()));
                }
                Status::Ok => {}
                Status::BufError => {
                    return Err(PackError::UnexpectedEof("zlib buffer error".into()));
                }
            }
        }

        Ok((compressed_consumed, crc.finalize()))
    }

    /// Reads the trailing whole-pack hash and verifies it against the
    /// running hash of every byte read so far. Call exactly once, after the
    /// last record and before any resolver re-seeking.
    pub fn checksum(&mut self) -> Result<ObjectId, PackError> {
        let digest_len = self.algo.digest_len();
        let mut trailer = vec![0u8; digest_len];
        self.read_untracked(&mut trailer)?;

        let expected = ObjectId::from_bytes(&trailer, self.algo).map_err(PackError::Hash)?;
        let hasher = self
            .hasher
            .take()
            .expect("Scanner::checksum must be called exactly once");
        let actual = hasher.finalize().map_err(PackError::Hash)?;
        if actual != expected {
            return Err(PackError::ChecksumMismatch { expected, actual });
        }
        Ok(actual)
    }

    fn fill_buf(&mut self) -> Result<&[u8], PackError> {
        if self.buf_pos >= self.buf.len() {
            self.buf.resize(BUF_CAP, 0);
            let n = self.source.read(&mut self.buf).map_err(PackError::Io)?;
            self.buf.truncate(n);
            self.buf_pos = 0;
        }
        Ok(&self.buf[self.buf_pos..])
    }

    /// Feeds the whole-pack hash (if still active) and the per-record CRC.
    fn consume_tracked(&mut self, n: usize, crc: &mut crc32fast::Hasher) {
        let bytes = self.buf[self.buf_pos..self.buf_pos + n].to_vec();
        if let Some(hasher) = &mut self.hasher {
            hasher.update(&bytes);
        }
        crc.update(&bytes);
        self.buf_pos += n;
        self.position += n as u64;
    }

    fn read_tracked(&mut self, out: &mut [u8], crc: &mut crc32fast::Hasher) -> Result<(), PackError> {
        let mut written = 0;
        while written < out.len() {
            let take = {
                let avail = self.fill_buf()?;
                if avail.is_empty() {
                    return Err(PackError::UnexpectedEof("pack stream ended early".into()));
                }
                avail.len().min(out.len() - written)
            };
            out[written..written + take]
                .copy_from_slice(&self.buf[self.buf_pos..self.buf_pos + take]);
            self.consume_tracked(take, crc);
            written += take;
        }
        Ok(())
    }

    /// Reads bytes that are not part of the running whole-pack hash (the
    /// trailer itself).
    fn read_untracked(&mut self, out: &mut [u8]) -> Result<(), PackError> {
        let mut written = 0;
        while written < out.len() {
            let take = {
                let avail = self.fill_buf()?;
                if avail.is_empty() {
                    return Err(PackError::UnexpectedEof("truncated pack trailer".into()));
                }
                avail.len().min(out.len() - written)
            };
            out[written..written + take]
                .copy_from_slice(&self.buf[self.buf_pos..self.buf_pos + take]);
            self.buf_pos += take;
            self.position += take as u64;
            written += take;
        }
        Ok(())
    }
}
