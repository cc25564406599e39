//! Packfile decoding and object resolution.
//!
//! Given a stream or seekable source containing a packfile, this crate
//! reconstructs every full object (applying delta patches as needed),
//! assigns each a content hash, and hands inflated contents to
//! [`observer::Observer`]s — optionally persisting them through an
//! [`store::ObjectStore`]. It does not produce packfiles, negotiate
//! transport, or interpret object content beyond the four base types.

pub mod cache;
pub mod delta;
pub mod entry;
pub mod graph;
pub mod observer;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod store;

use git_hash::ObjectId;

use cache::ObjectCache;
use observer::Observer;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;
use source::PackSource;
use store::ObjectStore;

/// Errors that can occur while decoding a packfile.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("malformed pack header: {0}")]
    MalformedHeader(String),

    #[error("unexpected end of pack stream: {0}")]
    UnexpectedEof(String),

    #[error("unsupported pack version: {0}")]
    UnsupportedVersion(u32),

    #[error("pack checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: ObjectId, actual: ObjectId },

    #[error("offset-delta at {offset} references a back-distance of {back_distance}, which is not strictly earlier in the pack")]
    MalformedReference { offset: u64, back_distance: u64 },

    #[error("corrupt record header at offset {0}: {1}")]
    CorruptEntry(u64, String),

    #[error("delta source size mismatch: delta declares {expected}, base is {actual} bytes")]
    DeltaSourceSizeMismatch { expected: usize, actual: usize },

    #[error("delta target size mismatch: delta declares {expected}, produced {actual} bytes")]
    DeltaTargetSizeMismatch { expected: usize, actual: usize },

    #[error("delta copy out of bounds: offset={offset}, size={size}, base_len={base_len}")]
    DeltaCopyOutOfBounds {
        offset: usize,
        size: usize,
        base_len: usize,
    },

    #[error("delta insert instruction has invalid length")]
    DeltaInsertInvalidLength,

    #[error("{count} hash-delta reference(s) remained unresolved after the full pass")]
    UnresolvedReferenceDelta { count: usize },

    #[error("pack source is not seekable and no object store was provided")]
    NotSeekableWithoutStore,

    #[error("base object {hash} was released and evicted, and the attached object store has no record of it")]
    BaseNotInStore { hash: ObjectId },

    #[error("delta payload at offset {0} was not retained for this non-seekable source")]
    DeltaNotCached(u64),

    #[error("observer callback failed: {0}")]
    ObserverError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] git_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] git_hash::HashError),
}

/// Pack format constants.
pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";
pub const PACK_HEADER_SIZE: usize = 12;
pub const PACK_SUPPORTED_VERSIONS: [u32; 2] = [2, 3];

/// A fully resolved object handed to callers through [`store::ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedObject {
    pub hash: ObjectId,
    pub obj_type: git_object::ObjectType,
    pub data: Vec<u8>,
}

/// Decodes an entire packfile: parses its record graph, resolves every
/// delta, and notifies `observer` of each object in pack order, finishing
/// with `on_footer`. Uses a default-sized object cache; see
/// [`decode_pack_with_cache`] to configure one.
pub fn decode_pack<S: PackSource>(
    scanner: Scanner<S>,
    observer: &mut dyn Observer,
    store: Option<&mut dyn ObjectStore>,
) -> Result<ObjectId, PackError> {
    decode_pack_with_cache(scanner, observer, store, ObjectCache::default())
}

/// Same as [`decode_pack`], with an explicit [`ObjectCache`] (for a
/// non-default byte budget, or one shared across several pack decodes).
pub fn decode_pack_with_cache<S: PackSource>(
    scanner: Scanner<S>,
    observer: &mut dyn Observer,
    store: Option<&mut dyn ObjectStore>,
    cache: ObjectCache,
) -> Result<ObjectId, PackError> {
    let parser = Parser::new(scanner);
    let (graph, scanner, pack_hash) = parser.parse(observer)?;

    let resolver = Resolver::new(graph, scanner, cache, store);
    resolver.run(observer)?;

    observer.on_footer(pack_hash)?;
    Ok(pack_hash)
}
