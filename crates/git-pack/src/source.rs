//! Capability abstraction over the byte source a [`crate::scanner::Scanner`] reads from.
//!
//! The resolver needs to know, at runtime, whether it can re-read earlier
//! bytes of the pack (seekable: disk file, mmap) or whether every delta
//! payload it might need later must be retained as it is first seen
//! (non-seekable: a network stream). `PackSource` exposes that capability
//! uniformly so `Scanner` and `Resolver` stay generic over a single type
//! parameter instead of branching on the concrete reader type.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

/// A byte source a [`crate::scanner::Scanner`] can read a pack from.
///
/// Implementations that cannot seek simply inherit the default `seek_from_start`,
/// which always fails — callers must check [`PackSource::is_seekable`] first.
pub trait PackSource: Read {
    fn is_seekable(&self) -> bool {
        false
    }

    fn seek_from_start(&mut self, offset: u64) -> io::Result<()> {
        let _ = offset;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "pack source is not seekable",
        ))
    }
}

/// Wraps any [`Read`] as a non-seekable pack source.
pub struct StreamSource<R>(pub R);

impl<R: Read> Read for StreamSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> PackSource for StreamSource<R> {}

/// Wraps a [`Read`] + [`std::io::Seek`] reader as a seekable pack source.
pub struct SeekableSource<R>(pub R);

impl<R: Read> Read for SeekableSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + io::Seek> PackSource for SeekableSource<R> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn seek_from_start(&mut self, offset: u64) -> io::Result<()> {
        self.0.seek(io::SeekFrom::Start(offset))?;
        Ok(())
    }
}

/// A memory-mapped on-disk pack, the random-access mode used when the pack
/// lives in a local file rather than arriving over a stream. Grounded on
/// `PackFile::open`'s `memmap2::Mmap::map` of the `.pack` file; this crate
/// has no on-disk index to validate alongside it, so opening one is just
/// mapping the file and handing the resulting bytes to a seekable cursor.
pub type MmapSource = SeekableSource<Cursor<memmap2::Mmap>>;

/// Opens `path` and memory-maps it as a seekable [`PackSource`].
///
/// # Safety
///
/// Memory-mapping a file is unsafe in general: if another process truncates
/// or rewrites the file while it is mapped, reads through the mapping can
/// observe torn data or segfault. Callers are responsible for ensuring the
/// pack file is not concurrently modified, exactly as the teacher's own
/// `PackFile::open` requires of its callers.
pub unsafe fn open_mmap_source(path: impl AsRef<Path>) -> io::Result<MmapSource> {
    let file = File::open(path)?;
    let mmap = memmap2::Mmap::map(&file)?;
    Ok(SeekableSource(Cursor::new(mmap)))
}
