//! Consumers notified of each record the resolver reconstructs.

use git_hash::ObjectId;
use git_object::ObjectType;

use crate::PackError;

/// Receives the decode events in strict pack order:
/// `on_header` once, then (`on_inflated_object_header`, `on_inflated_object_content`)
/// pairs per record in pack order, then `on_footer` once.
///
/// Returning an error from any callback aborts resolution immediately.
pub trait Observer {
    fn on_header(&mut self, count: u32) -> Result<(), PackError> {
        let _ = count;
        Ok(())
    }

    fn on_inflated_object_header(
        &mut self,
        obj_type: ObjectType,
        size: usize,
        offset: u64,
    ) -> Result<(), PackError> {
        let _ = (obj_type, size, offset);
        Ok(())
    }

    fn on_inflated_object_content(
        &mut self,
        hash: ObjectId,
        offset: u64,
        crc32: u32,
        content: &[u8],
    ) -> Result<(), PackError> {
        let _ = (hash, offset, crc32, content);
        Ok(())
    }

    fn on_footer(&mut self, pack_hash: ObjectId) -> Result<(), PackError> {
        let _ = pack_hash;
        Ok(())
    }
}

/// Fans a single stream of callbacks out to several observers, in
/// registration order, stopping at the first error.
#[derive(Default)]
pub struct ObserverDispatcher {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }
}

impl Observer for ObserverDispatcher {
    fn on_header(&mut self, count: u32) -> Result<(), PackError> {
        for o in &mut self.observers {
            o.on_header(count)?;
        }
        Ok(())
    }

    fn on_inflated_object_header(
        &mut self,
        obj_type: ObjectType,
        size: usize,
        offset: u64,
    ) -> Result<(), PackError> {
        for o in &mut self.observers {
            o.on_inflated_object_header(obj_type, size, offset)?;
        }
        Ok(())
    }

    fn on_inflated_object_content(
        &mut self,
        hash: ObjectId,
        offset: u64,
        crc32: u32,
        content: &[u8],
    ) -> Result<(), PackError> {
        for o in &mut self.observers {
            o.on_inflated_object_content(hash, offset, crc32, content)?;
        }
        Ok(())
    }

    fn on_footer(&mut self, pack_hash: ObjectId) -> Result<(), PackError> {
        for o in &mut self.observers {
            o.on_footer(pack_hash)?;
        }
        Ok(())
    }
}
