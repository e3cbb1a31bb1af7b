use std::sync::Arc;

pub type WriteSlots = evmap::WriteHandle<&'static str, Arc<Vec<u8>>>;
pub type ReadSlots = evmap::ReadHandle<&'static str, Arc<Vec<u8>>>;

/// A storage for the fee market slots that keeps data in memory.
///
/// Writes are staged by [`Self::put`] and become visible to a [`FeeMarketMemoryReader`] together
/// on the next [`Self::publish`].
#[derive(Debug)]
pub struct FeeMarketMemory {
    slots: WriteSlots,
}

impl FeeMarketMemory {
    pub fn new(slots: WriteSlots) -> Self {
        Self { slots }
    }

    pub fn put(&mut self, key: &'static str, bytes: Vec<u8>) {
        self.slots.update(key, Arc::new(bytes));
    }

    pub fn publish(&mut self) {
        self.slots.refresh();
    }
}

impl AsRef<ReadSlots> for FeeMarketMemory {
    fn as_ref(&self) -> &ReadSlots {
        &self.slots
    }
}

#[derive(Debug, Clone)]
pub struct FeeMarketMemoryReader {
    slots: ReadSlots,
}

impl FeeMarketMemoryReader {
    pub fn new(slots: ReadSlots) -> Self {
        Self { slots }
    }
}

impl AsRef<ReadSlots> for FeeMarketMemoryReader {
    fn as_ref(&self) -> &ReadSlots {
        &self.slots
    }
}

pub trait ReadFeeMarketMemory {
    fn get(&self, key: &'static str) -> Option<Arc<Vec<u8>>>;

    /// Reads every slot of `keys` from the same publication.
    fn get_all<const N: usize>(&self, keys: [&'static str; N]) -> [Option<Arc<Vec<u8>>>; N];
}

impl<T: AsRef<ReadSlots>> ReadFeeMarketMemory for T {
    fn get(&self, key: &'static str) -> Option<Arc<Vec<u8>>> {
        self.as_ref().get_one(&key).map(|bytes| Arc::clone(&bytes))
    }

    fn get_all<const N: usize>(&self, keys: [&'static str; N]) -> [Option<Arc<Vec<u8>>>; N] {
        let Some(slots) = self.as_ref().read() else {
            return [const { None }; N];
        };

        keys.map(|key| slots.get_one(&key).cloned())
    }
}

pub mod shared_memory {
    use crate::fee_market::{FeeMarketMemory, FeeMarketMemoryReader};

    pub fn new() -> (FeeMarketMemoryReader, FeeMarketMemory) {
        let (r, w) = evmap::new();

        (FeeMarketMemoryReader::new(r), FeeMarketMemory::new(w))
    }
}
