use super::memory::RamTarget;

/// Visible queue depth. The status word's full/empty bits and the
/// bus-stall behaviour of real software are defined against these four
/// slots.
pub const FIFO_DEPTH: usize = 4;

/// Hard capacity. Writes pushed while the visible queue is full still
/// land in the slack slots; only past eight entries are they lost.
const FIFO_CAPACITY: usize = 8;

/// One queued data-port write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FifoEntry {
    pub target: RamTarget,
    pub address: u16,
    pub value: u16,
}

/// The VDP write FIFO between the data port and internal RAM.
///
/// A fixed ring; entries drain one per available access slot, ahead of
/// any active DMA transfer.
pub struct Fifo {
    entries: [FifoEntry; FIFO_CAPACITY],
    head: usize,
    len: usize,
}

impl Fifo {
    pub fn new() -> Self {
        Self {
            entries: [FifoEntry::default(); FIFO_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Full as the status word reports it: all four visible slots
    /// occupied. The slack slots do not show here.
    pub fn is_full(&self) -> bool {
        self.len >= FIFO_DEPTH
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn push(&mut self, entry: FifoEntry) {
        if self.len == FIFO_CAPACITY {
            log::warn!(
                "VDP write FIFO overrun, dropping {:#06x} -> {:?} {:#06x}",
                entry.value,
                entry.target,
                entry.address
            );
            return;
        }
        self.entries[(self.head + self.len) % FIFO_CAPACITY] = entry;
        self.len += 1;
    }

    pub fn peek(&self) -> Option<FifoEntry> {
        (self.len > 0).then(|| self.entries[self.head])
    }

    pub fn pop(&mut self) -> Option<FifoEntry> {
        if self.len == 0 {
            return None;
        }
        let entry = self.entries[self.head];
        self.head = (self.head + 1) % FIFO_CAPACITY;
        self.len -= 1;
        Some(entry)
    }
}
