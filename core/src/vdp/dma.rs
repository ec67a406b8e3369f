use super::VdpBus;
use super::fifo::Fifo;
use super::memory::{MemoryStore, RamTarget};
use super::port::PortController;
use super::registers::{HorizontalMode, RegisterFile};

/// An in-flight transfer. Memory transfers move whole words from the
/// external bus; fill and copy move single VRAM bytes.
enum Transfer {
    Memory {
        target: RamTarget,
        /// Word address on the external bus.
        source: u32,
        remaining: u32,
    },
    /// A fill command was issued; the next data-port write supplies the
    /// fill value and starts it.
    AwaitingFill { remaining: u32 },
    Fill { value: u8, remaining: u32 },
    Copy { source: u16, remaining: u32 },
}

impl Transfer {
    fn kind(&self) -> TransferKind {
        match self {
            Self::Memory { .. } => TransferKind::Memory,
            Self::AwaitingFill { .. } | Self::Fill { .. } => TransferKind::Fill,
            Self::Copy { .. } => TransferKind::Copy,
        }
    }
}

#[derive(Clone, Copy)]
enum TransferKind {
    Memory,
    Fill,
    Copy,
}

/// Transfer bandwidth in bytes per scanline, measured on hardware.
/// Blanking lines (vertical blank or display disabled) free nearly all
/// access slots for the transfer.
fn bytes_per_line(kind: TransferKind, horizontal: HorizontalMode, blanking: bool) -> u32 {
    use HorizontalMode::{H32, H40};
    match (kind, horizontal, blanking) {
        (TransferKind::Memory, H32, false) => 16,
        (TransferKind::Memory, H32, true) => 167,
        (TransferKind::Memory, H40, false) => 18,
        (TransferKind::Memory, H40, true) => 205,
        (TransferKind::Fill, H32, false) => 15,
        (TransferKind::Fill, H32, true) => 166,
        (TransferKind::Fill, H40, false) => 17,
        (TransferKind::Fill, H40, true) => 204,
        (TransferKind::Copy, H32, false) => 8,
        (TransferKind::Copy, H32, true) => 83,
        (TransferKind::Copy, H40, false) => 9,
        (TransferKind::Copy, H40, true) => 102,
    }
}

/// VRAM sits on an 8-bit internal bus, so a word write costs two byte
/// slots; CRAM and VSRAM take a word per slot.
fn word_cost(target: RamTarget) -> u32 {
    match target {
        RamTarget::Vram => 2,
        RamTarget::Cram | RamTarget::Vsram => 1,
    }
}

/// Advance a memory-transfer word source. The source never carries
/// across a bank boundary: work RAM (byte addresses 0xE00000 and up)
/// mirrors every 64 KiB, everything else wraps within 128 KiB.
fn advance_memory_source(source: u32) -> u32 {
    if source << 1 >= 0xE0_0000 {
        (source & !0x7FFF) | (source.wrapping_add(1) & 0x7FFF)
    } else {
        (source & !0xFFFF) | (source.wrapping_add(1) & 0xFFFF)
    }
}

/// The DMA unit, including the shared access-slot budget that also
/// paces the write FIFO drain.
///
/// `run_slot` is called once per pixel slot. The budget accumulates
/// `bytes_per_line` each slot and one byte of work is performed for
/// every `slots_per_line` accumulated, which spreads a line's bandwidth
/// evenly without tracking individual refresh and render slots. Queued
/// FIFO writes always drain ahead of transfer units.
pub struct DmaEngine {
    transfer: Option<Transfer>,
    accumulator: u32,
}

impl DmaEngine {
    pub fn new() -> Self {
        Self {
            transfer: None,
            accumulator: 0,
        }
    }

    /// Reflected in status bit 1. An armed fill counts as busy even
    /// before its value is latched.
    pub fn is_busy(&self) -> bool {
        self.transfer.is_some()
    }

    /// Start the transfer described by registers 0x13-0x17 for a
    /// completed control command with the DMA code bit set.
    pub fn begin(&mut self, registers: &RegisterFile, port: &PortController) {
        if !registers.dma_enabled() {
            log::debug!("DMA command issued with DMA disabled, ignored");
            return;
        }
        if self.transfer.is_some() {
            log::warn!("DMA command issued while a transfer is active, ignored");
            return;
        }
        // Length zero transfers the full 65536 units.
        let remaining = match registers.dma_length() {
            0 => 0x1_0000,
            n => u32::from(n),
        };
        self.transfer = match registers.dma_mode_bits() {
            // Fill only arms against a VRAM write code; any other code
            // degrades the command to a memory transfer.
            0b10 if port.access_mode().write_target() == Some(RamTarget::Vram) => {
                Some(Transfer::AwaitingFill { remaining })
            }
            0b11 => Some(Transfer::Copy {
                source: registers.dma_source() as u16,
                remaining,
            }),
            _ => match port.access_mode().write_target() {
                Some(target) => Some(Transfer::Memory {
                    target,
                    source: registers.dma_source(),
                    remaining,
                }),
                None => {
                    log::warn!(
                        "memory DMA with non-write access code {:?}, ignored",
                        port.access_mode()
                    );
                    None
                }
            },
        };
    }

    /// Every data-port write is offered as a fill latch; the write
    /// itself still goes through the FIFO as a normal word write.
    /// Returns true if an armed fill consumed the value, in which case
    /// the port address must not auto-increment.
    pub fn notify_data_write(&mut self, value: u16) -> bool {
        if let Some(Transfer::AwaitingFill { remaining }) = self.transfer {
            self.transfer = Some(Transfer::Fill {
                value: (value >> 8) as u8,
                remaining,
            });
            return true;
        }
        false
    }

    /// Spend this pixel slot's bandwidth on queued FIFO writes, then on
    /// the active transfer.
    pub fn run_slot(
        &mut self,
        registers: &mut RegisterFile,
        port: &mut PortController,
        memory: &mut MemoryStore,
        fifo: &mut Fifo,
        bus: &mut dyn VdpBus,
        blanking: bool,
    ) {
        let horizontal = registers.video_mode().horizontal;
        let slots = u32::from(horizontal.slots_per_line());
        let kind = self
            .transfer
            .as_ref()
            .map_or(TransferKind::Memory, Transfer::kind);
        self.accumulator += bytes_per_line(kind, horizontal, blanking);

        loop {
            if let Some(entry) = fifo.peek() {
                let cost = slots * word_cost(entry.target);
                if self.accumulator < cost {
                    return;
                }
                self.accumulator -= cost;
                fifo.pop();
                memory.set_word(entry.target, entry.address, entry.value);
                continue;
            }

            let cost = match &self.transfer {
                None | Some(Transfer::AwaitingFill { .. }) => {
                    // Unused slots are lost, not banked.
                    self.accumulator = 0;
                    return;
                }
                Some(Transfer::Memory { target, .. }) => slots * word_cost(*target),
                Some(Transfer::Fill { .. }) | Some(Transfer::Copy { .. }) => slots,
            };
            if self.accumulator < cost {
                return;
            }
            self.accumulator -= cost;

            match self.transfer.take() {
                Some(Transfer::Memory {
                    target,
                    source,
                    remaining,
                }) => {
                    let value = bus.read_word((source << 1) & 0xFF_FFFF);
                    memory.set_word(target, port.address(), value);
                    port.advance_address(registers.auto_increment());
                    let source = advance_memory_source(source);
                    if remaining > 1 {
                        self.transfer = Some(Transfer::Memory {
                            target,
                            source,
                            remaining: remaining - 1,
                        });
                    } else {
                        registers.write_back_dma_state(0, source);
                    }
                }
                Some(Transfer::Fill { value, remaining }) => {
                    // Fill writes single bytes to the partner of the
                    // current address, so it interleaves with whatever
                    // the arming word write left behind.
                    memory.set_vram_byte(port.address() ^ 1, value);
                    port.advance_address(registers.auto_increment());
                    if remaining > 1 {
                        self.transfer = Some(Transfer::Fill {
                            value,
                            remaining: remaining - 1,
                        });
                    } else {
                        registers.write_back_dma_state(0, registers.dma_source());
                    }
                }
                Some(Transfer::Copy { source, remaining }) => {
                    // Straight byte copy, no partner swap on either end.
                    let byte = memory.vram_byte(source);
                    memory.set_vram_byte(port.address(), byte);
                    port.advance_address(registers.auto_increment());
                    let source = source.wrapping_add(1);
                    if remaining > 1 {
                        self.transfer = Some(Transfer::Copy {
                            source,
                            remaining: remaining - 1,
                        });
                    } else {
                        let high = registers.dma_source() & !0xFFFF;
                        registers.write_back_dma_state(0, high | u32::from(source));
                    }
                }
                // Idle states were filtered out by the cost match.
                _ => return,
            }
        }
    }
}
