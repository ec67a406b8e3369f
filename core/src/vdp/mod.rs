//! Mega Drive video display processor.
//!
//! The chip is driven one pixel slot at a time through [`Vdp::step`];
//! the host CPU talks to it through the data, control and HV-counter
//! ports. Everything the VDP does is paced by the slot clock: scanline
//! rendering, the write FIFO drain and DMA transfer bandwidth all key
//! off the counter state.

use bitflags::bitflags;

use dma::DmaEngine;
use fifo::{Fifo, FifoEntry};
use frame::FrameBuffer;
use memory::MemoryStore;
use port::{ControlWriteEffect, PortController};
use registers::{InterlaceMode, RegisterFile, Region, VideoMode};
use render::RenderPipeline;
use timing::CounterTimingEngine;

pub mod color;
pub mod dma;
pub mod fifo;
pub mod frame;
pub mod memory;
pub mod port;
pub mod registers;
pub mod render;
pub mod timing;

/// Word reads from the 68000 bus, needed only for memory-to-VDP DMA.
pub trait VdpBus {
    fn read_word(&mut self, address: u32) -> u16;
}

bitflags! {
    /// Status port bits. The unused upper bits read back as the open
    /// bus pattern 0x3400.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Status: u16 {
        const PAL                = 0x0001;
        const DMA_BUSY           = 0x0002;
        const H_BLANK            = 0x0004;
        const V_BLANK            = 0x0008;
        const ODD_FRAME          = 0x0010;
        const SPRITE_COLLISION   = 0x0020;
        const SPRITE_OVERFLOW    = 0x0040;
        const VERTICAL_INTERRUPT = 0x0080;
        const FIFO_FULL          = 0x0100;
        const FIFO_EMPTY         = 0x0200;
    }
}

const STATUS_OPEN_BUS: u16 = 0x3400;

/// Outcome of one pixel-slot step.
#[derive(Default)]
pub struct StepResult {
    /// The completed frame, present on the step that enters vertical
    /// blank.
    pub frame: Option<FrameBuffer>,
    /// Level 6 interrupt request, already gated on the enable bit.
    pub vertical_interrupt: bool,
    /// Level 4 interrupt request, already gated on the enable bit.
    pub horizontal_interrupt: bool,
}

pub struct Vdp {
    registers: RegisterFile,
    memory: MemoryStore,
    timing: CounterTimingEngine,
    port: PortController,
    fifo: Fifo,
    dma: DmaEngine,
    pipeline: RenderPipeline,
    video_mode: VideoMode,
    odd_frame: bool,
    sprite_collision: bool,
    sprite_overflow: bool,
    /// Frozen HV counter while the latch bit is set.
    hv_latched: Option<u16>,
}

impl Vdp {
    pub fn new(region: Region) -> Self {
        let registers = RegisterFile::new(region);
        let video_mode = registers.video_mode();
        Self {
            registers,
            memory: MemoryStore::new(),
            timing: CounterTimingEngine::new(video_mode),
            port: PortController::new(),
            fifo: Fifo::new(),
            dma: DmaEngine::new(),
            pipeline: RenderPipeline::new(video_mode),
            video_mode,
            odd_frame: false,
            sprite_collision: false,
            sprite_overflow: false,
            hv_latched: None,
        }
    }

    /// Advance one pixel slot: move the counters, render the line when
    /// its last slot is reached, then spend the slot's access bandwidth
    /// on the FIFO and DMA.
    pub fn step(&mut self, bus: &mut dyn VdpBus) -> StepResult {
        let events = self
            .timing
            .advance(self.registers.horizontal_interrupt_reload());

        if let Some(line) = events.render_line {
            self.sprite_collision |=
                self.pipeline.render_line(line, &self.registers, &self.memory);
        }

        let blanking = self.timing.in_v_blank() || !self.registers.display_enabled();
        self.dma.run_slot(
            &mut self.registers,
            &mut self.port,
            &mut self.memory,
            &mut self.fifo,
            bus,
            blanking,
        );

        let mut result = StepResult {
            frame: None,
            vertical_interrupt: events.vertical_interrupt
                && self.registers.vertical_interrupt_enabled(),
            horizontal_interrupt: events.horizontal_interrupt
                && self.registers.horizontal_interrupt_enabled(),
        };
        if events.vblank_start {
            if self.video_mode.interlace != InterlaceMode::Off {
                self.odd_frame = !self.odd_frame;
            }
            let output = self.pipeline.render_frame(&self.registers, &self.memory);
            self.sprite_overflow |= output.sprite_overflow;
            result.frame = Some(output.frame);
        }
        result
    }

    pub fn write_control(&mut self, word: u16) {
        match self.port.write_control(word) {
            ControlWriteEffect::RegisterWrite { index, value } => {
                self.registers.write(index, value);
                self.sync_after_register_write();
            }
            ControlWriteEffect::CommandComplete { dma: true } => {
                self.dma.begin(&self.registers, &self.port);
            }
            ControlWriteEffect::CommandComplete { dma: false } | ControlWriteEffect::Pending => {}
        }
    }

    /// Status read. Clears the pending command latch, the vertical
    /// interrupt flag and the sprite collision/overflow flags.
    pub fn read_status(&mut self) -> u16 {
        let mut status = Status::empty();
        status.set(Status::PAL, self.registers.region() == Region::Pal);
        status.set(Status::DMA_BUSY, self.dma.is_busy());
        status.set(Status::H_BLANK, self.timing.in_h_blank());
        status.set(
            Status::V_BLANK,
            self.timing.in_v_blank() || !self.registers.display_enabled(),
        );
        status.set(Status::ODD_FRAME, self.odd_frame);
        status.set(Status::SPRITE_COLLISION, self.sprite_collision);
        status.set(Status::SPRITE_OVERFLOW, self.sprite_overflow);
        status.set(
            Status::VERTICAL_INTERRUPT,
            self.timing.vertical_interrupt_pending(),
        );
        status.set(Status::FIFO_FULL, self.fifo.is_full());
        status.set(Status::FIFO_EMPTY, self.fifo.is_empty());

        self.port.clear_pending();
        self.timing.acknowledge_vertical_interrupt();
        self.sprite_collision = false;
        self.sprite_overflow = false;

        STATUS_OPEN_BUS | status.bits()
    }

    /// Data port write: queued in the FIFO against the current access
    /// target, or consumed as the value latch of an armed DMA fill.
    pub fn write_data(&mut self, value: u16) {
        self.port.clear_pending();
        if let Some(target) = self.port.access_mode().write_target() {
            self.fifo.push(FifoEntry {
                target,
                address: self.port.address(),
                value,
            });
        } else {
            log::debug!(
                "data port write with access code {:?} dropped",
                self.port.access_mode()
            );
        }
        // An armed fill starts from the same address the latching
        // write went to.
        if !self.dma.notify_data_write(value) {
            self.port.advance_address(self.registers.auto_increment());
        }
    }

    /// Byte-wide data port write. The bus duplicates the byte onto
    /// both halves of the word.
    pub fn write_data_byte(&mut self, value: u8) {
        self.write_data(u16::from(value) * 0x0101);
    }

    /// Long-word data port write, performed as two word writes with
    /// the address advancing between them.
    pub fn write_data_long(&mut self, value: u32) {
        self.write_data((value >> 16) as u16);
        self.write_data(value as u16);
    }

    /// Data port read. Anything still queued in the FIFO is flushed to
    /// RAM first so the read observes every earlier write.
    pub fn read_data(&mut self) -> u16 {
        self.port.clear_pending();
        while let Some(entry) = self.fifo.pop() {
            self.memory.set_word(entry.target, entry.address, entry.value);
        }
        let value = match self.port.access_mode().read_target() {
            Some(target) => self.memory.word(target, self.port.address() & !1),
            None => {
                log::debug!(
                    "data port read with access code {:?} returns zero",
                    self.port.access_mode()
                );
                0
            }
        };
        self.port.advance_address(self.registers.auto_increment());
        value
    }

    /// The HV counter port: vertical counter in the high byte,
    /// horizontal in the low byte, frozen while the latch bit is set.
    pub fn hv_counter(&self) -> u16 {
        self.hv_latched.unwrap_or_else(|| self.live_hv_counter())
    }

    fn live_hv_counter(&self) -> u16 {
        (u16::from(self.timing.v_counter_byte()) << 8) | u16::from(self.timing.h_counter_byte())
    }

    fn sync_after_register_write(&mut self) {
        let mode = self.registers.video_mode();
        if mode != self.video_mode {
            self.video_mode = mode;
            self.timing.set_mode(mode);
            self.pipeline.set_mode(mode);
        }
        if self.registers.hv_counter_latch_enabled() {
            if self.hv_latched.is_none() {
                self.hv_latched = Some(self.live_hv_counter());
            }
        } else {
            self.hv_latched = None;
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Direct RAM access for frontends and debuggers; the emulated CPU
    /// goes through the ports.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}
