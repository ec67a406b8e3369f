use overdrive_core::vdp::Vdp;
use overdrive_core::vdp::frame::FrameBuffer;
use overdrive_core::vdp::registers::Region;
use overdrive_core::VdpBus;

pub const VRAM_READ: u8 = 0x00;
pub const VRAM_WRITE: u8 = 0x01;
pub const CRAM_WRITE: u8 = 0x03;
pub const VSRAM_READ: u8 = 0x04;
pub const VSRAM_WRITE: u8 = 0x05;
pub const CRAM_READ: u8 = 0x08;
pub const DMA_FLAG: u8 = 0x20;

/// Bus stub for steps that never reach a memory transfer.
pub struct NullBus;

impl VdpBus for NullBus {
    fn read_word(&mut self, _address: u32) -> u16 {
        0
    }
}

/// Bus stub serving a word slice mapped at a fixed base address.
pub struct TestBus {
    pub base: u32,
    pub words: Vec<u16>,
}

impl VdpBus for TestBus {
    fn read_word(&mut self, address: u32) -> u16 {
        let index = (address.wrapping_sub(self.base) / 2) as usize;
        self.words.get(index).copied().unwrap_or(0)
    }
}

/// NTSC unit with display and DMA enabled and auto-increment 2.
pub fn setup() -> Vdp {
    let mut vdp = Vdp::new(Region::Ntsc);
    vdp.write_control(0x8154);
    vdp.write_control(0x8F02);
    vdp
}

/// Issue the two-word command for an access code and address.
pub fn command(vdp: &mut Vdp, code: u8, address: u16) {
    vdp.write_control((u16::from(code & 0x03) << 14) | (address & 0x3FFF));
    vdp.write_control((u16::from(code & 0x3C) << 2) | (address >> 14));
}

pub fn run_slots(vdp: &mut Vdp, slots: u32) {
    for _ in 0..slots {
        vdp.step(&mut NullBus);
    }
}

/// Step until the next completed frame is delivered.
pub fn run_frame(vdp: &mut Vdp) -> FrameBuffer {
    for _ in 0..2 * 313 * 420 {
        if let Some(frame) = vdp.step(&mut NullBus).frame {
            return frame;
        }
    }
    panic!("no frame delivered within two PAL frames of slots");
}

/// Write a run of words through the data port, pausing for the FIFO
/// to drain between bursts.
pub fn write_vram_words(vdp: &mut Vdp, address: u16, values: &[u16]) {
    vdp.write_control(0x8F02);
    for (burst_index, burst) in values.chunks(4).enumerate() {
        command(vdp, VRAM_WRITE, address + burst_index as u16 * 8);
        for &value in burst {
            vdp.write_data(value);
        }
        run_slots(vdp, 342);
    }
}
