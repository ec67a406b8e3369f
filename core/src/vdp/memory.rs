/// Video RAM: 64 KiB of tile patterns, nametables and the sprite
/// attribute table, byte-addressed on a 16-bit internal bus.
pub const VRAM_SIZE: usize = 0x10000;
/// Color RAM: 64 palette entries of one word each.
pub const CRAM_SIZE: usize = 128;
/// Vertical scroll RAM: 40 columns x 2 bytes per plane pair.
pub const VSRAM_SIZE: usize = 80;

/// Which of the three internal RAMs a port access or FIFO entry targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RamTarget {
    #[default]
    Vram,
    Cram,
    Vsram,
}

/// The VDP's three internal RAM arrays.
///
/// Word access is big-endian-ish with a twist on VRAM: the high byte
/// lands at `addr` and the low byte at `addr ^ 1`, so a word write to
/// an odd address stores its bytes swapped within the aligned pair.
/// Software depends on this for fast single-byte updates.
pub struct MemoryStore {
    vram: Box<[u8; VRAM_SIZE]>,
    cram: [u8; CRAM_SIZE],
    vsram: [u8; VSRAM_SIZE],
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            vram: Box::new([0; VRAM_SIZE]),
            cram: [0; CRAM_SIZE],
            vsram: [0; VSRAM_SIZE],
        }
    }

    pub fn vram_byte(&self, address: u16) -> u8 {
        self.vram[address as usize]
    }

    pub fn set_vram_byte(&mut self, address: u16, value: u8) {
        self.vram[address as usize] = value;
    }

    /// Read a VRAM word: MSB from `addr`, LSB from `addr ^ 1`.
    pub fn vram_word(&self, address: u16) -> u16 {
        let hi = self.vram[address as usize];
        let lo = self.vram[(address ^ 1) as usize];
        (u16::from(hi) << 8) | u16::from(lo)
    }

    /// Write a VRAM word: MSB to `addr`, LSB to `addr ^ 1`.
    pub fn set_vram_word(&mut self, address: u16, value: u16) {
        self.vram[address as usize] = (value >> 8) as u8;
        self.vram[(address ^ 1) as usize] = value as u8;
    }

    /// Read a CRAM word. Addresses wrap at the 128-byte table and are
    /// aligned down to the entry boundary.
    pub fn cram_word(&self, address: u16) -> u16 {
        let addr = (address as usize % CRAM_SIZE) & !1;
        u16::from_be_bytes([self.cram[addr], self.cram[addr + 1]])
    }

    pub fn set_cram_word(&mut self, address: u16, value: u16) {
        let addr = (address as usize % CRAM_SIZE) & !1;
        self.cram[addr..addr + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Palette entry lookup by 6-bit color index (palette row * 16 + color).
    pub fn palette_entry(&self, index: u8) -> u16 {
        self.cram_word(u16::from(index & 0x3F) << 1)
    }

    /// Read a VSRAM word. The port decodes a 128-byte window but only
    /// 80 bytes are backed; the tail reads zero.
    pub fn vsram_word(&self, address: u16) -> u16 {
        let addr = (address as usize % 128) & !1;
        if addr >= VSRAM_SIZE {
            return 0;
        }
        u16::from_be_bytes([self.vsram[addr], self.vsram[addr + 1]]) & 0x07FF
    }

    pub fn set_vsram_word(&mut self, address: u16, value: u16) {
        let addr = (address as usize % 128) & !1;
        if addr >= VSRAM_SIZE {
            log::debug!("VSRAM write past backed range dropped: {address:#06x}");
            return;
        }
        self.vsram[addr..addr + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Word write dispatch used by the FIFO drain and the DMA engine.
    pub fn set_word(&mut self, target: RamTarget, address: u16, value: u16) {
        match target {
            RamTarget::Vram => self.set_vram_word(address, value),
            RamTarget::Cram => self.set_cram_word(address, value),
            RamTarget::Vsram => self.set_vsram_word(address, value),
        }
    }

    pub fn word(&self, target: RamTarget, address: u16) -> u16 {
        match target {
            RamTarget::Vram => self.vram_word(address),
            RamTarget::Cram => self.cram_word(address),
            RamTarget::Vsram => self.vsram_word(address),
        }
    }
}
