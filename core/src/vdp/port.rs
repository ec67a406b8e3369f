use super::memory::RamTarget;

/// Decoded port access mode from the 6-bit command code. Only the
/// documented encodings move data; everything else reads garbage and
/// writes nowhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    VramRead,
    VramWrite,
    CramRead,
    CramWrite,
    VsramRead,
    VsramWrite,
    Invalid,
}

impl AccessMode {
    fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0x0 => Self::VramRead,
            0x1 => Self::VramWrite,
            0x3 => Self::CramWrite,
            0x4 => Self::VsramRead,
            0x5 => Self::VsramWrite,
            0x8 => Self::CramRead,
            _ => Self::Invalid,
        }
    }

    /// RAM written by data-port writes in this mode, if any.
    pub fn write_target(self) -> Option<RamTarget> {
        match self {
            Self::VramWrite => Some(RamTarget::Vram),
            Self::CramWrite => Some(RamTarget::Cram),
            Self::VsramWrite => Some(RamTarget::Vsram),
            _ => None,
        }
    }

    /// RAM read by data-port reads in this mode, if any.
    pub fn read_target(self) -> Option<RamTarget> {
        match self {
            Self::VramRead => Some(RamTarget::Vram),
            Self::CramRead => Some(RamTarget::Cram),
            Self::VsramRead => Some(RamTarget::Vsram),
            _ => None,
        }
    }
}

/// What a control-port word write amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlWriteEffect {
    /// First half of a two-word command; the port now waits for the
    /// second half.
    Pending,
    RegisterWrite {
        index: u8,
        value: u8,
    },
    /// A full command was assembled. `dma` is bit 5 of the code; the
    /// engine decides whether a transfer actually starts.
    CommandComplete {
        dma: bool,
    },
}

/// Control-port command state: the 6-bit access code, the address
/// register and the first-word-seen latch.
///
/// A control write while the latch is set is always consumed as a
/// command second word, even if its top bits look like a register
/// write. Any data-port access or status read drops the latch, which
/// is how software abandons a half-written command.
pub struct PortController {
    code: u8,
    address: u16,
    pending: bool,
}

impl PortController {
    pub fn new() -> Self {
        Self {
            code: 0,
            address: 0,
            pending: false,
        }
    }

    pub fn write_control(&mut self, word: u16) -> ControlWriteEffect {
        if self.pending {
            // Second command word: code bits 5:2 and address bits 15:14.
            self.pending = false;
            self.code = (self.code & 0x03) | (((word >> 2) & 0x3C) as u8);
            self.address = (self.address & 0x3FFF) | ((word & 0x0003) << 14);
            return ControlWriteEffect::CommandComplete {
                dma: self.code & 0x20 != 0,
            };
        }

        if word & 0xC000 == 0x8000 {
            return ControlWriteEffect::RegisterWrite {
                index: ((word >> 8) & 0x1F) as u8,
                value: word as u8,
            };
        }

        // First command word: code bits 1:0 and address bits 13:0. The
        // untouched high bits persist from the previous command.
        self.pending = true;
        self.code = (self.code & 0x3C) | ((word >> 14) as u8);
        self.address = (self.address & 0xC000) | (word & 0x3FFF);
        ControlWriteEffect::Pending
    }

    pub fn access_mode(&self) -> AccessMode {
        AccessMode::from_code(self.code)
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    /// Post-access address increment, from register 0x0F.
    pub fn advance_address(&mut self, auto_increment: u16) {
        self.address = self.address.wrapping_add(auto_increment);
    }

    pub fn command_pending(&self) -> bool {
        self.pending
    }

    /// Data-port accesses and status reads abandon a half-written
    /// command.
    pub fn clear_pending(&mut self) {
        self.pending = false;
    }
}
