use bitflags::bitflags;

/// Console region. Fixed at construction; selects counter totals and
/// the PAL status bit. There is no register to change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
}

/// Horizontal resolution: 32 or 40 tile columns (256 / 320 pixels).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalMode {
    H32,
    H40,
}

impl HorizontalMode {
    pub fn cells(self) -> usize {
        match self {
            Self::H32 => 32,
            Self::H40 => 40,
        }
    }

    pub fn pixels(self) -> usize {
        self.cells() * 8
    }

    /// Pixel slots per scanline, including blanking.
    pub fn slots_per_line(self) -> u16 {
        match self {
            Self::H32 => 342,
            Self::H40 => 420,
        }
    }

    pub fn sprites_per_line(self) -> usize {
        match self {
            Self::H32 => 16,
            Self::H40 => 20,
        }
    }

    pub fn sprites_per_frame(self) -> usize {
        match self {
            Self::H32 => 64,
            Self::H40 => 80,
        }
    }
}

/// Vertical resolution: 28 or 30 tile rows (224 / 240 lines).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalMode {
    V28,
    V30,
}

impl VerticalMode {
    pub fn lines(self) -> usize {
        match self {
            Self::V28 => 224,
            Self::V30 => 240,
        }
    }
}

/// Interlace field handling, from register 0x0C bits 2:1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterlaceMode {
    Off,
    /// Same resolution, alternating fields; the odd-frame status bit
    /// toggles every frame.
    Interlaced,
    /// Double vertical resolution variant; modeled only as far as the
    /// odd-frame latch (resolutions beyond the documented modes are a
    /// non-goal).
    DoubleResolution,
}

/// The active video mode. An immutable value recomputed only when a
/// mode-affecting register (0, 1, 0x0C) is written; everything timing-
/// or limit-related derives from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoMode {
    pub region: Region,
    pub horizontal: HorizontalMode,
    pub vertical: VerticalMode,
    pub interlace: InterlaceMode,
}

impl VideoMode {
    pub fn lines_per_frame(self) -> u16 {
        match self.region {
            Region::Ntsc => 262,
            Region::Pal => 313,
        }
    }
}

bitflags! {
    /// Mode register 1 (register 0).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Mode1: u8 {
        const LEFT_COLUMN_BLANK          = 0b0010_0000;
        const HORIZONTAL_INTERRUPT_ENABLE = 0b0001_0000;
        const HV_COUNTER_LATCH           = 0b0000_0010;
    }
}

bitflags! {
    /// Mode register 2 (register 1).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Mode2: u8 {
        const VRAM_128K                 = 0b1000_0000;
        const DISPLAY_ENABLE            = 0b0100_0000;
        const VERTICAL_INTERRUPT_ENABLE = 0b0010_0000;
        const DMA_ENABLE                = 0b0001_0000;
        const V30                       = 0b0000_1000;
        const MODE5                     = 0b0000_0100;
    }
}

/// Horizontal scroll granularity, register 0x0B bits 1:0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalScrollMode {
    FullScreen,
    /// One scroll pair per 8-line cell row.
    PerCell,
    PerLine,
}

/// Vertical scroll granularity, register 0x0B bit 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalScrollMode {
    FullScreen,
    /// One VSRAM pair per 2-cell column.
    TwoCell,
}

/// Window plane split, from registers 0x11/0x12. The window occupies
/// the region from the named edge up to the split point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSplit {
    /// Window sits on the right (H) / bottom (V) side of the split.
    pub from_far_edge: bool,
    /// Split position in pixels/lines from the near edge.
    pub at: usize,
}

/// The 24 byte-wide VDP registers plus the mode flags cached from them.
///
/// Registers are write-only from the host; every write re-derives the
/// cached flags so the rest of the engine never parses raw bytes on the
/// hot path.
pub struct RegisterFile {
    values: [u8; 24],
    region: Region,
    mode1: Mode1,
    mode2: Mode2,
    video_mode: VideoMode,
}

pub const REGISTER_COUNT: usize = 24;

impl RegisterFile {
    pub fn new(region: Region) -> Self {
        let mut registers = Self {
            values: [0; REGISTER_COUNT],
            region,
            mode1: Mode1::empty(),
            mode2: Mode2::empty(),
            video_mode: VideoMode {
                region,
                horizontal: HorizontalMode::H32,
                vertical: VerticalMode::V28,
                interlace: InterlaceMode::Off,
            },
        };
        registers.recompute_modes();
        registers
    }

    /// Write one register. Out-of-range indices are tolerated and
    /// logged; existing software pokes them freely.
    pub fn write(&mut self, index: u8, value: u8) {
        if usize::from(index) >= REGISTER_COUNT {
            log::debug!("write to unimplemented VDP register {index:#04x} ignored");
            return;
        }
        self.values[usize::from(index)] = value;
        if matches!(index, 0x00 | 0x01 | 0x0C) {
            self.recompute_modes();
        }
    }

    pub fn value(&self, index: u8) -> u8 {
        self.values[usize::from(index)]
    }

    fn recompute_modes(&mut self) {
        self.mode1 = Mode1::from_bits_truncate(self.values[0x00]);
        self.mode2 = Mode2::from_bits_truncate(self.values[0x01]);

        // H40 requires both RS bits set; anything else is H32.
        let horizontal = if self.values[0x0C] & 0x81 == 0x81 {
            HorizontalMode::H40
        } else {
            HorizontalMode::H32
        };
        let vertical = if self.mode2.contains(Mode2::V30) {
            VerticalMode::V30
        } else {
            VerticalMode::V28
        };
        let interlace = match (self.values[0x0C] >> 1) & 0x03 {
            0b01 => InterlaceMode::Interlaced,
            0b11 => InterlaceMode::DoubleResolution,
            _ => InterlaceMode::Off,
        };
        self.video_mode = VideoMode {
            region: self.region,
            horizontal,
            vertical,
            interlace,
        };
    }

    pub fn video_mode(&self) -> VideoMode {
        self.video_mode
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn display_enabled(&self) -> bool {
        self.mode2.contains(Mode2::DISPLAY_ENABLE)
    }

    pub fn dma_enabled(&self) -> bool {
        self.mode2.contains(Mode2::DMA_ENABLE)
    }

    pub fn vertical_interrupt_enabled(&self) -> bool {
        self.mode2.contains(Mode2::VERTICAL_INTERRUPT_ENABLE)
    }

    pub fn horizontal_interrupt_enabled(&self) -> bool {
        self.mode1.contains(Mode1::HORIZONTAL_INTERRUPT_ENABLE)
    }

    pub fn left_column_blank(&self) -> bool {
        self.mode1.contains(Mode1::LEFT_COLUMN_BLANK)
    }

    pub fn hv_counter_latch_enabled(&self) -> bool {
        self.mode1.contains(Mode1::HV_COUNTER_LATCH)
    }

    pub fn shadow_highlight_enabled(&self) -> bool {
        self.values[0x0C] & 0x08 != 0
    }

    /// Backdrop color as a 6-bit CRAM index (palette row * 16 + color).
    pub fn backdrop_color(&self) -> u8 {
        self.values[0x07] & 0x3F
    }

    pub fn horizontal_interrupt_reload(&self) -> u8 {
        self.values[0x0A]
    }

    pub fn auto_increment(&self) -> u16 {
        u16::from(self.values[0x0F])
    }

    pub fn plane_a_base(&self) -> u16 {
        u16::from(self.values[0x02] & 0x38) << 10
    }

    pub fn plane_b_base(&self) -> u16 {
        u16::from(self.values[0x04] & 0x07) << 13
    }

    pub fn window_base(&self) -> u16 {
        // H40 ignores bit 1; the table is 2 KiB aligned there.
        let mask = match self.video_mode.horizontal {
            HorizontalMode::H32 => 0x3E,
            HorizontalMode::H40 => 0x3C,
        };
        u16::from(self.values[0x03] & mask) << 10
    }

    pub fn sprite_table_base(&self) -> u16 {
        let mask = match self.video_mode.horizontal {
            HorizontalMode::H32 => 0x7F,
            HorizontalMode::H40 => 0x7E,
        };
        u16::from(self.values[0x05] & mask) << 9
    }

    pub fn hscroll_base(&self) -> u16 {
        u16::from(self.values[0x0D] & 0x3F) << 10
    }

    pub fn horizontal_scroll_mode(&self) -> HorizontalScrollMode {
        match self.values[0x0B] & 0x03 {
            0b00 => HorizontalScrollMode::FullScreen,
            0b10 => HorizontalScrollMode::PerCell,
            0b11 => HorizontalScrollMode::PerLine,
            // Prohibited encoding; real units fetch garbage here, no
            // software relies on it.
            _ => HorizontalScrollMode::FullScreen,
        }
    }

    pub fn vertical_scroll_mode(&self) -> VerticalScrollMode {
        if self.values[0x0B] & 0x04 != 0 {
            VerticalScrollMode::TwoCell
        } else {
            VerticalScrollMode::FullScreen
        }
    }

    /// Plane dimensions in tiles. The prohibited size encoding 0b10
    /// falls back to 32.
    pub fn plane_size(&self) -> (usize, usize) {
        let dimension = |bits: u8| match bits & 0x03 {
            0b00 => 32,
            0b01 => 64,
            0b11 => 128,
            _ => 32,
        };
        (
            dimension(self.values[0x10]),
            dimension(self.values[0x10] >> 4),
        )
    }

    /// Horizontal window split in pixels (units of 2 cells).
    pub fn window_horizontal(&self) -> WindowSplit {
        WindowSplit {
            from_far_edge: self.values[0x11] & 0x80 != 0,
            at: usize::from(self.values[0x11] & 0x1F) * 16,
        }
    }

    /// Vertical window split in lines (units of 1 cell).
    pub fn window_vertical(&self) -> WindowSplit {
        WindowSplit {
            from_far_edge: self.values[0x12] & 0x80 != 0,
            at: usize::from(self.values[0x12] & 0x1F) * 8,
        }
    }

    pub fn dma_length(&self) -> u16 {
        (u16::from(self.values[0x14]) << 8) | u16::from(self.values[0x13])
    }

    /// DMA source in words (22 bits); doubled by the DMA engine for
    /// memory-to-VRAM byte addressing.
    pub fn dma_source(&self) -> u32 {
        (u32::from(self.values[0x17] & 0x3F) << 16)
            | (u32::from(self.values[0x16]) << 8)
            | u32::from(self.values[0x15])
    }

    /// Bits 7:6 of the DMA source-high register select the mode.
    pub fn dma_mode_bits(&self) -> u8 {
        self.values[0x17] >> 6
    }

    /// Completion write-back: host software polls these registers after
    /// a transfer and expects them to reflect the final state.
    pub fn write_back_dma_state(&mut self, length: u16, source: u32) {
        self.values[0x13] = length as u8;
        self.values[0x14] = (length >> 8) as u8;
        self.values[0x15] = source as u8;
        self.values[0x16] = (source >> 8) as u8;
        self.values[0x17] = (self.values[0x17] & 0xC0) | ((source >> 16) as u8 & 0x3F);
    }
}
