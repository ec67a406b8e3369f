use super::registers::{HorizontalMode, Region, VerticalMode, VideoMode};

/// Counter behaviour for one {region, H, V} combination.
///
/// The internal counters are linear slot/line counts; the hardware's
/// non-linear register view is produced by `raw_view`. Blanking
/// positions are linear pixel offsets within a line, with 0 at the
/// start of active display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CounterTable {
    /// Pixel slots per scanline.
    h_total: u16,
    /// Raw pixel at which the horizontal view jumps forward.
    h_jump: u16,
    /// Pixel where the h-blank flag asserts.
    h_blank_set: u16,
    /// Pixel (early next line) where the h-blank flag deasserts.
    h_blank_clear: u16,
    /// Lines per frame.
    v_total: u16,
    /// Raw line at which the vertical view jumps forward.
    v_jump: u16,
    /// First v-blank line; equals the active display height.
    active_lines: u16,
}

/// The horizontal view is 10 bits wide internally (two pixels per
/// external count), the vertical view 9 bits.
const H_COUNTER_LIMIT: u16 = 0x3FF;
const V_COUNTER_LIMIT: u16 = 0x1FF;

fn table_for(mode: VideoMode) -> CounterTable {
    let (h_total, h_jump, h_blank_set, h_blank_clear) = match mode.horizontal {
        // External view: 0x00-0x93, then 0xE9-0xFF. Blank at 0x93/0x05.
        HorizontalMode::H32 => (342, 0x128, 294, 10),
        // External view: 0x00-0xB5, then 0xE4-0xFF. Blank at 0xB2/0x06.
        HorizontalMode::H40 => (420, 0x16C, 356, 12),
    };
    let (v_total, v_jump) = match (mode.region, mode.vertical) {
        // 0x00-0xE9, then 0xE4-0xFF
        (Region::Ntsc, VerticalMode::V28) => (262, 0x0EA),
        // 0x00-0xFF, 0x00-0x05; no visible jump, the view wraps twice
        (Region::Ntsc, VerticalMode::V30) => (262, 0x106),
        // 0x00-0xFF, 0x00-0x02, then 0xCA-0xFF
        (Region::Pal, VerticalMode::V28) => (313, 0x103),
        // 0x00-0xFF, 0x00-0x0A, then 0xD2-0xFF
        (Region::Pal, VerticalMode::V30) => (313, 0x10B),
    };
    CounterTable {
        h_total,
        h_jump,
        h_blank_set,
        h_blank_clear,
        v_total,
        v_jump,
        active_lines: mode.vertical.lines() as u16,
    }
}

/// Map a linear count onto the hardware's non-linear counter: past the
/// jump trigger the count continues from `(limit + 1) + jump - total`,
/// so it reaches the wrap limit exactly at the end of the period.
fn raw_view(linear: u16, jump: u16, limit: u16, total: u16) -> u16 {
    if linear >= jump {
        (linear + (limit + 1) - total) & limit
    } else {
        linear
    }
}

/// Events produced by one slot advance, in the order the engine must
/// act on them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SlotEvents {
    /// The visible line whose last pixel slot was just reached.
    pub render_line: Option<u16>,
    /// The vertical counter just crossed into the blanking region.
    pub vblank_start: bool,
    /// One-shot vertical interrupt latch event.
    pub vertical_interrupt: bool,
    /// The H-line countdown underflowed on this line.
    pub horizontal_interrupt: bool,
}

/// Horizontal/vertical pixel counters, blanking edges and interrupt
/// latches. Driven one hardware step at a time by `advance`; all other
/// engine triggers key off the events it returns, so DMA bandwidth and
/// render decisions always observe post-advance counter state.
pub struct CounterTimingEngine {
    table: CounterTable,
    /// Linear pixel slot within the current line.
    h: u16,
    /// Linear line within the current frame.
    line: u16,
    h_blank: bool,
    v_blank: bool,
    /// One-shot, visible in the status word until acknowledged.
    vertical_interrupt_pending: bool,
    hint_countdown: u8,
}

impl CounterTimingEngine {
    pub fn new(mode: VideoMode) -> Self {
        Self {
            table: table_for(mode),
            h: 0,
            line: 0,
            h_blank: false,
            v_blank: false,
            vertical_interrupt_pending: false,
            hint_countdown: 0,
        }
    }

    /// Reset for a new video mode: both counters to zero, all latches
    /// cleared.
    pub fn set_mode(&mut self, mode: VideoMode) {
        *self = Self::new(mode);
    }

    /// Advance the horizontal counter by one hardware step.
    ///
    /// The vertical counter advances every `h_total` steps, at the
    /// frame-start horizontal position; the vertical interrupt is
    /// latched there when the blanking line is reached, which is why
    /// the horizontal counter condition from the hardware manual holds
    /// by construction.
    pub fn advance(&mut self, hint_reload: u8) -> SlotEvents {
        let mut events = SlotEvents::default();
        let table = self.table;

        self.h += 1;

        // Blanking edges only fire on the exact crossing.
        if self.h == table.h_blank_set && !self.h_blank {
            self.h_blank = true;
        }
        if self.h == table.h_blank_clear && self.h_blank {
            self.h_blank = false;
        }

        if self.h == table.h_total - 1 && self.line < table.active_lines {
            events.render_line = Some(self.line);
        }

        if self.h == table.h_total {
            self.h = 0;
            self.line += 1;
            if self.line == table.v_total {
                self.line = 0;
                self.v_blank = false;
            }

            // The countdown runs on every active line and the line
            // immediately after; elsewhere it reloads continuously.
            if self.line <= table.active_lines {
                if self.hint_countdown == 0 {
                    self.hint_countdown = hint_reload;
                    events.horizontal_interrupt = true;
                } else {
                    self.hint_countdown -= 1;
                }
            } else {
                self.hint_countdown = hint_reload;
            }

            if self.line == table.active_lines {
                self.v_blank = true;
                self.vertical_interrupt_pending = true;
                events.vblank_start = true;
                events.vertical_interrupt = true;
            }
        }

        events
    }

    pub fn in_h_blank(&self) -> bool {
        self.h_blank
    }

    pub fn in_v_blank(&self) -> bool {
        self.v_blank
    }

    pub fn vertical_interrupt_pending(&self) -> bool {
        self.vertical_interrupt_pending
    }

    pub fn acknowledge_vertical_interrupt(&mut self) {
        self.vertical_interrupt_pending = false;
    }

    /// The truncated 8-bit horizontal counter as the HV port reads it:
    /// one external count per two pixels, with the wrap jump applied.
    pub fn h_counter_byte(&self) -> u8 {
        let table = self.table;
        (raw_view(self.h, table.h_jump, H_COUNTER_LIMIT, table.h_total) >> 1) as u8
    }

    /// The truncated 8-bit vertical counter with the wrap jump applied.
    pub fn v_counter_byte(&self) -> u8 {
        let table = self.table;
        raw_view(self.line, table.v_jump, V_COUNTER_LIMIT, table.v_total) as u8
    }

    /// Current line as a linear count, for render triggers and tests.
    pub fn line(&self) -> u16 {
        self.line
    }
}
