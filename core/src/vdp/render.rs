use rgb::RGB8;

use super::color::{ColorMapper, ColorVariant};
use super::frame::FrameBuffer;
use super::memory::MemoryStore;
use super::registers::{
    HorizontalMode, HorizontalScrollMode, RegisterFile, VerticalScrollMode, VideoMode,
};

/// One layer's contribution to a pixel: the resolved color, the raw
/// 6-bit CRAM index (palette row * 16 + color) and the tile or sprite
/// priority bit. Index color 0 within a palette row is transparent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerPixel {
    pub rgb: RGB8,
    pub color: u8,
    pub priority: bool,
}

impl LayerPixel {
    fn drawn(self) -> bool {
        self.color & 0x0F != 0
    }
}

/// A finished frame plus the sprite-evaluation outcome latched into
/// the status word by the caller.
pub struct FrameOutput {
    pub frame: FrameBuffer,
    pub sprite_overflow: bool,
}

#[derive(Clone, Copy)]
enum Plane {
    A,
    B,
}

/// Scanline renderer.
///
/// `render_line` resolves each visible line into five full-frame layer
/// grids; `render_frame` walks the sprite table into per-line index
/// lists for the next frame and composites the grids into RGB output.
pub struct RenderPipeline {
    colors: ColorMapper,
    width: usize,
    height: usize,
    back: Vec<LayerPixel>,
    plane_a: Vec<LayerPixel>,
    plane_b: Vec<LayerPixel>,
    window: Vec<LayerPixel>,
    sprites: Vec<LayerPixel>,
    /// Sprite table indices per scanline, rebuilt by each evaluation
    /// pass and consumed by the following frame's line renders.
    line_sprites: Vec<Vec<u16>>,
    frame: FrameBuffer,
}

impl RenderPipeline {
    pub fn new(mode: VideoMode) -> Self {
        let width = mode.horizontal.pixels();
        let height = mode.vertical.lines();
        Self {
            colors: ColorMapper::new(),
            width,
            height,
            back: vec![LayerPixel::default(); width * height],
            plane_a: vec![LayerPixel::default(); width * height],
            plane_b: vec![LayerPixel::default(); width * height],
            window: vec![LayerPixel::default(); width * height],
            sprites: vec![LayerPixel::default(); width * height],
            line_sprites: vec![Vec::new(); height],
            frame: FrameBuffer::new(width, height),
        }
    }

    /// Resize every grid for a resolution change, discarding frame
    /// contents.
    pub fn set_mode(&mut self, mode: VideoMode) {
        *self = Self::new(mode);
    }

    /// Render one visible line into the layer grids.
    ///
    /// Returns true if two opaque sprite pixels overlapped on the line.
    pub fn render_line(
        &mut self,
        line: u16,
        registers: &RegisterFile,
        memory: &MemoryStore,
    ) -> bool {
        let line = usize::from(line);
        if line >= self.height {
            return false;
        }

        let row = line * self.width..(line + 1) * self.width;
        self.plane_a[row.clone()].fill(LayerPixel::default());
        self.plane_b[row.clone()].fill(LayerPixel::default());
        self.window[row.clone()].fill(LayerPixel::default());
        self.sprites[row.clone()].fill(LayerPixel::default());

        if !registers.display_enabled() {
            // Transparent black, not the backdrop color.
            self.back[row].fill(LayerPixel::default());
            return false;
        }

        let backdrop = registers.backdrop_color();
        self.back[row].fill(LayerPixel {
            rgb: self
                .colors
                .cram_word(ColorVariant::Normal, memory.palette_entry(backdrop)),
            color: backdrop,
            priority: false,
        });

        self.draw_plane(Plane::B, line, registers, memory);
        self.draw_plane(Plane::A, line, registers, memory);
        self.draw_window(line, registers, memory);
        self.draw_sprites(line, registers, memory)
    }

    /// End-of-frame pass: evaluate the sprite table for the coming
    /// frame and composite the current grids into the output frame.
    pub fn render_frame(&mut self, registers: &RegisterFile, memory: &MemoryStore) -> FrameOutput {
        let sprite_overflow = self.evaluate_sprites(registers, memory);
        self.composite(registers, memory);
        FrameOutput {
            frame: self.frame.clone(),
            sprite_overflow,
        }
    }

    fn draw_plane(
        &mut self,
        plane: Plane,
        line: usize,
        registers: &RegisterFile,
        memory: &MemoryStore,
    ) {
        let (plane_cols, plane_rows) = registers.plane_size();
        let pixel_mask = (plane_cols * 8 - 1) as u16;
        let line_mask = (plane_rows * 8 - 1) as u16;

        let (base, scroll_offset) = match plane {
            Plane::A => (registers.plane_a_base(), 0u16),
            Plane::B => (registers.plane_b_base(), 2u16),
        };

        let hscroll_entry = match registers.horizontal_scroll_mode() {
            HorizontalScrollMode::FullScreen => 0,
            HorizontalScrollMode::PerCell => (line as u16 & !7) * 4,
            HorizontalScrollMode::PerLine => line as u16 * 4,
        };
        let hscroll = memory.vram_word(
            registers
                .hscroll_base()
                .wrapping_add(hscroll_entry)
                .wrapping_add(scroll_offset),
        ) & 0x3FF;

        for x in 0..self.width {
            if matches!(plane, Plane::A) && window_covers(registers, x, line) {
                continue;
            }

            let vscroll = match registers.vertical_scroll_mode() {
                VerticalScrollMode::FullScreen => memory.vsram_word(scroll_offset),
                VerticalScrollMode::TwoCell => {
                    memory.vsram_word((x as u16 / 16) * 4 + scroll_offset)
                }
            } & 0x3FF;

            let plane_x = (x as u16).wrapping_sub(hscroll) & pixel_mask;
            let plane_y = (line as u16).wrapping_add(vscroll) & line_mask;

            let entry_address =
                base.wrapping_add(((plane_y / 8) * plane_cols as u16 + plane_x / 8) * 2);
            let entry = memory.vram_word(entry_address);
            let pixel = self.tile_pixel(memory, entry, plane_y % 8, plane_x % 8);
            let offset = line * self.width + x;
            match plane {
                Plane::A => self.plane_a[offset] = pixel,
                Plane::B => self.plane_b[offset] = pixel,
            }
        }
    }

    fn draw_window(&mut self, line: usize, registers: &RegisterFile, memory: &MemoryStore) {
        // Window nametable rows are 32 tiles in H32, 64 in H40.
        let row_tiles: u16 = match registers.video_mode().horizontal {
            HorizontalMode::H32 => 32,
            HorizontalMode::H40 => 64,
        };
        let base = registers.window_base();

        for x in 0..self.width {
            if !window_covers(registers, x, line) {
                continue;
            }
            let entry_address =
                base.wrapping_add(((line as u16 / 8) * row_tiles + x as u16 / 8) * 2);
            let entry = memory.vram_word(entry_address);
            let pixel = self.tile_pixel(memory, entry, line as u16 % 8, x as u16 % 8);
            self.window[line * self.width + x] = pixel;
        }
    }

    /// Draw the line's selected sprites. Earlier table entries win an
    /// overlap unless the later pixel has its priority bit set and the
    /// earlier one does not; any overlap of opaque pixels reports a
    /// collision.
    fn draw_sprites(&mut self, line: usize, registers: &RegisterFile, memory: &MemoryStore) -> bool {
        let base = registers.sprite_table_base();
        let mut collision = false;

        // The list is borrowed by value (indices) so the attribute
        // fetches below always see current table contents.
        for sprite_index in 0..self.line_sprites[line].len() {
            let entry = base.wrapping_add(self.line_sprites[line][sprite_index] * 8);
            let y = i32::from(memory.vram_word(entry) & 0x3FF) - 128;
            let word1 = memory.vram_word(entry.wrapping_add(2));
            let attributes = memory.vram_word(entry.wrapping_add(4));
            let x_left = i32::from(memory.vram_word(entry.wrapping_add(6)) & 0x1FF) - 128;
            let width_cells = ((word1 >> 10) & 0x03) + 1;
            let height_cells = ((word1 >> 8) & 0x03) + 1;

            let row = line as i32 - y;
            if row < 0 || row >= i32::from(height_cells) * 8 {
                // The table moved since evaluation; nothing to draw.
                continue;
            }
            let row = if attributes & 0x1000 != 0 {
                height_cells * 8 - 1 - row as u16
            } else {
                row as u16
            };
            let hflip = attributes & 0x0800 != 0;
            let palette = ((attributes >> 13) & 0x03) as u8;
            let priority = attributes & 0x8000 != 0;

            for i in 0..i32::from(width_cells) * 8 {
                let x = x_left + i;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let column = if hflip {
                    (i32::from(width_cells) * 8 - 1 - i) as u16
                } else {
                    i as u16
                };
                // Sprite patterns stack column-major: all cells of the
                // first column, then the next column.
                let tile = (attributes & 0x07FF)
                    .wrapping_add((column / 8) * height_cells + row / 8)
                    & 0x07FF;
                let pattern = tile * 32 + (row % 8) * 4 + (column % 8) / 2;
                let byte = memory.vram_byte(pattern);
                let nibble = if column % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                if nibble == 0 {
                    continue;
                }
                let color = palette * 16 + nibble;
                let pixel = LayerPixel {
                    rgb: self
                        .colors
                        .cram_word(ColorVariant::Normal, memory.palette_entry(color)),
                    color,
                    priority,
                };
                let target = &mut self.sprites[line * self.width + x as usize];
                if target.drawn() {
                    collision = true;
                    if pixel.priority && !target.priority {
                        *target = pixel;
                    }
                } else {
                    *target = pixel;
                }
            }
        }
        collision
    }

    /// Walk the sprite attribute table by link fields and record each
    /// sprite's index against every scanline it covers, up to the
    /// per-frame and per-line caps. Returns true if any line's cap was
    /// exceeded.
    fn evaluate_sprites(&mut self, registers: &RegisterFile, memory: &MemoryStore) -> bool {
        let mode = registers.video_mode();
        let frame_cap = mode.horizontal.sprites_per_frame();
        let line_cap = mode.horizontal.sprites_per_line();
        let base = registers.sprite_table_base();

        for list in &mut self.line_sprites {
            list.clear();
        }

        let mut overflow = false;
        let mut index: u16 = 0;
        for _ in 0..frame_cap {
            let entry = base.wrapping_add(index * 8);
            let y = i32::from(memory.vram_word(entry) & 0x3FF) - 128;
            let word1 = memory.vram_word(entry.wrapping_add(2));
            let height_cells = i32::from(((word1 >> 8) & 0x03) + 1);

            for row in 0..height_cells * 8 {
                let line = y + row;
                if line < 0 || line >= self.height as i32 {
                    continue;
                }
                let list = &mut self.line_sprites[line as usize];
                if list.len() < line_cap {
                    list.push(index);
                } else {
                    overflow = true;
                }
            }

            let link = word1 & 0x7F;
            if link == 0 || usize::from(link) >= frame_cap {
                break;
            }
            index = link;
        }
        overflow
    }

    /// Per-pixel nine-tier selection, lowest to highest: backdrop,
    /// plane B, plane A, sprite, window, then the same four layers
    /// again with their priority bits set.
    fn composite(&mut self, registers: &RegisterFile, memory: &MemoryStore) {
        let shadow_highlight = registers.shadow_highlight_enabled();
        let blank_left = registers.left_column_blank();

        for offset in 0..self.width * self.height {
            let x = offset % self.width;
            let back = self.back[offset];
            if blank_left && x < 8 {
                self.frame.set_pixel(x, offset / self.width, back.rgb);
                continue;
            }

            let window = self.window[offset];
            let plane_a = self.plane_a[offset];
            let plane_b = self.plane_b[offset];
            let mut sprite = self.sprites[offset];

            // Sprite colors 0x3E/0x3F act as highlight/shadow
            // operators on the pixel beneath instead of drawing.
            let operator = shadow_highlight && (sprite.color == 0x3E || sprite.color == 0x3F);
            let operator_color = sprite.color;
            if operator {
                sprite = LayerPixel::default();
            }

            let mut shadowable = false;
            let chosen = if window.drawn() && window.priority {
                window
            } else if sprite.drawn() && sprite.priority {
                sprite
            } else if plane_a.drawn() && plane_a.priority {
                plane_a
            } else if plane_b.drawn() && plane_b.priority {
                plane_b
            } else if window.drawn() {
                shadowable = true;
                window
            } else if sprite.drawn() {
                sprite
            } else if plane_a.drawn() {
                shadowable = true;
                plane_a
            } else if plane_b.drawn() {
                shadowable = true;
                plane_b
            } else {
                shadowable = true;
                back
            };

            let mut variant = ColorVariant::Normal;
            if shadow_highlight {
                // Low-tier scroll-layer and backdrop wins are shadowed
                // unless some scroll layer asserts priority at this
                // pixel; transparent priority pixels still count.
                if shadowable && !(window.priority || plane_a.priority || plane_b.priority) {
                    variant = ColorVariant::Shadow;
                }
                if operator {
                    variant = if operator_color == 0x3E {
                        match variant {
                            ColorVariant::Shadow => ColorVariant::Normal,
                            _ => ColorVariant::Highlight,
                        }
                    } else {
                        ColorVariant::Shadow
                    };
                }
            }

            let rgb = if variant == ColorVariant::Normal {
                chosen.rgb
            } else {
                self.colors
                    .cram_word(variant, memory.palette_entry(chosen.color))
            };
            self.frame.set_pixel(x, offset / self.width, rgb);
        }
    }

    fn tile_pixel(
        &self,
        memory: &MemoryStore,
        entry: u16,
        row: u16,
        column: u16,
    ) -> LayerPixel {
        let row = if entry & 0x1000 != 0 { 7 - row } else { row };
        let column = if entry & 0x0800 != 0 { 7 - column } else { column };
        let pattern = (entry & 0x07FF) * 32 + row * 4 + column / 2;
        let byte = memory.vram_byte(pattern);
        let nibble = if column % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        let color = (((entry >> 13) & 0x03) as u8) * 16 + nibble;
        LayerPixel {
            rgb: self
                .colors
                .cram_word(ColorVariant::Normal, memory.palette_entry(color)),
            color,
            priority: entry & 0x8000 != 0,
        }
    }
}

/// Window region test: the union of the horizontal and vertical
/// stripes described by registers 0x11/0x12.
fn window_covers(registers: &RegisterFile, x: usize, line: usize) -> bool {
    let h = registers.window_horizontal();
    let v = registers.window_vertical();
    let in_h = if h.from_far_edge { x >= h.at } else { x < h.at };
    let in_v = if v.from_far_edge { line >= v.at } else { line < v.at };
    in_h || in_v
}
