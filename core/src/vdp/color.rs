use rgb::RGB8;

/// Which analog output level table a pixel resolves through.
///
/// Shadow and highlight are selected per pixel by the compositor when
/// register 0x0C bit 3 enables shadow/highlight mode; everything else
/// uses the normal table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorVariant {
    #[default]
    Normal,
    Shadow,
    Highlight,
}

/// Measured DAC output levels for each 3-bit channel value, scaled to
/// 0-255. The shadow table halves the voltage range from the bottom,
/// the highlight table from the top; shadow's maximum meets highlight's
/// minimum at the midpoint.
const NORMAL_LEVELS: [u8; 8] = [0, 52, 87, 116, 144, 172, 206, 255];
const SHADOW_LEVELS: [u8; 8] = [0, 29, 52, 70, 87, 101, 116, 130];
const HIGHLIGHT_LEVELS: [u8; 8] = [130, 144, 158, 172, 187, 206, 228, 255];

/// 3-bit-per-channel VDP color to RGB lookup.
///
/// Pure table lookup: one precomputed 8x8x8 cache per variant, indexed
/// by the packed 9-bit channel triple. No state beyond the caches.
pub struct ColorMapper {
    normal: [RGB8; 512],
    shadow: [RGB8; 512],
    highlight: [RGB8; 512],
}

impl ColorMapper {
    pub fn new() -> Self {
        Self {
            normal: build_cache(&NORMAL_LEVELS),
            shadow: build_cache(&SHADOW_LEVELS),
            highlight: build_cache(&HIGHLIGHT_LEVELS),
        }
    }

    /// Resolve three 3-bit channel values through the given table.
    pub fn rgb(&self, variant: ColorVariant, red: u8, green: u8, blue: u8) -> RGB8 {
        let index = cache_index(red, green, blue);
        match variant {
            ColorVariant::Normal => self.normal[index],
            ColorVariant::Shadow => self.shadow[index],
            ColorVariant::Highlight => self.highlight[index],
        }
    }

    /// Resolve a raw CRAM word (`0000 BBB0 GGG0 RRR0`).
    pub fn cram_word(&self, variant: ColorVariant, word: u16) -> RGB8 {
        let red = ((word >> 1) & 0x07) as u8;
        let green = ((word >> 5) & 0x07) as u8;
        let blue = ((word >> 9) & 0x07) as u8;
        self.rgb(variant, red, green, blue)
    }
}

fn cache_index(red: u8, green: u8, blue: u8) -> usize {
    (((blue & 0x07) as usize) << 6) | (((green & 0x07) as usize) << 3) | ((red & 0x07) as usize)
}

fn build_cache(levels: &[u8; 8]) -> [RGB8; 512] {
    let mut cache = [RGB8::new(0, 0, 0); 512];
    for blue in 0..8u8 {
        for green in 0..8u8 {
            for red in 0..8u8 {
                cache[cache_index(red, green, blue)] = RGB8::new(
                    levels[red as usize],
                    levels[green as usize],
                    levels[blue as usize],
                );
            }
        }
    }
    cache
}
