use rgb::RGB8;

/// A completed frame of resolved RGB pixels, sized to the video mode
/// that was active when it was rendered. Delivered by value from
/// `Vdp::step` once per vertical blank; the engine keeps its own
/// working copy.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<RGB8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![RGB8::new(0, 0, 0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> RGB8 {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: RGB8) {
        self.pixels[y * self.width + x] = color;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[RGB8]> {
        self.pixels.chunks_exact(self.width)
    }
}
