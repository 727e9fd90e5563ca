// Core types shared by the trail, the renderer and the compositor.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/// One recorded pointer position, surface-local, with the tick time it was captured at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub seq: u64,       // append counter; never reused within a renderer's lifetime
    pub x: f32,
    pub y: f32,
    pub timestamp: f64, // seconds
}

impl PointerSample {
    #[inline]
    pub fn same_position(&self, x: f32, y: f32) -> bool {
        self.x == x && self.y == y
    }
}

/// The overlay rectangle in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaskSurface {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl MaskSurface {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Surface covering a whole window of the given pixel size.
    pub fn window(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }
}

/// A transparent disc punched through the mask, in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub seq: u64, // sequence number of the sample that produced it
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// Geometry for one frame: the surface is opaque except inside the union of `holes`.
#[derive(Debug, Clone, Default)]
pub struct MaskFrame {
    pub surface: MaskSurface,
    pub holes: Vec<Hole>, // chronological order
}

impl MaskFrame {
    pub fn is_fully_opaque(&self) -> bool {
        self.holes.is_empty()
    }
}

/// Per-pixel mask coverage in [0,1]; 1 = opaque black, 0 = camera visible.
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<f32>,   // length = width * height
}

/// Precomputed disc "stamp" punched into the Mask for every hole.
pub struct Stamp {
    pub radius: i32,       // pixels from center to edge
    pub weights: Vec<f32>, // (2r+1)*(2r+1), centered; 1.0 = fully transparent hole
}
