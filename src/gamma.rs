// sRGB <-> linear lookup tables.
// Feathered hole rims darken the camera image in linear light; the tables keep
// that to two lookups per channel instead of powf calls.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), index = (linear * 4095).round()
    to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, slot) in to_linear.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut to_srgb = [0u8; 4096];
        for (i, slot) in to_srgb.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.to_srgb[idx]
    }

    /// Mix a 0x00RRGGBB pixel toward black by `coverage` (0 = untouched, 1 = black).
    #[inline]
    pub fn darken(&self, px: u32, coverage: f32) -> u32 {
        let keep = 1.0 - coverage;
        let channel = |shift: u32| {
            let c = ((px >> shift) & 0xFF) as u8;
            self.linear_to_srgb_u8(self.srgb_u8_to_linear(c) * keep) as u32
        };
        (channel(16) << 16) | (channel(8) << 8) | channel(0)
    }
}
