// Turns mask geometry into pixels.
// The surface rectangle is filled opaque, every hole stamps a transparent disc
// into it, and the result darkens the camera frame: black everywhere except
// inside the union of holes.

use crate::error::Error;
use crate::gamma::GammaLut;
use crate::types::{FrameBuffer, Hole, Mask, MaskFrame, MaskSurface, Stamp};

/// Disc stamp for holes of `radius` pixels with a rim feathered over `softness` pixels.
pub fn make_disc_stamp(radius: f32, softness: f32) -> Stamp {
    let r = radius.ceil().max(0.0) as i32;
    let d = 2 * r + 1;
    let inner = radius - softness;
    let mut weights = Vec::with_capacity((d * d) as usize);

    for y in -r..=r {
        for x in -r..=r {
            let dist = ((x * x + y * y) as f32).sqrt();
            let w = if dist <= inner {
                1.0
            } else if dist > radius {
                0.0
            } else {
                // smoothstep across the rim
                let t = (radius - dist) / softness;
                t * t * (3.0 - 2.0 * t)
            };
            weights.push(w);
        }
    }

    Stamp { radius: r, weights }
}

/// Punch one hole into the mask. `origin` is the surface position in mask pixels.
pub fn punch_hole(mask: &mut Mask, origin: (f32, f32), hole: &Hole, stamp: &Stamp) {
    let cx = (origin.0 + hole.cx).round() as i32;
    let cy = (origin.1 + hole.cy).round() as i32;
    let w = mask.width as i32;
    let h = mask.height as i32;
    let r = stamp.radius;
    let d = 2 * r + 1;

    for ky in 0..d {
        let sy = cy + ky - r;
        if sy < 0 || sy >= h { continue; }
        for kx in 0..d {
            let sx = cx + kx - r;
            if sx < 0 || sx >= w { continue; }
            let weight = stamp.weights[(ky * d + kx) as usize];
            if weight <= 0.0 { continue; }
            let idx = sy as usize * mask.width + sx as usize;
            let a = 1.0 - weight;
            if a < mask.alpha[idx] { mask.alpha[idx] = a; }
        }
    }
}

/// Reset the mask: opaque inside `surface`, clear outside it.
pub fn cover_surface(mask: &mut Mask, surface: &MaskSurface) {
    mask.alpha.fill(0.0);
    let x0 = (surface.x.round().max(0.0) as usize).min(mask.width);
    let y0 = (surface.y.round().max(0.0) as usize).min(mask.height);
    let x1 = ((surface.x + surface.width).round().max(0.0) as usize).min(mask.width);
    let y1 = ((surface.y + surface.height).round().max(0.0) as usize).min(mask.height);
    if x0 >= x1 {
        return;
    }
    for y in y0..y1 {
        let row = y * mask.width;
        mask.alpha[row + x0..row + x1].fill(1.0);
    }
}

/// What the last `MaskRaster::update` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterUpdate {
    Rebuilt,
    Appended(usize),
}

/// A mask kept in sync with successive `MaskFrame`s.
///
/// When a frame only adds holes after the ones already drawn (the usual
/// case while the pointer moves), only the new holes are stamped.
pub struct MaskRaster {
    mask: Mask,
    stamp: Stamp,
    surface: Option<MaskSurface>, // None = must rebuild
    first_seq: Option<u64>,
    last_seq: Option<u64>,
    drawn: usize,
}

impl MaskRaster {
    pub fn new(width: usize, height: usize, stamp: Stamp) -> Self {
        Self {
            mask: Mask { width, height, alpha: vec![0.0; width * height] },
            stamp,
            surface: None,
            first_seq: None,
            last_seq: None,
            drawn: 0,
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Match the window size; the next update rebuilds from scratch.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.mask.width && height == self.mask.height {
            return;
        }
        self.mask = Mask { width, height, alpha: vec![0.0; width * height] };
        self.surface = None;
    }

    fn extends_drawn(&self, frame: &MaskFrame) -> bool {
        if self.surface != Some(frame.surface) || frame.holes.len() < self.drawn {
            return false;
        }
        if self.drawn == 0 {
            return true;
        }
        frame.holes[0].seq == self.first_seq.unwrap_or(u64::MAX)
            && frame.holes[self.drawn - 1].seq == self.last_seq.unwrap_or(u64::MAX)
    }

    pub fn update(&mut self, frame: &MaskFrame) -> RasterUpdate {
        let origin = (frame.surface.x, frame.surface.y);
        let result = if self.extends_drawn(frame) {
            let fresh = &frame.holes[self.drawn..];
            for hole in fresh {
                punch_hole(&mut self.mask, origin, hole, &self.stamp);
            }
            RasterUpdate::Appended(fresh.len())
        } else {
            cover_surface(&mut self.mask, &frame.surface);
            for hole in &frame.holes {
                punch_hole(&mut self.mask, origin, hole, &self.stamp);
            }
            RasterUpdate::Rebuilt
        };

        self.surface = Some(frame.surface);
        self.first_seq = frame.holes.first().map(|h| h.seq);
        self.last_seq = frame.holes.last().map(|h| h.seq);
        self.drawn = frame.holes.len();
        result
    }
}

/// Darken `screen` by the mask: black where coverage is 1, untouched where 0.
pub fn composite(screen: &mut FrameBuffer, mask: &Mask, lut: &GammaLut) -> Result<(), Error> {
    if mask.width != screen.width || mask.height != screen.height {
        return Err(Error::MaskSize {
            mask_w: mask.width,
            mask_h: mask.height,
            screen_w: screen.width,
            screen_h: screen.height,
        });
    }
    for (px, &a) in screen.pixels.iter_mut().zip(&mask.alpha) {
        if a <= 0.0 { continue; }
        *px = if a >= 1.0 { 0 } else { lut.darken(*px, a) };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole(seq: u64, cx: f32, cy: f32) -> Hole {
        Hole { seq, cx, cy, radius: 5.0 }
    }

    fn frame(holes: Vec<Hole>) -> MaskFrame {
        MaskFrame { surface: MaskSurface::window(40, 30), holes }
    }

    fn alpha_at(mask: &Mask, x: usize, y: usize) -> f32 {
        mask.alpha[y * mask.width + x]
    }

    #[test]
    fn hard_stamp_is_a_disc() {
        let stamp = make_disc_stamp(5.0, 0.0);
        assert_eq!(stamp.radius, 5);
        let d = 11;
        assert_eq!(stamp.weights[5 * d + 5], 1.0); // center
        assert_eq!(stamp.weights[5 * d + 10], 1.0); // distance 5 on the axis
        assert_eq!(stamp.weights[0], 0.0); // corner, distance ~7.07
    }

    #[test]
    fn soft_stamp_fades_toward_rim() {
        let stamp = make_disc_stamp(10.0, 4.0);
        let d = 21;
        let row = 10 * d;
        assert_eq!(stamp.weights[row + 10], 1.0);
        let rim = stamp.weights[row + 10 + 8];
        assert!(rim > 0.0 && rim < 1.0, "got {rim}");
        assert_eq!(stamp.weights[row], 0.0); // distance 10: on the edge
    }

    #[test]
    fn empty_frame_covers_the_surface() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        let surface = MaskSurface::new(10.0, 10.0, 20.0, 10.0);
        raster.update(&MaskFrame { surface, holes: vec![] });
        let mask = raster.mask();
        assert_eq!(alpha_at(mask, 15, 15), 1.0);
        assert_eq!(alpha_at(mask, 5, 5), 0.0);
        assert_eq!(alpha_at(mask, 30, 15), 0.0);
    }

    #[test]
    fn holes_clear_their_discs_only() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        raster.update(&frame(vec![hole(0, 10.0, 10.0)]));
        let mask = raster.mask();
        assert_eq!(alpha_at(mask, 10, 10), 0.0);
        assert_eq!(alpha_at(mask, 14, 10), 0.0);
        assert_eq!(alpha_at(mask, 16, 10), 1.0);
        assert_eq!(alpha_at(mask, 30, 20), 1.0);
    }

    #[test]
    fn holes_near_the_edge_are_clipped() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        raster.update(&frame(vec![hole(0, 0.0, 0.0), hole(1, 39.0, 29.0), hole(2, -50.0, 80.0)]));
        assert_eq!(alpha_at(raster.mask(), 0, 0), 0.0);
        assert_eq!(alpha_at(raster.mask(), 39, 29), 0.0);
    }

    #[test]
    fn appended_holes_are_drawn_incrementally() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        assert_eq!(raster.update(&frame(vec![hole(0, 10.0, 10.0)])), RasterUpdate::Rebuilt);
        assert_eq!(
            raster.update(&frame(vec![hole(0, 10.0, 10.0), hole(1, 25.0, 10.0)])),
            RasterUpdate::Appended(1)
        );
        assert_eq!(alpha_at(raster.mask(), 25, 10), 0.0);
        assert_eq!(alpha_at(raster.mask(), 10, 10), 0.0);
    }

    #[test]
    fn expired_holes_force_a_rebuild() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        raster.update(&frame(vec![hole(0, 10.0, 10.0), hole(1, 25.0, 10.0)]));
        assert_eq!(raster.update(&frame(vec![hole(1, 25.0, 10.0)])), RasterUpdate::Rebuilt);
        assert_eq!(alpha_at(raster.mask(), 10, 10), 1.0);
        assert_eq!(alpha_at(raster.mask(), 25, 10), 0.0);
    }

    #[test]
    fn resize_forces_a_rebuild() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        raster.update(&frame(vec![]));
        raster.resize(50, 30);
        let grown = MaskFrame { surface: MaskSurface::window(50, 30), holes: vec![] };
        assert_eq!(raster.update(&grown), RasterUpdate::Rebuilt);
        assert_eq!(alpha_at(raster.mask(), 45, 5), 1.0);
    }

    #[test]
    fn composite_keeps_camera_inside_holes() {
        let lut = GammaLut::new();
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        raster.update(&frame(vec![hole(0, 20.0, 15.0)]));

        let mut screen = FrameBuffer::filled(40, 30, 0x00_80_90_A0);
        composite(&mut screen, raster.mask(), &lut).unwrap();
        assert_eq!(screen.pixels[15 * 40 + 20], 0x00_80_90_A0);
        assert_eq!(screen.pixels[0], 0);
    }

    #[test]
    fn composite_rejects_mismatched_sizes() {
        let lut = GammaLut::new();
        let raster = MaskRaster::new(40, 30, make_disc_stamp(5.0, 0.0));
        let mut screen = FrameBuffer::filled(10, 10, 0);
        let err = composite(&mut screen, raster.mask(), &lut).unwrap_err();
        assert!(matches!(err, Error::MaskSize { mask_w: 40, mask_h: 30, screen_w: 10, screen_h: 10 }));
    }

    #[test]
    fn holes_follow_an_offset_surface() {
        let mut raster = MaskRaster::new(40, 30, make_disc_stamp(3.0, 0.0));
        let surface = MaskSurface::new(10.0, 5.0, 25.0, 20.0);
        raster.update(&MaskFrame { surface, holes: vec![Hole { seq: 0, cx: 5.0, cy: 5.0, radius: 3.0 }] });
        let mask = raster.mask();
        assert_eq!(alpha_at(mask, 15, 10), 0.0); // hole center in window pixels
        assert_eq!(alpha_at(mask, 25, 20), 1.0);
        assert_eq!(alpha_at(mask, 5, 5), 0.0); // left of the surface, never covered
        assert_eq!(alpha_at(mask, 36, 10), 0.0);
    }

    use crate::config::MaskConfig;
    use crate::mode::Mode;
    use crate::renderer::MaskTrailRenderer;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Step {
        Move(f32, f32),
        Tick(f64),
        Toggle,
        Clear,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => (0u8..12, 0u8..9).prop_map(|(x, y)| Step::Move(x as f32 * 4.0 + 8.0, y as f32 * 4.0 + 4.0)),
            4 => (0.0f64..6.0).prop_map(Step::Tick),
            1 => Just(Step::Toggle),
            1 => Just(Step::Clear),
        ]
    }

    proptest! {
        #[test]
        fn incremental_mask_matches_full_rebuild(
            steps in prop::collection::vec(step(), 1..80),
            photo in any::<bool>(),
            prune in any::<bool>(),
        ) {
            let config = MaskConfig {
                hole_diameter: 8.0,
                deletion_lag_secs: 10.0,
                prune_expired: prune,
                initial_mode: if photo { Mode::Photo } else { Mode::Disappear },
                ..MaskConfig::default()
            };
            let surface = MaskSurface::new(6.0, 3.0, 50.0, 36.0);
            let mut renderer = MaskTrailRenderer::new(config, surface);
            let mut raster = MaskRaster::new(64, 48, make_disc_stamp(4.0, 0.0));
            let mut now = 0.0;
            for step in steps {
                match step {
                    Step::Move(x, y) => renderer.record_pointer_move(x, y),
                    Step::Toggle => { renderer.toggle_mode(); }
                    Step::Clear => renderer.clear_trail(),
                    Step::Tick(dt) => {
                        now += dt;
                        let frame = renderer.redraw(now);
                        raster.update(frame);

                        let mut fresh = MaskRaster::new(64, 48, make_disc_stamp(4.0, 0.0));
                        fresh.update(frame);
                        prop_assert_eq!(&raster.mask().alpha, &fresh.mask().alpha);
                    }
                }
            }
        }
    }
}
