// The masking state machine.
//
// Pointer events only move the live position; each redraw tick appends at
// most one sample to the trail and rebuilds the hole list from it. All
// methods are called from the window's event loop, so nothing here locks.

use crate::config::{HoleAnchor, MaskConfig};
use crate::mode::Mode;
use crate::trail::Trail;
use crate::types::{Hole, MaskFrame, MaskSurface};
use tracing::{debug, info, trace};

pub struct MaskTrailRenderer {
    config: MaskConfig,
    surface: MaskSurface,
    trail: Trail,
    live: Option<(f32, f32)>, // surface-local; None until the pointer moves
    mode: Mode,
    touched: bool,
    frame: MaskFrame,         // reused every tick
}

impl MaskTrailRenderer {
    pub fn new(config: MaskConfig, surface: MaskSurface) -> Self {
        let mode = config.initial_mode;
        Self {
            config,
            surface,
            trail: Trail::new(),
            live: None,
            mode,
            touched: false,
            frame: MaskFrame { surface, holes: Vec::new() },
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn surface(&self) -> MaskSurface {
        self.surface
    }

    pub fn live_pointer(&self) -> Option<(f32, f32)> {
        self.live
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Geometry produced by the last redraw.
    pub fn frame(&self) -> &MaskFrame {
        &self.frame
    }

    /// Store a pointer position given in window coordinates.
    pub fn record_pointer_move(&mut self, window_x: f32, window_y: f32) {
        if self.config.record_while_pressed_only && !self.touched {
            return;
        }
        self.live = Some((window_x - self.surface.x, window_y - self.surface.y));
    }

    /// Primary button / finger state from the platform.
    pub fn set_touched(&mut self, touched: bool) {
        self.touched = touched;
    }

    /// Build this tick's mask geometry.
    pub fn redraw(&mut self, now: f64) -> &MaskFrame {
        self.frame.surface = self.surface;
        self.frame.holes.clear();

        let Some((x, y)) = self.live else {
            return &self.frame;
        };
        self.trail.push_if_changed(x, y, now);

        let radius = self.config.hole_radius();
        let offset = match self.config.anchor {
            HoleAnchor::Center => 0.0,
            HoleAnchor::Corner => radius,
        };
        let lag = self.config.deletion_lag_secs;
        self.frame.holes.extend(self.trail.visible(self.mode, now, lag).map(|s| Hole {
            seq: s.seq,
            cx: s.x + offset,
            cy: s.y + offset,
            radius,
        }));

        if self.mode.expires_samples() && self.config.prune_expired {
            let removed = self.trail.evict_expired(now, lag);
            if removed > 0 {
                trace!(removed, remaining = self.trail.len(), "evicted expired samples");
            }
        }

        &self.frame
    }

    /// Switch between Disappear and Photo. History is discarded, not reinterpreted.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        self.clear_trail();
        info!(mode = %self.mode, "mode toggled");
        self.mode
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.live = None;
        self.touched = false;
        debug!("trail cleared");
    }

    /// The overlay moved or resized; redraw right away so the cover matches the new bounds.
    pub fn on_surface_geometry_changed(&mut self, surface: MaskSurface, now: f64) -> &MaskFrame {
        debug!(
            x = surface.x,
            y = surface.y,
            width = surface.width,
            height = surface.height,
            "mask surface changed"
        );
        self.surface = surface;
        self.redraw(now)
    }
}
