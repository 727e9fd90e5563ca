// Window + software drawing utilities.
// Visual pieces provided here:
// 1) A resizable window that shows the masked camera image.
// 2) The mode button in the top-right corner.
// 3) A tiny 5x7 bitmap font for the button label and the HUD.

use crate::error::Error;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
    left_was_down: bool, // for click edge detection
    pointer: PointerMotion,
}

/// Turns a polled pointer position into move events.
/// Visual: a pointer parked in the window does not reopen holes after a clear.
#[derive(Debug, Default)]
pub struct PointerMotion {
    last: Option<(f32, f32)>,
}

impl PointerMotion {
    /// Feed this tick's polled position; Some only when it differs from the last poll.
    pub fn update(&mut self, pos: Option<(f32, f32)>) -> Option<(f32, f32)> {
        let moved = match (pos, self.last) {
            (Some(p), Some(prev)) if p == prev => None,
            (p, _) => p,
        };
        self.last = pos;
        moved
    }
}

impl Drawer {
    /// Open a resizable window that refreshes at most `tick_hz` times per second.
    pub fn new(title: &str, width: usize, height: usize, tick_hz: u32) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(tick_hz as usize);
        Ok(Self { window, left_was_down: false, pointer: PointerMotion::default() })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current drawable size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Pointer position in window pixels, None while it is outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    /// New pointer position if it moved since the last call. Call once per tick.
    pub fn mouse_moved(&mut self) -> Option<(f32, f32)> {
        let pos = self.mouse_pos();
        self.pointer.update(pos)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// True on the tick the left button goes down. Call once per tick.
    pub fn left_clicked(&mut self) -> bool {
        let down = self.left_mouse_down();
        let clicked = down && !self.left_was_down;
        self.left_was_down = down;
        clicked
    }

    pub fn m_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::M, KeyRepeat::No)
    }

    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    pub fn h_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::H, KeyRepeat::No)
    }
}

/* ---------- Mode button ---------- */

const BUTTON_W: usize = 300;
const BUTTON_H: usize = 100;
const BUTTON_FILL: u32 = 0x00_3A_3A_3A;
const BUTTON_BORDER: u32 = 0x00_D0_D0_D0;
const BUTTON_TEXT: u32 = 0x00_FF_FF_FF;

/// Fixed-size button pinned to the top-right corner of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeButton {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

impl ModeButton {
    pub fn for_window(window_width: usize, window_height: usize) -> Self {
        let width = BUTTON_W.min(window_width);
        let height = BUTTON_H.min(window_height);
        Self { x: (window_width - width) as i32, y: 0, width, height }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width as i32) as f32
            && py < (self.y + self.height as i32) as f32
    }

    pub fn draw(&self, fb: &mut FrameBuffer, label: &str) {
        fill_rect(fb, self.x, self.y, self.width, self.height, BUTTON_FILL);
        let (x1, y1) = (self.x + self.width as i32 - 1, self.y + self.height as i32 - 1);
        draw_line(fb, self.x, self.y, x1, self.y, BUTTON_BORDER);
        draw_line(fb, self.x, y1, x1, y1, BUTTON_BORDER);
        draw_line(fb, self.x, self.y, self.x, y1, BUTTON_BORDER);
        draw_line(fb, x1, self.y, x1, y1, BUTTON_BORDER);

        // Biggest scale that fits, at least 1.
        let scale = (1..=4)
            .rev()
            .find(|&s| text_width(label, s) + 8 <= self.width)
            .unwrap_or(1);
        let tx = self.x + (self.width as i32 - text_width(label, scale) as i32) / 2;
        let ty = self.y + (self.height as i32 - 7 * scale as i32) / 2;
        draw_text_scaled(fb, tx, ty, label, BUTTON_TEXT, scale);
    }
}

/* ---------- Software drawing: pixels, lines, rectangles, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Fill an axis-aligned rectangle, clipped to the framebuffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, width: usize, height: usize, color: u32) {
    let x0 = x.max(0) as usize;
    let y0 = y.max(0) as usize;
    let x1 = ((x + width as i32).max(0) as usize).min(fb.width);
    let y1 = ((y + height as i32).max(0) as usize).min(fb.height);
    if x0 >= x1 {
        return;
    }
    for row in y0..y1 {
        let ofs = row * fb.width;
        fb.pixels[ofs + x0..ofs + x1].fill(color);
    }
}

/* ---------- 5x7 bitmap font (digits, A-Z and a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; bit 4 is the leftmost pixel.
/// Lowercase letters share the uppercase glyphs.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Width in pixels of `text` at `scale` (5 px glyph + 1 px spacing, scaled).
pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 6 * scale
}

/// Draw one glyph with each font pixel blown up to a `scale` x `scale` block.
fn draw_char_scaled(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: usize) {
    let Some(rows) = glyph5x7(ch) else { return };
    let s = scale as i32;
    // Shadow pass first, offset by one block, so text stays readable over video.
    for (offset, c) in [(s, 0x00000000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + rx * s + offset;
                    let py = y + ry as i32 * s + offset;
                    fill_rect(fb, px, py, scale, scale, c);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs scaled by `scale`.
pub fn draw_text_scaled(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: usize) {
    for ch in text.chars() {
        draw_char_scaled(fb, x, y, ch, color, scale);
        x += 6 * scale as i32;
    }
}

/// Draw a text string using unscaled 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    draw_text_scaled(fb, x, y, text, color, 1);
}
