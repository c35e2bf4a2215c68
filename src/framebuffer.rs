use log::debug;

use crate::config::SpriteEdge;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// every sprite row is one byte, so 8 pixels wide
pub const SPRITE_WIDTH: usize = 8;

/// What a sprite draw did to the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawResult {
    /// at least one pixel went from on to off
    pub collision: bool,
    /// sprite pixels that were dropped for being off-screen
    pub clipped: usize,
}

/// The 64x32 monochrome screen, one byte per pixel (0 off, 1 on), indexed
/// `[y][x]`. Only sprite drawing and clearing change it.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    /// every pixel off
    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// pixel at (x, y); off-screen reads as off
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> &[[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT] {
        &self.pixels
    }

    /// number of pixels switched on
    pub fn lit(&self) -> usize {
        self.pixels.iter().flatten().filter(|p| **p == 1).count()
    }

    /// XOR a sprite onto the screen with its top-left corner at (x, y). Each
    /// byte of `sprite` is a row, most significant bit leftmost.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], edge: SpriteEdge) -> DrawResult {
        let mut result = DrawResult::default();
        for (dy, &row) in sprite.iter().enumerate() {
            for dx in 0..SPRITE_WIDTH {
                let bit = (row >> (7 - dx)) & 1;
                let (px, py) = (x as usize + dx, y as usize + dy);
                let (px, py) = match edge {
                    SpriteEdge::Wrap => (px % DISPLAY_WIDTH, py % DISPLAY_HEIGHT),
                    SpriteEdge::Clip if px < DISPLAY_WIDTH && py < DISPLAY_HEIGHT => (px, py),
                    SpriteEdge::Clip => {
                        result.clipped += bit as usize;
                        continue;
                    }
                };
                let pixel = &mut self.pixels[py][px];
                if bit == 1 && *pixel == 1 {
                    result.collision = true;
                }
                *pixel ^= bit;
            }
        }
        if result.clipped > 0 {
            debug!(
                "clipped {} sprite pixel(s) drawn at ({}, {})",
                result.clipped, x, y
            );
        }
        result
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|p| if *p == 1 { 'x' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPH_0: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    #[test]
    fn test_new_is_blank() {
        assert_eq!(FrameBuffer::new().lit(), 0);
    }

    #[test]
    fn test_draw_msb_is_leftmost() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(10, 3, &[0x80, 0x01], SpriteEdge::Clip);
        assert_eq!(fb.get(10, 3), 1);
        assert_eq!(fb.get(17, 4), 1);
        assert_eq!(fb.lit(), 2);
    }

    #[test]
    fn test_clear_after_anything() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xff; 15], SpriteEdge::Clip);
        fb.draw_sprite(60, 30, &[0xaa; 15], SpriteEdge::Wrap);
        fb.clear();
        assert_eq!(fb, FrameBuffer::new());
    }

    #[test]
    fn test_xor_involution() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(1, 1, &[0x3c, 0x42], SpriteEdge::Clip);
        let before = fb.clone();
        for (x, y) in [(0, 0), (5, 7), (56, 27), (20, 10)] {
            let first = fb.draw_sprite(x, y, &GLYPH_0, SpriteEdge::Clip);
            let second = fb.draw_sprite(x, y, &GLYPH_0, SpriteEdge::Clip);
            assert!(second.collision);
            assert_eq!(fb, before, "at ({}, {}) first {:?}", x, y, first);
        }
    }

    #[test]
    fn test_collision_only_when_pixel_turns_off() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[0xf0], SpriteEdge::Clip).collision);
        // touches no lit pixel
        assert!(!fb.draw_sprite(0, 0, &[0x0f], SpriteEdge::Clip).collision);
        assert!(fb.draw_sprite(0, 0, &[0x01], SpriteEdge::Clip).collision);
    }

    #[test]
    fn test_clip_right_and_bottom() {
        let mut fb = FrameBuffer::new();
        let res = fb.draw_sprite(60, 30, &[0xff, 0xff, 0xff, 0xff], SpriteEdge::Clip);
        // 4 columns x 2 rows survive
        assert_eq!(fb.lit(), 8);
        assert_eq!(res.clipped, 32 - 8);
        assert_eq!(fb.get(0, 0), 0);
        assert_eq!(fb.get(63, 31), 1);
    }

    #[test]
    fn test_clip_entirely_offscreen() {
        let mut fb = FrameBuffer::new();
        let res = fb.draw_sprite(200, 100, &GLYPH_0, SpriteEdge::Clip);
        assert_eq!(fb, FrameBuffer::new());
        assert!(!res.collision);
    }

    #[test]
    fn test_wrap() {
        let mut fb = FrameBuffer::new();
        let res = fb.draw_sprite(62, 31, &[0xf0, 0xf0], SpriteEdge::Wrap);
        assert_eq!(res.clipped, 0);
        for (x, y) in [(62, 31), (63, 31), (0, 31), (1, 31), (62, 0), (1, 0)] {
            assert_eq!(fb.get(x, y), 1, "({}, {})", x, y);
        }
        assert_eq!(fb.lit(), 8);
    }

    #[test]
    fn test_get_offscreen_is_off() {
        assert_eq!(FrameBuffer::new().get(64, 0), 0);
        assert_eq!(FrameBuffer::new().get(0, 32), 0);
    }
}
