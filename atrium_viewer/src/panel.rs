//! 2D panels composited on the CPU: the playback panel that fronts a
//! selected video and the expanded photo overlay with its caption. Text
//! is rasterized from the 8x8 bitmap font, images are blitted in after a
//! nearest resample.

use font8x8::legacy::BASIC_LEGACY;

use crate::texture::{RgbaTexture, resample_rgba_nearest};

pub const GLYPH_WIDTH: u32 = 8;
pub const GLYPH_HEIGHT: u32 = 8;

const BG_COLOR: [u8; 4] = [12, 12, 18, 230];
const FG_COLOR: [u8; 4] = [235, 235, 235, 255];
const ACCENT_COLOR: [u8; 4] = [255, 64, 64, 255];

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// CPU pixel buffer a panel composes into before upload.
#[derive(Debug, Clone)]
pub struct PanelCanvas {
    pub width: u32,
    pub height: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pixels: Vec<u8>,
}

impl PanelCanvas {
    pub fn new(width: u32, height: u32, padding_x: u32, padding_y: u32) -> Self {
        let mut canvas = Self {
            width: width.max(1),
            height: height.max(1),
            padding_x,
            padding_y,
            pixels: vec![0u8; (width.max(1) * height.max(1) * 4) as usize],
        };
        canvas.clear();
        canvas
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.chunks_mut(4) {
            pixel.copy_from_slice(&BG_COLOR);
        }
    }

    /// How many characters fit on one padded row.
    pub fn columns(&self) -> usize {
        (self.width.saturating_sub(self.padding_x * 2) / GLYPH_WIDTH) as usize
    }

    pub fn rows(&self) -> usize {
        (self.height.saturating_sub(self.padding_y * 2) / GLYPH_HEIGHT) as usize
    }

    pub fn draw_text_row(&mut self, row: usize, text: &str) {
        self.draw_text_row_colored(row, text, FG_COLOR);
    }

    pub fn draw_accent_row(&mut self, row: usize, text: &str) {
        self.draw_text_row_colored(row, text, ACCENT_COLOR);
    }

    fn draw_text_row_colored(&mut self, row: usize, text: &str, color: [u8; 4]) {
        if row >= self.rows() {
            return;
        }
        let glyph_row = self.padding_y + row as u32 * GLYPH_HEIGHT;
        for (col_idx, ch) in text.chars().take(self.columns()).enumerate() {
            let glyph = glyph_for_char(ch);
            let glyph_col = self.padding_x + col_idx as u32 * GLYPH_WIDTH;
            for (y_offset, bits) in glyph.iter().enumerate() {
                let y = glyph_row + y_offset as u32;
                if y >= self.height {
                    continue;
                }
                for x_bit in 0..GLYPH_WIDTH {
                    if (bits >> x_bit) & 0x01 == 0 {
                        continue;
                    }
                    let x = glyph_col + x_bit;
                    if x >= self.width {
                        continue;
                    }
                    let idx = ((y * self.width + x) * 4) as usize;
                    self.pixels[idx..idx + 4].copy_from_slice(&color);
                }
            }
        }
    }

    /// Blit an image into the given panel rectangle, resampling to fit.
    pub fn blit_image(&mut self, image: &RgbaTexture, x: u32, y: u32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let fitted = resample_rgba_nearest(image, width, height);
        for row in 0..height {
            let dst_y = y + row;
            if dst_y >= self.height {
                break;
            }
            for col in 0..width {
                let dst_x = x + col;
                if dst_x >= self.width {
                    break;
                }
                let src_idx = ((row * width + col) * 4) as usize;
                let dst_idx = ((dst_y * self.width + dst_x) * 4) as usize;
                if let Some(src_px) = fitted.data.get(src_idx..src_idx + 4) {
                    self.pixels[dst_idx..dst_idx + 4].copy_from_slice(src_px);
                }
            }
        }
    }
}

/// Playback panel body: title row, embed URL row, close hint.
pub fn compose_playback(canvas: &mut PanelCanvas, title: &str, embed_url: &str) {
    canvas.clear();
    canvas.draw_text_row(0, title);
    canvas.draw_text_row(1, embed_url);
    canvas.draw_accent_row(3, "[X] close");
}

/// Photo overlay body: the image scaled to the panel with its caption
/// and close hint underneath.
pub fn compose_photo(canvas: &mut PanelCanvas, image: &RgbaTexture, caption: &str) {
    canvas.clear();
    let text_band = GLYPH_HEIGHT * 3 + canvas.padding_y * 2;
    let image_height = canvas.height.saturating_sub(text_band).max(1);
    let image_width = canvas.width.saturating_sub(canvas.padding_x * 2).max(1);
    canvas.blit_image(image, canvas.padding_x, canvas.padding_y, image_width, image_height);
    let caption_row = (image_height / GLYPH_HEIGHT) as usize + 1;
    canvas.draw_text_row(caption_row, caption);
    canvas.draw_accent_row(caption_row + 1, "[X] close");
}
