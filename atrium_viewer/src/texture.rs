//! CPU texture plumbing: photo decoding, deterministic placeholders for
//! content that has no local asset (remote video thumbnails), and row
//! padding for wgpu uploads.

use std::{borrow::Cow, fs, path::Path};

use anyhow::{Context, Result, ensure};

#[derive(Debug, Clone)]
pub struct RgbaTexture {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode a photo from disk into RGBA. PNG and JPEG are the formats the
/// shipped gallery uses.
pub fn load_photo_rgba(path: &Path) -> Result<RgbaTexture> {
    let bytes =
        fs::read(path).with_context(|| format!("reading photo {}", path.display()))?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding photo {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(RgbaTexture {
        data: image.into_raw(),
        width,
        height,
    })
}

/// Deterministic stand-in texture derived from the entity identity, so a
/// failed or unavailable load still renders something stable per item.
pub fn generate_placeholder_texture(seed_text: &str) -> RgbaTexture {
    const WIDTH: u32 = 256;
    const HEIGHT: u32 = 256;
    let bytes = seed_text.as_bytes();
    let len = bytes.len().max(1);
    let seed = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));

    let mut data = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for (idx, pixel) in data.chunks_mut(4).enumerate() {
        let base = (idx + seed as usize) % len;
        let r = bytes.get(base).copied().unwrap_or(seed);
        let g = bytes.get((base + 17) % len).copied().unwrap_or(r);
        let b = bytes.get((base + 43) % len).copied().unwrap_or(g);
        pixel[0] = r.wrapping_mul(5);
        pixel[1] = g.wrapping_mul(3);
        pixel[2] = b.wrapping_mul(7);
        pixel[3] = 0xFF;
    }
    RgbaTexture {
        data,
        width: WIDTH,
        height: HEIGHT,
    }
}

/// Stable per-identity tint for the 3D visuals.
pub fn identity_tint(seed_text: &str) -> [f32; 3] {
    let mut hash = 0u64;
    for chunk in seed_text.as_bytes().chunks(8) {
        let mut padded = [0u8; 8];
        padded[..chunk.len()].copy_from_slice(chunk);
        hash ^= u64::from_le_bytes(padded).rotate_left(7);
    }
    let r = (hash & 0xFF) as f32 / 255.0;
    let g = ((hash >> 8) & 0xFF) as f32 / 255.0;
    let b = ((hash >> 16) & 0xFF) as f32 / 255.0;
    // Keep tints bright enough to read against the dark backdrop.
    [
        0.25 + 0.75 * r,
        0.25 + 0.75 * g,
        0.25 + 0.75 * b,
    ]
}

/// Mean color of a texture, used to tint an entity once its asset lands.
pub fn average_tint(texture: &RgbaTexture) -> [f32; 3] {
    let pixel_count = (texture.width as u64 * texture.height as u64).max(1);
    let mut sums = [0u64; 3];
    for pixel in texture.data.chunks_exact(4) {
        sums[0] += pixel[0] as u64;
        sums[1] += pixel[1] as u64;
        sums[2] += pixel[2] as u64;
    }
    [
        sums[0] as f32 / (pixel_count as f32 * 255.0),
        sums[1] as f32 / (pixel_count as f32 * 255.0),
        sums[2] as f32 / (pixel_count as f32 * 255.0),
    ]
}

pub struct TextureUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl TextureUpload<'_> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

/// Pad RGBA rows out to `COPY_BYTES_PER_ROW_ALIGNMENT` when needed;
/// borrows the input when it is already aligned.
pub fn prepare_rgba_upload<'a>(width: u32, height: u32, data: &'a [u8]) -> Result<TextureUpload<'a>> {
    ensure!(width > 0 && height > 0, "texture has no dimensions");
    let row_bytes = 4usize * width as usize;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    ensure!(
        data.len() >= row_bytes * height as usize,
        "texture buffer ({}) smaller than {}x{} RGBA ({})",
        data.len(),
        width,
        height,
        row_bytes * height as usize
    );

    if row_bytes % alignment == 0 && data.len() == row_bytes * height as usize {
        return Ok(TextureUpload {
            data: Cow::Borrowed(data),
            bytes_per_row: row_bytes as u32,
        });
    }

    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;
    let mut buffer = vec![0u8; padded_row_bytes * height as usize];
    for row in 0..height as usize {
        let src_offset = row * row_bytes;
        if src_offset >= data.len() {
            break;
        }
        let to_copy = (data.len() - src_offset).min(row_bytes);
        let dst_offset = row * padded_row_bytes;
        buffer[dst_offset..dst_offset + to_copy]
            .copy_from_slice(&data[src_offset..src_offset + to_copy]);
    }
    Ok(TextureUpload {
        data: Cow::Owned(buffer),
        bytes_per_row: padded_row_bytes as u32,
    })
}

/// Nearest-neighbour resample into a fixed destination size; used to fit
/// photos into the overlay panel without pulling in a scaling crate.
pub fn resample_rgba_nearest(src: &RgbaTexture, dst_width: u32, dst_height: u32) -> RgbaTexture {
    let mut data = vec![0u8; (dst_width * dst_height * 4) as usize];
    for y in 0..dst_height {
        let src_y = (y as u64 * src.height as u64 / dst_height.max(1) as u64) as u32;
        for x in 0..dst_width {
            let src_x = (x as u64 * src.width as u64 / dst_width.max(1) as u64) as u32;
            let src_idx = ((src_y * src.width + src_x) * 4) as usize;
            let dst_idx = ((y * dst_width + x) * 4) as usize;
            if let (Some(src_px), Some(dst_px)) = (
                src.data.get(src_idx..src_idx + 4),
                data.get_mut(dst_idx..dst_idx + 4),
            ) {
                dst_px.copy_from_slice(src_px);
            }
        }
    }
    RgbaTexture {
        data,
        width: dst_width,
        height: dst_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_deterministic_per_identity() {
        let first = generate_placeholder_texture("video:22NTSj3yMgc");
        let second = generate_placeholder_texture("video:22NTSj3yMgc");
        let other = generate_placeholder_texture("video:different");
        assert_eq!(first.data, second.data);
        assert_ne!(first.data, other.data);
        assert_eq!(first.width, 256);
    }

    #[test]
    fn aligned_upload_borrows_the_source() {
        // 64 pixels per row = 256 bytes, already aligned.
        let data = vec![0xAAu8; 64 * 4 * 4];
        let upload = prepare_rgba_upload(64, 4, &data).expect("upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(upload.pixels().len(), data.len());
    }

    #[test]
    fn unaligned_upload_pads_rows() {
        let data = vec![0x55u8; 30 * 4 * 2];
        let upload = prepare_rgba_upload(30, 2, &data).expect("upload");
        assert_eq!(upload.bytes_per_row() % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
        assert!(upload.pixels().len() > data.len());
        // Row content survives the padding.
        assert_eq!(&upload.pixels()[..120], &data[..120]);
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let data = vec![0u8; 8];
        assert!(prepare_rgba_upload(64, 64, &data).is_err());
    }

    #[test]
    fn resample_preserves_solid_color() {
        let src = RgbaTexture {
            data: vec![0x11u8; 8 * 8 * 4],
            width: 8,
            height: 8,
        };
        let dst = resample_rgba_nearest(&src, 3, 5);
        assert_eq!(dst.data.len(), 3 * 5 * 4);
        assert!(dst.data.iter().all(|&b| b == 0x11));
    }

    #[test]
    fn tints_sit_in_the_visible_band() {
        for identity in ["video:a", "photo:b", "contact:c"] {
            let tint = identity_tint(identity);
            for channel in tint {
                assert!((0.25..=1.0).contains(&channel));
            }
        }
    }
}
