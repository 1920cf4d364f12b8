use base64::{engine::general_purpose, Engine as _};
use image::GenericImageView;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kitty graphics format code for PNG payloads.
const FORMAT_PNG: u32 = 100;
const CHUNK_SIZE: usize = 4096;

/// A decoded sprite, kept as base64 PNG ready for the kitty protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteData {
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (width, height) = image.dimensions();
    Ok(SpriteData {
        payload: general_purpose::STANDARD.encode(bytes),
        width,
        height,
    })
}

pub fn kitty_sequence(sprite: &SpriteData, cols: u16, rows: u16) -> Result<String, String> {
    let mut sequences = String::new();
    let payload = sprite.payload.as_bytes();
    let total_chunks = payload.len().div_ceil(CHUNK_SIZE);

    for (index, chunk) in payload.chunks(CHUNK_SIZE).enumerate() {
        let more = u8::from(index + 1 < total_chunks);
        let chunk_str = std::str::from_utf8(chunk).map_err(|err| err.to_string())?;
        if index == 0 {
            let mut params = format!(
                "f={FORMAT_PNG},s={},v={},a=T,t=d",
                sprite.width, sprite.height
            );
            if cols > 0 {
                params.push_str(&format!(",c={cols}"));
            }
            if rows > 0 {
                params.push_str(&format!(",r={rows}"));
            }
            params.push_str(&format!(",m={more}"));
            sequences.push_str(&format!("\x1b_G{params};{chunk_str}\x1b\\"));
        } else {
            sequences.push_str(&format!("\x1b_Gm={more};{chunk_str}\x1b\\"));
        }
    }
    Ok(sequences)
}

/// Largest (cols, rows) box that keeps the sprite's aspect ratio inside the area.
pub fn sprite_fit(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    const CELL_ASPECT: f32 = 2.0;
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let image_ratio = sprite.width as f32 / sprite.height as f32;
    let cols_for_max_rows = image_ratio * max_rows as f32 * CELL_ASPECT;
    if cols_for_max_rows <= max_cols as f32 {
        let cols = cols_for_max_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows);
    }
    let rows_for_max_cols = max_cols as f32 / (image_ratio * CELL_ASPECT);
    let rows = rows_for_max_cols.max(1.0).round() as u16;
    (max_cols, rows.min(max_rows).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::new(width, height);
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn test_decode_sprite_reads_dimensions() {
        let sprite = decode_sprite(&png_bytes(96, 48)).unwrap();
        assert_eq!((sprite.width, sprite.height), (96, 48));
        assert!(!sprite.payload.is_empty());
    }

    #[test]
    fn test_decode_sprite_rejects_garbage() {
        assert!(decode_sprite(b"not an image").is_err());
    }

    #[test]
    fn test_kitty_sequence_chunks_payload() {
        let sprite = SpriteData {
            payload: "A".repeat(CHUNK_SIZE + 10),
            width: 96,
            height: 96,
        };
        let sequence = kitty_sequence(&sprite, 20, 10).unwrap();
        assert!(sequence.starts_with("\x1b_Gf=100,s=96,v=96,a=T,t=d,c=20,r=10,m=1;"));
        assert!(sequence.contains("\x1b_Gm=0;"));
        assert_eq!(sequence.matches("\x1b_G").count(), 2);
    }

    #[test]
    fn test_sprite_fit_square_in_wide_area() {
        let sprite = SpriteData {
            payload: String::new(),
            width: 96,
            height: 96,
        };
        assert_eq!(sprite_fit(&sprite, 40, 10), (20, 10));
        assert_eq!(sprite_fit(&sprite, 10, 10), (10, 5));
    }
}
