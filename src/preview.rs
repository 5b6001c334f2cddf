// Renders tilesheets to RGBA images, e.g. for a bird's eye view of every character.

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    common::{NUM_TILES, TRANSPARENT_SLOT},
    helpers::{alpha_blend, color_to_rgb8},
    state::{Character, EditorState},
};

pub const SHEET_TILES_WIDE: usize = 8;
pub const SHEET_TILES_HIGH: usize = NUM_TILES / SHEET_TILES_WIDE;

pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: usize, height: usize) -> Self {
        RgbaImage {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    fn put(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

#[derive(Copy, Clone, Debug)]
pub struct PreviewOptions {
    pub pixel_size: usize,
    // Opacity of the black grid drawn between tiles (0 disables it).
    pub grid_alpha: f32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions {
            pixel_size: 3,
            grid_alpha: 0.0,
        }
    }
}

fn sheet_size(opts: &PreviewOptions) -> (usize, usize) {
    (
        SHEET_TILES_WIDE * 8 * opts.pixel_size,
        SHEET_TILES_HIGH * 8 * opts.pixel_size,
    )
}

// Draws one character's sheet with its top-left corner at (0, y0). Rows are mirrored:
// pixel `col` of a tile row is drawn at horizontal position `7 - col`.
fn draw_sheet(img: &mut RgbaImage, y0: usize, character: &Character, opts: &PreviewOptions) {
    let palette = character.palette();
    let ps = opts.pixel_size;
    for (t, tile) in character.tilesheet().iter().enumerate() {
        let tx = (t % SHEET_TILES_WIDE) * 8;
        let ty = (t / SHEET_TILES_WIDE) * 8;
        for (row, pixels) in tile.iter().enumerate() {
            for (col, &c) in pixels.iter().enumerate() {
                if c == TRANSPARENT_SLOT {
                    continue;
                }
                let mut rgb = color_to_rgb8(palette[c as usize]);
                let px = tx + 7 - col;
                let py = ty + row;
                for dy in 0..ps {
                    for dx in 0..ps {
                        let on_grid = opts.grid_alpha > 0.0
                            && ((px % 8 == 0 && dx == 0) || (py % 8 == 0 && dy == 0));
                        if on_grid {
                            rgb = alpha_blend(rgb, [0, 0, 0], opts.grid_alpha);
                        }
                        img.put(px * ps + dx, y0 + py * ps + dy, [rgb[0], rgb[1], rgb[2], 255]);
                        if on_grid {
                            rgb = color_to_rgb8(palette[c as usize]);
                        }
                    }
                }
            }
        }
    }
}

pub fn render_character(character: &Character, opts: &PreviewOptions) -> RgbaImage {
    let (w, h) = sheet_size(opts);
    let mut img = RgbaImage::new(w, h);
    draw_sheet(&mut img, 0, character, opts);
    img
}

/// Every character that has tile data, stacked top to bottom.
pub fn render_all(state: &EditorState, opts: &PreviewOptions) -> RgbaImage {
    let chars: Vec<&Character> = state
        .characters
        .iter()
        .filter(|c| !c.tilesheet().is_empty())
        .collect();
    let (w, h) = sheet_size(opts);
    let mut img = RgbaImage::new(w, h * chars.len());
    for (i, c) in chars.into_iter().enumerate() {
        draw_sheet(&mut img, i * h, c, opts);
    }
    img
}

pub fn save_png(path: &Path, img: &RgbaImage) -> Result<()> {
    info!("Saving {}", path.display());
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, img.width as u32, img.height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&img.data)?;
    Ok(())
}
