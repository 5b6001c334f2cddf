use anyhow::{ensure, Result};
use log::info;
use std::{
    fmt::Display,
    ops::{Add, AddAssign},
};

use crate::{
    common::{
        ColorValue, NUM_CHARACTERS, NUM_CHARACTERS_WITH_TILES, NUM_TILES, PALETTE_SIZE,
    },
    state::{CharacterGraphics, Color, Palette, Tile},
};

// Byte index into the ROM file (after any copier header has been stripped).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PcAddr(pub u32);

impl Add<u32> for PcAddr {
    type Output = PcAddr;

    fn add(self, other: u32) -> Self {
        PcAddr(self.0 + other)
    }
}

impl AddAssign<u32> for PcAddr {
    fn add_assign(&mut self, other: u32) {
        self.0 += other;
    }
}

impl Display for PcAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)?;
        Ok(())
    }
}

impl PcAddr {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

pub const PALETTE_BASE: PcAddr = PcAddr(0xE7D00);
pub const PALETTE_STRIDE: u32 = 0x20;
pub const TILE_BASE: PcAddr = PcAddr(0xD0000);
pub const CHARACTER_TILE_STRIDE: u32 = 0x800;
pub const TILE_STRIDE: u32 = 0x20;

pub const COPIER_HEADER_SIZE: usize = 512;

// End of the furthest window the codec touches; buffers must be at least this long.
pub const MIN_ROM_SIZE: usize = {
    let pal_end = PALETTE_BASE.0 + PALETTE_STRIDE * NUM_CHARACTERS as u32;
    let tile_end = TILE_BASE.0 + CHARACTER_TILE_STRIDE * NUM_CHARACTERS_WITH_TILES as u32;
    if pal_end > tile_end {
        pal_end as usize
    } else {
        tile_end as usize
    }
};

fn palette_addr(char_idx: usize) -> PcAddr {
    PALETTE_BASE + PALETTE_STRIDE * char_idx as u32
}

fn tile_addr(char_idx: usize, tile_idx: usize) -> PcAddr {
    TILE_BASE + CHARACTER_TILE_STRIDE * char_idx as u32 + TILE_STRIDE * tile_idx as u32
}

fn read_u16(data: &[u8], addr: PcAddr) -> u16 {
    let b0 = data[addr.idx()] as u16;
    let b1 = data[addr.idx() + 1] as u16;
    b0 | b1 << 8
}

fn write_u16(data: &mut [u8], addr: PcAddr, w: u16) {
    data[addr.idx()] = (w & 0xFF) as u8;
    data[addr.idx() + 1] = (w >> 8) as u8;
}

pub fn color_from_word(w: u16) -> Color {
    Color {
        r: (w & 31) as ColorValue,
        g: ((w >> 5) & 31) as ColorValue,
        b: ((w >> 10) & 31) as ColorValue,
    }
}

pub fn color_to_word(c: Color) -> u16 {
    (c.r as u16 & 31) | (c.g as u16 & 31) << 5 | (c.b as u16 & 31) << 10
}

fn decode_palette(data: &[u8], addr: PcAddr) -> Palette {
    let mut palette = [Color::default(); PALETTE_SIZE];
    for (i, c) in palette.iter_mut().enumerate() {
        *c = color_from_word(read_u16(data, addr + i as u32 * 2));
    }
    palette
}

fn encode_palette(palette: &Palette, data: &mut [u8], addr: PcAddr) {
    for (i, &c) in palette.iter().enumerate() {
        write_u16(data, addr + i as u32 * 2, color_to_word(c));
    }
}

// Each row uses bitplanes 0/1 at bytes 2y/2y+1 and bitplanes 2/3 at bytes 2y+16/2y+17.
// Pixel `x` of a row lives at bit `x` of each plane byte.
pub fn decode_tile(bytes: &[u8]) -> Tile {
    let mut tile: Tile = [[0; 8]; 8];
    for y in 0..8 {
        for x in 0..8 {
            let c0 = (bytes[2 * y] >> x) & 1;
            let c1 = (bytes[2 * y + 1] >> x) & 1;
            let c2 = (bytes[2 * y + 16] >> x) & 1;
            let c3 = (bytes[2 * y + 17] >> x) & 1;
            tile[y][x] = c0 | c1 << 1 | c2 << 2 | c3 << 3;
        }
    }
    tile
}

pub fn encode_tile(tile: &Tile, bytes: &mut [u8]) {
    for (y, row) in tile.iter().enumerate() {
        let mut planes = [0u8; 4];
        for (x, &px) in row.iter().enumerate() {
            for (p, plane) in planes.iter_mut().enumerate() {
                *plane |= ((px >> p) & 1) << x;
            }
        }
        bytes[2 * y] = planes[0];
        bytes[2 * y + 1] = planes[1];
        bytes[2 * y + 16] = planes[2];
        bytes[2 * y + 17] = planes[3];
    }
}

/// Decodes palettes for all 16 characters and tilesheets for the first 14.
pub fn decode(data: &[u8]) -> Result<Vec<CharacterGraphics>> {
    ensure!(
        data.len() >= MIN_ROM_SIZE,
        "ROM too small: {} bytes, need at least {}",
        data.len(),
        MIN_ROM_SIZE
    );
    let mut out = Vec::with_capacity(NUM_CHARACTERS);
    for c in 0..NUM_CHARACTERS {
        let palette = decode_palette(data, palette_addr(c));
        let mut tilesheet = vec![];
        if c < NUM_CHARACTERS_WITH_TILES {
            for t in 0..NUM_TILES {
                let addr = tile_addr(c, t).idx();
                tilesheet.push(decode_tile(&data[addr..addr + TILE_STRIDE as usize]));
            }
        }
        out.push(CharacterGraphics { palette, tilesheet });
    }
    Ok(out)
}

/// Writes graphics back into `data`. Only the palette and tile windows are touched.
pub fn encode(graphics: &[CharacterGraphics], data: &mut [u8]) -> Result<()> {
    ensure!(
        data.len() >= MIN_ROM_SIZE,
        "ROM too small: {} bytes, need at least {}",
        data.len(),
        MIN_ROM_SIZE
    );
    ensure!(
        graphics.len() <= NUM_CHARACTERS,
        "too many characters: {}",
        graphics.len()
    );
    for (c, gfx) in graphics.iter().enumerate() {
        encode_palette(&gfx.palette, data, palette_addr(c));
        if c < NUM_CHARACTERS_WITH_TILES {
            ensure!(
                gfx.tilesheet.len() == NUM_TILES,
                "character {}: expected {} tiles, found {}",
                c,
                NUM_TILES,
                gfx.tilesheet.len()
            );
            for (t, tile) in gfx.tilesheet.iter().enumerate() {
                let addr = tile_addr(c, t).idx();
                encode_tile(tile, &mut data[addr..addr + TILE_STRIDE as usize]);
            }
        }
    }
    Ok(())
}

/// Whether two decoded graphic sets differ anywhere in their palettes or tilesheets.
pub fn graphics_differ(a: &[CharacterGraphics], b: &[CharacterGraphics]) -> bool {
    a.len() != b.len()
        || a
            .iter()
            .zip(b)
            .any(|(x, y)| x.palette != y.palette || x.tilesheet != y.tilesheet)
}

/// A ROM file split into its optional copier header and the actual ROM data.
#[derive(Clone, Debug, PartialEq)]
pub struct RomImage {
    pub header: Option<Vec<u8>>,
    pub data: Vec<u8>,
}

impl RomImage {
    pub fn new(mut bytes: Vec<u8>) -> Self {
        if bytes.len() % 1024 == COPIER_HEADER_SIZE {
            info!("Copier header detected ({} bytes)", COPIER_HEADER_SIZE);
            let data = bytes.split_off(COPIER_HEADER_SIZE);
            RomImage {
                header: Some(bytes),
                data,
            }
        } else {
            RomImage {
                header: None,
                data: bytes,
            }
        }
    }

    pub fn decode(&self) -> Result<Vec<CharacterGraphics>> {
        decode(&self.data)
    }

    pub fn encode(&mut self, graphics: &[CharacterGraphics]) -> Result<()> {
        encode(graphics, &mut self.data)
    }

    /// Header (if any) followed by the ROM data, as it would be written to disk.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.as_ref().map_or(0, Vec::len) + self.data.len());
        if let Some(header) = &self.header {
            out.extend_from_slice(header);
        }
        out.extend_from_slice(&self.data);
        out
    }
}
