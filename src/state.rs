use anyhow::{ensure, Context, Result};
use hashbrown::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{rom::RomImage, undo::History};
pub use crate::common::{CharIdx, ColorIdx, ColorValue, TileIdx};
use crate::common::{
    BLACK_SLOT, CHARACTER_NAMES, EDITABLE_SLOTS, MAX_COLOR_VALUE, NUM_CHARACTERS,
    NUM_CHARACTERS_WITH_TILES, NUM_TILES, PALETTE_SIZE, WHITE_SLOT,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: ColorValue,
    pub g: ColorValue,
    pub b: ColorValue,
}

impl Color {
    pub const fn new(r: ColorValue, g: ColorValue, b: ColorValue) -> Self {
        Self { r, g, b }
    }

    pub fn is_valid(&self) -> bool {
        self.r <= MAX_COLOR_VALUE && self.g <= MAX_COLOR_VALUE && self.b <= MAX_COLOR_VALUE
    }

    // Channels normalized to 0.0-1.0
    pub fn to_unit(&self) -> [f64; 3] {
        let max = MAX_COLOR_VALUE as f64;
        [self.r as f64 / max, self.g as f64 / max, self.b as f64 / max]
    }
}

pub type Palette = [Color; PALETTE_SIZE];

// Pixels are indexed [row][col], where `col` is the bit number within the ROM bitplane bytes.
pub type Tile = [[ColorIdx; 8]; 8];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterGraphics {
    pub palette: Palette,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tilesheet: Vec<Tile>,
}

/// One palette slot driven by its group's parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorItem {
    pub index: ColorIdx,
    /// Hue offset from the group's first item, in [-1.5, 1.5].
    pub huedel: f64,
    pub bright: f64,
    /// Stored saturation; `recolor` consumes it as `1 - sat`.
    pub sat: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorGroup {
    pub label: String,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub huebr: f64,
    pub bright: f64,
    pub sat: f64,
    pub items: Vec<ColorItem>,
}

impl ColorGroup {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub graphics: CharacterGraphics,
    #[serde(default)]
    pub color_groups: Vec<ColorGroup>,
}

impl Character {
    pub fn new(name: &str, graphics: CharacterGraphics) -> Self {
        Self {
            name: name.to_string(),
            graphics,
            color_groups: vec![],
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.graphics.palette
    }

    pub fn tilesheet(&self) -> &[Tile] {
        &self.graphics.tilesheet
    }

    pub fn set_pixel(&mut self, tile_idx: TileIdx, row: usize, col: usize, color_idx: ColorIdx) -> Result<()> {
        ensure!((color_idx as usize) < PALETTE_SIZE, "color index {} out of range", color_idx);
        ensure!(row < 8 && col < 8, "pixel ({}, {}) out of range", row, col);
        let tile = self
            .graphics
            .tilesheet
            .get_mut(tile_idx as usize)
            .context("tile index out of range")?;
        tile[row][col] = color_idx;
        Ok(())
    }

    /// Swaps palette indices across the given tiles. `remap[c]` is the replacement for
    /// color index `c`, or `None` to leave it alone. Returns whether any pixel changed.
    pub fn remap_pixels(
        &mut self,
        tiles: &[TileIdx],
        remap: &[Option<ColorIdx>; PALETTE_SIZE],
    ) -> Result<bool> {
        ensure!(
            remap.iter().flatten().all(|&c| (c as usize) < PALETTE_SIZE),
            "remap target out of range"
        );
        let mut changed = false;
        for &tile_idx in tiles {
            let tile = self
                .graphics
                .tilesheet
                .get_mut(tile_idx as usize)
                .context("tile index out of range")?;
            for row in tile.iter_mut() {
                for px in row.iter_mut() {
                    if let Some(new_px) = remap[*px as usize] {
                        if new_px != *px {
                            *px = new_px;
                            changed = true;
                        }
                    }
                }
            }
        }
        Ok(changed)
    }

    /// Overrides the reserved black or white slot.
    pub fn set_reserved_color(&mut self, slot: ColorIdx, color: Color) -> Result<()> {
        ensure!(
            slot == BLACK_SLOT || slot == WHITE_SLOT,
            "slot {} is not a reserved black/white slot",
            slot
        );
        ensure!(color.is_valid(), "color channel out of range");
        self.graphics.palette[slot as usize] = color;
        Ok(())
    }

    fn validate(&self, char_idx: CharIdx) -> Result<()> {
        let gfx = &self.graphics;
        ensure!(
            gfx.palette.iter().all(Color::is_valid),
            "character {}: palette color out of range",
            char_idx
        );
        if char_idx < NUM_CHARACTERS_WITH_TILES {
            ensure!(
                gfx.tilesheet.len() == NUM_TILES,
                "character {}: expected {} tiles, found {}",
                char_idx,
                NUM_TILES,
                gfx.tilesheet.len()
            );
        }
        ensure!(
            gfx.tilesheet
                .iter()
                .flatten()
                .flatten()
                .all(|&c| (c as usize) < PALETTE_SIZE),
            "character {}: pixel value out of range",
            char_idx
        );
        validate_color_groups(&self.color_groups)
            .with_context(|| format!("character {}", char_idx))
    }
}

/// Every group is non-empty and the grouped slots are editable and distinct.
pub(crate) fn validate_color_groups(groups: &[ColorGroup]) -> Result<()> {
    let mut taken: HashSet<ColorIdx> = HashSet::new();
    for group in groups {
        ensure!(!group.items.is_empty(), "empty color group '{}'", group.label);
        for item in &group.items {
            ensure!(
                EDITABLE_SLOTS.contains(&item.index),
                "grouped slot {} is not editable",
                item.index
            );
            ensure!(
                taken.insert(item.index),
                "slot {} is in more than one group",
                item.index
            );
        }
    }
    Ok(())
}

/// A ROM the session will be exported into.
#[derive(Debug)]
pub struct LoadedRom {
    pub path: PathBuf,
    pub image: RomImage,
}

/// Everything belonging to one editing session.
#[derive(Debug)]
pub struct Editor {
    pub state: EditorState,
    pub history: History,
    // Graphics and groups as they were when the session started; presets and
    // character resets are applied on top of a copy of this.
    pub baseline: EditorState,
    pub rom: Option<LoadedRom>,
}

impl Editor {
    pub fn new(state: EditorState, max_history: usize) -> Self {
        let mut history = History::new(max_history);
        history.push(&state);
        Editor {
            baseline: state.clone(),
            state,
            history,
            rom: None,
        }
    }

    /// Replaces the session data (and baseline) wholesale, e.g. with graphics taken from a ROM.
    pub fn reinitialize(&mut self, state: EditorState) {
        self.baseline = state.clone();
        self.history.reset(&state);
        self.state = state;
    }

    /// Swaps in a loaded snapshot while keeping the baseline.
    pub fn load_snapshot(&mut self, state: EditorState) {
        self.history.reset(&state);
        self.state = state;
    }
}
