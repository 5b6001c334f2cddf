// Presets store a character's look compactly: a tile delta against the vanilla baseline
// plus the final color groups and palette.

use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    delta::TileDelta,
    state::{validate_color_groups, Character, ColorGroup, Palette},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub delta: TileDelta,
    #[serde(default)]
    pub color_groups: Vec<ColorGroup>,
    pub palette: Palette,
}

impl Preset {
    pub fn capture(name: &str, description: &str, baseline: &Character, current: &Character) -> Self {
        Preset {
            name: name.to_string(),
            description: description.to_string(),
            delta: TileDelta::diff(baseline.tilesheet(), current.tilesheet()),
            color_groups: current.color_groups.clone(),
            palette: current.graphics.palette,
        }
    }

    /// Palette colors are in range and each group claims distinct editable slots.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.palette.iter().all(|c| c.is_valid()),
            "preset '{}' has a palette color out of range",
            self.name
        );
        validate_color_groups(&self.color_groups)
            .with_context(|| format!("preset '{}'", self.name))
    }

    /// Builds a fresh copy of `baseline` with this preset applied.
    pub fn apply(&self, baseline: &Character) -> Result<Character> {
        self.validate()?;
        info!("Applying preset '{}' to {}", self.name, baseline.name);
        let mut c = baseline.clone();
        self.delta.apply(&mut c.graphics.tilesheet);
        c.color_groups = self.color_groups.clone();
        c.graphics.palette = self.palette;
        Ok(c)
    }
}
