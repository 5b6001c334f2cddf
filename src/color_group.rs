// Color groups: several palette slots whose colors are derived from one shared anchor
// (hue/brightness/saturation) plus small per-slot offsets.

use anyhow::{bail, ensure, Context, Result};
use hashbrown::HashSet;
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    common::{ColorIdx, EDITABLE_SLOTS, MAX_COLOR_VALUE},
    hue::{float_to_five, hue_sum, hue_to_rgb, rgb_to_hue},
    state::{Character, ColorGroup, ColorItem, EditorState, Palette},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GroupParam {
    Red,
    Green,
    Blue,
    Bright,
    Sat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemParam {
    HueDelta,
    Bright,
    Sat,
}

/// Editable slots not claimed by any group, ascending.
pub fn ungrouped_slots(character: &Character) -> Vec<ColorIdx> {
    let taken: HashSet<ColorIdx> = character
        .color_groups
        .iter()
        .flat_map(|g| g.items.iter().map(|c| c.index))
        .collect();
    EDITABLE_SLOTS.filter(|i| !taken.contains(i)).collect()
}

fn group_of_slot(character: &Character, slot: ColorIdx) -> Option<usize> {
    character
        .color_groups
        .iter()
        .position(|g| g.items.iter().any(|c| c.index == slot))
}

/// Appends palette slot `slot` to `group`, seeding the group's anchor if it has no items yet.
///
/// The hue offset of a new item is measured against the current color of the group's
/// first item, not against the anchor.
pub fn append_to_group(palette: &Palette, group: &mut ColorGroup, slot: ColorIdx) -> Result<()> {
    ensure!(
        EDITABLE_SLOTS.contains(&slot),
        "palette slot {} cannot be grouped",
        slot
    );
    let col = palette[slot as usize];

    if group.items.is_empty() {
        let dir = hue_to_rgb(rgb_to_hue(col.r as f64, col.g as f64, col.b as f64));
        group.red = float_to_five(dir[0]) as f64;
        group.green = float_to_five(dir[1]) as f64;
        group.blue = float_to_five(dir[2]) as f64;
        group.bright = 0.0;
        group.sat = 0.0;
        group.huebr = dir.iter().sum();
    }

    let [r, g, b] = col.to_unit();
    let hue = rgb_to_hue(r, g, b);
    let huedel = match group.items.first() {
        None => 0.0,
        Some(first) => {
            let fc = palette[first.index as usize];
            let d = hue_sum(hue, -rgb_to_hue(fc.r as f64, fc.g as f64, fc.b as f64));
            if d > 1.5 {
                d - 3.0
            } else {
                d
            }
        }
    };
    let bright = (r + b + g) / 3.0;
    let sat = if bright == 0.0 {
        0.0
    } else {
        1.0 - r.min(g).min(b) / bright
    };

    group.items.push(ColorItem {
        index: slot,
        huedel,
        bright,
        sat,
    });
    Ok(())
}

/// Starts a new group labelled `label` from a free palette slot. Returns the group index.
pub fn add_group(character: &mut Character, label: &str, slot: ColorIdx) -> Result<usize> {
    if let Some(g) = group_of_slot(character, slot) {
        bail!("palette slot {} already belongs to group {}", slot, g);
    }
    let mut group = ColorGroup::new(label);
    append_to_group(&character.graphics.palette, &mut group, slot)?;
    character.color_groups.push(group);
    Ok(character.color_groups.len() - 1)
}

pub fn join_group(character: &mut Character, group_idx: usize, slot: ColorIdx) -> Result<()> {
    if let Some(g) = group_of_slot(character, slot) {
        bail!("palette slot {} already belongs to group {}", slot, g);
    }
    let palette = &character.graphics.palette;
    let group = character
        .color_groups
        .get_mut(group_idx)
        .context("color group index out of range")?;
    append_to_group(palette, group, slot)
}

/// Removes an item from a group, deleting the group if it becomes empty.
/// Returns whether the group was deleted. Hue offsets of the remaining items are untouched.
pub fn remove_from_group(
    character: &mut Character,
    group_idx: usize,
    item_idx: usize,
) -> Result<bool> {
    let group = character
        .color_groups
        .get_mut(group_idx)
        .context("color group index out of range")?;
    ensure!(item_idx < group.items.len(), "color item index out of range");
    group.items.remove(item_idx);
    if group.items.is_empty() {
        character.color_groups.remove(group_idx);
        return Ok(true);
    }
    Ok(false)
}

/// Recomputes the palette colors of every item in `group` from the group and item parameters.
pub fn recolor(group: &ColorGroup, palette: &mut Palette) {
    let max = MAX_COLOR_VALUE as f64;
    let (dr, dg, db) = (group.red / max, group.green / max, group.blue / max);
    let hba = group.huebr;

    let anchor_hue = rgb_to_hue(dr, dg, db);
    let anchor_bright = (dr + dg + db) / 3.0;
    let anchor_sat = if anchor_bright == 0.0 {
        0.0
    } else {
        dr.min(dg).min(db) / anchor_bright
    };
    let q = hue_to_rgb(anchor_hue).iter().sum::<f64>() / hba;

    for item in &group.items {
        let dir = hue_to_rgb(hue_sum(anchor_hue, item.huedel));
        let hb: f64 = dir.iter().sum();
        let mut scale = 3.0 / hb / hba / q;
        if !scale.is_finite() {
            scale = 0.0;
        }
        let n = dir.map(|u| scale * u * anchor_bright * (1.0 - anchor_sat) + anchor_bright * anchor_sat);

        let br = item.bright * (1.0 + group.bright);
        let item_sat = 1.0 - item.sat;
        let sa = if group.sat < 0.0 {
            1.0 - (1.0 - item_sat) * (1.0 + group.sat)
        } else if group.sat > 0.0 {
            item_sat * (1.0 - group.sat)
        } else {
            item_sat
        };

        let [r, g, b] = n.map(|nc| float_to_five(3.0 * nc * br * (1.0 - sa) + br * sa));
        match palette.get_mut(item.index as usize) {
            Some(pc) => {
                pc.r = r;
                pc.g = g;
                pc.b = b;
            }
            None => warn!("color item refers to palette slot {}", item.index),
        }
    }
}

pub fn recolor_group(character: &mut Character, group_idx: usize) -> Result<()> {
    let group = character
        .color_groups
        .get(group_idx)
        .context("color group index out of range")?;
    recolor(group, &mut character.graphics.palette);
    Ok(())
}

pub fn set_group_param(
    character: &mut Character,
    group_idx: usize,
    param: GroupParam,
    value: f64,
) -> Result<()> {
    ensure!(value.is_finite(), "parameter value must be finite");
    let group = character
        .color_groups
        .get_mut(group_idx)
        .context("color group index out of range")?;
    let max = MAX_COLOR_VALUE as f64;
    match param {
        GroupParam::Red => group.red = value.round().clamp(0.0, max),
        GroupParam::Green => group.green = value.round().clamp(0.0, max),
        GroupParam::Blue => group.blue = value.round().clamp(0.0, max),
        GroupParam::Bright => group.bright = value.clamp(-1.0, 1.0),
        GroupParam::Sat => group.sat = value.clamp(-1.0, 1.0),
    }
    recolor_group(character, group_idx)
}

pub fn set_item_param(
    character: &mut Character,
    group_idx: usize,
    item_idx: usize,
    param: ItemParam,
    value: f64,
) -> Result<()> {
    ensure!(value.is_finite(), "parameter value must be finite");
    let group = character
        .color_groups
        .get_mut(group_idx)
        .context("color group index out of range")?;
    let item = group
        .items
        .get_mut(item_idx)
        .context("color item index out of range")?;
    match param {
        ItemParam::HueDelta => item.huedel = value.clamp(-1.5, 1.5),
        ItemParam::Bright => item.bright = value.clamp(0.0, 1.0),
        ItemParam::Sat => item.sat = value.clamp(0.0, 1.0),
    }
    recolor_group(character, group_idx)
}

pub fn rename_group(character: &mut Character, group_idx: usize, label: &str) -> Result<()> {
    let group = character
        .color_groups
        .get_mut(group_idx)
        .context("color group index out of range")?;
    group.label = label.to_string();
    Ok(())
}

pub fn delete_group(character: &mut Character, group_idx: usize) -> Result<ColorGroup> {
    ensure!(
        group_idx < character.color_groups.len(),
        "color group index out of range"
    );
    Ok(character.color_groups.remove(group_idx))
}

// Moves `v[idx]` by `offset` places. Out-of-range moves leave `v` alone and return None.
fn move_entry<T>(v: &mut Vec<T>, idx: usize, offset: isize) -> Option<usize> {
    let target = idx.checked_add_signed(offset)?;
    if idx >= v.len() || target >= v.len() {
        return None;
    }
    let entry = v.remove(idx);
    v.insert(target, entry);
    Some(target)
}

/// Reorders a group among its siblings. Returns the new index, or None if the move was
/// out of range.
pub fn move_group(character: &mut Character, group_idx: usize, offset: isize) -> Option<usize> {
    move_entry(&mut character.color_groups, group_idx, offset)
}

/// Reorders an item inside its group. Hue offsets are kept as they are, so an item moved
/// to the front keeps its offset (as after removing the first item).
pub fn move_item(
    character: &mut Character,
    group_idx: usize,
    item_idx: usize,
    offset: isize,
) -> Option<usize> {
    let group = character.color_groups.get_mut(group_idx)?;
    move_entry(&mut group.items, item_idx, offset)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLayoutEntry {
    pub label: String,
    pub palette_indices: Vec<ColorIdx>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterLayout {
    #[serde(default)]
    pub color_groups: Vec<GroupLayoutEntry>,
}

/// Group membership (labels and slots) without any color parameters, for every character.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub characters: Vec<CharacterLayout>,
}

impl GroupLayout {
    pub fn generate(state: &EditorState) -> Self {
        let characters = state
            .characters
            .iter()
            .map(|c| CharacterLayout {
                color_groups: c
                    .color_groups
                    .iter()
                    .map(|g| GroupLayoutEntry {
                        label: g.label.clone(),
                        palette_indices: g.items.iter().map(|i| i.index).collect(),
                    })
                    .collect(),
            })
            .collect();
        GroupLayout { characters }
    }

    /// Rebuilds every listed character's groups from the current palette colors.
    /// Nothing is modified unless the whole layout is valid.
    pub fn apply(&self, state: &mut EditorState) -> Result<()> {
        ensure!(
            self.characters.len() <= state.characters.len(),
            "layout has {} characters, state has {}",
            self.characters.len(),
            state.characters.len()
        );
        let mut rebuilt = Vec::with_capacity(self.characters.len());
        for (char_idx, layout) in self.characters.iter().enumerate() {
            let palette = &state.characters[char_idx].graphics.palette;
            let all_slots = layout
                .color_groups
                .iter()
                .flat_map(|g| g.palette_indices.iter().copied())
                .collect_vec();
            ensure!(
                all_slots.iter().all_unique(),
                "character {}: a palette slot appears in more than one group",
                char_idx
            );
            let mut groups = vec![];
            for entry in &layout.color_groups {
                ensure!(
                    !entry.palette_indices.is_empty(),
                    "character {}: group '{}' has no palette slots",
                    char_idx,
                    entry.label
                );
                let mut group = ColorGroup::new(&entry.label);
                for &slot in &entry.palette_indices {
                    append_to_group(palette, &mut group, slot)?;
                }
                groups.push(group);
            }
            rebuilt.push(groups);
        }
        for (character, groups) in state.characters.iter_mut().zip(rebuilt) {
            character.color_groups = groups;
        }
        Ok(())
    }
}
