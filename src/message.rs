use crate::{
    color_group::{GroupLayout, GroupParam, ItemParam},
    common::PALETTE_SIZE,
    preset::Preset,
    state::{CharIdx, Color, ColorIdx, TileIdx},
};

/// Commands accepted by `update`. All of them act on the currently selected character.
#[derive(Debug, Clone)]
pub enum Message {
    SelectCharacter(CharIdx),
    RenameCharacter(String),
    AddGroup {
        label: String,
        slot: ColorIdx,
    },
    JoinGroup {
        group: usize,
        slot: ColorIdx,
    },
    RemoveFromGroup {
        group: usize,
        item: usize,
    },
    // `commit: false` is for slider drags; send `Commit` when the drag ends.
    SetGroupParam {
        group: usize,
        param: GroupParam,
        value: f64,
        commit: bool,
    },
    SetItemParam {
        group: usize,
        item: usize,
        param: ItemParam,
        value: f64,
        commit: bool,
    },
    Commit,
    RenameGroup {
        group: usize,
        label: String,
    },
    MoveGroup {
        group: usize,
        offset: isize,
    },
    DeleteGroup(usize),
    MoveItem {
        group: usize,
        item: usize,
        offset: isize,
    },
    SetBlack(Color),
    SetWhite(Color),
    SetPixel {
        tile: TileIdx,
        row: usize,
        col: usize,
        color: ColorIdx,
    },
    RemapPixels {
        tiles: Vec<TileIdx>,
        remap: [Option<ColorIdx>; PALETTE_SIZE],
    },
    ApplyLayout(GroupLayout),
    ApplyPreset(Preset),
    ResetCharacter,
    Undo,
    Redo,
}
