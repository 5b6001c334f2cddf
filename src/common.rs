use std::ops::Range;

pub type ColorValue = u8; // Color value (0-31)
pub type ColorIdx = u8; // Index into 4bpp palette (0-15)
pub type TileIdx = u8; // Index into a character's tilesheet (0-63)
pub type CharIdx = usize; // Index into the character list (0-15)

pub const NUM_CHARACTERS: usize = 16;
pub const NUM_CHARACTERS_WITH_TILES: usize = 14;
pub const NUM_TILES: usize = 64;
pub const PALETTE_SIZE: usize = 16;

// Palette slots 0-2 are reserved (transparency, black, white); the rest are free to edit.
pub const TRANSPARENT_SLOT: ColorIdx = 0;
pub const BLACK_SLOT: ColorIdx = 1;
pub const WHITE_SLOT: ColorIdx = 2;
pub const EDITABLE_SLOTS: Range<ColorIdx> = 3..16;

pub const MAX_COLOR_VALUE: ColorValue = 31;

pub const CHARACTER_NAMES: [&str; NUM_CHARACTERS] = [
    "DK Cecil",
    "Kain",
    "Young Rydia",
    "Tellah",
    "Edward",
    "Rosa",
    "Yang",
    "Palom",
    "Porom",
    "Cecil",
    "Cid",
    "Rydia",
    "Edge",
    "FuSoYa",
    "Golbez",
    "Anna",
];
