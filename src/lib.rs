pub mod color_group;
pub mod common;
pub mod delta;
pub mod helpers;
pub mod hue;
pub mod import;
pub mod message;
pub mod persist;
pub mod preset;
pub mod preview;
pub mod rom;
pub mod state;
pub mod undo;
pub mod update;
