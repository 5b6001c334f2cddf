use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::{
    persist::load_rom,
    rom::{graphics_differ, RomImage},
    state::{CharacterGraphics, Editor, EditorState, LoadedRom},
};

/// What to do with a ROM whose graphics differ from the vanilla baseline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RomGraphicsChoice {
    /// Replace the editor contents with the ROM's graphics.
    UseRom,
    /// Attach the ROM for export but keep the editor's graphics.
    KeepEditor,
    /// Don't load the ROM at all.
    Cancel,
}

/// A ROM that has been read and decoded but not yet attached to an editor.
pub struct RomImport {
    pub path: PathBuf,
    pub image: RomImage,
    pub graphics: Vec<CharacterGraphics>,
    pub modified: bool,
}

impl RomImport {
    /// Reads and decodes a ROM without comparing it to any baseline.
    pub fn read(path: &Path) -> Result<Self> {
        info!("Importing from ROM at {}", path.display());
        let image = load_rom(path)?;
        let graphics = image.decode()?;
        Ok(RomImport {
            path: path.to_owned(),
            image,
            graphics,
            modified: false,
        })
    }

    pub fn load(path: &Path, vanilla: &[CharacterGraphics]) -> Result<Self> {
        let mut import = Self::read(path)?;
        import.modified = graphics_differ(&import.graphics, vanilla);
        if import.modified {
            warn!("The graphic data in {} differs from vanilla", path.display());
        }
        Ok(import)
    }

    /// The ROM's graphics as a fresh editor state, without any color groups.
    pub fn to_state(&self) -> EditorState {
        EditorState::from_graphics(self.graphics.clone())
    }

    /// Attaches the ROM to `editor`. `choice` only matters when the ROM's graphics were
    /// modified; an unmodified ROM is always attached with the editor graphics kept.
    /// Returns whether the ROM was attached.
    pub fn resolve(self, editor: &mut Editor, choice: RomGraphicsChoice) -> bool {
        let choice = if self.modified {
            choice
        } else {
            RomGraphicsChoice::KeepEditor
        };
        match choice {
            RomGraphicsChoice::Cancel => {
                info!("ROM load cancelled");
                return false;
            }
            RomGraphicsChoice::UseRom => {
                info!("Using graphics from {}", self.path.display());
                editor.reinitialize(self.to_state());
            }
            RomGraphicsChoice::KeepEditor => {}
        }
        editor.rom = Some(LoadedRom {
            path: self.path,
            image: self.image,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rom::{encode, MIN_ROM_SIZE},
        state::tests::{sample_graphics, sample_state},
        undo::MAX_HISTORY,
    };
    use std::fs;

    fn write_rom(dir: &Path, name: &str, graphics: &[CharacterGraphics]) -> PathBuf {
        let mut data = vec![0u8; MIN_ROM_SIZE.next_multiple_of(1024)];
        encode(graphics, &mut data).unwrap();
        let path = dir.join(name);
        fs::write(&path, &data).unwrap();
        path
    }

    #[test]
    fn test_unmodified_rom_keeps_editor() {
        let dir = tempfile::tempdir().unwrap();
        let vanilla = sample_graphics();
        let path = write_rom(dir.path(), "ff2.sfc", &vanilla);
        let import = RomImport::load(&path, &vanilla).unwrap();
        assert!(!import.modified);

        let mut editor = Editor::new(sample_state(), MAX_HISTORY);
        editor.state.characters[0].name = "Renamed".into();
        assert!(import.resolve(&mut editor, RomGraphicsChoice::Cancel));
        assert_eq!(editor.state.characters[0].name, "Renamed");
        assert!(editor.rom.is_some());
    }

    #[test]
    fn test_modified_rom_choices() {
        let dir = tempfile::tempdir().unwrap();
        let vanilla = sample_graphics();
        let mut hacked = vanilla.clone();
        hacked[4].palette[7].r = (hacked[4].palette[7].r + 1) % 32;
        let path = write_rom(dir.path(), "hack.smc", &hacked);

        let mut editor = Editor::new(sample_state(), MAX_HISTORY);
        let import = RomImport::load(&path, &vanilla).unwrap();
        assert!(import.modified);
        assert!(!import.resolve(&mut editor, RomGraphicsChoice::Cancel));
        assert!(editor.rom.is_none());

        let import = RomImport::load(&path, &vanilla).unwrap();
        assert!(import.resolve(&mut editor, RomGraphicsChoice::KeepEditor));
        assert_eq!(editor.state.graphics(), vanilla);

        let import = RomImport::load(&path, &vanilla).unwrap();
        assert!(import.resolve(&mut editor, RomGraphicsChoice::UseRom));
        assert_eq!(editor.state.graphics(), hacked);
        assert_eq!(editor.baseline.graphics(), hacked);
        assert_eq!(editor.history.len(), 1);
    }

    #[test]
    fn test_read_without_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let mut hacked = sample_graphics();
        hacked[0].palette[3].g = (hacked[0].palette[3].g + 1) % 32;
        let path = write_rom(dir.path(), "hack.sfc", &hacked);
        let import = RomImport::read(&path).unwrap();
        assert!(!import.modified);
        assert_eq!(import.graphics, hacked);
        assert_eq!(import.to_state().graphics(), hacked);
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let vanilla = sample_graphics();
        let path = write_rom(dir.path(), "ff2.bin", &vanilla);
        assert!(RomImport::load(&path, &vanilla).is_err());
    }
}
