use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Serializer;

use crate::{
    preset::Preset,
    rom::RomImage,
    state::{EditorState, GlobalConfig},
};

pub const ROM_EXTENSIONS: [&str; 2] = ["smc", "sfc"];
pub const SNAPSHOT_EXTENSION: &str = "json";

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &data_bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(data)
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn check_rom_extension(path: &Path) -> Result<()> {
    match extension_lowercase(path) {
        Some(ext) if ROM_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => bail!("File must have a .smc or .sfc extension: {}", path.display()),
    }
}

pub fn check_snapshot_extension(path: &Path) -> Result<()> {
    match extension_lowercase(path) {
        Some(ext) if ext == SNAPSHOT_EXTENSION => Ok(()),
        _ => bail!("File must have a .json extension: {}", path.display()),
    }
}

pub fn load_global_config(path: &Path) -> Result<GlobalConfig> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(GlobalConfig::default());
    }
    load_json(path)
}

pub fn save_global_config(path: &Path, config: &mut GlobalConfig) -> Result<()> {
    if config.modified {
        save_json(path, config)?;
        config.modified = false;
    }
    Ok(())
}

pub fn load_rom(path: &Path) -> Result<RomImage> {
    check_rom_extension(path)?;
    info!("Loading ROM {}", path.display());
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(RomImage::new(bytes))
}

/// Output name for an exported ROM: `<stem>_NewSprites.<ext>` next to the source.
pub fn exported_rom_path(source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .context("invalid ROM file name")?;
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .context("invalid ROM file extension")?;
    Ok(source.with_file_name(format!("{}_NewSprites.{}", stem, ext)))
}

/// Writes the session's graphics into `rom` and saves it (header included) to `path`.
pub fn export_rom(rom: &mut RomImage, state: &EditorState, path: &Path) -> Result<()> {
    check_rom_extension(path)?;
    rom.encode(&state.graphics())?;
    info!("Exporting ROM to {}", path.display());
    fs::write(path, rom.to_bytes()).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn save_session(path: &Path, state: &EditorState) -> Result<()> {
    check_snapshot_extension(path)?;
    save_json(path, state)
}

/// Loads and validates a session snapshot. Errors leave the caller's state untouched,
/// since nothing is returned unless the whole file is usable.
pub fn load_session(path: &Path) -> Result<EditorState> {
    check_snapshot_extension(path)?;
    let state: EditorState = load_json(path)?;
    state
        .validate()
        .with_context(|| format!("invalid session file {}", path.display()))?;
    Ok(state)
}

pub fn save_preset(path: &Path, preset: &Preset) -> Result<()> {
    check_snapshot_extension(path)?;
    save_json(path, preset)
}

pub fn load_preset(path: &Path) -> Result<Preset> {
    check_snapshot_extension(path)?;
    let preset: Preset = load_json(path)?;
    preset
        .validate()
        .with_context(|| format!("invalid preset file {}", path.display()))?;
    Ok(preset)
}

/// Loads every `*.json` preset in `dir`, sorted by name.
pub fn load_preset_dir(dir: &Path) -> Result<Vec<Preset>> {
    let pattern = format!("{}/*.json", dir.display());
    let mut presets = vec![];
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        presets.push(load_preset(&path)?);
    }
    presets.sort_by(|x, y| x.name.cmp(&y.name));
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color_group::add_group,
        rom::{decode, MIN_ROM_SIZE},
        state::tests::sample_state,
    };

    #[test]
    fn test_extensions() {
        assert!(check_rom_extension(Path::new("ff4.smc")).is_ok());
        assert!(check_rom_extension(Path::new("FF4.SFC")).is_ok());
        assert!(check_rom_extension(Path::new("ff4.zip")).is_err());
        assert!(check_rom_extension(Path::new("ff4")).is_err());
        assert!(check_snapshot_extension(Path::new("save.JSON")).is_ok());
        assert!(check_snapshot_extension(Path::new("save.txt")).is_err());
    }

    #[test]
    fn test_exported_rom_path() {
        let p = exported_rom_path(Path::new("/roms/ff2.sfc")).unwrap();
        assert_eq!(p, Path::new("/roms/ff2_NewSprites.sfc"));
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut state = sample_state();
        state.curr_char = 4;
        save_session(&path, &state).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_session_rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, b"{\"characters\": [").unwrap();
        assert!(load_session(&garbage).is_err());

        let short = dir.path().join("short.json");
        fs::write(&short, b"{\"characters\": [], \"currChar\": 0}").unwrap();
        assert!(load_session(&short).is_err());

        let wrong_ext = dir.path().join("session.txt");
        save_json(&wrong_ext, &sample_state()).unwrap();
        assert!(load_session(&wrong_ext).is_err());
    }

    #[test]
    fn test_config_defaults_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = load_global_config(&path).unwrap();
        assert!(config.vanilla_rom.is_none());
        assert_eq!(config.max_history, crate::undo::MAX_HISTORY);

        config.vanilla_rom = Some(PathBuf::from("/roms/ff2.sfc"));
        save_global_config(&path, &mut config).unwrap();
        assert!(!path.exists(), "unmodified config is not written");
        config.modified = true;
        save_global_config(&path, &mut config).unwrap();
        assert!(!config.modified);
        let loaded = load_global_config(&path).unwrap();
        assert_eq!(loaded.vanilla_rom, config.vanilla_rom);
    }

    #[test]
    fn test_export_rom_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("game.smc");
        let mut bytes = vec![0x55; 512];
        bytes.extend(vec![0u8; MIN_ROM_SIZE.next_multiple_of(1024)]);
        fs::write(&src, &bytes).unwrap();

        let mut rom = load_rom(&src).unwrap();
        assert!(rom.header.is_some());
        let state = sample_state();
        let out = exported_rom_path(&src).unwrap();
        export_rom(&mut rom, &state, &out).unwrap();

        let written = fs::read(&out).unwrap();
        assert_eq!(written.len(), bytes.len());
        assert_eq!(&written[..512], &bytes[..512]);
        assert_eq!(decode(&written[512..]).unwrap(), state.graphics());
    }

    #[test]
    fn test_preset_dir_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state();
        let c = &state.characters[0];
        let b = Preset::capture("Beta", "", c, c);
        let a = Preset::capture("Alpha", "", c, c);
        save_preset(&dir.path().join("b.json"), &b).unwrap();
        save_preset(&dir.path().join("a.json"), &a).unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        let presets = load_preset_dir(dir.path()).unwrap();
        assert_eq!(presets.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["Alpha", "Beta"]);
    }

    #[test]
    fn test_load_preset_rejects_overlapping_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlap.json");
        let mut c = sample_state().characters[0].clone();
        add_group(&mut c, "A", 5).unwrap();
        add_group(&mut c, "B", 6).unwrap();
        let mut preset = Preset::capture("Overlap", "", &c, &c);
        preset.color_groups[1].items[0].index = 5;
        save_preset(&path, &preset).unwrap();
        assert!(load_preset(&path).is_err());
        assert!(load_preset_dir(dir.path()).is_err());
    }
}
