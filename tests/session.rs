use std::{fs, path::Path};

use ff4_sprite_editor::{
    common::{NUM_CHARACTERS, NUM_CHARACTERS_WITH_TILES, NUM_TILES, PALETTE_SIZE},
    import::{RomGraphicsChoice, RomImport},
    message::Message,
    persist::{export_rom, exported_rom_path, load_session, save_session},
    preset::Preset,
    rom::{encode, COPIER_HEADER_SIZE, MIN_ROM_SIZE},
    state::{CharacterGraphics, Color, Editor, EditorState, Tile},
    undo::MAX_HISTORY,
    update::update,
};

fn vanilla_graphics() -> Vec<CharacterGraphics> {
    (0..NUM_CHARACTERS)
        .map(|i| {
            let mut palette = [Color::default(); PALETTE_SIZE];
            for (j, c) in palette.iter_mut().enumerate() {
                *c = Color::new((j * 2) as u8, (31 - j) as u8, ((i + j) % 32) as u8);
            }
            let tilesheet = if i < NUM_CHARACTERS_WITH_TILES {
                (0..NUM_TILES)
                    .map(|t| {
                        let mut tile: Tile = [[0; 8]; 8];
                        for (y, row) in tile.iter_mut().enumerate() {
                            for (x, px) in row.iter_mut().enumerate() {
                                *px = ((t + y * x + i) % 16) as u8;
                            }
                        }
                        tile
                    })
                    .collect()
            } else {
                vec![]
            };
            CharacterGraphics { palette, tilesheet }
        })
        .collect()
}

fn write_headered_rom(path: &Path, graphics: &[CharacterGraphics]) {
    let mut data = vec![0u8; MIN_ROM_SIZE.next_multiple_of(1024)];
    encode(graphics, &mut data).unwrap();
    let mut bytes = vec![0xAB; COPIER_HEADER_SIZE];
    bytes.extend_from_slice(&data);
    fs::write(path, bytes).unwrap();
}

#[test]
fn import_edit_undo_export() {
    let dir = tempfile::tempdir().unwrap();
    let vanilla = vanilla_graphics();
    let rom_path = dir.path().join("ff2.smc");
    write_headered_rom(&rom_path, &vanilla);

    let mut editor = Editor::new(EditorState::from_graphics(vanilla.clone()), MAX_HISTORY);
    let import = RomImport::load(&rom_path, &vanilla).unwrap();
    assert!(!import.modified);
    assert!(import.image.header.is_some());
    assert!(import.resolve(&mut editor, RomGraphicsChoice::KeepEditor));

    update(&mut editor, Message::SelectCharacter(2)).unwrap();
    update(&mut editor, Message::SetPixel { tile: 5, row: 2, col: 3, color: 15 }).unwrap();
    update(&mut editor, Message::AddGroup { label: "Cape".into(), slot: 9 }).unwrap();
    update(&mut editor, Message::SetBlack(Color::new(2, 2, 4))).unwrap();
    assert_eq!(editor.state.characters[2].graphics.palette[1], Color::new(2, 2, 4));

    update(&mut editor, Message::Undo).unwrap();
    assert_eq!(editor.state.characters[2].graphics.palette[1], vanilla[2].palette[1]);
    assert_eq!(editor.state.characters[2].color_groups.len(), 1);
    assert_eq!(editor.state.characters[2].tilesheet()[5][2][3], 15);

    let out = exported_rom_path(&rom_path).unwrap();
    let mut rom = editor.rom.take().unwrap().image;
    export_rom(&mut rom, &editor.state, &out).unwrap();

    let written = fs::read(&out).unwrap();
    assert!(written[..COPIER_HEADER_SIZE].iter().all(|&b| b == 0xAB));
    let reimport = RomImport::load(&out, &vanilla).unwrap();
    assert!(reimport.modified);
    assert_eq!(reimport.graphics, editor.state.graphics());
}

#[test]
fn modified_rom_replaces_session() {
    let dir = tempfile::tempdir().unwrap();
    let vanilla = vanilla_graphics();
    let mut hacked = vanilla.clone();
    hacked[0].tilesheet[0][0][0] = (hacked[0].tilesheet[0][0][0] + 1) % 16;
    let rom_path = dir.path().join("hack.sfc");
    write_headered_rom(&rom_path, &hacked);

    let mut editor = Editor::new(EditorState::from_graphics(vanilla.clone()), MAX_HISTORY);
    update(&mut editor, Message::RenameCharacter("Someone".into())).unwrap();
    let import = RomImport::load(&rom_path, &vanilla).unwrap();
    assert!(import.modified);
    assert!(import.resolve(&mut editor, RomGraphicsChoice::UseRom));
    assert_eq!(editor.state.graphics(), hacked);
    assert!(!editor.history.can_undo());
}

#[test]
fn snapshot_and_preset_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let vanilla = EditorState::from_graphics(vanilla_graphics());
    let mut editor = Editor::new(vanilla.clone(), MAX_HISTORY);
    update(&mut editor, Message::SelectCharacter(4)).unwrap();
    update(&mut editor, Message::SetPixel { tile: 63, row: 7, col: 7, color: 14 }).unwrap();
    update(&mut editor, Message::AddGroup { label: "Hair".into(), slot: 4 }).unwrap();
    update(&mut editor, Message::JoinGroup { group: 0, slot: 5 }).unwrap();

    let session = dir.path().join("session.json");
    save_session(&session, &editor.state).unwrap();
    let loaded = load_session(&session).unwrap();
    assert_eq!(loaded, editor.state);

    let preset = Preset::capture(
        "Alt",
        "",
        vanilla.character(4).unwrap(),
        loaded.character(4).unwrap(),
    );
    let mut fresh = Editor::new(vanilla.clone(), MAX_HISTORY);
    update(&mut fresh, Message::SelectCharacter(4)).unwrap();
    update(&mut fresh, Message::ApplyPreset(preset)).unwrap();
    assert_eq!(fresh.state.characters[4], loaded.characters[4]);

    // A broken snapshot never replaces what was loaded before.
    let broken = dir.path().join("broken.json");
    fs::write(&broken, b"{\"characters\": 5}").unwrap();
    let before = fresh.state.clone();
    if let Ok(state) = load_session(&broken) {
        fresh.load_snapshot(state);
    }
    assert_eq!(fresh.state, before);
}
