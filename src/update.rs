use anyhow::{ensure, Result};
use log::info;

use crate::{
    color_group::{
        add_group, delete_group, join_group, move_group, move_item, remove_from_group,
        rename_group, set_group_param, set_item_param,
    },
    common::{BLACK_SLOT, WHITE_SLOT},
    message::Message,
    state::{Character, Editor},
    undo::{get_undo_action, UndoAction},
};

// Applies `f` to a copy of the selected character and stores it only if `f` succeeds,
// so a failed command never leaves a half-edited character behind.
fn edit_current(editor: &mut Editor, f: impl FnOnce(&mut Character) -> Result<bool>) -> Result<bool> {
    let mut c = editor.state.current()?.clone();
    let changed = f(&mut c)?;
    if changed {
        *editor.state.current_mut()? = c;
    }
    Ok(changed)
}

pub fn update(editor: &mut Editor, message: Message) -> Result<()> {
    let action = get_undo_action(&message);
    let changed = match message {
        Message::SelectCharacter(idx) => {
            ensure!(
                idx < editor.state.characters.len(),
                "character index {} out of range",
                idx
            );
            editor.state.curr_char = idx;
            false
        }
        Message::RenameCharacter(name) => edit_current(editor, |c| {
            c.name = name;
            Ok(true)
        })?,
        Message::AddGroup { label, slot } => {
            edit_current(editor, |c| add_group(c, &label, slot).map(|_| true))?
        }
        Message::JoinGroup { group, slot } => {
            edit_current(editor, |c| join_group(c, group, slot).map(|_| true))?
        }
        Message::RemoveFromGroup { group, item } => {
            edit_current(editor, |c| remove_from_group(c, group, item).map(|_| true))?
        }
        Message::SetGroupParam {
            group,
            param,
            value,
            ..
        } => edit_current(editor, |c| {
            set_group_param(c, group, param, value).map(|_| true)
        })?,
        Message::SetItemParam {
            group,
            item,
            param,
            value,
            ..
        } => edit_current(editor, |c| {
            set_item_param(c, group, item, param, value).map(|_| true)
        })?,
        Message::Commit => true,
        Message::RenameGroup { group, label } => {
            edit_current(editor, |c| rename_group(c, group, &label).map(|_| true))?
        }
        Message::MoveGroup { group, offset } => {
            edit_current(editor, |c| Ok(move_group(c, group, offset).is_some()))?
        }
        Message::DeleteGroup(group) => {
            edit_current(editor, |c| delete_group(c, group).map(|_| true))?
        }
        Message::MoveItem {
            group,
            item,
            offset,
        } => edit_current(editor, |c| Ok(move_item(c, group, item, offset).is_some()))?,
        Message::SetBlack(color) => edit_current(editor, |c| {
            c.set_reserved_color(BLACK_SLOT, color).map(|_| true)
        })?,
        Message::SetWhite(color) => edit_current(editor, |c| {
            c.set_reserved_color(WHITE_SLOT, color).map(|_| true)
        })?,
        Message::SetPixel {
            tile,
            row,
            col,
            color,
        } => edit_current(editor, |c| c.set_pixel(tile, row, col, color).map(|_| true))?,
        Message::RemapPixels { tiles, remap } => {
            edit_current(editor, |c| c.remap_pixels(&tiles, &remap))?
        }
        Message::ApplyLayout(layout) => {
            layout.apply(&mut editor.state)?;
            true
        }
        Message::ApplyPreset(preset) => {
            let curr = editor.state.curr_char;
            let c = preset.apply(editor.baseline.character(curr)?)?;
            *editor.state.current_mut()? = c;
            true
        }
        Message::ResetCharacter => {
            let curr = editor.state.curr_char;
            let c = editor.baseline.character(curr)?.clone();
            info!("Resetting {} to its initial graphics", c.name);
            *editor.state.current_mut()? = c;
            true
        }
        Message::Undo => {
            if let Some(state) = editor.history.undo() {
                info!("Undo ({}/{})", editor.history.index() + 1, editor.history.len());
                editor.state = state;
            }
            false
        }
        Message::Redo => {
            if let Some(state) = editor.history.redo() {
                info!("Redo ({}/{})", editor.history.index() + 1, editor.history.len());
                editor.state = state;
            }
            false
        }
    };
    if changed && action == UndoAction::Snapshot {
        editor.history.push(&editor.state);
    }
    Ok(())
}
