use crate::{message::Message, state::EditorState};

pub const MAX_HISTORY: usize = 50;

#[derive(Debug, PartialEq, Eq)]
pub enum UndoAction {
    None,
    Snapshot,
}

pub fn get_undo_action(message: &Message) -> UndoAction {
    // Only changes to project data (graphics, palettes, groups) are recorded, not
    // navigation or the intermediate values of a slider drag.
    match message {
        Message::SelectCharacter(_) => UndoAction::None,
        Message::Undo | Message::Redo => UndoAction::None,
        Message::SetGroupParam { commit: false, .. } => UndoAction::None,
        Message::SetItemParam { commit: false, .. } => UndoAction::None,
        Message::SetGroupParam { commit: true, .. } => UndoAction::Snapshot,
        Message::SetItemParam { commit: true, .. } => UndoAction::Snapshot,
        Message::Commit => UndoAction::Snapshot,
        Message::RenameCharacter(_) => UndoAction::Snapshot,
        Message::AddGroup { .. } => UndoAction::Snapshot,
        Message::JoinGroup { .. } => UndoAction::Snapshot,
        Message::RemoveFromGroup { .. } => UndoAction::Snapshot,
        Message::RenameGroup { .. } => UndoAction::Snapshot,
        Message::MoveGroup { .. } => UndoAction::Snapshot,
        Message::DeleteGroup(_) => UndoAction::Snapshot,
        Message::MoveItem { .. } => UndoAction::Snapshot,
        Message::SetBlack(_) | Message::SetWhite(_) => UndoAction::Snapshot,
        Message::SetPixel { .. } => UndoAction::Snapshot,
        Message::RemapPixels { .. } => UndoAction::Snapshot,
        Message::ApplyLayout(_) => UndoAction::Snapshot,
        Message::ApplyPreset(_) => UndoAction::Snapshot,
        Message::ResetCharacter => UndoAction::Snapshot,
    }
}

/// Bounded stack of whole-state snapshots for undo/redo.
///
/// `entries[index]` is always the snapshot matching the current state. Pushing
/// discards any redo entries past `index`; the oldest entries fall off the front
/// once `max_size` is exceeded.
#[derive(Debug)]
pub struct History {
    entries: Vec<EditorState>,
    index: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        History {
            entries: vec![],
            index: 0,
            max_size: max_size.max(1),
        }
    }

    pub fn push(&mut self, state: &EditorState) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state.clone());
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
    }

    /// Steps back one snapshot. The selection cursor of the returned state is taken from
    /// the snapshot that was current before the undo, so navigation is not rolled back.
    pub fn undo(&mut self) -> Option<EditorState> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        let curr_char = self.entries[self.index].curr_char;
        self.index -= 1;
        let mut state = self.entries[self.index].clone();
        state.curr_char = curr_char;
        Some(state)
    }

    pub fn redo(&mut self) -> Option<EditorState> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drops all history and starts over from `state`.
    pub fn reset(&mut self, state: &EditorState) {
        self.entries.clear();
        self.index = 0;
        self.push(state);
    }
}
