pub mod app;
pub mod config;
pub mod pin;
pub mod preset;
pub mod session;

use std::fs;
use std::path::Path;

use overseer_core::{PolicyEditor, SessionSnapshot};
use tracing::debug;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open a session file written by `overseer new` or `overseer import`.
pub fn load_session(path: &Path) -> Result<(String, PolicyEditor), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read session {}: {e}", path.display()))?;
    let snapshot = SessionSnapshot::from_json(&json)?;
    debug!(path = %path.display(), saved_at = %snapshot.saved_at, "session loaded");
    let name = snapshot.name.clone();
    Ok((name, PolicyEditor::from_snapshot(snapshot)))
}

/// Write the session back under the name it was opened with.
pub fn save_session(path: &Path, name: &str, editor: &mut PolicyEditor) -> CmdResult {
    let json = editor.snapshot(name).to_json()?;
    fs::write(path, json).map_err(|e| format!("cannot write session {}: {e}", path.display()))?;
    editor.mark_saved();
    debug!(path = %path.display(), "session saved");
    Ok(())
}

/// Load a session, apply `change`, and save it again.
pub fn update_session<F>(path: &Path, change: F) -> CmdResult
where
    F: FnOnce(&mut PolicyEditor) -> CmdResult,
{
    let (name, mut editor) = load_session(path)?;
    change(&mut editor)?;
    if editor.is_dirty() {
        save_session(path, &name, &mut editor)?;
    }
    Ok(())
}
