use clap::Subcommand;

use overseer_core::policy::{builtin_presets, find_preset};

use super::CmdResult;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List built-in presets
    List,
    /// Show what a preset sets up
    Show {
        /// Preset id
        id: String,
    },
}

pub fn run(action: PresetAction) -> CmdResult {
    match action {
        PresetAction::List => {
            for info in builtin_presets() {
                println!("{:<16} {}", info.id, info.description);
            }
        }
        PresetAction::Show { id } => {
            let preset = find_preset(&id).ok_or_else(|| format!("unknown preset: {id}"))?;
            let info = preset.info();
            println!("{} ({})", info.name, info.id);
            println!("{}", info.description);
            if !info.notes.is_empty() {
                println!();
                print!("{}", info.notes);
            }
        }
    }
    Ok(())
}
