use clap::{Args, Subcommand};
use std::path::PathBuf;

use overseer_core::codec::tile_url;
use overseer_core::policy::{DesktopLink, PinList, SecondaryTile};
use overseer_core::{KioskPolicy, Pin};

use super::app::position;
use super::{load_session, update_session, CmdResult};

/// Session file and which pin list to work on.
#[derive(Args)]
pub struct Target {
    /// Session file
    pub file: PathBuf,
    /// Work on the taskbar instead of Start
    #[arg(long)]
    pub taskbar: bool,
}

#[derive(Subcommand)]
pub enum PinAction {
    /// Pin a desktop shortcut
    AddDesktop {
        #[command(flatten)]
        target: Target,
        /// Display name
        name: String,
        /// Executable the shortcut launches
        #[arg(long = "target")]
        target_path: Option<String>,
        /// Arguments passed to the executable
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
        #[arg(long)]
        working_dir: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Reference this existing .lnk instead of creating one
        #[arg(long)]
        system_shortcut: Option<String>,
    },
    /// Pin a packaged app
    AddPackaged {
        #[command(flatten)]
        target: Target,
        /// Display name
        name: String,
        /// App user model id
        app_id: String,
    },
    /// Pin a website tile to Start
    AddTile {
        /// Session file
        file: PathBuf,
        /// Display name
        name: String,
        /// Address the tile opens
        url: String,
        /// Explicit tile id (derived from the name when omitted)
        #[arg(long)]
        tile_id: Option<String>,
    },
    /// Pin an allowed application by its position in `app list`
    FromApp {
        #[command(flatten)]
        target: Target,
        /// Position of the allowed application
        app: usize,
    },
    /// Remove a pin
    Remove {
        #[command(flatten)]
        target: Target,
        /// Position, as shown by `pin list`
        index: usize,
    },
    /// Move a pin to another position
    Move {
        #[command(flatten)]
        target: Target,
        from: usize,
        to: usize,
    },
    /// Rename a pin
    Rename {
        #[command(flatten)]
        target: Target,
        index: usize,
        name: String,
    },
    /// Copy a pin under a new unique name
    Duplicate {
        #[command(flatten)]
        target: Target,
        index: usize,
    },
    /// List pins
    List {
        #[command(flatten)]
        target: Target,
    },
}

fn pins(policy: &mut KioskPolicy, taskbar: bool) -> &mut PinList {
    if taskbar {
        &mut policy.taskbar_pins
    } else {
        &mut policy.start_pins
    }
}

fn add(target: &Target, pin: Pin) -> CmdResult {
    update_session(&target.file, |editor| {
        let name = pin.name().to_string();
        editor.edit(|p| {
            if target.taskbar {
                p.add_taskbar_pin(pin)
            } else {
                p.add_start_pin(pin)
            }
        })?;
        println!("pinned: {}", name.trim());
        Ok(())
    })
}

pub fn run(action: PinAction) -> CmdResult {
    match action {
        PinAction::AddDesktop {
            target,
            name,
            target_path,
            args,
            working_dir,
            icon,
            system_shortcut,
        } => {
            let mut link = DesktopLink::new(name, target_path.unwrap_or_default());
            link.arguments = args.unwrap_or_default();
            link.working_dir = working_dir.unwrap_or_default();
            link.icon_path = icon.unwrap_or_default();
            link.system_shortcut_path = system_shortcut;
            add(&target, Pin::DesktopLink(link))
        }
        PinAction::AddPackaged {
            target,
            name,
            app_id,
        } => add(&target, Pin::packaged(name, app_id)),
        PinAction::AddTile {
            file,
            name,
            url,
            tile_id,
        } => {
            let mut tile = SecondaryTile::new(name, tile_url(&url));
            tile.tile_id = tile_id.unwrap_or_default();
            let target = Target {
                file,
                taskbar: false,
            };
            add(&target, Pin::SecondaryTile(tile))
        }
        PinAction::FromApp { target, app } => update_session(&target.file, |editor| {
            let index = position(app)?;
            editor.edit(|p| {
                if target.taskbar {
                    p.pin_app_to_taskbar(index)
                } else {
                    p.pin_app_to_start(index)
                }
            })?;
            println!("pinned");
            Ok(())
        }),
        PinAction::Remove { target, index } => update_session(&target.file, |editor| {
            let index = position(index)?;
            let removed = editor.edit(|p| pins(p, target.taskbar).remove(index))?;
            println!("removed: {}", removed.name());
            Ok(())
        }),
        PinAction::Move { target, from, to } => update_session(&target.file, |editor| {
            let (from, to) = (position(from)?, position(to)?);
            editor.edit(|p| pins(p, target.taskbar).move_pin(from, to))?;
            println!("moved");
            Ok(())
        }),
        PinAction::Rename {
            target,
            index,
            name,
        } => update_session(&target.file, |editor| {
            let index = position(index)?;
            editor.edit(|p| pins(p, target.taskbar).rename(index, &name))?;
            println!("renamed");
            Ok(())
        }),
        PinAction::Duplicate { target, index } => update_session(&target.file, |editor| {
            let index = position(index)?;
            let copy = editor.edit(|p| -> Result<String, Box<dyn std::error::Error>> {
                let list = pins(p, target.taskbar);
                let at = list.duplicate(index)?;
                Ok(list.get(at).map(|pin| pin.name().to_string()).unwrap_or_default())
            })?;
            println!("created: {copy}");
            Ok(())
        }),
        PinAction::List { target } => {
            let (_, editor) = load_session(&target.file)?;
            let policy = editor.policy();
            let list = if target.taskbar {
                &policy.taskbar_pins
            } else {
                &policy.start_pins
            };
            if list.is_empty() {
                println!("No pins.");
            }
            for (i, pin) in list.iter().enumerate() {
                let detail = match pin {
                    Pin::DesktopLink(link) => link.system_shortcut().map_or_else(
                        || link.target.clone(),
                        |path| format!("{path} (system shortcut)"),
                    ),
                    Pin::PackagedApp(p) => p.packaged_app_id.clone(),
                    Pin::SecondaryTile(tile) => tile.launch_arguments.clone(),
                };
                println!("{}. [{}] {} -> {detail}", i + 1, pin.type_label(), pin.name());
            }
            Ok(())
        }
    }
}
