use clap::Subcommand;
use std::path::{Path, PathBuf};

use overseer_core::policy::{catalog_apps, BrowserLaunch, EdgeKioskType, LaunchSource};
use overseer_core::{AllowedApp, AppKind};

use super::{load_session, update_session, CmdResult};

#[derive(Subcommand)]
pub enum AppAction {
    /// Allow an application
    Add {
        /// Session file
        file: PathBuf,
        /// Executable path, or app user model id with --packaged
        value: String,
        /// Treat the value as a packaged app id
        #[arg(long)]
        packaged: bool,
        /// Also allow the helpers the application needs (Edge)
        #[arg(long)]
        with_deps: bool,
    },
    /// Allow the applications of a catalog entry (edge, osk, calculator)
    AddCatalog {
        /// Session file
        file: PathBuf,
        /// Catalog key
        key: String,
    },
    /// Remove an allowed application
    Remove {
        /// Session file
        file: PathBuf,
        /// Position, as shown by `app list`
        index: usize,
    },
    /// Move an allowed application to another position
    Move {
        /// Session file
        file: PathBuf,
        /// Current position
        from: usize,
        /// New position
        to: usize,
    },
    /// Choose the application launched at sign-in
    AutoLaunch {
        /// Session file
        file: PathBuf,
        /// Position of the application; omit to clear
        index: Option<usize>,
        /// Start page when the application is a browser
        #[arg(long, conflicts_with = "file_path")]
        url: Option<String>,
        /// Local start page when the application is a browser
        #[arg(long)]
        file_path: Option<String>,
        /// fullscreen or public-browsing
        #[arg(long, value_parser = parse_kiosk_type)]
        kiosk_type: Option<EdgeKioskType>,
        /// Minutes of inactivity before the browser session resets
        #[arg(long)]
        idle_timeout: Option<u32>,
        /// Command line for any other desktop application
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
    },
    /// List allowed applications
    List {
        /// Session file
        file: PathBuf,
    },
}

fn parse_kiosk_type(value: &str) -> Result<EdgeKioskType, String> {
    EdgeKioskType::parse(value).ok_or_else(|| format!("unknown kiosk type: {value}"))
}

/// Convert a 1-based position from the command line.
pub fn position(n: usize) -> Result<usize, String> {
    n.checked_sub(1).ok_or_else(|| "positions start at 1".to_string())
}

pub fn run(action: AppAction) -> CmdResult {
    match action {
        AppAction::Add {
            file,
            value,
            packaged,
            with_deps,
        } => update_session(&file, |editor| {
            let app = if packaged {
                AllowedApp::packaged(value.trim())
            } else {
                AllowedApp::desktop(value.trim())
            };
            let added = editor.edit(|p| {
                if with_deps {
                    p.add_app_with_dependencies(app)
                } else {
                    usize::from(p.add_app(app))
                }
            });
            match added {
                0 => println!("already allowed: {}", value.trim()),
                n => println!("added {n} application(s)"),
            }
            Ok(())
        }),
        AppAction::AddCatalog { file, key } => update_session(&file, |editor| {
            let apps = catalog_apps(&key);
            if apps.is_empty() {
                return Err(format!("unknown catalog entry: {key}").into());
            }
            let added = editor.edit(|p| {
                apps.into_iter()
                    .map(|app| p.add_app(app))
                    .filter(|added| *added)
                    .count()
            });
            println!("added {added} application(s)");
            Ok(())
        }),
        AppAction::Remove { file, index } => update_session(&file, |editor| {
            let index = position(index)?;
            let removed = editor.edit(|p| p.remove_app(index))?;
            println!("removed: {}", removed.value);
            Ok(())
        }),
        AppAction::Move { file, from, to } => update_session(&file, |editor| {
            let (from, to) = (position(from)?, position(to)?);
            editor.edit(|p| p.apps.move_app(from, to))?;
            println!("moved");
            Ok(())
        }),
        AppAction::AutoLaunch {
            file,
            index,
            url,
            file_path,
            kiosk_type,
            idle_timeout,
            args,
        } => update_session(&file, |editor| {
            let index = index.map(position).transpose()?;
            editor.edit(|p| -> CmdResult {
                p.apps.set_auto_launch(index)?;
                let browser = &mut p.auto_launch.browser;
                if let Some(url) = url {
                    browser.source = LaunchSource::Url(url);
                }
                if let Some(path) = file_path {
                    browser.source = LaunchSource::File(path);
                }
                if let Some(kind) = kiosk_type {
                    browser.kiosk_type = kind;
                }
                if let Some(minutes) = idle_timeout {
                    browser.idle_timeout_minutes = minutes;
                }
                if let Some(args) = args {
                    p.auto_launch.arguments = args;
                }
                if index.is_none() {
                    p.auto_launch.browser = BrowserLaunch::default();
                    p.auto_launch.arguments.clear();
                }
                Ok(())
            })?;
            match editor.policy().apps.auto_launch_app() {
                Some(app) => println!("auto-launch: {}", app.value),
                None => println!("auto-launch cleared"),
            }
            Ok(())
        }),
        AppAction::List { file } => list(&file),
    }
}

fn list(file: &Path) -> CmdResult {
    let (_, editor) = load_session(file)?;
    let apps = &editor.policy().apps;
    if apps.is_empty() {
        println!("No allowed applications.");
        return Ok(());
    }
    for (i, app) in apps.iter().enumerate() {
        let mut flags = Vec::new();
        if apps.auto_launch() == Some(i) {
            flags.push("auto-launch");
        }
        if app.skip_auto_pin {
            flags.push("no auto-pin");
        }
        if app.skip_auto_launch {
            flags.push("no auto-launch");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        println!("{}. [{}] {}{flags}", i + 1, kind_label(app), app.value);
    }
    Ok(())
}

fn kind_label(app: &AllowedApp) -> &'static str {
    match app.kind {
        AppKind::PackagedApp => "packaged",
        AppKind::DesktopPath => "desktop",
    }
}
