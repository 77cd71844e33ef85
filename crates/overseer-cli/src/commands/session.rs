//! Whole-session commands: create, inspect, validate, import and export.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use overseer_core::policy::{
    find_preset, BrowserLaunch, GroupType, KioskMode, LaunchSource, SingleApp,
};
use overseer_core::{
    export_file_name, prepare_export, shortcut_manifest, Account, AccountKind, Config,
    ExportError, KioskPolicy, PolicyEditor, PolicyError, ValidationError,
};

use super::{load_session, save_session, update_session, CmdResult};

#[derive(Args)]
pub struct NewArgs {
    /// Session file to create
    pub file: PathBuf,
    /// Preset id (see `overseer preset list`)
    #[arg(long)]
    pub preset: Option<String>,
    /// Configuration name, used for export file names
    #[arg(long)]
    pub name: Option<String>,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Session file
    pub file: PathBuf,
    /// Output directory (defaults to export.output_dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Export even if validation fails
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Assigned access XML document
    pub xml: PathBuf,
    /// Session file to create
    #[arg(short, long)]
    pub output: PathBuf,
    /// Configuration name (defaults to the XML file stem)
    #[arg(long)]
    pub name: Option<String>,
    /// Overwrite an existing session file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ModeArgs {
    /// Session file
    pub file: PathBuf,
    /// single, multi or restricted
    pub mode: KioskMode,
}

#[derive(Args)]
pub struct AccountArgs {
    /// Session file
    pub file: PathBuf,
    /// auto-logon, existing, group or global
    pub kind: AccountKind,
    /// Display name, account name or group name, depending on the kind
    pub value: Option<String>,
    /// LocalGroup, ActiveDirectoryGroup or AzureActiveDirectoryGroup
    #[arg(long, value_parser = parse_group_type)]
    pub group_type: Option<GroupType>,
}

fn parse_group_type(value: &str) -> Result<GroupType, String> {
    GroupType::parse(value).ok_or_else(|| format!("unknown group type: {value}"))
}

fn refuse_overwrite(path: &Path, force: bool) -> CmdResult {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A single-app browser draft seeded from the configured defaults.
fn default_draft(config: &Config) -> Result<KioskPolicy, PolicyError> {
    let mut policy = KioskPolicy::with_mode(KioskMode::Single);
    policy.single_app = SingleApp::Browser(BrowserLaunch::url(
        config.defaults.browser_url.clone(),
        config.defaults.kiosk_type,
    ));
    policy.set_account(Account::auto_logon(config.defaults.display_name.clone()))?;
    Ok(policy)
}

pub fn new(args: NewArgs) -> CmdResult {
    refuse_overwrite(&args.file, args.force)?;

    let mut editor = match args.preset.as_deref() {
        Some(id) => {
            let preset = find_preset(id).ok_or_else(|| format!("unknown preset: {id}"))?;
            let mut editor = PolicyEditor::new();
            editor.load_preset(preset)?;
            editor
        }
        None => PolicyEditor::from_policy(default_draft(&Config::load_or_default())?),
    };
    if let Some(name) = &args.name {
        editor.edit(|p| p.set_config_name(name.clone()));
    }

    let name = match editor.policy().config_name() {
        "" => file_stem(&args.file),
        name => name.to_string(),
    };
    save_session(&args.file, &name, &mut editor)?;
    println!("Session created: {}", args.file.display());
    println!("Profile: {}", editor.policy().id());
    Ok(())
}

fn describe_account(account: &Account) -> String {
    match account {
        Account::AutoLogon { display_name } => format!("auto-logon \"{display_name}\""),
        Account::ExistingUser { account_name } => format!("existing user {account_name}"),
        Account::UserGroup {
            group_type,
            group_name,
        } => format!("{group_type} {group_name}"),
        Account::GlobalProfile => "every non-administrator account".to_string(),
    }
}

fn describe_single_app(app: &SingleApp) -> String {
    match app {
        SingleApp::Browser(launch) => {
            let source = match &launch.source {
                LaunchSource::Url(url) => url.clone(),
                LaunchSource::File(path) => format!("file {path}"),
            };
            let mut text = format!("Edge ({}) {source}", launch.kiosk_type);
            if launch.idle_timeout_minutes > 0 {
                text.push_str(&format!(", idle reset after {} min", launch.idle_timeout_minutes));
            }
            text
        }
        SingleApp::Packaged { app_id } => format!("packaged app {app_id}"),
        SingleApp::Desktop { path, arguments } if arguments.is_empty() => path.clone(),
        SingleApp::Desktop { path, arguments } => format!("{path} {arguments}"),
    }
}

pub fn show(file: &Path) -> CmdResult {
    let (name, editor) = load_session(file)?;
    let policy = editor.policy();

    println!("Session: {name}");
    println!("Configuration: {}", policy.config_name());
    println!("Profile: {}", policy.id());
    println!("Mode: {}", policy.mode());
    println!("Account: {}", describe_account(policy.account()));

    if policy.mode().uses_app_list() {
        println!("Allowed apps: {}", policy.apps.len());
        for (i, app) in policy.apps.iter().enumerate() {
            let marker = if policy.apps.auto_launch() == Some(i) {
                " [auto-launch]"
            } else if app.skip_auto_launch {
                " [dependency]"
            } else {
                ""
            };
            println!("  {}. {}{marker}", i + 1, app.value);
        }
        println!("Start pins: {}", policy.start_pins.len());
        println!("Taskbar pins: {}", policy.taskbar_pins.len());
        println!("Show taskbar: {}", policy.restrictions.show_taskbar);
        for name in policy.edge_shortcut_warnings() {
            println!("warning: '{name}' launches Edge with a custom name or icon; the shell may show it as Microsoft Edge");
        }
    } else {
        println!("App: {}", describe_single_app(&policy.single_app));
        if let Some(breakout) = &policy.restrictions.breakout {
            println!("Break-out: {breakout}");
        }
    }

    let errors = editor.validate();
    if errors.is_empty() {
        println!("Validation: ok");
    } else {
        println!("Validation: {} error(s)", errors.len());
    }
    Ok(())
}

fn print_errors(errors: &[ValidationError]) {
    for error in errors {
        eprintln!("  [{}] {}", error.category.as_str(), error.message);
    }
}

pub fn validate(file: &Path) -> CmdResult {
    let (_, editor) = load_session(file)?;
    let errors = editor.validate();
    if errors.is_empty() {
        println!("ok");
        return Ok(());
    }
    print_errors(&errors);
    Err(format!("{} validation error(s)", errors.len()).into())
}

pub fn preview(file: &Path) -> CmdResult {
    let (_, editor) = load_session(file)?;
    println!("{}", editor.preview());
    Ok(())
}

pub fn export(args: ExportArgs) -> CmdResult {
    let (_, editor) = load_session(&args.file)?;
    let config = Config::load_or_default();
    let allow_invalid = args.force || config.export.allow_invalid;

    let artifact = match prepare_export(editor.policy(), allow_invalid) {
        Ok(artifact) => artifact,
        Err(ExportError::Invalid(errors)) => {
            print_errors(&errors);
            return Err(
                format!("{} validation error(s); use --force to export anyway", errors.len()).into(),
            );
        }
    };

    let dir = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.export.output_dir));
    fs::create_dir_all(&dir)?;

    let xml_path = dir.join(&artifact.file_name);
    fs::write(&xml_path, &artifact.xml)?;
    println!("Policy written to: {}", xml_path.display());

    if !artifact.shortcuts.is_empty() {
        let name = export_file_name(editor.policy().config_name(), "shortcuts.json");
        let shortcuts_path = dir.join(name);
        fs::write(&shortcuts_path, serde_json::to_string_pretty(&artifact.shortcuts)?)?;
        println!("Shortcuts written to: {}", shortcuts_path.display());
    }
    Ok(())
}

pub fn import(args: ImportArgs) -> CmdResult {
    refuse_overwrite(&args.output, args.force)?;
    let xml = fs::read_to_string(&args.xml)
        .map_err(|e| format!("cannot read {}: {e}", args.xml.display()))?;

    let mut editor = PolicyEditor::new();
    editor.import_xml(&xml)?;
    let name = args.name.unwrap_or_else(|| file_stem(&args.xml));
    editor.edit(|p| p.set_config_name(name.clone()));

    save_session(&args.output, &name, &mut editor)?;
    let policy = editor.policy();
    println!("Imported {} profile {}", policy.mode(), policy.id());
    Ok(())
}

pub fn shortcuts(file: &Path) -> CmdResult {
    let (_, editor) = load_session(file)?;
    let manifest = shortcut_manifest(editor.policy());
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

pub fn mode(args: ModeArgs) -> CmdResult {
    update_session(&args.file, |editor| {
        editor.set_mode(args.mode)?;
        println!("Mode: {}", args.mode);
        println!("Account: {}", describe_account(editor.policy().account()));
        Ok(())
    })
}

pub fn account(args: AccountArgs) -> CmdResult {
    update_session(&args.file, |editor| {
        editor.set_account_kind(args.kind)?;
        let current = editor.policy().account().clone();
        let updated = match (current, args.value, args.group_type) {
            (Account::AutoLogon { .. }, Some(value), _) => Some(Account::auto_logon(value)),
            (Account::ExistingUser { .. }, Some(value), _) => Some(Account::existing(value)),
            (Account::UserGroup { group_type, group_name }, value, new_type) => Some(Account::group(
                new_type.unwrap_or(group_type),
                value.unwrap_or(group_name),
            )),
            _ => None,
        };
        if let Some(account) = updated {
            editor.set_account(account)?;
        }
        println!("Account: {}", describe_account(editor.policy().account()));
        Ok(())
    })
}
