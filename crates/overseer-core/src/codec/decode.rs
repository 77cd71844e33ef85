//! Assigned access document → policy.
//!
//! Only a document that cannot be parsed, or whose root is not an assigned
//! access configuration, is rejected. Everything else is best effort: missing
//! or unrecognized pieces are logged and left at their defaults.

use tracing::{debug, warn};

use super::launch::parse_kiosk_arguments;
use super::rules::{self, Rule};
use super::tree::{self, XmlElement};
use super::{start_pins, taskbar};
use crate::error::DecodeError;
use crate::policy::{
    is_edge_app, is_helper_executable, pin_name_for_app, Account, AllowedApp, AllowedApps,
    AppKind, BreakoutSequence, BrowserLaunch, FileExplorerAccess, GroupType, KioskMode,
    KioskPolicy, Pin, PinList, SingleApp, DEFAULT_DISPLAY_NAME, EDGE_APP_ID, EDGE_PROXY_PATH,
    PLACEHOLDER_PROFILE_ID,
};

fn child_of<'a>(parent: Option<&'a XmlElement>, rule: Rule) -> Option<&'a XmlElement> {
    parent.and_then(|p| p.child(rule))
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Parse an assigned access document into a policy.
pub fn decode(input: &str) -> Result<KioskPolicy, DecodeError> {
    let root = tree::parse(input)?;
    if !root.matches(rules::ROOT) {
        return Err(DecodeError::UnexpectedRoot {
            found: root.local.clone(),
        });
    }

    let profiles = root.child(rules::PROFILES);
    if profiles.is_some_and(|p| p.children_matching(rules::PROFILE).count() > 1) {
        debug!("document lists several profiles, reading the first");
    }
    let profile = child_of(profiles, rules::PROFILE);
    let (account, referenced_id) = read_account(root.child(rules::CONFIGS));

    let id = profile
        .and_then(|p| p.attr(rules::ID))
        .or(referenced_id.as_deref())
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| {
            debug!("no profile id found, using placeholder");
            PLACEHOLDER_PROFILE_ID
        })
        .to_string();

    let kiosk_app = child_of(profile, rules::KIOSK_MODE_APP);
    let app_list = child_of(profile, rules::ALL_APPS_LIST);
    let mode = match (kiosk_app, app_list) {
        (Some(_), _) => KioskMode::Single,
        (None, Some(_)) => match account {
            Some(Account::UserGroup { .. } | Account::GlobalProfile) => KioskMode::Restricted,
            _ => KioskMode::Multi,
        },
        (None, None) => {
            debug!("profile declares neither a kiosk app nor an app list, using an empty multi-app policy");
            KioskMode::Multi
        }
    };

    let mut policy = KioskPolicy::new();
    policy.set_mode(mode);
    policy.set_id(id);

    if let (Some(app), Some(profile)) = (kiosk_app, profile) {
        policy.single_app = read_single_app(app);
        policy.restrictions.breakout = read_breakout(profile);
    } else if let Some(profile) = profile {
        read_app_list_profile(&mut policy, profile, app_list);
    }

    match account {
        Some(account) => {
            if let Err(e) = policy.set_account(account) {
                warn!(error = %e, "account does not fit the profile, using the default for {mode}");
            }
        }
        None => debug!("no account binding found, using the default"),
    }

    Ok(policy)
}

/// The bound account, plus the profile id the binding refers to.
fn read_account(configs: Option<&XmlElement>) -> (Option<Account>, Option<String>) {
    let Some(configs) = configs else {
        return (None, None);
    };
    if let Some(global) = configs.child(rules::GLOBAL_PROFILE) {
        return (
            Some(Account::GlobalProfile),
            global.attr(rules::ID).map(str::to_string),
        );
    }
    let Some(config) = configs.child(rules::CONFIG) else {
        return (None, None);
    };
    let referenced_id = config
        .child(rules::DEFAULT_PROFILE)
        .and_then(|p| p.attr(rules::ID))
        .map(str::to_string);

    let account = if let Some(auto) = config.child(rules::AUTO_LOGON_ACCOUNT) {
        let display_name = auto.attr(rules::DISPLAY_NAME).unwrap_or_else(|| {
            debug!("auto-logon account without a display name");
            DEFAULT_DISPLAY_NAME
        });
        Some(Account::auto_logon(display_name))
    } else if let Some(account) = config.child(rules::ACCOUNT) {
        Some(Account::existing(account.text.trim()))
    } else if let Some(group) = config.child(rules::USER_GROUP) {
        let group_type = match group.attr(rules::TYPE) {
            Some(value) => GroupType::parse(value).unwrap_or_else(|| {
                warn!(value, "unknown group type, using LocalGroup");
                GroupType::LocalGroup
            }),
            None => GroupType::LocalGroup,
        };
        Some(Account::group(
            group_type,
            group.attr(rules::NAME).unwrap_or_default(),
        ))
    } else {
        None
    };
    (account, referenced_id)
}

fn read_single_app(app: &XmlElement) -> SingleApp {
    if let Some(app_id) = app.attr(rules::APP_USER_MODEL_ID) {
        return SingleApp::Packaged {
            app_id: app_id.to_string(),
        };
    }
    let Some(path) = app.attr(rules::CLASSIC_APP_PATH) else {
        warn!("kiosk app has neither an app id nor a path");
        return SingleApp::default();
    };
    let arguments = app.attr(rules::CLASSIC_APP_ARGUMENTS).unwrap_or_default();
    if is_edge_app(path) {
        let launch = parse_kiosk_arguments(arguments).unwrap_or_else(|| {
            debug!(arguments, "edge arguments do not follow the kiosk grammar");
            BrowserLaunch::default()
        });
        SingleApp::Browser(launch)
    } else {
        SingleApp::Desktop {
            path: path.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

fn read_breakout(profile: &XmlElement) -> Option<BreakoutSequence> {
    let key = profile.child(rules::BREAKOUT_SEQUENCE)?.attr(rules::KEY)?;
    let parsed = BreakoutSequence::parse(key);
    if parsed.is_none() {
        warn!(key, "unreadable break-out sequence, ignoring");
    }
    parsed
}

/// Apps in document order with dependency flags restored: the Edge helper
/// and packaged identity count as dependencies when Edge itself is listed.
fn read_apps(list: &XmlElement) -> Vec<(AllowedApp, &XmlElement)> {
    let mut apps = Vec::new();
    let Some(allowed) = list.child(rules::ALLOWED_APPS) else {
        return apps;
    };
    for element in allowed.children_matching(rules::APP) {
        let app = if let Some(id) = element.attr(rules::APP_USER_MODEL_ID) {
            AllowedApp::packaged(id)
        } else if let Some(path) = element.attr(rules::DESKTOP_APP_PATH) {
            AllowedApp::desktop(path)
        } else {
            debug!("app entry without an id or path, skipping");
            continue;
        };
        apps.push((app, element));
    }

    let has_edge = apps.iter().any(|(app, _)| {
        app.kind == AppKind::DesktopPath && is_edge_app(&app.value) && !is_helper_executable(&app.value)
    });
    if has_edge {
        for (app, _) in apps.iter_mut() {
            if app.value.eq_ignore_ascii_case(EDGE_PROXY_PATH) || app.value.eq_ignore_ascii_case(EDGE_APP_ID) {
                *app = app.clone().as_dependency();
            }
        }
    }
    apps
}

fn read_app_list_profile(policy: &mut KioskPolicy, profile: &XmlElement, list: Option<&XmlElement>) {
    let mut marker: Option<(String, Option<String>)> = None;
    for (app, element) in list.map(read_apps).unwrap_or_default() {
        let value = app.value.clone();
        if !policy.add_app(app) {
            debug!(value = %value, "duplicate app entry, skipping");
        }
        if element.attr(rules::AUTO_LAUNCH).is_some_and(is_true) {
            if marker.is_some() {
                warn!(value = %value, "several apps marked for auto-launch, keeping the first");
                continue;
            }
            let args = element.attr(rules::AUTO_LAUNCH_ARGUMENTS).map(str::to_string);
            marker = Some((value, args));
        }
    }
    if let Some((value, args)) = marker {
        apply_auto_launch(policy, &value, args.as_deref());
    }

    policy.restrictions.file_access = read_file_access(profile);

    if let Some(pins) = profile.child(rules::START_PINS) {
        policy.start_pins = with_recovered_targets(start_pins::decode(&pins.text), &policy.apps);
    }
    if let Some(value) = profile.child(rules::TASKBAR).and_then(|t| t.attr(rules::SHOW_TASKBAR)) {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" => policy.restrictions.show_taskbar = true,
            "false" | "0" => policy.restrictions.show_taskbar = false,
            _ => warn!(value, "unreadable ShowTaskbar value, keeping default"),
        }
    }
    if let Some(layout) = profile.child(rules::TASKBAR_LAYOUT) {
        policy.taskbar_pins = with_recovered_targets(taskbar::decode(&layout.text), &policy.apps);
    }
}

fn apply_auto_launch(policy: &mut KioskPolicy, value: &str, args: Option<&str>) {
    let Some((index, app)) = policy.apps.find(|a| a.value == value) else {
        return;
    };
    let browser = app.browser();
    let kind = app.kind;
    if let Err(e) = policy.apps.set_auto_launch(Some(index)) {
        warn!(error = %e, "ignoring auto-launch marker");
        return;
    }
    let Some(args) = args.filter(|a| !a.trim().is_empty()) else {
        return;
    };
    match browser {
        Some(_) => match parse_kiosk_arguments(args) {
            Some(launch) => policy.auto_launch.browser = launch,
            None => debug!(args, "browser auto-launch arguments do not follow the kiosk grammar"),
        },
        None if kind == AppKind::DesktopPath => policy.auto_launch.arguments = args.to_string(),
        None => debug!(args, "packaged apps take no auto-launch arguments"),
    }
}

fn read_file_access(profile: &XmlElement) -> FileExplorerAccess {
    let Some(block) = profile.child(rules::FILE_EXPLORER_RESTRICTIONS) else {
        return FileExplorerAccess::None;
    };
    let downloads = block.children_matching(rules::ALLOWED_NAMESPACE).any(|ns| {
        let name = ns.attr(rules::NAME).unwrap_or_default();
        if !name.eq_ignore_ascii_case("Downloads") {
            debug!(name, "unsupported namespace in file explorer restrictions");
        }
        name.eq_ignore_ascii_case("Downloads")
    });
    let removable = block.child(rules::ALLOW_REMOVABLE_DRIVES).is_some();
    let unrestricted = block.child(rules::NO_RESTRICTION).is_some();
    FileExplorerAccess::from_parts(downloads, removable, unrestricted)
}

/// Generated shortcuts carry no target in the document. Recover it from the
/// allowed app the pin name was derived from, when there is one.
fn with_recovered_targets(pins: PinList, apps: &AllowedApps) -> PinList {
    let mut out = PinList::new();
    for pin in pins.iter().cloned() {
        let pin = match pin {
            Pin::DesktopLink(mut link) if link.target.is_empty() && link.system_shortcut().is_none() => {
                if let Some((_, app)) = apps.find(|app| {
                    app.kind == AppKind::DesktopPath
                        && !app.skip_auto_pin
                        && pin_name_for_app(app).eq_ignore_ascii_case(&link.name)
                }) {
                    link.target = app.value.clone();
                }
                Pin::DesktopLink(link)
            }
            other => other,
        };
        out.push_renaming(pin);
    }
    out
}
