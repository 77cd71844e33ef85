//! Policy validation.
//!
//! [`validate`] never fails: it returns every violation it finds, grouped by
//! category in a stable order. Encoding does not depend on it; only export
//! call sites gate on an empty result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::{
    is_canonical_guid, is_placeholder_id, Account, KioskPolicy, LaunchSource, Pin, SingleApp,
};

/// Rule groups, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Identity,
    Account,
    SingleApp,
    AppList,
}

impl RuleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleCategory::Identity => "identity",
            RuleCategory::Account => "account",
            RuleCategory::SingleApp => "single-app",
            RuleCategory::AppList => "app-list",
        }
    }
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub category: RuleCategory,
    /// Model field the violation is about.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(category: RuleCategory, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Roots a referenced system shortcut may live under (lowercase).
const SHORTCUT_ROOTS: [&str; 5] = [
    "%appdata%",
    "%allusersprofile%",
    "%programdata%",
    r"c:\users\",
    r"c:\programdata\",
];
const START_MENU_FRAGMENT: &str = r"\microsoft\windows\start menu\programs\";

/// Whether `path` points into a Start menu Programs folder under a permitted root.
pub fn is_start_menu_shortcut_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let normalized = path.replace('/', "\\").to_lowercase();
    normalized.contains(START_MENU_FRAGMENT)
        && SHORTCUT_ROOTS.iter().any(|root| normalized.starts_with(root))
}

/// Check a policy. All rules run; none short-circuits another.
pub fn validate(policy: &KioskPolicy) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    identity_rules(policy, &mut errors);
    account_rules(policy, &mut errors);
    if policy.mode().uses_app_list() {
        app_list_rules(policy, &mut errors);
    } else {
        single_app_rules(policy, &mut errors);
    }
    errors
}

fn identity_rules(policy: &KioskPolicy, errors: &mut Vec<ValidationError>) {
    let category = RuleCategory::Identity;
    if policy.config_name().trim().is_empty() {
        errors.push(ValidationError::new(
            category,
            "configName",
            "Configuration Name is required",
        ));
    }
    let id = policy.id();
    if id.trim().is_empty() {
        errors.push(ValidationError::new(category, "id", "Profile GUID is required"));
    } else if !is_canonical_guid(id) || is_placeholder_id(id) {
        errors.push(ValidationError::new(
            category,
            "id",
            "Profile GUID format is invalid",
        ));
    }
}

fn account_rules(policy: &KioskPolicy, errors: &mut Vec<ValidationError>) {
    let category = RuleCategory::Account;
    match policy.account() {
        Account::AutoLogon { display_name } if display_name.trim().is_empty() => {
            errors.push(ValidationError::new(
                category,
                "displayName",
                "Display Name is required for auto-logon account",
            ));
        }
        Account::ExistingUser { account_name } if account_name.trim().is_empty() => {
            errors.push(ValidationError::new(
                category,
                "accountName",
                "Account Name is required",
            ));
        }
        Account::UserGroup { group_name, .. } if group_name.trim().is_empty() => {
            errors.push(ValidationError::new(
                category,
                "groupName",
                "Group Name is required",
            ));
        }
        _ => {}
    }
}

fn single_app_rules(policy: &KioskPolicy, errors: &mut Vec<ValidationError>) {
    let category = RuleCategory::SingleApp;
    match &policy.single_app {
        SingleApp::Browser(launch) => match &launch.source {
            LaunchSource::Url(url) if url.trim().is_empty() => {
                errors.push(ValidationError::new(category, "url", "Edge URL is required"));
            }
            LaunchSource::File(path) if path.trim().is_empty() => {
                errors.push(ValidationError::new(
                    category,
                    "filePath",
                    "Edge file path is required",
                ));
            }
            _ => {}
        },
        SingleApp::Packaged { app_id } if app_id.trim().is_empty() => {
            errors.push(ValidationError::new(
                category,
                "appId",
                "Packaged app ID is required",
            ));
        }
        SingleApp::Desktop { path, .. } if path.trim().is_empty() => {
            errors.push(ValidationError::new(
                category,
                "path",
                "Application path is required",
            ));
        }
        _ => {}
    }
    if let Some(breakout) = &policy.restrictions.breakout {
        if breakout.key.trim().is_empty() {
            errors.push(ValidationError::new(
                category,
                "breakout",
                "Break-out sequence needs a key",
            ));
        }
    }
}

fn app_list_rules(policy: &KioskPolicy, errors: &mut Vec<ValidationError>) {
    let category = RuleCategory::AppList;
    if policy.apps.is_empty() {
        errors.push(ValidationError::new(
            category,
            "allowedApps",
            "At least one allowed app is required",
        ));
    }

    let links = || {
        policy
            .start_pins
            .iter()
            .chain(policy.taskbar_pins.iter())
            .filter_map(|pin| match pin {
                Pin::DesktopLink(link) => Some(link),
                _ => None,
            })
    };

    let missing: Vec<&str> = links()
        .filter(|link| !link.has_target())
        .map(|link| link.name.as_str())
        .collect();
    if !missing.is_empty() {
        errors.push(ValidationError::new(
            category,
            "pins",
            format!(
                "{} shortcut(s) missing target path: {}",
                missing.len(),
                missing.join(", ")
            ),
        ));
    }

    let outside: Vec<&str> = links()
        .filter(|link| {
            link.system_shortcut()
                .is_some_and(|path| !is_start_menu_shortcut_path(path))
        })
        .map(|link| link.name.as_str())
        .collect();
    if !outside.is_empty() {
        errors.push(ValidationError::new(
            category,
            "pins",
            format!(
                "Start menu pin shortcuts must live under the Start Menu Programs folder (%APPDATA% or %ALLUSERSPROFILE%): {}",
                outside.join(", ")
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        AllowedApp, BreakoutSequence, BrowserLaunch, DesktopLink, EdgeKioskType, GroupType,
        KioskMode, Preset,
    };

    fn messages(policy: &KioskPolicy) -> Vec<String> {
        validate(policy).into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn blank_draft_reports_identity_and_app_errors() {
        let policy = KioskPolicy::new();
        let errors = messages(&policy);
        assert!(errors.len() >= 2, "{errors:?}");
        assert_eq!(errors[0], "Configuration Name is required");
        assert_eq!(errors[1], "Profile GUID format is invalid");
        assert!(errors.contains(&"Edge URL is required".to_string()));
    }

    #[test]
    fn filled_draft_is_valid() {
        let mut policy = KioskPolicy::new();
        policy.set_config_name("Lobby");
        policy.regenerate_id();
        policy.single_app = SingleApp::Browser(BrowserLaunch::url(
            "https://example.com",
            EdgeKioskType::Fullscreen,
        ));
        assert_eq!(validate(&policy), Vec::new());
    }

    #[test]
    fn empty_id_is_required_not_malformed() {
        let mut policy = KioskPolicy::new();
        policy.set_id("");
        let errors = validate(&policy);
        assert!(errors
            .iter()
            .any(|e| e.message == "Profile GUID is required"));
        assert!(!errors
            .iter()
            .any(|e| e.message == "Profile GUID format is invalid"));
    }

    #[test]
    fn errors_are_ordered_by_category() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Restricted);
        policy.set_id("not-a-guid");
        policy
            .set_account(Account::group(GroupType::LocalGroup, ""))
            .unwrap();
        let errors = validate(&policy);
        let categories: Vec<RuleCategory> = errors.iter().map(|e| e.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert!(errors.iter().any(|e| e.message == "Group Name is required"));
        assert!(errors
            .iter()
            .any(|e| e.message == "At least one allowed app is required"));
    }

    #[test]
    fn global_profile_needs_nothing_extra() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Restricted);
        policy.set_config_name("Shared");
        policy.set_account(Account::GlobalProfile).unwrap();
        policy.add_app(AllowedApp::desktop(r"C:\Windows\System32\osk.exe"));
        assert!(validate(&policy).is_empty());
    }

    #[test]
    fn shortcut_rules_list_offending_pins() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy.set_config_name("Lab");
        policy.add_app(AllowedApp::desktop(r"C:\Tools\tool.exe"));
        policy
            .add_start_pin(Pin::DesktopLink(DesktopLink::new("Empty", "")))
            .unwrap();
        let mut stray = DesktopLink::new("Stray", "");
        stray.system_shortcut_path = Some(r"D:\Links\Stray.lnk".to_string());
        policy.add_taskbar_pin(Pin::DesktopLink(stray)).unwrap();

        let errors = messages(&policy);
        assert_eq!(
            errors,
            vec![
                "1 shortcut(s) missing target path: Empty".to_string(),
                "Start menu pin shortcuts must live under the Start Menu Programs folder (%APPDATA% or %ALLUSERSPROFILE%): Stray".to_string(),
            ]
        );
    }

    #[test]
    fn start_menu_paths_are_matched_case_insensitively() {
        assert!(is_start_menu_shortcut_path(
            r"%AppData%\Microsoft\Windows\Start Menu\Programs\Tool.lnk"
        ));
        assert!(is_start_menu_shortcut_path(
            "C:/ProgramData/Microsoft/Windows/Start Menu/Programs/Tool.lnk"
        ));
        assert!(!is_start_menu_shortcut_path(r"%TEMP%\Microsoft\Windows\Start Menu\Programs\x.lnk"));
        assert!(!is_start_menu_shortcut_path(r"%APPDATA%\Tool.lnk"));
        assert!(!is_start_menu_shortcut_path(""));
    }

    #[test]
    fn breakout_without_key_is_reported() {
        let mut policy = Preset::EdgeFullscreen.build().unwrap();
        policy.restrictions.breakout = Some(BreakoutSequence::new(true, true, false, ""));
        assert_eq!(
            messages(&policy),
            vec!["Break-out sequence needs a key".to_string()]
        );
    }
}
