//! Built-in starting points and a small application catalog.
//!
//! Presets are assembled through the same public operations as manual input,
//! so they can never produce a policy the model would reject.

use super::account::Account;
use super::apps::AllowedApp;
use super::browser::{EDGE_APP_ID, EDGE_PATH, EDGE_PROXY_PATH};
use super::profile::KioskMode;
use super::restrictions::FileExplorerAccess;
use super::single::{BrowserLaunch, EdgeKioskType, SingleApp};
use super::KioskPolicy;
use crate::error::PolicyError;

/// Listing entry for a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub notes: &'static str,
}

/// A named starting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Blank,
    EdgeFullscreen,
    EdgePublic,
    MultiApp,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Blank,
        Preset::EdgeFullscreen,
        Preset::EdgePublic,
        Preset::MultiApp,
    ];

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn info(self) -> PresetInfo {
        match self {
            Preset::Blank => PresetInfo {
                id: "blank",
                name: "Blank",
                description: "Empty single-app draft",
                notes: indoc::indoc! {"
                    Starts from nothing: an auto-logon account and an Edge
                    kiosk with no start page yet.
                "},
            },
            Preset::EdgeFullscreen => PresetInfo {
                id: "edge-fullscreen",
                name: "Edge Fullscreen",
                description: "Digital signage in full-screen Edge",
                notes: indoc::indoc! {"
                    Single-app kiosk running Edge full screen with no
                    browser frame. Suited to signage and interactive
                    displays that show one site.
                "},
            },
            Preset::EdgePublic => PresetInfo {
                id: "edge-public",
                name: "Edge Public Browsing",
                description: "Public browsing in the restricted Edge frame",
                notes: indoc::indoc! {"
                    Single-app kiosk running Edge with the restricted
                    public-browsing frame, starting on a search page.
                "},
            },
            Preset::MultiApp => PresetInfo {
                id: "multi-app",
                name: "Multi-App",
                description: "Edge plus accessibility tools",
                notes: indoc::indoc! {"
                    Multi-app kiosk allowing Edge, the on-screen keyboard and
                    the calculator, with the taskbar shown and File Explorer
                    limited to Downloads. Pins and auto-launch are left to
                    you.
                "},
            },
        }
    }

    /// Build the preset's policy with a fresh profile id. The configuration
    /// name is left for the user to fill in.
    ///
    /// # Errors
    /// Returns an error if the preset's account is not legal for its mode.
    pub fn build(self) -> Result<KioskPolicy, PolicyError> {
        let policy = match self {
            Preset::Blank => {
                let mut policy = KioskPolicy::with_mode(KioskMode::Single);
                policy.set_account(Account::auto_logon(""))?;
                policy
            }
            Preset::EdgeFullscreen => single_browser(
                "Kiosk",
                BrowserLaunch::url("https://www.microsoft.com", EdgeKioskType::Fullscreen),
            )?,
            Preset::EdgePublic => single_browser(
                "Public Browsing",
                BrowserLaunch::url("https://www.bing.com", EdgeKioskType::PublicBrowsing),
            )?,
            Preset::MultiApp => multi_app()?,
        };
        Ok(policy)
    }
}

fn single_browser(display_name: &str, launch: BrowserLaunch) -> Result<KioskPolicy, PolicyError> {
    let mut policy = KioskPolicy::with_mode(KioskMode::Single);
    policy.set_account(Account::auto_logon(display_name))?;
    policy.single_app = SingleApp::Browser(launch);
    Ok(policy)
}

fn multi_app() -> Result<KioskPolicy, PolicyError> {
    let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
    policy.set_account(Account::auto_logon("Multi-App Kiosk"))?;
    for app in catalog_apps("edge")
        .into_iter()
        .chain(catalog_apps("osk"))
        .chain(catalog_apps("calculator"))
    {
        policy.add_app(app);
    }
    policy.restrictions.show_taskbar = true;
    policy.restrictions.file_access = FileExplorerAccess::DownloadsOnly;
    Ok(policy)
}

const OSK_PATH: &str = r"C:\Windows\System32\osk.exe";
const CALCULATOR_APP_ID: &str = "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App";

/// All built-in presets.
pub fn builtin_presets() -> Vec<PresetInfo> {
    Preset::ALL.iter().map(|p| p.info()).collect()
}

/// Find a built-in preset by id.
pub fn find_preset(id: &str) -> Option<Preset> {
    Preset::ALL.into_iter().find(|p| p.id() == id)
}

/// Applications for a catalog key (`edge`, `osk`, `calculator`), dependencies
/// included and flagged. Unknown keys yield nothing.
pub fn catalog_apps(key: &str) -> Vec<AllowedApp> {
    match key {
        "edge" => vec![
            AllowedApp::desktop(EDGE_PATH),
            AllowedApp::desktop(EDGE_PROXY_PATH).as_dependency(),
            AllowedApp::packaged(EDGE_APP_ID).as_dependency(),
        ],
        "osk" => vec![AllowedApp::desktop(OSK_PATH)],
        "calculator" => vec![AllowedApp::packaged(CALCULATOR_APP_ID)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::is_canonical_guid;

    #[test]
    fn preset_ids_are_unique_and_findable() {
        let presets = builtin_presets();
        assert_eq!(presets.len(), 4);
        for info in &presets {
            assert_eq!(find_preset(info.id).map(Preset::id), Some(info.id));
        }
        assert!(find_preset("nope").is_none());
    }

    #[test]
    fn presets_get_fresh_ids() {
        let a = Preset::EdgeFullscreen.build().unwrap();
        let b = Preset::EdgeFullscreen.build().unwrap();
        assert!(is_canonical_guid(a.id()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn presets_leave_the_config_name_empty() {
        for preset in Preset::ALL {
            assert_eq!(preset.build().unwrap().config_name(), "");
        }
    }

    #[test]
    fn blank_preset_has_no_display_name_or_url() {
        let policy = Preset::Blank.build().unwrap();
        assert_eq!(policy.account(), &Account::auto_logon(""));
        match policy.single_app {
            SingleApp::Browser(launch) => assert!(launch.source.is_empty()),
            other => panic!("unexpected app {other:?}"),
        }
    }

    #[test]
    fn multi_app_preset_allows_apps_only() {
        let policy = Preset::MultiApp.build().unwrap();
        assert_eq!(policy.mode(), KioskMode::Multi);
        assert_eq!(policy.account(), &Account::auto_logon("Multi-App Kiosk"));
        assert_eq!(policy.apps.len(), 5);
        assert_eq!(policy.apps.auto_launch(), None);
        assert!(policy.start_pins.is_empty());
        assert!(policy.taskbar_pins.is_empty());
        assert!(policy.restrictions.show_taskbar);
        assert_eq!(policy.restrictions.file_access, FileExplorerAccess::DownloadsOnly);
    }

    #[test]
    fn public_preset_has_no_idle_timeout() {
        let policy = Preset::EdgePublic.build().unwrap();
        assert_eq!(policy.account(), &Account::auto_logon("Public Browsing"));
        match policy.single_app {
            SingleApp::Browser(launch) => {
                assert_eq!(launch.kiosk_type, EdgeKioskType::PublicBrowsing);
                assert_eq!(launch.idle_timeout_minutes, 0);
            }
            other => panic!("unexpected app {other:?}"),
        }
    }

    #[test]
    fn unknown_catalog_key_is_empty() {
        assert!(catalog_apps("solitaire").is_empty());
        assert!(catalog_apps("edge")[1].skip_auto_launch);
    }
}
