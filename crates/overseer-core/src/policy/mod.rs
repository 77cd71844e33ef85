//! Kiosk policy model.
//!
//! This module provides:
//! - The typed policy graph (profile, account, allowed apps, pins, restrictions)
//! - Collection operations that keep the graph's invariants on every mutation
//! - Built-in presets and an application catalog fed through the same operations

mod account;
mod apps;
mod browser;
mod pins;
mod presets;
mod profile;
mod restrictions;
mod single;

pub use account::{Account, GroupType, DEFAULT_DISPLAY_NAME};
pub use apps::{AllowedApp, AllowedApps, AppKind, AutoLaunchSettings};
pub use browser::{
    is_edge_app, is_helper_executable, BrowserKind, KioskSupport, EDGE_APP_ID, EDGE_PATH,
    EDGE_PROXY_PATH,
};
pub use pins::{
    generated_link_path, DesktopLink, PackagedAppPin, Pin, PinList, SecondaryTile,
    START_MENU_PROGRAMS,
};
pub use presets::{builtin_presets, catalog_apps, find_preset, Preset, PresetInfo};
pub use profile::{is_canonical_guid, is_placeholder_id, KioskMode, Profile, PLACEHOLDER_PROFILE_ID};
pub use restrictions::{BreakoutSequence, FileExplorerAccess, Restrictions};
pub use single::{BrowserLaunch, EdgeKioskType, LaunchSource, SingleApp, SingleAppKind};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PolicyError;

/// A complete kiosk policy.
///
/// Mode and account are private so the pair can only change together through
/// [`KioskPolicy::set_mode`] and [`KioskPolicy::set_account`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PolicyRepr", into = "PolicyRepr")]
pub struct KioskPolicy {
    profile: Profile,
    account: Account,
    /// Single mode only.
    pub single_app: SingleApp,
    /// Multi and restricted modes only.
    pub apps: AllowedApps,
    pub auto_launch: AutoLaunchSettings,
    pub start_pins: PinList,
    pub taskbar_pins: PinList,
    pub restrictions: Restrictions,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyRepr {
    #[serde(default)]
    profile: Profile,
    #[serde(default)]
    account: Account,
    #[serde(default)]
    single_app: SingleApp,
    #[serde(default)]
    allowed_apps: AllowedApps,
    #[serde(default)]
    auto_launch: AutoLaunchSettings,
    #[serde(default)]
    start_pins: PinList,
    #[serde(default)]
    taskbar_pins: PinList,
    #[serde(default)]
    restrictions: Restrictions,
}

impl From<PolicyRepr> for KioskPolicy {
    fn from(repr: PolicyRepr) -> Self {
        let mut account = repr.account;
        if let Some(coerced) = account.coerced_for(repr.profile.mode) {
            debug!(
                mode = %repr.profile.mode,
                from = account.label(),
                to = coerced.label(),
                "coerced stored account to match mode"
            );
            account = coerced;
        }
        let mut taskbar_pins = repr.taskbar_pins;
        let dropped = taskbar_pins.retain(|pin| !matches!(pin, Pin::SecondaryTile(_)));
        if dropped > 0 {
            warn!(dropped, "removed browser site tiles from stored taskbar pins");
        }
        Self {
            profile: repr.profile,
            account,
            single_app: repr.single_app,
            apps: repr.allowed_apps,
            auto_launch: repr.auto_launch,
            start_pins: repr.start_pins,
            taskbar_pins,
            restrictions: repr.restrictions,
        }
    }
}

impl From<KioskPolicy> for PolicyRepr {
    fn from(policy: KioskPolicy) -> Self {
        Self {
            profile: policy.profile,
            account: policy.account,
            single_app: policy.single_app,
            allowed_apps: policy.apps,
            auto_launch: policy.auto_launch,
            start_pins: policy.start_pins,
            taskbar_pins: policy.taskbar_pins,
            restrictions: policy.restrictions,
        }
    }
}

impl KioskPolicy {
    /// A blank single-app draft with a placeholder id.
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank draft in `mode` with a freshly generated id.
    pub fn with_mode(mode: KioskMode) -> Self {
        let mut policy = Self::new();
        policy.set_mode(mode);
        policy.profile.regenerate_id();
        policy
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn mode(&self) -> KioskMode {
        self.profile.mode
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.profile.id = id.into();
    }

    pub fn regenerate_id(&mut self) {
        self.profile.regenerate_id();
    }

    pub fn config_name(&self) -> &str {
        &self.profile.config_name
    }

    pub fn set_config_name(&mut self, name: impl Into<String>) {
        self.profile.config_name = name.into();
    }

    /// Switch mode, coercing the account when it is not legal in the new mode.
    /// Returns the account that was replaced, if any.
    pub fn set_mode(&mut self, mode: KioskMode) -> Option<Account> {
        self.profile.mode = mode;
        let coerced = self.account.coerced_for(mode)?;
        Some(std::mem::replace(&mut self.account, coerced))
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Bind an account. Group and global accounts require restricted mode;
    /// auto-logon and existing accounts require any other mode.
    pub fn set_account(&mut self, account: Account) -> Result<(), PolicyError> {
        if !account.allowed_in(self.mode()) {
            return Err(PolicyError::AccountNotAllowed {
                account: account.label(),
                mode: self.mode().as_str(),
            });
        }
        self.account = account;
        Ok(())
    }

    /// Append an allowed application; `false` if it was already listed.
    pub fn add_app(&mut self, app: AllowedApp) -> bool {
        self.apps.add(app)
    }

    /// Append an application and, for Edge, the helper executable and packaged
    /// identity it needs at runtime. Returns how many entries were added.
    pub fn add_app_with_dependencies(&mut self, app: AllowedApp) -> usize {
        let is_edge = is_edge_app(&app.value);
        if !self.apps.add(app) {
            return 0;
        }
        let mut added = 1;
        if is_edge {
            for dependency in [
                AllowedApp::desktop(EDGE_PATH),
                AllowedApp::desktop(EDGE_PROXY_PATH).as_dependency(),
                AllowedApp::packaged(EDGE_APP_ID).as_dependency(),
            ] {
                if self.apps.add(dependency) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn remove_app(&mut self, index: usize) -> Result<AllowedApp, PolicyError> {
        self.apps.remove(index)
    }

    pub fn add_start_pin(&mut self, pin: Pin) -> Result<(), PolicyError> {
        self.start_pins.add(pin)
    }

    /// Append a taskbar pin. Site tiles are Start-only.
    pub fn add_taskbar_pin(&mut self, pin: Pin) -> Result<(), PolicyError> {
        if matches!(pin, Pin::SecondaryTile(_)) {
            return Err(PolicyError::TileOnTaskbar);
        }
        self.taskbar_pins.add(pin)
    }

    /// Pin the allowed application at `index` to Start.
    pub fn pin_app_to_start(&mut self, index: usize) -> Result<(), PolicyError> {
        let pin = pin_for_app(&self.apps, &self.start_pins, index)?;
        self.start_pins.add(pin)
    }

    /// Pin the allowed application at `index` to the taskbar.
    pub fn pin_app_to_taskbar(&mut self, index: usize) -> Result<(), PolicyError> {
        let pin = pin_for_app(&self.apps, &self.taskbar_pins, index)?;
        self.taskbar_pins.add(pin)
    }

    /// Names of Edge-backed shortcut pins carrying a custom name or icon; the
    /// shell may show these as the stock browser entry instead.
    pub fn edge_shortcut_warnings(&self) -> Vec<String> {
        self.start_pins
            .iter()
            .chain(self.taskbar_pins.iter())
            .filter_map(|pin| match pin {
                Pin::DesktopLink(link) if link.is_edge_backed() => {
                    let name = link.name.trim();
                    let custom_name = !name.is_empty() && !name.eq_ignore_ascii_case("Microsoft Edge");
                    let custom_icon = !link.icon_path.trim().is_empty();
                    (custom_name || custom_icon).then(|| {
                        if name.is_empty() {
                            "(unnamed)".to_string()
                        } else {
                            name.to_string()
                        }
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Drop everything and start over from a blank draft.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Display name derived from an allowed application.
pub fn pin_name_for_app(app: &AllowedApp) -> String {
    if is_edge_app(&app.value) {
        return "Microsoft Edge".to_string();
    }
    match app.kind {
        AppKind::PackagedApp => app.value.clone(),
        AppKind::DesktopPath => app
            .value
            .rsplit(['\\', '/'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&app.value)
            .to_string(),
    }
}

fn pin_for_app(apps: &AllowedApps, pins: &PinList, index: usize) -> Result<Pin, PolicyError> {
    let app = apps.get(index).ok_or(PolicyError::OutOfBounds {
        collection: "allowed applications",
        index,
        len: apps.len(),
    })?;
    let already = pins
        .find(|pin| match (pin, app.kind) {
            (Pin::PackagedApp(p), AppKind::PackagedApp) => p.packaged_app_id == app.value,
            (Pin::DesktopLink(l), AppKind::DesktopPath) => l.target == app.value,
            _ => false,
        })
        .is_some();
    if already {
        return Err(PolicyError::AlreadyPinned {
            value: app.value.clone(),
        });
    }
    let name = pins.unique_name(&pin_name_for_app(app));
    Ok(match app.kind {
        AppKind::PackagedApp => Pin::packaged(name, app.value.clone()),
        AppKind::DesktopPath => Pin::DesktopLink(DesktopLink::new(name, app.value.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_policy_is_single_mode_draft() {
        let policy = KioskPolicy::new();
        assert_eq!(policy.mode(), KioskMode::Single);
        assert_eq!(policy.id(), PLACEHOLDER_PROFILE_ID);
        assert_eq!(policy.account(), &Account::auto_logon("Kiosk"));
        assert!(matches!(policy.single_app, SingleApp::Browser(_)));
    }

    #[test]
    fn switching_to_restricted_coerces_account() {
        let mut policy = KioskPolicy::new();
        policy.set_account(Account::existing("kioskuser")).unwrap();
        let replaced = policy.set_mode(KioskMode::Restricted);
        assert_eq!(replaced, Some(Account::existing("kioskuser")));
        assert_eq!(policy.account(), &Account::group(GroupType::LocalGroup, ""));

        policy.set_account(Account::GlobalProfile).unwrap();
        policy.set_mode(KioskMode::Multi);
        assert_eq!(policy.account(), &Account::default());
    }

    #[test]
    fn illegal_account_is_rejected_without_change() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        let err = policy.set_account(Account::GlobalProfile).unwrap_err();
        assert!(matches!(err, PolicyError::AccountNotAllowed { .. }));
        assert_eq!(policy.account(), &Account::default());
    }

    #[test]
    fn edge_brings_its_dependencies() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        assert_eq!(policy.add_app_with_dependencies(AllowedApp::desktop(EDGE_PATH)), 3);
        assert_eq!(policy.apps.len(), 3);
        assert_eq!(policy.apps.auto_launch_candidates(), vec![0]);
        assert!(policy.apps.get(1).unwrap().skip_auto_pin);
        assert_eq!(policy.add_app_with_dependencies(AllowedApp::desktop(EDGE_PATH)), 0);
    }

    #[test]
    fn taskbar_rejects_site_tiles() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        let tile = Pin::SecondaryTile(SecondaryTile::new("Portal", "https://portal.local"));
        assert_eq!(policy.add_taskbar_pin(tile.clone()), Err(PolicyError::TileOnTaskbar));
        assert!(policy.add_start_pin(tile).is_ok());
    }

    #[test]
    fn pinning_allowed_apps_derives_names() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy.add_app(AllowedApp::desktop(r"C:\Windows\System32\osk.exe"));
        policy.add_app(AllowedApp::packaged("Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"));
        policy.pin_app_to_start(0).unwrap();
        policy.pin_app_to_taskbar(1).unwrap();
        assert_eq!(policy.start_pins.get(0).unwrap().name(), "osk.exe");
        assert_eq!(
            policy.taskbar_pins.get(0).unwrap().name(),
            "Microsoft.WindowsCalculator_8wekyb3d8bbwe!App"
        );
        assert!(matches!(
            policy.pin_app_to_start(0),
            Err(PolicyError::AlreadyPinned { .. })
        ));
    }

    #[test]
    fn edge_shortcut_with_custom_name_warns() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy
            .add_start_pin(Pin::DesktopLink(DesktopLink::new("Intranet", EDGE_PATH)))
            .unwrap();
        policy
            .add_start_pin(Pin::DesktopLink(DesktopLink::new("Microsoft Edge", EDGE_PATH)))
            .unwrap();
        assert_eq!(policy.edge_shortcut_warnings(), vec!["Intranet".to_string()]);
    }

    #[test]
    fn stored_policy_with_illegal_account_is_coerced() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Restricted);
        policy.set_account(Account::GlobalProfile).unwrap();
        let mut json = serde_json::to_value(&policy).unwrap();
        json["profile"]["mode"] = serde_json::json!("single");
        let loaded: KioskPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.mode(), KioskMode::Single);
        assert_eq!(loaded.account(), &Account::default());
    }

    #[test]
    fn reset_returns_to_draft() {
        let mut policy = KioskPolicy::with_mode(KioskMode::Multi);
        policy.add_app(AllowedApp::desktop(r"C:\a.exe"));
        policy.reset();
        assert_eq!(policy, KioskPolicy::new());
    }
}
