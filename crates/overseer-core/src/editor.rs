//! Policy editor session.
//!
//! Provides functionality for:
//! - Switching mode, account and single-app variants without losing what the
//!   user typed into the variant they left
//! - Replacing the whole model from markup, a snapshot, a preset or a blank
//!   draft, atomically
//! - Validating and previewing the current model

use std::mem;
use std::str::FromStr;

use tracing::debug;

use crate::codec;
use crate::error::{DecodeError, PolicyError, SnapshotError};
use crate::policy::{
    Account, BrowserLaunch, KioskMode, KioskPolicy, LaunchSource, Preset, SingleApp,
    SingleAppKind, DEFAULT_DISPLAY_NAME,
};
use crate::snapshot::{AuxiliaryFields, SessionSnapshot};
use crate::validate::{validate, ValidationError};

/// Discriminant of [`Account`], used when switching variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    AutoLogon,
    ExistingUser,
    UserGroup,
    GlobalProfile,
}

impl AccountKind {
    pub fn of(account: &Account) -> Self {
        match account {
            Account::AutoLogon { .. } => AccountKind::AutoLogon,
            Account::ExistingUser { .. } => AccountKind::ExistingUser,
            Account::UserGroup { .. } => AccountKind::UserGroup,
            Account::GlobalProfile => AccountKind::GlobalProfile,
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto-logon" | "autologon" => Ok(AccountKind::AutoLogon),
            "existing" | "existing-user" => Ok(AccountKind::ExistingUser),
            "group" | "user-group" => Ok(AccountKind::UserGroup),
            "global" | "global-profile" => Ok(AccountKind::GlobalProfile),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// An editing session over one policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyEditor {
    policy: KioskPolicy,
    auxiliary: AuxiliaryFields,
    dirty: bool,
}

impl PolicyEditor {
    /// Start from a blank draft.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_policy(policy: KioskPolicy) -> Self {
        Self {
            policy,
            auxiliary: AuxiliaryFields::default(),
            dirty: false,
        }
    }

    /// Resume a saved session.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            policy: snapshot.payload.model,
            auxiliary: snapshot.payload.auxiliary,
            dirty: false,
        }
    }

    pub fn policy(&self) -> &KioskPolicy {
        &self.policy
    }

    pub fn auxiliary(&self) -> &AuxiliaryFields {
        &self.auxiliary
    }

    pub fn into_policy(self) -> KioskPolicy {
        self.policy
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Apply an arbitrary change to the model.
    pub fn edit<R>(&mut self, change: impl FnOnce(&mut KioskPolicy) -> R) -> R {
        self.dirty = true;
        change(&mut self.policy)
    }

    /// Switch mode. An account that is not legal in the new mode is stashed
    /// and replaced by the nearest legal variant, filled from earlier input.
    pub fn set_mode(&mut self, mode: KioskMode) -> Result<(), PolicyError> {
        if mode == self.policy.mode() {
            return Ok(());
        }
        self.dirty = true;
        if let Some(previous) = self.policy.set_mode(mode) {
            stash_account(&mut self.auxiliary, &previous);
            let kind = AccountKind::of(self.policy.account());
            let restored = account_from(&self.auxiliary, kind);
            self.policy.set_account(restored)?;
        }
        Ok(())
    }

    /// Bind an account, stashing the values of the one it replaces.
    pub fn set_account(&mut self, account: Account) -> Result<(), PolicyError> {
        let previous = self.policy.account().clone();
        self.policy.set_account(account)?;
        if AccountKind::of(&previous) != AccountKind::of(self.policy.account()) {
            stash_account(&mut self.auxiliary, &previous);
        }
        self.dirty = true;
        Ok(())
    }

    /// Switch to another account variant, restoring its earlier values.
    pub fn set_account_kind(&mut self, kind: AccountKind) -> Result<(), PolicyError> {
        if kind == AccountKind::of(self.policy.account()) {
            return Ok(());
        }
        self.set_account(account_from(&self.auxiliary, kind))
    }

    /// Switch the single-app variant, restoring its earlier values.
    pub fn set_single_app_kind(&mut self, kind: SingleAppKind) {
        if kind == self.policy.single_app.kind() {
            return;
        }
        let restored = single_app_from(&self.auxiliary, kind);
        let previous = mem::replace(&mut self.policy.single_app, restored);
        stash_single_app(&mut self.auxiliary, &previous);
        self.dirty = true;
    }

    /// Point the single-app browser at a URL or a local file. Does nothing
    /// when the single app is not the browser.
    pub fn set_browser_uses_file(&mut self, use_file: bool) {
        let SingleApp::Browser(launch) = &mut self.policy.single_app else {
            return;
        };
        if matches!(launch.source, LaunchSource::File(_)) == use_file {
            return;
        }
        let restored = if use_file {
            LaunchSource::File(self.auxiliary.browser_file_path.clone().unwrap_or_default())
        } else {
            LaunchSource::Url(self.auxiliary.browser_url.clone().unwrap_or_default())
        };
        let previous = mem::replace(&mut launch.source, restored);
        stash_source(&mut self.auxiliary, &previous);
        self.dirty = true;
    }

    /// Replace the model with a decoded document. On error nothing changes.
    pub fn import_xml(&mut self, xml: &str) -> Result<(), DecodeError> {
        let policy = codec::decode(xml)?;
        debug!(mode = %policy.mode(), "imported policy document");
        self.replace(policy, AuxiliaryFields::default(), true);
        Ok(())
    }

    /// Replace the session with a saved snapshot. On error nothing changes.
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), SnapshotError> {
        let snapshot = SessionSnapshot::from_json(json)?;
        self.replace(snapshot.payload.model, snapshot.payload.auxiliary, false);
        Ok(())
    }

    /// Replace the session with a built-in preset. On error nothing changes.
    pub fn load_preset(&mut self, preset: Preset) -> Result<(), PolicyError> {
        let policy = preset.build()?;
        self.replace(policy, AuxiliaryFields::default(), true);
        Ok(())
    }

    /// Start over from a blank draft.
    pub fn reset(&mut self) {
        self.replace(KioskPolicy::new(), AuxiliaryFields::default(), false);
    }

    pub fn snapshot(&self, name: impl Into<String>) -> SessionSnapshot {
        SessionSnapshot::new(name, self.policy.clone(), self.auxiliary.clone())
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        validate(&self.policy)
    }

    /// The document export would produce.
    pub fn preview(&self) -> String {
        codec::encode(&self.policy)
    }

    fn replace(&mut self, policy: KioskPolicy, auxiliary: AuxiliaryFields, dirty: bool) {
        self.policy = policy;
        self.auxiliary = auxiliary;
        self.dirty = dirty;
    }
}

fn stash_account(aux: &mut AuxiliaryFields, account: &Account) {
    match account {
        Account::AutoLogon { display_name } => aux.display_name = Some(display_name.clone()),
        Account::ExistingUser { account_name } => aux.account_name = Some(account_name.clone()),
        Account::UserGroup {
            group_type,
            group_name,
        } => {
            aux.group_type = Some(*group_type);
            aux.group_name = Some(group_name.clone());
        }
        Account::GlobalProfile => {}
    }
}

fn account_from(aux: &AuxiliaryFields, kind: AccountKind) -> Account {
    match kind {
        AccountKind::AutoLogon => Account::auto_logon(
            aux.display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        ),
        AccountKind::ExistingUser => Account::existing(aux.account_name.clone().unwrap_or_default()),
        AccountKind::UserGroup => Account::group(
            aux.group_type.unwrap_or_default(),
            aux.group_name.clone().unwrap_or_default(),
        ),
        AccountKind::GlobalProfile => Account::GlobalProfile,
    }
}

fn stash_source(aux: &mut AuxiliaryFields, source: &LaunchSource) {
    match source {
        LaunchSource::Url(url) => aux.browser_url = Some(url.clone()),
        LaunchSource::File(path) => aux.browser_file_path = Some(path.clone()),
    }
}

fn stash_single_app(aux: &mut AuxiliaryFields, app: &SingleApp) {
    match app {
        SingleApp::Browser(launch) => stash_source(aux, &launch.source),
        SingleApp::Packaged { app_id } => aux.packaged_app_id = Some(app_id.clone()),
        SingleApp::Desktop { path, arguments } => {
            aux.desktop_path = Some(path.clone());
            aux.desktop_arguments = Some(arguments.clone());
        }
    }
}

fn single_app_from(aux: &AuxiliaryFields, kind: SingleAppKind) -> SingleApp {
    match kind {
        SingleAppKind::Browser => {
            let source = match (&aux.browser_url, &aux.browser_file_path) {
                (Some(url), _) => LaunchSource::Url(url.clone()),
                (None, Some(path)) => LaunchSource::File(path.clone()),
                (None, None) => LaunchSource::default(),
            };
            SingleApp::Browser(BrowserLaunch {
                source,
                ..BrowserLaunch::default()
            })
        }
        SingleAppKind::Packaged => SingleApp::Packaged {
            app_id: aux.packaged_app_id.clone().unwrap_or_default(),
        },
        SingleAppKind::Desktop => SingleApp::Desktop {
            path: aux.desktop_path.clone().unwrap_or_default(),
            arguments: aux.desktop_arguments.clone().unwrap_or_default(),
        },
    }
}
