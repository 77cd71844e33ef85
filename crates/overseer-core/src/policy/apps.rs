//! Allowed applications for multi-app and restricted kiosks.
//!
//! The list owns the auto-launch designation so that every mutation keeps the
//! reference pointing at the same application, or clears it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::browser::{is_helper_executable, BrowserKind};
use super::single::BrowserLaunch;
use crate::error::PolicyError;

/// How an allowed application is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppKind {
    /// Application user model id of a packaged app.
    #[serde(rename = "aumid")]
    PackagedApp,
    /// Full path of a desktop executable.
    #[serde(rename = "path")]
    DesktopPath,
}

/// One entry of the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedApp {
    #[serde(rename = "type")]
    pub kind: AppKind,
    pub value: String,
    /// Added as a dependency; not offered for automatic pinning.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_auto_pin: bool,
    /// Added as a dependency; never offered as the auto-launch target.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_auto_launch: bool,
}

impl AllowedApp {
    pub fn packaged(app_id: impl Into<String>) -> Self {
        Self::new(AppKind::PackagedApp, app_id)
    }

    pub fn desktop(path: impl Into<String>) -> Self {
        Self::new(AppKind::DesktopPath, path)
    }

    pub fn new(kind: AppKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            skip_auto_pin: false,
            skip_auto_launch: false,
        }
    }

    /// Mark as an automatic dependency of another application.
    pub fn as_dependency(mut self) -> Self {
        self.skip_auto_pin = true;
        self.skip_auto_launch = true;
        self
    }

    pub fn browser(&self) -> Option<BrowserKind> {
        BrowserKind::detect(&self.value)
    }

    /// Whether this entry may be designated for auto-launch.
    pub fn is_auto_launch_candidate(&self) -> bool {
        !self.skip_auto_launch && !is_helper_executable(&self.value)
    }
}

/// Ordered allow-list with an optional auto-launch position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "AllowedAppsRepr", into = "AllowedAppsRepr")]
pub struct AllowedApps {
    apps: Vec<AllowedApp>,
    auto_launch: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllowedAppsRepr {
    #[serde(default)]
    apps: Vec<AllowedApp>,
    #[serde(default)]
    auto_launch: Option<usize>,
}

impl From<AllowedAppsRepr> for AllowedApps {
    fn from(repr: AllowedAppsRepr) -> Self {
        let mut list = Self::new();
        let mut auto_launch = None;
        for (i, app) in repr.apps.into_iter().enumerate() {
            let value = app.value.clone();
            list.add(app);
            if repr.auto_launch == Some(i) {
                auto_launch = list.find(|a| a.value == value).map(|(at, _)| at);
            }
        }
        list.auto_launch = auto_launch.filter(|&i| {
            list.apps.get(i).is_some_and(AllowedApp::is_auto_launch_candidate)
        });
        if repr.auto_launch.is_some() && list.auto_launch.is_none() {
            debug!("dropped stored auto-launch entry that is not a candidate");
        }
        list
    }
}

impl From<AllowedApps> for AllowedAppsRepr {
    fn from(list: AllowedApps) -> Self {
        Self {
            apps: list.apps,
            auto_launch: list.auto_launch,
        }
    }
}

impl AllowedApps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[AllowedApp] {
        &self.apps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AllowedApp> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AllowedApp> {
        self.apps.get(index)
    }

    /// Append an application. Returns `false` if its value is already listed.
    pub fn add(&mut self, app: AllowedApp) -> bool {
        if app.value.trim().is_empty() || self.contains(&app.value) {
            return false;
        }
        self.apps.push(app);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.apps.iter().any(|a| a.value == value)
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<(usize, &AllowedApp)>
    where
        P: FnMut(&AllowedApp) -> bool,
    {
        self.apps.iter().enumerate().find(|(_, app)| predicate(app))
    }

    /// Remove the application at `index`, shifting or clearing auto-launch.
    pub fn remove(&mut self, index: usize) -> Result<AllowedApp, PolicyError> {
        self.check_index(index)?;
        let removed = self.apps.remove(index);
        self.auto_launch = match self.auto_launch {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Move an application; the auto-launch designation follows the app it named.
    pub fn move_app(&mut self, from: usize, to: usize) -> Result<(), PolicyError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let app = self.apps.remove(from);
        self.apps.insert(to, app);
        self.auto_launch = self.auto_launch.map(|current| {
            if current == from {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            }
        });
        Ok(())
    }

    pub fn auto_launch(&self) -> Option<usize> {
        self.auto_launch
    }

    pub fn auto_launch_app(&self) -> Option<&AllowedApp> {
        self.auto_launch.and_then(|i| self.apps.get(i))
    }

    /// Designate (or clear) the auto-launch application.
    pub fn set_auto_launch(&mut self, index: Option<usize>) -> Result<(), PolicyError> {
        if let Some(i) = index {
            self.check_index(i)?;
            let app = &self.apps[i];
            if !app.is_auto_launch_candidate() {
                return Err(PolicyError::NotAutoLaunchCandidate {
                    value: app.value.clone(),
                });
            }
        }
        self.auto_launch = index;
        Ok(())
    }

    /// Positions eligible for auto-launch.
    pub fn auto_launch_candidates(&self) -> Vec<usize> {
        self.apps
            .iter()
            .enumerate()
            .filter(|(_, app)| app.is_auto_launch_candidate())
            .map(|(i, _)| i)
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<(), PolicyError> {
        if index < self.apps.len() {
            Ok(())
        } else {
            Err(PolicyError::OutOfBounds {
                collection: "allowed applications",
                index,
                len: self.apps.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a AllowedApps {
    type Item = &'a AllowedApp;
    type IntoIter = std::slice::Iter<'a, AllowedApp>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter()
    }
}

/// Launch settings for the auto-launch entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLaunchSettings {
    /// Used when the auto-launch entry is a kiosk-capable browser.
    #[serde(default)]
    pub browser: BrowserLaunch,
    /// Literal command line for any other desktop executable.
    #[serde(default)]
    pub arguments: String,
}
