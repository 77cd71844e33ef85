//! # Kiosk Overseer Core Library
//!
//! This library provides the core logic for authoring Windows Assigned Access
//! kiosk policies. It follows a CLI-first design: every operation is
//! available through the `overseer` binary, which is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Policy model**: a typed policy graph whose collection operations keep
//!   its invariants (unique pin names, a valid auto-launch reference, an
//!   account legal for the mode)
//! - **Validation**: rule checks returned as data, gating export only
//! - **Codec**: a deterministic encoder to the Assigned Access document and a
//!   tolerant decoder that reads several schema generations back
//! - **Editor**: an editing session that keeps inactive form values and
//!   replaces the model atomically
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`KioskPolicy`]: the policy model
//! - [`validate()`]: policy rule checks
//! - [`encode()`] / [`decode()`]: the document codec
//! - [`PolicyEditor`]: editing sessions and snapshots
//! - [`Config`]: application configuration management

pub mod codec;
pub mod editor;
pub mod error;
pub mod export;
pub mod policy;
pub mod snapshot;
pub mod storage;
pub mod validate;

pub use codec::{decode, encode};
pub use editor::{AccountKind, PolicyEditor};
pub use error::{ConfigError, CoreError, DecodeError, ExportError, PolicyError, SnapshotError};
pub use export::{export_file_name, prepare_export, shortcut_manifest, ExportArtifact, ShortcutEntry};
pub use policy::{
    Account, AllowedApp, AppKind, KioskMode, KioskPolicy, Pin, Preset, SingleApp,
};
pub use snapshot::{AuxiliaryFields, SessionSnapshot};
pub use storage::Config;
pub use validate::{validate, RuleCategory, ValidationError};
