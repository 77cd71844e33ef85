//! Assigned access document codec.
//!
//! This module provides:
//! - [`encode`]: a deterministic, total rendering of a policy as markup
//! - [`decode`]: a best-effort parse of markup back into a policy
//! - The browser launch-argument grammar shared by both directions
//! - Markup escaping
//!
//! `decode(encode(p))` reproduces every field the active mode can express.
//! Desktop link targets are only recovered for pins named after an allowed
//! application; packaged pins come back named by their app id.

mod decode;
mod encode;
pub mod escape;
pub mod launch;
pub mod namespaces;
mod rules;
mod start_pins;
mod taskbar;
mod tree;

pub use decode::decode;
pub use encode::encode;
pub use escape::{escape, push_escaped};
pub use launch::{
    file_url, kiosk_arguments, launch_arguments, parse_kiosk_arguments, path_from_file_url,
    resolve_source, tile_url, FALLBACK_FILE, FALLBACK_URL,
};
