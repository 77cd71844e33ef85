//! Browser kiosk command lines.
//!
//! Three tiers exist. Edge understands the full grammar
//! `--kiosk <url> --edge-kiosk-type=<type> --no-first-run [--kiosk-idle-timeout-minutes=N]`;
//! Chrome, Brave and Island take `--kiosk <url> --no-first-run`; Firefox takes
//! `--kiosk <url>`. Everything else has no kiosk support and gets an empty
//! string.

use tracing::debug;

use crate::policy::{BrowserKind, BrowserLaunch, EdgeKioskType, KioskSupport, LaunchSource};

/// Start page used when a URL source is empty.
pub const FALLBACK_URL: &str = "https://www.microsoft.com";
/// Local page used when a file source is empty.
pub const FALLBACK_FILE: &str = "C:/Kiosk/index.html";

const FILE_URL_PREFIX: &str = "file:///";
const KIOSK_FLAG: &str = "--kiosk";
const KIOSK_TYPE_FLAG: &str = "--edge-kiosk-type=";
const NO_FIRST_RUN_FLAG: &str = "--no-first-run";
const IDLE_FLAG: &str = "--kiosk-idle-timeout-minutes=";

fn has_file_prefix(value: &str) -> bool {
    value
        .get(..FILE_URL_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(FILE_URL_PREFIX))
}

fn is_drive_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Convert a local path to a `file:///` URL, percent-encoding every segment
/// except a leading drive letter. Input that already is a file URL is kept.
pub fn file_url(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if has_file_prefix(trimmed) {
        return trimmed.to_string();
    }
    let normalized = trimmed.replace('\\', "/");
    let encoded: Vec<String> = normalized
        .split('/')
        .enumerate()
        .map(|(i, segment)| {
            if i == 0 && is_drive_segment(segment) {
                segment.to_string()
            } else {
                urlencoding::encode(segment).into_owned()
            }
        })
        .collect();
    format!("{FILE_URL_PREFIX}{}", encoded.join("/"))
}

/// Address for a website tile. Web and file URLs are kept as typed; anything
/// else is taken for a local path and turned into a file URL.
pub fn tile_url(value: &str) -> String {
    let trimmed = value.trim();
    let has_scheme = ["http://", "https://", "file://"].iter().any(|scheme| {
        trimmed
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        trimmed.to_string()
    } else {
        file_url(trimmed)
    }
}

/// Inverse of [`file_url`]: a backslash-separated local path, or `None` when
/// `url` is not a file URL.
pub fn path_from_file_url(url: &str) -> Option<String> {
    if !has_file_prefix(url) {
        return None;
    }
    let rest = &url[FILE_URL_PREFIX.len()..];
    let segments: Vec<String> = rest
        .split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect();
    Some(segments.join("\\"))
}

/// The URL a browser is pointed at, with fallbacks for empty sources.
pub fn resolve_source(source: &LaunchSource) -> String {
    match source {
        LaunchSource::Url(url) if url.trim().is_empty() => FALLBACK_URL.to_string(),
        LaunchSource::Url(url) => url.trim().to_string(),
        LaunchSource::File(path) => {
            let url = file_url(path);
            if url.is_empty() {
                file_url(FALLBACK_FILE)
            } else {
                url
            }
        }
    }
}

/// Kiosk arguments for `browser` opening `url`. Empty when the browser has no
/// kiosk support or there is no URL.
pub fn kiosk_arguments(
    browser: Option<BrowserKind>,
    url: &str,
    kiosk_type: EdgeKioskType,
    idle_timeout_minutes: u32,
) -> String {
    let Some(browser) = browser else {
        return String::new();
    };
    if url.is_empty() {
        return String::new();
    }
    match (browser, browser.kiosk_support()) {
        (_, KioskSupport::Full) => {
            let mut args =
                format!("{KIOSK_FLAG} {url} {KIOSK_TYPE_FLAG}{kiosk_type} {NO_FIRST_RUN_FLAG}");
            if idle_timeout_minutes > 0 {
                args.push_str(&format!(" {IDLE_FLAG}{idle_timeout_minutes}"));
            }
            args
        }
        (BrowserKind::Firefox, KioskSupport::Reduced) => format!("{KIOSK_FLAG} {url}"),
        (_, KioskSupport::Reduced) => format!("{KIOSK_FLAG} {url} {NO_FIRST_RUN_FLAG}"),
    }
}

/// Kiosk arguments for a browser launch configuration.
pub fn launch_arguments(browser: Option<BrowserKind>, launch: &BrowserLaunch) -> String {
    kiosk_arguments(
        browser,
        &resolve_source(&launch.source),
        launch.kiosk_type,
        launch.idle_timeout_minutes,
    )
}

/// Recover a launch configuration from a kiosk command line. Returns `None`
/// when `args` does not follow the kiosk grammar.
pub fn parse_kiosk_arguments(args: &str) -> Option<BrowserLaunch> {
    let mut tokens = args.split_whitespace();
    if tokens.next()? != KIOSK_FLAG {
        return None;
    }
    let url = tokens.next().filter(|t| !t.starts_with("--"))?;
    let source = match path_from_file_url(url) {
        Some(path) => LaunchSource::File(path),
        None => LaunchSource::Url(url.to_string()),
    };
    let mut launch = BrowserLaunch {
        source,
        ..BrowserLaunch::default()
    };
    for token in tokens {
        if let Some(value) = token.strip_prefix(KIOSK_TYPE_FLAG) {
            match EdgeKioskType::parse(value) {
                Some(kind) => launch.kiosk_type = kind,
                None => debug!(value, "unknown kiosk type, keeping default"),
            }
        } else if let Some(value) = token.strip_prefix(IDLE_FLAG) {
            match value.parse() {
                Ok(minutes) => launch.idle_timeout_minutes = minutes,
                Err(_) => debug!(value, "unreadable idle timeout, ignoring"),
            }
        } else if token != NO_FIRST_RUN_FLAG {
            debug!(token, "ignoring unrecognized kiosk argument");
        }
    }
    Some(launch)
}
