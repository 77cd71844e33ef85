//! Namespace URIs of the assigned access schema and the embedded layout
//! documents.

/// Stable core of the schema; the default namespace of encoded documents.
pub const DEFAULT: &str = "http://schemas.microsoft.com/AssignedAccess/2017/config";
/// Auto-launch, display name, file explorer restrictions.
pub const RS5: &str = "http://schemas.microsoft.com/AssignedAccess/201810/config";
/// Global profile, removable drives, no-restriction marker.
pub const V3: &str = "http://schemas.microsoft.com/AssignedAccess/2020/config";
/// Classic app path and arguments, break-out sequence.
pub const V4: &str = "http://schemas.microsoft.com/AssignedAccess/2021/config";
/// Start pins and taskbar layout.
pub const V5: &str = "http://schemas.microsoft.com/AssignedAccess/2022/config";

/// Extension namespaces with the prefixes the encoder binds them to.
pub const PREFIXED: [(&str, &str); 4] = [("rs5", RS5), ("v3", V3), ("v4", V4), ("v5", V5)];

pub const LAYOUT_MODIFICATION: &str = "http://schemas.microsoft.com/Start/2014/LayoutModification";
pub const FULL_DEFAULT_LAYOUT: &str = "http://schemas.microsoft.com/Start/2014/FullDefaultLayout";
pub const START_LAYOUT: &str = "http://schemas.microsoft.com/Start/2014/StartLayout";
pub const TASKBAR_LAYOUT: &str = "http://schemas.microsoft.com/Start/2014/TaskbarLayout";

/// Root element of an assigned access document.
pub const ROOT_ELEMENT: &str = "AssignedAccessConfiguration";
