//! Sentinel strings and cell values shared with the package inventory.

/// Placeholder written to the inventory when a value could not be determined.
pub const NOT_FOUND: &str = "Not_Found";

/// Every spelling of the "unknown" placeholder seen in inventories.
pub const UNKNOWN_SENTINELS: [&str; 2] = [NOT_FOUND, "Not_found"];

pub const CELL_UPGRADE: &str = "Y";
pub const CELL_UP_TO_DATE: &str = "N";
pub const CELL_REVISIT: &str = "Revisit";
pub const CELL_NOT_APPLICABLE: &str = "NA";

pub const CELL_BUILD_SUCCEEDED: &str = "Y";
pub const CELL_BUILD_FAILED: &str = "N";

/// Characters that mark an upstream version as unusual, e.g. `2.0~rc1` or `1.0^20240101git`.
pub const UNUSUAL_VERSION_CHARS: &str = ",!?~^*%$#@";

/// Base of the upstream build system's package tree.
pub const UPSTREAM_PACKAGES_URL: &str = "https://kojipkgs.fedoraproject.org/packages";

/// Dist tag of the upstream release the inventory is compared against.
pub const DEFAULT_DIST_TAG: &str = ".fc41";

/// Spec file section markers that end the preamble.
pub(crate) const SPEC_SECTIONS: [&str; 8] = [
    "%description",
    "%prep",
    "%build",
    "%install",
    "%check",
    "%files",
    "%changelog",
    "%package",
];

pub(crate) const MACRO_EXPANSION_DEPTH: usize = 16;

/// Upper bound on the text produced while expanding a single string, counting nested expansions.
pub(crate) const MAX_EXPANDED_LEN: usize = 64 * 1024;
