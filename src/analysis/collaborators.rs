//! The outside world as seen by the analysis: an inventory to read and annotate, and a place
//! to look up what the upstream distribution ships.

use chrono::NaiveDateTime;

use super::UpgradeStatus;
use crate::errors::*;

/// Format of the timestamps next to entries in a package listing
pub const LISTING_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One package row of the inventory. Cells that are empty in the inventory are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryRow {
    pub package: String,
    pub current_version: Option<String>,
    pub upstream_version: Option<String>,
    pub build_status: Option<String>,
    /// The package left the extended repository for the core one, so the inventory's
    /// current version no longer describes it
    pub moved_to_core: bool,
}

impl InventoryRow {
    pub fn new<T: Into<String>>(package: T) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    pub fn current_version<T: Into<String>>(mut self, version: T) -> Self {
        self.current_version = Some(version.into());
        self
    }

    pub fn upstream_version<T: Into<String>>(mut self, version: T) -> Self {
        self.upstream_version = Some(version.into());
        self
    }

    pub fn build_status<T: Into<String>>(mut self, status: T) -> Self {
        self.build_status = Some(status.into());
        self
    }

    pub fn moved_to_core(mut self, moved: bool) -> Self {
        self.moved_to_core = moved;
        self
    }
}

/// A release published upstream for some version of a package
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Release string including its dist tag, e.g. `3.fc41`
    pub release: String,
    pub published: NaiveDateTime,
}

impl ReleaseEntry {
    pub fn new<T: Into<String>>(release: T, published: NaiveDateTime) -> Self {
        Self {
            release: release.into(),
            published,
        }
    }

    /// Build an entry from a directory listing, where the timestamp reads `2024-08-01 12:30`
    /// and directory names carry a trailing `/`.
    pub fn from_listing(release: &str, published: &str) -> Result<Self, Error> {
        let published = NaiveDateTime::parse_from_str(published.trim(), LISTING_TIMESTAMP_FORMAT)?;
        Ok(Self::new(release.trim_end_matches('/'), published))
    }
}

/// Storage of the package inventory.
#[cfg_attr(test, mockall::automock)]
pub trait SpreadsheetStore {
    fn rows(&self) -> Result<Vec<InventoryRow>, Error>;

    /// Write the upstream version and release found for a package
    fn record_upstream(&mut self, package: &str, version: &str, release: &str)
    -> Result<(), Error>;

    /// Write the upgrade verdict for a package
    fn record_decision(&mut self, package: &str, status: &UpgradeStatus) -> Result<(), Error>;
}

/// Package metadata published by the upstream distribution.
#[cfg_attr(test, mockall::automock)]
pub trait PackageMetadataSource {
    /// Every version the upstream has built the package at, in no particular order
    fn versions(&self, package: &str) -> Result<Vec<String>, Error>;

    /// Every release of one version
    fn releases(&self, package: &str, version: &str) -> Result<Vec<ReleaseEntry>, Error>;
}
