//! Deciding which inventory packages need an upgrade to match the upstream distribution.

mod collaborators;
mod config;
mod status;
mod upstream;

use std::cmp::Ordering;
use std::fmt;

pub use collaborators::*;
pub use config::*;
pub use status::*;
pub use upstream::*;

use crate::constants::*;
use crate::errors::*;
use crate::version::{ObservedVersion, compare, truncate_at_unusual_char};

/// Why a package could not be decided automatically
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevisitReason {
    /// The current version, the upstream version or the build status is unknown
    MissingData,
    /// The inventory is already ahead of upstream
    CurrentIsNewer,
    /// Looking up the upstream version failed
    LookupFailed,
    /// Upstream has no build of the package for the target dist
    NoDistRelease,
    /// The upstream version carries a pre-release or snapshot marker such as `~` or `^`
    UnusualUpstreamVersion,
    /// The package moved to the core repository
    MovedToCore,
}

impl fmt::Display for RevisitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RevisitReason::MissingData => "missing data",
            RevisitReason::CurrentIsNewer => "current version is newer than upstream",
            RevisitReason::LookupFailed => "upstream lookup failed",
            RevisitReason::NoDistRelease => "no upstream release for the target dist",
            RevisitReason::UnusualUpstreamVersion => "unusual upstream version",
            RevisitReason::MovedToCore => "moved to core",
        };
        f.write_str(reason)
    }
}

/// The verdict for one package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpgradeStatus {
    /// Upstream ships a newer version
    Upgrade { to: String },
    UpToDate,
    /// A human has to look at this one
    Revisit(RevisitReason),
}

impl UpgradeStatus {
    /// Value of the "need upgrade" inventory column
    pub fn need_upgrade_cell(&self) -> &str {
        match self {
            UpgradeStatus::Upgrade { .. } => CELL_UPGRADE,
            UpgradeStatus::UpToDate => CELL_UP_TO_DATE,
            UpgradeStatus::Revisit(_) => CELL_REVISIT,
        }
    }

    /// Value of the "upgrade to version" inventory column
    pub fn upgrade_to_cell(&self) -> &str {
        match self {
            UpgradeStatus::Upgrade { to } => to,
            UpgradeStatus::UpToDate => CELL_NOT_APPLICABLE,
            UpgradeStatus::Revisit(_) => CELL_REVISIT,
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, UpgradeStatus::Revisit(_))
    }
}

impl fmt::Display for UpgradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeStatus::Upgrade { to } => write!(f, "upgrade to {}", to),
            UpgradeStatus::UpToDate => f.write_str("up to date"),
            UpgradeStatus::Revisit(reason) => write!(f, "revisit ({})", reason),
        }
    }
}

/// Decide whether a package has to be upgraded to the upstream version.
///
/// Nothing is decided while any of the inputs is unknown. Versions that are textually
/// identical or compare equal (`1_2` and `1.2`) are up to date.
pub fn decide_upgrade(
    current: ObservedVersion<'_>,
    upstream: ObservedVersion<'_>,
    build_status: Option<&str>,
) -> UpgradeStatus {
    let build_known = ObservedVersion::from_cell(build_status).is_known();
    let (ObservedVersion::Known(current), ObservedVersion::Known(upstream), true) =
        (current, upstream, build_known)
    else {
        return UpgradeStatus::Revisit(RevisitReason::MissingData);
    };

    if current == upstream {
        return UpgradeStatus::UpToDate;
    }

    match compare(current, upstream) {
        Ordering::Equal => UpgradeStatus::UpToDate,
        Ordering::Less => UpgradeStatus::Upgrade {
            to: upstream.to_string(),
        },
        Ordering::Greater => UpgradeStatus::Revisit(RevisitReason::CurrentIsNewer),
    }
}

/// Verdict for one inventory row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageOutcome {
    pub package: String,
    pub upstream: Option<UpstreamRelease>,
    pub status: UpgradeStatus,
    pub work_status: WorkStatus,
}

/// Result of an [`analyze_packages`] run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub outcomes: Vec<PackageOutcome>,
    pub skipped: Vec<String>,
}

impl AnalysisReport {
    pub fn get(&self, package: &str) -> Option<&PackageOutcome> {
        self.outcomes.iter().find(|outcome| outcome.package == package)
    }

    pub fn upgrades(&self) -> usize {
        self.count(|status| matches!(status, UpgradeStatus::Upgrade { .. }))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|status| *status == UpgradeStatus::UpToDate)
    }

    pub fn revisit(&self) -> usize {
        self.count(UpgradeStatus::needs_attention)
    }

    fn count<F: Fn(&UpgradeStatus) -> bool>(&self, pred: F) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| pred(&outcome.status))
            .count()
    }
}

/// Walk the inventory, compare every package against upstream and write the verdicts back.
///
/// A failed upstream lookup only affects the package it was for, which is marked for revisit.
/// Errors from the store abort the run.
pub fn analyze_packages(
    config: &AnalysisConfig,
    store: &mut dyn SpreadsheetStore,
    source: &dyn PackageMetadataSource,
) -> Result<AnalysisReport, Error> {
    let mut report = AnalysisReport::default();

    for row in store.rows()? {
        let package = row.package.trim().to_string();
        if config.is_skipped(&package) {
            log::info!("{}: skipped", package);
            report.skipped.push(package);
            continue;
        }

        let current = ObservedVersion::from_cell(row.current_version.as_deref());
        let (upstream, status) = if config.refresh_upstream() {
            match resolve_upstream(source, &package, config.dist_tag()) {
                Ok(upstream) => {
                    let status = record_upstream(store, &package, &row, upstream.as_ref())?;
                    (upstream, status)
                }
                Err(e) => {
                    log::error!("{}: upstream lookup failed: {}", package, e);
                    (None, UpgradeStatus::Revisit(RevisitReason::LookupFailed))
                }
            }
        } else {
            let upstream = ObservedVersion::from_cell(row.upstream_version.as_deref());
            (None, decide_row(&row, upstream, None))
        };
        let work_status = WorkStatus::derive(
            &status,
            BuildState::from_cell(row.build_status.as_deref()),
        );

        log::info!("{}: {} (current {})", package, status, current);
        store.record_decision(&package, &status)?;
        report.outcomes.push(PackageOutcome {
            package,
            upstream,
            status,
            work_status,
        });
    }

    log::info!(
        "{} package(s) to upgrade, {} up to date, {} to revisit, {} skipped",
        report.upgrades(),
        report.up_to_date(),
        report.revisit(),
        report.skipped.len()
    );
    Ok(report)
}

/// Write what was found upstream for a package and decide on it.
///
/// A release that was not built for the target dist, or a version with an unusual marker,
/// is still written down but always needs a human to decide. Unusual versions are written
/// without their marker.
fn record_upstream(
    store: &mut dyn SpreadsheetStore,
    package: &str,
    row: &InventoryRow,
    upstream: Option<&UpstreamRelease>,
) -> Result<UpgradeStatus, Error> {
    let Some(found) = upstream else {
        store.record_upstream(package, NOT_FOUND, NOT_FOUND)?;
        return Ok(decide_row(row, ObservedVersion::Unknown, None));
    };
    let release = found.release.as_deref().unwrap_or(NOT_FOUND);

    if !found.matches_dist {
        log::warn!(
            "{}: newest upstream build {}-{} is not for the target dist",
            package,
            found.version,
            release
        );
        store.record_upstream(package, &found.version, release)?;
        return Ok(decide_row(
            row,
            ObservedVersion::Unknown,
            Some(RevisitReason::NoDistRelease),
        ));
    }

    let version = truncate_at_unusual_char(&found.version);
    let recorded = if version.is_empty() { NOT_FOUND } else { version };
    store.record_upstream(package, recorded, release)?;

    if version != found.version {
        log::warn!("{}: unusual upstream version {}", package, found.version);
        return Ok(decide_row(
            row,
            ObservedVersion::Unknown,
            Some(RevisitReason::UnusualUpstreamVersion),
        ));
    }
    Ok(decide_row(row, ObservedVersion::from_cell(Some(version)), None))
}

/// Decide on one inventory row. Problems found upstream take precedence over the version
/// comparison, a move to the core repository over everything.
fn decide_row(
    row: &InventoryRow,
    upstream: ObservedVersion<'_>,
    upstream_issue: Option<RevisitReason>,
) -> UpgradeStatus {
    if row.moved_to_core {
        return UpgradeStatus::Revisit(RevisitReason::MovedToCore);
    }
    if let Some(reason) = upstream_issue {
        return UpgradeStatus::Revisit(reason);
    }
    decide_upgrade(
        ObservedVersion::from_cell(row.current_version.as_deref()),
        upstream,
        row.build_status.as_deref(),
    )
}
