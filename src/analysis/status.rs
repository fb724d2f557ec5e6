//! Build results and work tracking columns of the inventory.

use std::fmt;

use super::UpgradeStatus;
use crate::constants::*;

/// Outcome of the latest build of a package
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    Succeeded,
    Failed,
    Unknown,
}

impl BuildState {
    /// Accepts both the build system's states (`Built`, `Failed`) and inventory cells (`Y`, `N`).
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell.map(str::trim) {
            Some("Built") | Some(CELL_BUILD_SUCCEEDED) => BuildState::Succeeded,
            Some("Failed") | Some(CELL_BUILD_FAILED) => BuildState::Failed,
            _ => BuildState::Unknown,
        }
    }

    /// Value of the build status inventory column
    pub fn cell(&self) -> &'static str {
        match self {
            BuildState::Succeeded => CELL_BUILD_SUCCEEDED,
            BuildState::Failed => CELL_BUILD_FAILED,
            BuildState::Unknown => NOT_FOUND,
        }
    }
}

/// Package name of a build state entry such as `zlib-1.3.1-2.azl3`, cut at the first `-`
/// followed by a digit.
pub fn build_state_package_name(entry: &str) -> &str {
    entry
        .match_indices('-')
        .find(|(idx, _)| entry[idx + 1..].starts_with(|c: char| c.is_ascii_digit()))
        .map_or(entry, |(idx, _)| &entry[..idx])
}

/// State of `package` in a list of `(entry, state)` pairs from the build system.
/// The first entry whose package name matches wins.
pub fn lookup_build_state<'a, I>(entries: I, package: &str) -> BuildState
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .find(|(entry, _)| build_state_package_name(entry) == package)
        .map_or(BuildState::Unknown, |(_, state)| BuildState::from_cell(Some(state)))
}

/// Where the work on a package stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    NotStarted,
    Ongoing,
    PrRaised,
    PrInReview,
    DoneUpgrade,
    DoneFixBuild,
    DoneOtherChanges,
    /// Nothing to do, the package builds and is current
    UpToDate,
}

impl WorkStatus {
    const ALL: [WorkStatus; 8] = [
        WorkStatus::NotStarted,
        WorkStatus::Ongoing,
        WorkStatus::PrRaised,
        WorkStatus::PrInReview,
        WorkStatus::DoneUpgrade,
        WorkStatus::DoneFixBuild,
        WorkStatus::DoneOtherChanges,
        WorkStatus::UpToDate,
    ];

    /// Initial status of a package after an analysis run. Only a package that builds and
    /// needs no upgrade has nothing left to do.
    pub fn derive(status: &UpgradeStatus, build: BuildState) -> Self {
        match (build, status) {
            (BuildState::Succeeded, UpgradeStatus::UpToDate) => WorkStatus::UpToDate,
            _ => WorkStatus::NotStarted,
        }
    }

    pub fn from_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        Self::ALL.into_iter().find(|status| status.cell() == cell)
    }

    /// Value of the status inventory column
    pub fn cell(&self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "Not_Started",
            WorkStatus::Ongoing => "Ongoing",
            WorkStatus::PrRaised => "PR Raised",
            WorkStatus::PrInReview => "PR in Review",
            WorkStatus::DoneUpgrade => "Done-Upgrade",
            WorkStatus::DoneFixBuild => "Done-FixBuild",
            WorkStatus::DoneOtherChanges => "Done-OtherChanges",
            WorkStatus::UpToDate => "NA-Uptodate",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cell())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::RevisitReason;

    #[test]
    fn test_build_state_from_cell() {
        assert_eq!(BuildState::Succeeded, BuildState::from_cell(Some("Built")));
        assert_eq!(BuildState::Succeeded, BuildState::from_cell(Some(" Y ")));
        assert_eq!(BuildState::Failed, BuildState::from_cell(Some("Failed")));
        assert_eq!(BuildState::Failed, BuildState::from_cell(Some("N")));
        assert_eq!(BuildState::Unknown, BuildState::from_cell(Some("Building")));
        assert_eq!(BuildState::Unknown, BuildState::from_cell(None));

        assert_eq!("Y", BuildState::Succeeded.cell());
        assert_eq!("Not_Found", BuildState::Unknown.cell());
    }

    #[test]
    fn test_build_state_package_name() {
        assert_eq!("zlib", build_state_package_name("zlib-1.3.1-2.azl3"));
        assert_eq!(
            "perl-Version-Requirements",
            build_state_package_name("perl-Version-Requirements-0.101023-1.azl3")
        );
        assert_eq!("python3-pip", build_state_package_name("python3-pip"));
        assert_eq!("libfoo-", build_state_package_name("libfoo-"));
    }

    #[test]
    fn test_lookup_build_state() {
        let entries = [
            ("zlib-devel-1.3.1-2.azl3", "Failed"),
            ("zlib-1.3.1-2.azl3", "Built"),
            ("zlib-1.3-1.azl3", "Failed"),
        ];
        assert_eq!(BuildState::Succeeded, lookup_build_state(entries, "zlib"));
        assert_eq!(BuildState::Failed, lookup_build_state(entries, "zlib-devel"));
        assert_eq!(BuildState::Unknown, lookup_build_state(entries, "xz"));
    }

    #[test]
    fn test_derive_work_status() {
        let upgrade = UpgradeStatus::Upgrade {
            to: "2.0".to_string(),
        };
        let revisit = UpgradeStatus::Revisit(RevisitReason::MissingData);

        assert_eq!(
            WorkStatus::UpToDate,
            WorkStatus::derive(&UpgradeStatus::UpToDate, BuildState::Succeeded)
        );
        assert_eq!(
            WorkStatus::NotStarted,
            WorkStatus::derive(&upgrade, BuildState::Succeeded)
        );
        assert_eq!(
            WorkStatus::NotStarted,
            WorkStatus::derive(&UpgradeStatus::UpToDate, BuildState::Failed)
        );
        assert_eq!(
            WorkStatus::NotStarted,
            WorkStatus::derive(&revisit, BuildState::Unknown)
        );
    }

    #[test]
    fn test_work_status_cells() {
        assert_eq!("NA-Uptodate", WorkStatus::UpToDate.to_string());
        assert_eq!(Some(WorkStatus::PrInReview), WorkStatus::from_cell("PR in Review"));
        assert_eq!(Some(WorkStatus::NotStarted), WorkStatus::from_cell(" Not_Started"));
        assert_eq!(None, WorkStatus::from_cell("Done"));
    }
}
