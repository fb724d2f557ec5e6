use super::collaborators::{PackageMetadataSource, ReleaseEntry};
use crate::constants::UPSTREAM_PACKAGES_URL;
use crate::errors::*;
use crate::version::sort_versions_desc;

/// The upstream build a package should be compared against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamRelease {
    pub version: String,
    /// `None` when the chosen version has no releases listed at all
    pub release: Option<String>,
    /// Whether `release` was built for the requested dist tag. A fallback to the newest
    /// version never is.
    pub matches_dist: bool,
}

impl UpstreamRelease {
    /// Path of the source package below the upstream package tree, when the release is known
    pub fn source_rpm_path(&self, package: &str) -> Option<String> {
        let release = self.release.as_deref()?;
        Some(source_rpm_path(package, &self.version, release))
    }

    /// Download url of the source package, when the release is known
    pub fn source_rpm_url(&self, package: &str) -> Option<String> {
        self.source_rpm_path(package)
            .map(|path| format!("{}/{}", UPSTREAM_PACKAGES_URL, path))
    }
}

/// `{package}/{version}/{release}/src/{package}-{version}-{release}.src.rpm`
pub fn source_rpm_path(package: &str, version: &str, release: &str) -> String {
    format!(
        "{0}/{1}/{2}/src/{0}-{1}-{2}.src.rpm",
        package, version, release
    )
}

/// Find the newest upstream version that was released for `dist_tag`.
///
/// Versions are walked newest first and the first one with a release ending in `dist_tag` wins,
/// taking the most recently published of its matching releases. When no version was ever
/// released for that tag, the most recently published release of the newest version is used
/// instead. Returns `None` when upstream knows no versions of the package.
pub fn resolve_upstream(
    source: &dyn PackageMetadataSource,
    package: &str,
    dist_tag: &str,
) -> Result<Option<UpstreamRelease>, Error> {
    let versions = source.versions(package)?;
    let versions = sort_versions_desc(versions.as_slice());
    let Some(newest) = versions.first() else {
        log::warn!("no upstream versions listed for {}", package);
        return Ok(None);
    };

    let mut newest_releases = None;
    for version in &versions {
        let releases = source.releases(package, version)?;
        log::debug!(
            "{} {}: {} release(s) upstream",
            package,
            version,
            releases.len()
        );

        let matching = releases.iter().filter(|r| r.release.ends_with(dist_tag));
        if let Some(entry) = latest_published(matching) {
            return Ok(Some(UpstreamRelease {
                version: version.clone(),
                release: Some(entry.release.clone()),
                matches_dist: true,
            }));
        }

        if newest_releases.is_none() {
            newest_releases = Some(releases);
        }
    }

    log::info!(
        "no {} release of {}, falling back to the newest version {}",
        dist_tag,
        package,
        newest
    );
    let release = newest_releases
        .as_deref()
        .and_then(|releases| latest_published(releases.iter()))
        .map(|entry| entry.release.clone());

    Ok(Some(UpstreamRelease {
        version: newest.clone(),
        release,
        matches_dist: false,
    }))
}

fn latest_published<'a, I>(releases: I) -> Option<&'a ReleaseEntry>
where
    I: Iterator<Item = &'a ReleaseEntry>,
{
    releases.max_by_key(|entry| entry.published)
}

#[cfg(test)]
mod test {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::analysis::collaborators::{LISTING_TIMESTAMP_FORMAT, MockPackageMetadataSource};

    fn release(name: &str, published: &str) -> ReleaseEntry {
        ReleaseEntry::new(
            name,
            NaiveDateTime::parse_from_str(published, LISTING_TIMESTAMP_FORMAT).unwrap(),
        )
    }

    fn source_with(versions: &'static [&'static str]) -> MockPackageMetadataSource {
        let mut source = MockPackageMetadataSource::new();
        source
            .expect_versions()
            .returning(move |_| Ok(versions.iter().map(|v| v.to_string()).collect()));
        source
    }

    #[test]
    fn test_newest_version_with_matching_release() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source_with(&["1.9", "1.10", "1.2"]);
        source.expect_releases().returning(|_, version| {
            Ok(match version {
                "1.10" => vec![
                    release("1.fc41", "2024-05-01 10:00"),
                    release("2.fc41", "2024-06-01 10:00"),
                    release("2.fc42", "2024-07-01 10:00"),
                ],
                _ => vec![release("1.fc41", "2023-01-01 10:00")],
            })
        });

        let upstream = resolve_upstream(&source, "libfoo", ".fc41")?;
        assert_eq!(
            Some(UpstreamRelease {
                version: "1.10".to_string(),
                release: Some("2.fc41".to_string()),
                matches_dist: true,
            }),
            upstream
        );
        Ok(())
    }

    /// Test that versions only built for a newer dist are skipped
    #[test]
    fn test_skips_versions_without_matching_release() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source_with(&["2.0", "1.5"]);
        source.expect_releases().returning(|_, version| {
            Ok(match version {
                "2.0" => vec![release("1.fc42", "2024-09-01 08:00")],
                "1.5" => vec![release("4.fc41", "2024-03-01 08:00")],
                _ => vec![],
            })
        });

        let upstream = resolve_upstream(&source, "libfoo", ".fc41")?.ok_or("no upstream")?;
        assert_eq!("1.5", upstream.version);
        assert_eq!(Some("4.fc41".to_string()), upstream.release);
        assert!(upstream.matches_dist);
        Ok(())
    }

    #[test]
    fn test_falls_back_to_newest_version() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source_with(&["2.0", "3.0~rc1", "1.0"]);
        source.expect_releases().times(3).returning(|_, version| {
            Ok(match version {
                "3.0~rc1" => vec![
                    release("0.2.fc43", "2024-10-02 08:00"),
                    release("0.1.fc43", "2024-10-01 08:00"),
                ],
                _ => vec![release("1.fc42", "2024-01-01 08:00")],
            })
        });

        let upstream = resolve_upstream(&source, "libfoo", ".fc41")?.ok_or("no upstream")?;
        assert_eq!("3.0~rc1", upstream.version);
        assert_eq!(Some("0.2.fc43".to_string()), upstream.release);
        assert!(!upstream.matches_dist);
        Ok(())
    }

    #[test]
    fn test_no_versions_or_releases() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = source_with(&[]);
        source.expect_releases().never();
        assert_eq!(None, resolve_upstream(&source, "libfoo", ".fc41")?);

        let mut source = source_with(&["1.0"]);
        source.expect_releases().returning(|_, _| Ok(vec![]));
        assert_eq!(
            Some(UpstreamRelease {
                version: "1.0".to_string(),
                release: None,
                matches_dist: false,
            }),
            resolve_upstream(&source, "libfoo", ".fc41")?
        );
        Ok(())
    }

    #[test]
    fn test_source_rpm_location() {
        let upstream = UpstreamRelease {
            version: "1.3.1".to_string(),
            release: Some("2.fc41".to_string()),
            matches_dist: true,
        };
        assert_eq!(
            Some("zlib/1.3.1/2.fc41/src/zlib-1.3.1-2.fc41.src.rpm".to_string()),
            upstream.source_rpm_path("zlib")
        );
        assert_eq!(
            Some(format!(
                "{}/zlib/1.3.1/2.fc41/src/zlib-1.3.1-2.fc41.src.rpm",
                UPSTREAM_PACKAGES_URL
            )),
            upstream.source_rpm_url("zlib")
        );

        let unreleased = UpstreamRelease {
            release: None,
            ..upstream
        };
        assert_eq!(None, unreleased.source_rpm_path("zlib"));
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let mut source = MockPackageMetadataSource::new();
        source.expect_versions().returning(|package| {
            Err(Error::MetadataLookup {
                package: package.to_string(),
                reason: "404".to_string(),
            })
        });

        assert!(matches!(
            resolve_upstream(&source, "libfoo", ".fc41"),
            Err(Error::MetadataLookup { .. })
        ));
    }
}
