#![allow(dead_code)]

use std::collections::HashMap;

use pkgvercmp::*;

pub fn cargo_manifest_dir() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn spec_fixture_path(name: &str) -> std::path::PathBuf {
    cargo_manifest_dir().join("test_assets/specs").join(name)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Inventory kept in memory, recording everything written to it
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub rows: Vec<InventoryRow>,
    pub upstream: HashMap<String, (String, String)>,
    pub decisions: HashMap<String, UpgradeStatus>,
}

impl MemoryStore {
    pub fn new(rows: Vec<InventoryRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn decision(&self, package: &str) -> Option<&UpgradeStatus> {
        self.decisions.get(package)
    }
}

impl SpreadsheetStore for MemoryStore {
    fn rows(&self) -> Result<Vec<InventoryRow>, Error> {
        Ok(self.rows.clone())
    }

    fn record_upstream(
        &mut self,
        package: &str,
        version: &str,
        release: &str,
    ) -> Result<(), Error> {
        self.upstream
            .insert(package.to_string(), (version.to_string(), release.to_string()));
        Ok(())
    }

    fn record_decision(&mut self, package: &str, status: &UpgradeStatus) -> Result<(), Error> {
        self.decisions.insert(package.to_string(), status.clone());
        Ok(())
    }
}

/// Upstream metadata served from fixed data. Packages it was never told about fail to look up.
#[derive(Debug, Default)]
pub struct StaticSource {
    versions: HashMap<String, Vec<String>>,
    releases: HashMap<(String, String), Vec<ReleaseEntry>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A package upstream knows about but has never built
    pub fn with_package(mut self, package: &str) -> Self {
        self.versions.entry(package.to_string()).or_default();
        self
    }

    pub fn with_release(
        mut self,
        package: &str,
        version: &str,
        release: &str,
        published: &str,
    ) -> Self {
        let versions = self.versions.entry(package.to_string()).or_default();
        if !versions.iter().any(|v| v == version) {
            versions.push(version.to_string());
        }
        self.releases
            .entry((package.to_string(), version.to_string()))
            .or_default()
            .push(ReleaseEntry::from_listing(release, published).expect("fixture timestamp"));
        self
    }
}

impl PackageMetadataSource for StaticSource {
    fn versions(&self, package: &str) -> Result<Vec<String>, Error> {
        self.versions
            .get(package)
            .cloned()
            .ok_or_else(|| Error::MetadataLookup {
                package: package.to_string(),
                reason: "404 Not Found".to_string(),
            })
    }

    fn releases(&self, package: &str, version: &str) -> Result<Vec<ReleaseEntry>, Error> {
        Ok(self
            .releases
            .get(&(package.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
