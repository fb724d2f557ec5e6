use std::collections::BTreeSet;

use crate::constants::DEFAULT_DIST_TAG;

/// Settings for one run of [`super::analyze_packages`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub(crate) dist_tag: String,
    pub(crate) refresh_upstream: bool,
    pub(crate) skip_packages: BTreeSet<String>,
}

impl AnalysisConfig {
    pub fn new() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            inner: AnalysisConfig::default(),
        }
    }

    /// Release suffix identifying the upstream distribution release, e.g. `.fc41`
    pub fn dist_tag(&self) -> &str {
        &self.dist_tag
    }

    /// Whether upstream versions are looked up again instead of taken from the inventory
    pub fn refresh_upstream(&self) -> bool {
        self.refresh_upstream
    }

    pub fn is_skipped(&self, package: &str) -> bool {
        self.skip_packages.contains(package)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dist_tag: DEFAULT_DIST_TAG.to_string(),
            refresh_upstream: true,
            skip_packages: BTreeSet::new(),
        }
    }
}

pub struct AnalysisConfigBuilder {
    inner: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn dist_tag<T: Into<String>>(mut self, dist_tag: T) -> Self {
        self.inner.dist_tag = dist_tag.into();
        self
    }

    pub fn refresh_upstream(mut self, refresh: bool) -> Self {
        self.inner.refresh_upstream = refresh;
        self
    }

    pub fn skip_package<T: Into<String>>(mut self, package: T) -> Self {
        self.inner.skip_packages.insert(package.into());
        self
    }

    pub fn build(self) -> AnalysisConfig {
        self.inner
    }
}

impl From<AnalysisConfigBuilder> for AnalysisConfig {
    fn from(builder: AnalysisConfigBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::new().build();
        assert_eq!(".fc41", config.dist_tag());
        assert!(config.refresh_upstream());
        assert!(!config.is_skipped("kernel"));

        let config: AnalysisConfig = AnalysisConfig::new()
            .dist_tag(".fc42")
            .refresh_upstream(false)
            .skip_package("kernel")
            .skip_package("glibc")
            .into();
        assert_eq!(".fc42", config.dist_tag());
        assert!(!config.refresh_upstream());
        assert!(config.is_skipped("kernel"));
        assert!(config.is_skipped("glibc"));
        assert!(!config.is_skipped("zlib"));
    }
}
