use std::fmt;

use serde::{Deserialize, Serialize};

/// Build metadata captured by `build.rs` at compile time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub build_profile: String,
    pub build_features: String,
    pub version: String,
    pub build_timestamp: String,
    pub rust_version: String,
    pub build_target: String,
}

impl BuildInfo {
    pub fn new(
        build_profile: &str,
        build_features: &str,
        version: &str,
        build_timestamp: &str,
        rust_version: &str,
        build_target: &str,
    ) -> Self {
        Self {
            build_profile: build_profile.to_string(),
            build_features: build_features.to_string(),
            version: version.to_string(),
            build_timestamp: build_timestamp.to_string(),
            rust_version: rust_version.to_string(),
            build_target: build_target.to_string(),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version:   {}", self.version)?;
        writeln!(f, "profile:   {}", self.build_profile)?;
        writeln!(f, "features:  {}", self.build_features)?;
        writeln!(f, "built at:  {}", self.build_timestamp)?;
        writeln!(f, "rustc:     {}", self.rust_version)?;
        write!(f, "target:    {}", self.build_target)
    }
}

/// Build info of this library crate
pub fn build_info() -> BuildInfo {
    crate::build_info!()
}

/// Capture the build info of the crate invoking the macro.
///
/// The invoking crate needs a `build.rs` exporting the same `rustc-env` keys as ours.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo::new(
            env!("BUILD_PROFILE"),
            env!("BUILD_FEATURES"),
            env!("REPO_VERSION"),
            env!("BUILD_TIMESTAMP"),
            env!("RUST_VERSION"),
            env!("BUILD_TARGET"),
        )
    };
}
