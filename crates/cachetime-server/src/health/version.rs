use serde::{Deserialize, Serialize};

/// Build metadata stamped into the binary at compile time.
///
/// `BUILD_TIME` and `GIT_COMMIT` are read from the build environment and
/// fall back to `unknown` for local builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub build_time: String,
    pub git_commit: String,
    pub version: String,
}

impl BuildInfo {
    pub fn from_build_env() -> Self {
        Self {
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
            git_commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::from_build_env()
    }
}

/// Version block of the health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub build_time: String,
    pub git_commit: String,
    pub language: String,
    pub version: String,
}

impl From<BuildInfo> for VersionInfo {
    fn from(info: BuildInfo) -> Self {
        Self {
            build_time: info.build_time,
            git_commit: info.git_commit,
            language: "rust".to_string(),
            version: info.version,
        }
    }
}
