//! Load AWS profiles from the shared config and credentials files.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::lib::paths;

pub mod ini;

pub use ini::{parse_profile_file, ProfileFileKind, ProfileMap};

/// A profile as offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_process: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_profile: Option<String>,
}

impl ProfileDescriptor {
    /// Descriptor with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            source_profile: None,
            credential_process: None,
            include_profile: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_source_profile(mut self, source_profile: impl Into<String>) -> Self {
        self.source_profile = Some(source_profile.into());
        self
    }
}

/// Locations of the two shared files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSources {
    pub config_file: PathBuf,
    pub credentials_file: PathBuf,
}

impl ProfileSources {
    pub fn new(config_file: PathBuf, credentials_file: PathBuf) -> Self {
        Self {
            config_file,
            credentials_file,
        }
    }

    /// Resolve both files from overrides, falling back to the AWS defaults.
    pub fn resolve(config_file: Option<PathBuf>, credentials_file: Option<PathBuf>) -> Self {
        Self::new(
            config_file.unwrap_or_else(paths::default_aws_config_file),
            credentials_file.unwrap_or_else(paths::default_aws_credentials_file),
        )
    }

    /// Read and merge both files. Never fails; unreadable files count as empty.
    pub fn load(&self) -> Vec<ProfileDescriptor> {
        let config = read_profile_file(&self.config_file, ProfileFileKind::Config);
        let credentials = read_profile_file(&self.credentials_file, ProfileFileKind::Credentials);
        let profiles = merge_profiles(&config, &credentials);
        debug!(
            target: "aws_profile_picker::profiles",
            config_profiles = config.len(),
            credential_profiles = credentials.len(),
            merged = profiles.len(),
            "Loaded AWS profiles"
        );
        profiles
    }
}

/// Merge the two files into the profile list.
///
/// A non-empty config file is the sole source of names; the credentials file
/// only contributes region fallbacks then. An empty config file hands the whole
/// list over to the credentials file.
pub fn merge_profiles(config: &ProfileMap, credentials: &ProfileMap) -> Vec<ProfileDescriptor> {
    let primary = if config.is_empty() {
        credentials
    } else {
        config
    };

    primary
        .iter()
        .map(|(name, properties)| {
            let get = |key: &str| {
                properties
                    .get(key)
                    .filter(|value| !value.is_empty())
                    .cloned()
            };
            let include_profile = config.property(name, "include_profile");
            let region = config
                .property(name, "region")
                .or_else(|| credentials.property(name, "region"))
                .or_else(|| include_profile.and_then(|include| config.property(include, "region")))
                .map(str::to_string);

            ProfileDescriptor {
                name: name.to_string(),
                region,
                source_profile: get("source_profile"),
                credential_process: get("credential_process"),
                include_profile: get("include_profile"),
            }
        })
        .collect()
}

fn read_profile_file(path: &Path, kind: ProfileFileKind) -> ProfileMap {
    match fs::read_to_string(path) {
        Ok(contents) => parse_profile_file(&contents, kind),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(
                target: "aws_profile_picker::profiles",
                path = %path.display(),
                file = kind.as_str(),
                "AWS file not found; treating as empty"
            );
            ProfileMap::default()
        }
        Err(err) => {
            warn!(
                target: "aws_profile_picker::profiles",
                path = %path.display(),
                file = kind.as_str(),
                reason = %err,
                "Failed to read AWS file; treating as empty"
            );
            ProfileMap::default()
        }
    }
}
