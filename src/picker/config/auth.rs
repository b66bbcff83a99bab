use std::path::Path;

use serde::Deserialize;

use crate::{lib::errors::ConfigError, session::AuthMethod};

/// Authentication method preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSection {
    pub method: AuthMethod,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawAuthSection {
    pub method: Option<String>,
}

pub fn parse_auth_section(
    raw: Option<RawAuthSection>,
    path: &Path,
) -> Result<AuthSection, ConfigError> {
    let auth_raw = raw.unwrap_or_default();
    let method = match auth_raw.method {
        None => AuthMethod::None,
        Some(value) => value
            .trim()
            .parse::<AuthMethod>()
            .map_err(|message| ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "auth.method",
                message,
            })?,
    };

    Ok(AuthSection { method })
}
