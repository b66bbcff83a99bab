use tracing::{debug, info};

use super::{PickerConfig, CONFIG_ENV_KEY};

pub fn log_source(path: &std::path::Path, origin: &'static str) {
    if origin == "default" {
        debug!(
            target: "aws_profile_picker::config",
            path = %path.display(),
            env = CONFIG_ENV_KEY,
            "No settings path given; using the default location"
        );
    } else {
        info!(
            target: "aws_profile_picker::config",
            path = %path.display(),
            origin,
            "Loading settings"
        );
    }
}

pub fn log_loaded(config: &PickerConfig) {
    info!(
        target: "aws_profile_picker::config",
        path = %config.source_path.display(),
        method = config.auth.method.as_str(),
        search_path_entries = config.tools.search_path.len(),
        vault_command = %config.tools.vault_command,
        sso_command = %config.tools.sso_command,
        "Settings loaded successfully"
    );
}
