//! Dropdown model handed to whatever renders the picker.
use serde::Serialize;

use crate::{
    profiles::ProfileDescriptor,
    session::{ActiveSessionSet, AuthMethod},
};

/// The dropdown only makes sense with a choice to make.
pub const MIN_VISIBLE_PROFILES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIcon {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownEntry {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<SessionIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownView {
    pub selected: Option<String>,
    pub method: AuthMethod,
    pub visible: bool,
    pub entries: Vec<DropdownEntry>,
}

impl DropdownView {
    /// Build the dropdown. Session icons are shown under the vault method only.
    pub fn build(
        profiles: &[ProfileDescriptor],
        selected: Option<&str>,
        sessions: &ActiveSessionSet,
        method: AuthMethod,
    ) -> Self {
        let entries = profiles
            .iter()
            .map(|profile| DropdownEntry {
                name: profile.name.clone(),
                title: profile.name.clone(),
                icon: (method == AuthMethod::Vault).then(|| {
                    if sessions.contains(&profile.name) {
                        SessionIcon::Active
                    } else {
                        SessionIcon::Inactive
                    }
                }),
            })
            .collect();

        Self {
            selected: selected.map(str::to_string),
            method,
            visible: profiles.len() >= MIN_VISIBLE_PROFILES,
            entries,
        }
    }
}
