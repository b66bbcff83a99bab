//! Parser for the AWS shared config and credentials file syntax.
//!
//! Only profile sections are kept. In the config file those are `[default]`
//! and `[profile <name>]`; in the credentials file they are `[<name>]`. Other
//! sections (`[sso-session x]`, `[services x]`) are skipped.

use std::collections::BTreeMap;

use tracing::warn;

const DEFAULT: &str = "default";
const PROFILE_PREFIX: &str = "profile";

/// Which of the two shared files is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFileKind {
    Config,
    Credentials,
}

impl ProfileFileKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProfileFileKind::Config => "config",
            ProfileFileKind::Credentials => "credentials",
        }
    }
}

/// Properties of a single profile section.
pub type Properties = BTreeMap<String, String>;

/// Profiles of one file, in the order they first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMap {
    entries: Vec<(String, Properties)>,
}

impl ProfileMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&Properties> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, properties)| properties)
    }

    /// Non-empty value of `key` in profile `name`.
    pub fn property(&self, name: &str, key: &str) -> Option<&str> {
        self.get(name)
            .and_then(|properties| properties.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Properties)> {
        self.entries
            .iter()
            .map(|(name, properties)| (name.as_str(), properties))
    }

    fn entry_mut(&mut self, name: &str) -> &mut Properties {
        let index = match self.entries.iter().position(|(entry, _)| entry == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), Properties::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

enum Section {
    /// Before the first header.
    Preamble,
    Profile(String),
    Skipped,
}

/// Parse one shared file. Malformed lines are skipped with a warning.
pub fn parse_profile_file(contents: &str, kind: ProfileFileKind) -> ProfileMap {
    let mut profiles = ProfileMap::default();
    let mut section = Section::Preamble;
    let mut last_key: Option<String> = None;

    for (index, raw_line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if raw_line.starts_with([' ', '\t']) {
            // Continuation of the previous property (nested sub-properties).
            if let (Section::Profile(name), Some(key)) = (&section, &last_key) {
                if let Some(value) = profiles.entry_mut(name).get_mut(key) {
                    value.push('\n');
                    value.push_str(trimmed);
                }
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            last_key = None;
            section = match rest.find(']') {
                Some(end) => classify_section(&rest[..end], kind, line_number),
                None => {
                    warn!(
                        target: "aws_profile_picker::profiles",
                        file = kind.as_str(),
                        line = line_number,
                        "section header is missing `]`; skipping section"
                    );
                    Section::Skipped
                }
            };
            if let Section::Profile(name) = &section {
                profiles.entry_mut(name);
            }
            continue;
        }

        let name = match &section {
            Section::Profile(name) => name,
            Section::Skipped => continue,
            Section::Preamble => {
                warn!(
                    target: "aws_profile_picker::profiles",
                    file = kind.as_str(),
                    line = line_number,
                    "property found before any section header; ignoring"
                );
                continue;
            }
        };

        let Some((key, value)) = trimmed.split_once('=') else {
            warn!(
                target: "aws_profile_picker::profiles",
                file = kind.as_str(),
                line = line_number,
                "expected `key = value`; ignoring line"
            );
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = strip_inline_comment(value.trim());
        profiles
            .entry_mut(name)
            .insert(key.to_string(), value.to_string());
        last_key = Some(key.to_string());
    }

    profiles
}

fn classify_section(header: &str, kind: ProfileFileKind, line_number: usize) -> Section {
    let header = header.trim();
    if header == DEFAULT {
        return Section::Profile(DEFAULT.to_string());
    }

    let name = match (header.split_once(char::is_whitespace), kind) {
        (Some((PROFILE_PREFIX, suffix)), ProfileFileKind::Config) => suffix.trim(),
        (Some((PROFILE_PREFIX, suffix)), ProfileFileKind::Credentials) => {
            warn!(
                target: "aws_profile_picker::profiles",
                line = line_number,
                profile = suffix.trim(),
                "credential profiles must not begin with `profile`; ignoring section"
            );
            return Section::Skipped;
        }
        // `[sso-session x]`, `[services x]` and friends.
        (Some(_), _) => return Section::Skipped,
        (None, ProfileFileKind::Credentials) => header,
        (None, ProfileFileKind::Config) => {
            warn!(
                target: "aws_profile_picker::profiles",
                line = line_number,
                profile = header,
                "config profiles must be of the form `[profile <name>]`; ignoring section"
            );
            return Section::Skipped;
        }
    };

    if !is_valid_identifier(name) {
        warn!(
            target: "aws_profile_picker::profiles",
            line = line_number,
            profile = name,
            "profile name is not a valid identifier; ignoring section"
        );
        return Section::Skipped;
    }
    Section::Profile(name.to_string())
}

/// Identifiers must match `[A-Za-z0-9_\-/.%@:+]+`.
fn is_valid_identifier(input: &str) -> bool {
    !input.is_empty()
        && input.chars().all(|ch| {
            ch.is_ascii_alphanumeric() || ['_', '-', '/', '.', '%', '@', ':', '+'].contains(&ch)
        })
}

/// `#` and `;` start a comment only when preceded by whitespace.
fn strip_inline_comment(value: &str) -> &str {
    let mut previous_is_space = false;
    for (index, ch) in value.char_indices() {
        if previous_is_space && (ch == '#' || ch == ';') {
            return value[..index].trim_end();
        }
        previous_is_space = ch.is_whitespace();
    }
    value
}
