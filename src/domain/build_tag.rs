use crate::error::{DebBuildError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

const TAG_FORMAT: &str = "%Y%m%d%H%M%S";
const TAG_LEN: usize = 14;

/// Timestamp identifying one build run, e.g. `20240101000000`
///
/// The tag is appended to the package version, so every artifact produced by
/// the run carries it in its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTag(String);

impl BuildTag {
    /// Tag for the current local time
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    /// Tag for a given point in time
    pub fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        BuildTag(time.format(TAG_FORMAT).to_string())
    }

    /// Parse a tag given as text (14 ASCII digits)
    pub fn parse(tag: &str) -> Result<Self> {
        if tag.len() != TAG_LEN || !tag.chars().all(|c| c.is_ascii_digit()) {
            return Err(DebBuildError::version(format!(
                "Invalid build tag '{}': expected {} digits",
                tag, TAG_LEN
            )));
        }
        Ok(BuildTag(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a file name belongs to the run with this tag
    pub fn is_in(&self, file_name: &str) -> bool {
        file_name.contains(&self.0)
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
