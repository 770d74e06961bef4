use crate::error::{DebBuildError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Debian package version: `[epoch:]upstream[-revision]`
///
/// Ordering follows dpkg: epochs compare numerically, then the upstream part
/// and the revision with the dpkg string algorithm, where `~` sorts before
/// everything (even the end of the string) and digit runs compare as numbers.
#[derive(Debug, Clone)]
pub struct DebVersion {
    pub epoch: u32,
    pub upstream: String,
    pub revision: Option<String>,
}

impl DebVersion {
    /// Parse a version string
    ///
    /// - "4.18.2" → epoch=0, upstream="4.18.2", revision=None
    /// - "1:4.18.2-3" → epoch=1, upstream="4.18.2", revision=Some("3")
    /// - "4.18.2-1-gaps" → upstream="4.18.2-1", revision=Some("gaps")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let (epoch, rest) = match s.split_once(':') {
            Some((e, r)) => {
                let epoch = e.parse::<u32>().map_err(|_| {
                    DebBuildError::version(format!("Invalid epoch in version '{}'", s))
                })?;
                (epoch, r)
            }
            None => (0, s),
        };

        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((u, r)) => (u, Some(r)),
            None => (rest, None),
        };

        if upstream.is_empty() {
            return Err(DebBuildError::version(format!(
                "Empty upstream version in '{}'",
                s
            )));
        }
        if revision.is_some_and(str::is_empty) {
            return Err(DebBuildError::version(format!(
                "Empty revision in version '{}'",
                s
            )));
        }

        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~' | '-');
        if !upstream.chars().all(allowed)
            || !revision.unwrap_or_default().chars().all(allowed)
        {
            return Err(DebBuildError::version(format!(
                "Invalid character in version '{}'",
                s
            )));
        }

        Ok(DebVersion {
            epoch,
            upstream: upstream.to_string(),
            revision: revision.map(str::to_string),
        })
    }

    /// The version used when no source provides one.
    pub fn fallback() -> Self {
        DebVersion {
            epoch: 0,
            upstream: "0.0.0".to_string(),
            revision: None,
        }
    }

    /// Same version with the Debian revision dropped.
    pub fn without_revision(&self) -> Self {
        DebVersion {
            epoch: self.epoch,
            upstream: self.upstream.clone(),
            revision: None,
        }
    }

    /// Compare two versions with dpkg semantics
    pub fn compare(&self, other: &DebVersion) -> Ordering {
        match self.epoch.cmp(&other.epoch) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match compare_fragment(&self.upstream, &other.upstream) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // A missing revision compares like an empty one
        compare_fragment(
            self.revision.as_deref().unwrap_or(""),
            other.revision.as_deref().unwrap_or(""),
        )
    }
}

/// Sort weight of a single non-digit position.
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

/// dpkg's `verrevcmp` over one version fragment.
fn compare_fragment(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);
    let is_digit = |s: &[u8], k: usize| s.get(k).is_some_and(u8::is_ascii_digit);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !is_digit(a, i)) || (j < b.len() && !is_digit(b, j)) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while is_digit(a, i) && is_digit(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        if is_digit(a, i) {
            return Ordering::Greater;
        }
        if is_digit(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

/// Picks the newer of the two version sources.
///
/// Either source may be absent; an absent source counts as `0.0.0`, so two
/// absent sources reconcile to `0.0.0`.
pub fn reconcile(history: Option<DebVersion>, marker: Option<DebVersion>) -> DebVersion {
    let history = history.unwrap_or_else(DebVersion::fallback);
    let marker = marker.unwrap_or_else(DebVersion::fallback);
    std::cmp::max(history, marker)
}

/// Full package version for a build: `<base>-<suffix><tag>`.
pub fn package_version(base: &DebVersion, suffix: &str, build_tag: &str) -> String {
    format!("{}-{}{}", base.without_revision(), suffix, build_tag)
}

impl fmt::Display for DebVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.upstream)?;
        if let Some(ref revision) = self.revision {
            write!(f, "-{}", revision)?;
        }
        Ok(())
    }
}

impl PartialEq for DebVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for DebVersion {}

impl Ord for DebVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for DebVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
