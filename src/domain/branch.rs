use crate::config::SourceConfig;

/// Which upstream branch a run builds from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelection {
    Stable(String),
    Next(String),
}

impl BranchSelection {
    /// Select a branch from the configured names
    pub fn from_choice(source: &SourceConfig, use_next: bool) -> Self {
        if use_next {
            BranchSelection::Next(source.next_branch.clone())
        } else {
            BranchSelection::Stable(source.stable_branch.clone())
        }
    }

    /// Branch name in the upstream repository
    pub fn name(&self) -> &str {
        match self {
            BranchSelection::Stable(name) | BranchSelection::Next(name) => name,
        }
    }

    pub fn is_next(&self) -> bool {
        matches!(self, BranchSelection::Next(_))
    }
}
