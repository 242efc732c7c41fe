use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an issue.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IssueStatus {
    #[default]
    New,
    Assigned,
    Accepted,
    Fixed,
    FixedVerified,
    WontfixNotReproducible,
    WontfixIntended,
    WontfixObsolete,
    WontfixInfeasible,
    WontfixUnfortunate,
    Duplicate,
}

impl IssueStatus {
    /// Parses a human-provided status, as typed in a `status:` search constraint.
    ///
    /// Matching ignores case and surrounding whitespace. Resolved states accept
    /// both their short (`verified`, `obsolete`) and long (`fixed_verified`,
    /// `wontfix_obsolete`) spellings. Returns `None` if nothing matches.
    pub fn parse(s: &str) -> Option<Self> {
        let status = match s.trim().to_lowercase().as_str() {
            "new" => IssueStatus::New,
            "assigned" => IssueStatus::Assigned,
            "accepted" => IssueStatus::Accepted,
            "fixed" => IssueStatus::Fixed,
            "verified" | "fixed_verified" => IssueStatus::FixedVerified,
            "not_reproducible" | "wontfix_not_reproducible" => IssueStatus::WontfixNotReproducible,
            "intended" | "wontfix_intended" => IssueStatus::WontfixIntended,
            "obsolete" | "wontfix_obsolete" => IssueStatus::WontfixObsolete,
            "infeasible" | "wontfix_infeasible" => IssueStatus::WontfixInfeasible,
            "unfortunate" | "wontfix_unfortunate" => IssueStatus::WontfixUnfortunate,
            "duplicate" => IssueStatus::Duplicate,
            _ => return None,
        };
        Some(status)
    }

    /// Name shown to users.
    pub fn pretty(&self) -> &'static str {
        match self {
            IssueStatus::New => "New",
            IssueStatus::Assigned => "Assigned",
            IssueStatus::Accepted => "Accepted",
            IssueStatus::Fixed => "Fixed",
            IssueStatus::FixedVerified => "Fixed (Verified)",
            IssueStatus::WontfixNotReproducible => "Won't fix (Not Reproducible)",
            IssueStatus::WontfixIntended => "Won't fix (Intended Behaviour)",
            IssueStatus::WontfixObsolete => "Won't fix (Obsolete)",
            IssueStatus::WontfixInfeasible => "Won't fix (Infeasible)",
            IssueStatus::WontfixUnfortunate => "Won't fix (Unfortunate)",
            IssueStatus::Duplicate => "Duplicate",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pretty())
    }
}

/// Kind of work an issue tracks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IssueType {
    #[default]
    Bug,
    FeatureRequest,
    CustomerIssue,
    InternalCleanup,
    Process,
    Vulnerability,
}

impl IssueType {
    pub fn pretty(&self) -> &'static str {
        match self {
            IssueType::Bug => "Bug",
            IssueType::FeatureRequest => "Feature Request",
            IssueType::CustomerIssue => "Customer Issue",
            IssueType::InternalCleanup => "Internal Cleanup",
            IssueType::Process => "Process",
            IssueType::Vulnerability => "Vulnerability",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pretty())
    }
}

/// The current, denormalized state of an issue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct IssueState {
    pub title: String,
    /// User id of the assignee, if any.
    pub assignee: Option<String>,
    pub kind: IssueType,
    /// 0 (P0, most urgent) to 4 (P4).
    pub priority: i64,
    pub status: IssueStatus,
}

/// An issue as returned by the model service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Issue {
    pub id: i64,
    /// User id of the reporter.
    pub reporter: String,
    /// Creation time, nanoseconds since the Unix epoch.
    pub created: i64,
    /// Time of the most recent update, nanoseconds since the Unix epoch.
    pub last_updated: i64,
    pub current: IssueState,
}

impl Issue {
    /// One-line summary used in lists: `P1 Bug · Assigned · q3k`.
    pub fn summary(&self) -> String {
        let state = &self.current;
        let mut summary = format!("P{} {} · {}", state.priority, state.kind, state.status);
        if let Some(assignee) = &state.assignee {
            summary.push_str(" · ");
            summary.push_str(assignee);
        }
        summary
    }
}
