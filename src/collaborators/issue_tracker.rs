use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::codec::stamp;
use crate::data::TagRecord;
use crate::errors::{Error, Result};

pub const DEFAULT_REPO_OWNER: &str = "UAIBIT";
pub const DEFAULT_REPO_NAME: &str = "data";

const FOOTER: &str = "*Submitted via OSM Field Filler*";

#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new_issue_url(&self) -> String {
        format!("https://github.com/{}/{}/issues/new", self.owner, self.name)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Repository {
            owner: DEFAULT_REPO_OWNER.to_string(),
            name: DEFAULT_REPO_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submitter {
    pub name: String,
    pub email: String,
}

/// What the user filled in on the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRequest {
    pub title: String,
    pub description: String,
    /// Line-format text of the record, without its stamp.
    pub osm_data: String,
    pub submitter: Submitter,
}

impl IssueRequest {
    pub fn for_record(record: &TagRecord, osm_data: String) -> IssueRequest {
        IssueRequest {
            title: default_title(record),
            description: String::new(),
            osm_data,
            submitter: Submitter::default(),
        }
    }
}

/// Title and markdown body ready to be posted or copied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedIssue {
    #[serde(rename = "html_url")]
    pub issue_url: String,
    #[serde(rename = "number", default)]
    pub issue_number: Option<u64>,
}

/// Everything needed to open the issue by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualSubmission {
    pub issue_title: String,
    pub issue_body: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Created(CreatedIssue),
    Manual {
        reason: String,
        fallback: ManualSubmission,
    },
}

pub trait IssueTracker {
    fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue>;
}

pub fn default_title(record: &TagRecord) -> String {
    format!("New OSM location: {}", record.name().unwrap_or("New Location"))
}

fn line_value<'a>(osm_data: &'a str, key: &str) -> Option<&'a str> {
    osm_data
        .lines()
        .find_map(|line| line.trim().strip_prefix(key)?.strip_prefix('='))
        .map(|value| value.split('=').next().unwrap_or(value))
        .filter(|value| !value.is_empty())
}

fn map_link(osm_data: &str) -> String {
    match (line_value(osm_data, "lat"), line_value(osm_data, "lon")) {
        (Some(lat), Some(lon)) => format!(
            "**OpenStreetMap Link:** [View on OpenStreetMap](https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=21/{lat}/{lon})\n\n"
        ),
        _ => String::new(),
    }
}

/// Builds the issue body: map link, description, the stamped line text in a
/// code block, then the optional submitter lines.
pub fn draft_issue(request: &IssueRequest) -> Result<IssueDraft> {
    if request.title.trim().is_empty() || request.osm_data.trim().is_empty() {
        return Err(Error::validation("title and OSM data are required"));
    }
    let description = if request.description.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", request.description)
    };
    let submitted_by = if request.submitter.name.is_empty() {
        String::new()
    } else {
        format!("Submitted by: {}", request.submitter.name)
    };
    let contact = if request.submitter.email.is_empty() {
        String::new()
    } else {
        format!("Contact: {}", request.submitter.email)
    };
    let body = format!(
        "## OSM Location Data\n{}{}\n```\n{}\n```\n\n{}\n{}\n{}",
        map_link(&request.osm_data),
        description,
        stamp::append(&request.osm_data),
        submitted_by,
        contact,
        FOOTER,
    );
    Ok(IssueDraft {
        title: request.title.clone(),
        body,
    })
}

pub fn decode_created_issue(body: &str) -> Result<CreatedIssue> {
    serde_json::from_str(body)
        .map_err(|err| Error::upstream(format!("unreadable issue response: {}", err)))
}

/// Tries the tracker; without one (no credentials) or on failure, hands back
/// the draft for manual submission.
pub fn submit(
    tracker: Option<&dyn IssueTracker>,
    repository: &Repository,
    draft: IssueDraft,
) -> SubmissionResult {
    let outcome = match tracker {
        Some(tracker) => tracker.create_issue(&draft),
        None => Err(Error::upstream("issue tracker token is not configured")),
    };
    settle(outcome, repository, draft)
}

pub(crate) fn settle(
    outcome: Result<CreatedIssue>,
    repository: &Repository,
    draft: IssueDraft,
) -> SubmissionResult {
    match outcome {
        Ok(issue) => {
            info!(url = issue.issue_url.as_str(); "Issue created");
            SubmissionResult::Created(issue)
        },
        Err(err) => {
            warn!(err = err.message.as_str(); "Issue creation failed, falling back to manual submission");
            SubmissionResult::Manual {
                reason: err.message,
                fallback: ManualSubmission {
                    issue_title: draft.title,
                    issue_body: draft.body,
                    repo_url: repository.new_issue_url(),
                },
            }
        },
    }
}
