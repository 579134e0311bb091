//! Narrow interfaces to the services around the editor. Network clients live
//! outside this crate; these traits are what they plug into.

pub mod communities;
pub mod image_host;
pub mod issue_tracker;
pub mod map;
pub mod search;

pub use self::image_host::{DataUrlImageHost, ImageFile, ImageHost, ImageUpload};
pub use self::issue_tracker::{
    CreatedIssue, IssueDraft, IssueRequest, IssueTracker, ManualSubmission, Repository,
    SubmissionResult, Submitter,
};
pub use self::map::{LocationListener, MapView};
pub use self::search::{PlaceCandidate, PlaceSearch};
