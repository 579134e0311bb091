//! Editing session for one node.
//!
//! The controller owns the current [`TagRecord`] and switches between two
//! editing modes:
//!
//! ```text
//!            enter_manual_mode (snapshot line text)
//!   Form  ─────────────────────────────────────────▶  Manual
//!         ◀─────────────────────────────────────────
//!            leave_manual_mode (parse buffer, replace record)
//! ```
//!
//! In form mode every edit goes straight into the record. In manual mode the
//! text buffer is the source of truth and structured edits are refused until
//! the buffer parses again. A failed parse never touches the record.
//!
//! Replies from slow collaborators (search, image upload, issue submission)
//! arrive through `complete_*` methods carrying the token handed out by the
//! matching `begin_*` call, so an older reply can never overwrite a newer one.

pub mod requests;

use log::{info, warn};

use crate::codec::{line_format, osm_xml, stamp, Format, LineFormat, OsmXml};
use crate::collaborators::issue_tracker::{self, IssueRequest};
use crate::collaborators::search;
use crate::collaborators::{
    CreatedIssue, ImageUpload, IssueDraft, LocationListener, MapView, PlaceCandidate, PlaceSearch,
    Repository, SubmissionResult, Submitter,
};
use crate::config::AppConfig;
use crate::data::catalog::{self, FormField, CBTC_KEY};
use crate::data::osm::{AMENITY, IMAGE, SHOP};
use crate::data::{Coordinate, TagRecord};
use crate::errors::{Error, Result};

use self::requests::{RequestKind, RequestSequencer, RequestToken};

const DESCRIPTION: &str = "description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Form,
    Manual,
}

#[derive(Debug)]
enum Editing {
    Form,
    Manual { buffer: String },
}

/// What happened to a collaborator reply.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Applied,
    /// A newer request of the same kind was started since.
    Superseded,
    /// The field changed under the request, or the buffer is being edited by
    /// hand. The value is handed back instead of applied.
    Late { value: String },
    /// The collaborator failed; see `last_error`.
    Failed,
}

/// An image upload in flight, with the `image` tag as it was when it started.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    token: RequestToken,
    baseline: Option<String>,
}

/// The read-only preview card.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub rows: Vec<(String, String)>,
}

pub struct FormController {
    record: TagRecord,
    editing: Editing,
    last_error: Option<Error>,
    fallback: Coordinate,
    generator: String,
    repository: Repository,
    searches: RequestSequencer,
    uploads: RequestSequencer,
    submissions: RequestSequencer,
    search_limit: usize,
    search_results: Vec<PlaceCandidate>,
    submission: Option<SubmissionResult>,
}

impl FormController {
    /// An empty record placed at `fallback`.
    pub fn new(fallback: Coordinate) -> Self {
        FormController {
            record: TagRecord::new(fallback.clone()),
            editing: Editing::Form,
            last_error: None,
            fallback,
            generator: osm_xml::DEFAULT_GENERATOR.to_string(),
            repository: Repository::default(),
            searches: RequestSequencer::new(RequestKind::Search),
            uploads: RequestSequencer::new(RequestKind::ImageUpload),
            submissions: RequestSequencer::new(RequestKind::Submission),
            search_limit: search::DEFAULT_LIMIT,
            search_results: Vec::new(),
            submission: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut controller = FormController::new(config.fallback_coordinate());
        controller.generator = config.generator.clone();
        controller.repository = config.repository();
        controller.search_limit = config.search_limit;
        controller
    }

    pub fn record(&self) -> &TagRecord {
        &self.record
    }

    pub fn mode(&self) -> Mode {
        match self.editing {
            Editing::Form => Mode::Form,
            Editing::Manual { .. } => Mode::Manual,
        }
    }

    /// The raw text being edited, in manual mode only.
    pub fn buffer(&self) -> Option<&str> {
        match &self.editing {
            Editing::Form => None,
            Editing::Manual { buffer } => Some(buffer),
        }
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn search_results(&self) -> &[PlaceCandidate] {
        &self.search_results
    }

    pub fn submission(&self) -> Option<&SubmissionResult> {
        self.submission.as_ref()
    }

    pub fn map_view(&self) -> MapView {
        MapView::for_record(&self.record, &self.fallback)
    }

    /// Records the outcome of a user action so the last failure can be shown.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                let kind = err.kind.to_string();
                warn!(kind = kind.as_str(), err = err.message.as_str(); "Edit rejected");
                self.last_error = Some(err.clone());
            },
        }
        result
    }

    fn require_form(&self) -> Result<()> {
        match self.editing {
            Editing::Form => Ok(()),
            Editing::Manual { .. } => Err(Error::validation(
                "structured editing is disabled while the raw text is being edited",
            )),
        }
    }

    fn check_tag(key: &str, value: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::validation("tag key must not be empty"));
        }
        if key != key.trim() {
            return Err(Error::validation(format!(
                "tag key {:?} has surrounding whitespace",
                key
            )));
        }
        if key == line_format::LAT_KEY || key == line_format::LON_KEY {
            return Err(Error::validation(format!(
                "'{}' is part of the coordinate, not a tag",
                key
            )));
        }
        if key.contains(&['=', '\n', '\r'][..]) || value.contains(&['\n', '\r'][..]) {
            return Err(Error::validation(format!(
                "tag {:?} cannot be written as a single key=value line",
                key
            )));
        }
        Ok(())
    }

    // Form mode edits

    pub fn edit_field(&mut self, field: FormField, value: &str) -> Result<()> {
        self.edit_tag(field.key(), value)
    }

    /// Sets any tag. An empty value keeps the key but leaves it out of every export.
    /// Values are trimmed, as the line format would trim them on the way back.
    pub fn edit_tag(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let result = self
            .require_form()
            .and_then(|_| Self::check_tag(key, value))
            .map(|_| self.record.set(key, value));
        self.settle(result)
    }

    pub fn remove_tag(&mut self, key: &str) -> Result<()> {
        let result = self.require_form().map(|_| {
            self.record.unset(key);
        });
        self.settle(result)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<()> {
        let result = self
            .require_form()
            .and_then(|_| Self::check_tag(key, ""))
            .map(|_| self.record.set_flag(key, value));
        self.settle(result)
    }

    /// Selector behaviour: picking the current value again clears it.
    fn choose(&mut self, key: &str, value: &str) -> Result<()> {
        self.require_form()?;
        let value = value.trim();
        Self::check_tag(key, value)?;
        let value = if self.record.get(key) == Some(value) { "" } else { value };
        info!(key = key, value = value; "Selector changed");
        self.record.set(key, value);
        Ok(())
    }

    pub fn choose_shop(&mut self, value: &str) -> Result<()> {
        let result = self.choose(SHOP, value);
        self.settle(result)
    }

    pub fn choose_amenity(&mut self, value: &str) -> Result<()> {
        let result = self.choose(AMENITY, value);
        self.settle(result)
    }

    /// Sets the shop type without the selector's toggle.
    pub fn set_shop(&mut self, value: &str) -> Result<()> {
        self.edit_tag(SHOP, value)
    }

    pub fn set_amenity(&mut self, value: &str) -> Result<()> {
        self.edit_tag(AMENITY, value)
    }

    pub fn choose_cbtc(&mut self, value: &str) -> Result<()> {
        let result = match catalog::label_for(catalog::CBTC_TYPES, value) {
            Some(_) => self.choose(CBTC_KEY, value),
            None => Err(Error::validation(format!("{:?} is not a CBTC choice", value))),
        };
        self.settle(result)
    }

    /// Typed latitude/longitude inputs. Out-of-range values are refused.
    pub fn edit_coordinate(&mut self, lat: &str, lon: &str) -> Result<()> {
        let result = self.apply_coordinate(lat, lon);
        self.settle(result)
    }

    /// Map click, marker drag or search pick.
    pub fn select_location(&mut self, lat: &str, lon: &str) -> Result<()> {
        info!(lat = lat, lon = lon; "Location selected");
        let result = self.apply_coordinate(lat, lon);
        self.settle(result)
    }

    fn apply_coordinate(&mut self, lat: &str, lon: &str) -> Result<()> {
        self.require_form()?;
        let coordinate = Coordinate::new(lat.trim(), lon.trim());
        coordinate.degrees()?;
        self.record.coordinate = coordinate;
        Ok(())
    }

    // Mode switching

    pub fn enter_manual_mode(&mut self) {
        if let Editing::Form = self.editing {
            let buffer = line_format::to_line_format(&self.record);
            info!(mode = "manual", lines = buffer.lines().count(); "Entered manual mode");
            self.editing = Editing::Manual { buffer };
        }
    }

    pub fn set_buffer(&mut self, text: &str) -> Result<()> {
        let result = match &mut self.editing {
            Editing::Manual { buffer } => {
                *buffer = text.to_string();
                Ok(())
            },
            Editing::Form => Err(Error::validation("raw text can only be edited in manual mode")),
        };
        self.settle(result)
    }

    /// Parses the buffer and, if it is valid, replaces the record with it. On
    /// failure the controller stays in manual mode with the buffer intact.
    pub fn leave_manual_mode(&mut self) -> Result<()> {
        let parsed = match &self.editing {
            Editing::Form => return Ok(()),
            Editing::Manual { buffer } => {
                let (body, _) = stamp::split(buffer);
                parse_valid(&LineFormat, body)
            },
        };
        let result = parsed.map(|record| {
            info!(mode = "form", tags = record.tags().len(); "Manual edits applied");
            self.record = record;
            self.editing = Editing::Form;
        });
        self.settle(result)
    }

    /// Throws away manual edits and regenerates the buffer from the record.
    pub fn reset_to_generated(&mut self) -> Result<()> {
        let generated = line_format::to_line_format(&self.record);
        let result = match &mut self.editing {
            Editing::Manual { buffer } => {
                *buffer = generated;
                Ok(())
            },
            Editing::Form => Err(Error::validation("nothing to reset outside manual mode")),
        };
        self.settle(result)
    }

    // Import and export

    /// Replaces the record with an uploaded document. A trailing integrity
    /// line is dropped; a mismatching one is only logged.
    pub fn import(&mut self, format: &dyn Format, text: &str) -> Result<()> {
        let result = self.require_form().and_then(|_| {
            let (body, digest) = stamp::split(text);
            if let Some(digest) = digest {
                if stamp::digest(body) != digest {
                    warn!(format = format.format_name(); "Integrity stamp does not match imported text");
                }
            }
            parse_valid(format, body)
        });
        let result = result.map(|record| self.record = record);
        self.settle(result)
    }

    pub fn import_xml(&mut self, text: &str) -> Result<()> {
        self.import(&OsmXml::default(), text)
    }

    pub fn import_line_format(&mut self, text: &str) -> Result<()> {
        self.import(&LineFormat, text)
    }

    /// Line text of the record, recomputed on every call.
    pub fn preview_text(&self) -> String {
        line_format::to_line_format(&self.record)
    }

    pub fn preview_xml(&self) -> String {
        osm_xml::to_xml_with_generator(&self.record, &self.generator)
    }

    /// Line text followed by its integrity stamp.
    pub fn export_text(&self) -> String {
        stamp::append(&self.preview_text())
    }

    pub fn summary(&self) -> Summary {
        let mut rows = vec![
            ("Latitude".to_string(), self.record.coordinate.lat.clone()),
            ("Longitude".to_string(), self.record.coordinate.lon.clone()),
        ];
        rows.extend(
            self.record
                .to_ordered_entries()
                .filter(|(key, _)| *key != IMAGE && *key != DESCRIPTION)
                .map(|(key, value)| {
                    let (label, shown) = describe(key, value);
                    (label.to_string(), shown.to_string())
                }),
        );
        Summary {
            title: self.record.display_name().to_string(),
            image: self.record.get(IMAGE).filter(|v| !v.is_empty()).map(String::from),
            description: self.record.get(DESCRIPTION).filter(|v| !v.is_empty()).map(String::from),
            rows,
        }
    }

    // Collaborator replies

    /// Starts a place search. Blank queries clear the results without a request.
    pub fn begin_search(&mut self, query: &str) -> Option<RequestToken> {
        let token = self.searches.issue();
        if query.trim().is_empty() {
            self.search_results.clear();
            return None;
        }
        Some(token)
    }

    pub fn complete_search(
        &mut self,
        token: RequestToken,
        result: Result<Vec<PlaceCandidate>>,
    ) -> UpdateOutcome {
        if !self.searches.is_current(token) {
            return UpdateOutcome::Superseded;
        }
        match result {
            Ok(candidates) => {
                self.search_results = candidates;
                UpdateOutcome::Applied
            },
            Err(err) => {
                self.search_results.clear();
                let _ = self.settle::<()>(Err(Error::upstream(err.message)));
                UpdateOutcome::Failed
            },
        }
    }

    /// Runs a place search through `service` and applies the reply, keeping at
    /// most the configured number of results.
    pub fn search(&mut self, service: &dyn PlaceSearch, query: &str) -> UpdateOutcome {
        match self.begin_search(query) {
            Some(token) => {
                let result = search::run_search(service, query, self.search_limit);
                self.complete_search(token, result)
            },
            None => UpdateOutcome::Applied,
        }
    }

    /// Moves the node to a search result and clears the result list.
    pub fn select_candidate(&mut self, index: usize) -> Result<()> {
        let candidate = match self.search_results.get(index) {
            Some(candidate) => candidate.clone(),
            None => return self.settle(Err(Error::validation(format!("no search result #{}", index)))),
        };
        self.select_location(&candidate.lat, &candidate.lon)?;
        self.search_results.clear();
        Ok(())
    }

    pub fn begin_image_upload(&mut self) -> PendingUpload {
        PendingUpload {
            token: self.uploads.issue(),
            baseline: self.record.get(IMAGE).map(String::from),
        }
    }

    pub fn complete_image_upload(
        &mut self,
        pending: PendingUpload,
        result: Result<ImageUpload>,
    ) -> UpdateOutcome {
        if !self.uploads.is_current(pending.token) {
            return UpdateOutcome::Superseded;
        }
        let upload = match result {
            Ok(upload) => upload,
            Err(err) => {
                let _ = self.settle::<()>(Err(Error::upstream(err.message)));
                return UpdateOutcome::Failed;
            },
        };
        let overwritten = self.record.get(IMAGE) != pending.baseline.as_deref();
        if overwritten || self.mode() == Mode::Manual {
            info!(overwritten = overwritten; "Image upload finished late, not applied");
            return UpdateOutcome::Late { value: upload.url };
        }
        self.record.set(IMAGE, upload.url);
        UpdateOutcome::Applied
    }

    /// Issue title and body for the current record.
    pub fn draft_issue(&mut self, description: &str, submitter: Submitter) -> Result<IssueDraft> {
        let mut request = IssueRequest::for_record(&self.record, self.preview_text());
        request.description = description.to_string();
        request.submitter = submitter;
        let result = issue_tracker::draft_issue(&request);
        self.settle(result)
    }

    pub fn begin_submission(&mut self) -> RequestToken {
        self.submission = None;
        self.submissions.issue()
    }

    /// A failed creation is not an error here: the draft is kept for manual submission.
    pub fn complete_submission(
        &mut self,
        token: RequestToken,
        draft: IssueDraft,
        result: Result<CreatedIssue>,
    ) -> UpdateOutcome {
        if !self.submissions.is_current(token) {
            return UpdateOutcome::Superseded;
        }
        self.submission = Some(issue_tracker::settle(result, &self.repository, draft));
        UpdateOutcome::Applied
    }
}

impl LocationListener for FormController {
    fn on_location_select(&mut self, lat: &str, lon: &str) {
        // Rejections are kept in last_error.
        let _ = self.select_location(lat, lon);
    }
}

/// Row label and shown value on the preview card.
fn describe<'a>(key: &'a str, value: &'a str) -> (&'a str, &'a str) {
    match key {
        SHOP => ("Shop", catalog::label_for(catalog::SHOP_TYPES, value).unwrap_or(value)),
        AMENITY => ("Amenity", catalog::label_for(catalog::AMENITY_TYPES, value).unwrap_or(value)),
        CBTC_KEY => ("CBTC", catalog::label_for(catalog::CBTC_TYPES, value).unwrap_or(value)),
        _ => (FormField::from_key(key).map(FormField::label).unwrap_or(key), value),
    }
}

/// Parses `text` and holds the result to the same rules as form edits, so
/// the record survives the next trip through the line format.
fn parse_valid(format: &dyn Format, text: &str) -> Result<TagRecord> {
    let mut record = format.import(text)?;
    record.coordinate.degrees()?;
    for (key, value) in record.tags() {
        FormController::check_tag(key, value.trim())?;
    }
    let padded: Vec<(String, String)> = record
        .tags()
        .iter()
        .filter(|(_, value)| value.trim() != value.as_str())
        .map(|(key, value)| (key.clone(), value.trim().to_string()))
        .collect();
    for (key, value) in padded {
        record.set(key, value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn controller() -> FormController {
        FormController::new(Coordinate::new("-19.84", "-43.91"))
    }

    #[test]
    fn starts_in_form_mode_at_fallback() {
        let c = controller();
        assert_eq!(c.mode(), Mode::Form);
        assert_eq!(c.buffer(), None);
        assert_eq!(c.preview_text(), "lat=-19.84\nlon=-43.91");
    }

    #[test]
    fn form_edits_show_up_in_preview() {
        let mut c = controller();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        c.choose_amenity("cafe").unwrap();
        c.choose_shop("bakery").unwrap();
        assert_eq!(c.preview_text(), "lat=-19.84\nlon=-43.91\nname=Padaria\nshop=bakery");
        assert!(c.preview_xml().contains(r#"<tag k="shop" v="bakery"/>"#));
    }

    #[test]
    fn choosing_the_same_value_clears_it() {
        let mut c = controller();
        c.choose_shop("bakery").unwrap();
        c.choose_shop("bakery").unwrap();
        assert_eq!(c.record().get(SHOP), Some(""));
        assert_eq!(c.preview_text(), "lat=-19.84\nlon=-43.91");
    }

    #[test]
    fn cbtc_accepts_only_known_choices() {
        let mut c = controller();
        c.choose_cbtc("yes").unwrap();
        assert_eq!(c.record().flag(CBTC_KEY), Some(true));
        assert_eq!(c.choose_cbtc("sometimes").unwrap_err().kind, ErrorKind::Validation);
        assert!(c.last_error().is_some());
    }

    #[test]
    fn tags_that_break_the_line_format_are_refused() {
        let mut c = controller();
        assert!(c.edit_tag("lat", "5").is_err());
        assert!(c.edit_tag("a=b", "c").is_err());
        assert!(c.edit_tag("note", "two\nlines").is_err());
        assert!(c.edit_tag("note", "a=b").is_ok());
    }

    fn manual_round_trip(c: &mut FormController) {
        c.enter_manual_mode();
        c.leave_manual_mode().unwrap();
    }

    #[test]
    fn padded_key_cannot_move_the_node() {
        let mut c = controller();
        assert_eq!(c.edit_tag(" lat", "45").unwrap_err().kind, ErrorKind::Validation);
        assert!(c.edit_tag("name ", "x").is_err());
        assert!(c.edit_tag("note\r", "x").is_err());
        assert!(c.edit_tag("note", "a\rb").is_err());
        manual_round_trip(&mut c);
        assert_eq!(c.record().coordinate, Coordinate::new("-19.84", "-43.91"));
        assert!(c.record().tags().is_empty());
    }

    #[test]
    fn selector_refuses_line_breaks() {
        let mut c = controller();
        c.choose_shop("bakery").unwrap();
        assert!(c.choose_shop("bakery\nlat=80").is_err());
        assert!(c.choose_amenity("cafe\r\nlon=1").is_err());
        let before = c.record().clone();
        manual_round_trip(&mut c);
        assert_eq!(c.record(), &before);
        assert_eq!(c.record().coordinate, Coordinate::new("-19.84", "-43.91"));
    }

    #[test]
    fn values_are_trimmed_so_manual_mode_is_lossless() {
        let mut c = controller();
        c.edit_tag("name", "Cafe ").unwrap();
        c.edit_field(FormField::Street, "  Rua da Bahia").unwrap();
        assert_eq!(c.record().get("name"), Some("Cafe"));
        let before = c.record().clone();
        manual_round_trip(&mut c);
        assert_eq!(c.record(), &before);
    }

    #[test]
    fn imported_tags_follow_the_same_rules() {
        let mut c = controller();
        let padded = r#"<osm><node lat="1" lon="2"><tag k="name" v=" Cafe "/></node></osm>"#;
        c.import_xml(padded).unwrap();
        assert_eq!(c.record().get("name"), Some("Cafe"));
        let before = c.record().clone();
        manual_round_trip(&mut c);
        assert_eq!(c.record(), &before);

        let sneaky = r#"<osm><node lat="1" lon="2"><tag k=" lat" v="45"/></node></osm>"#;
        assert_eq!(c.import_xml(sneaky).unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(c.record(), &before);
    }

    #[test]
    fn setters_do_not_toggle() {
        let mut c = controller();
        c.import_line_format("lat=1\nlon=2\nshop=bakery").unwrap();
        c.set_shop("bakery").unwrap();
        assert_eq!(c.record().get(SHOP), Some("bakery"));
        c.set_amenity("cafe").unwrap();
        c.set_amenity("cafe").unwrap();
        assert_eq!(c.record().get(AMENITY), Some("cafe"));
        assert_eq!(c.record().get(SHOP), None);
    }

    #[test]
    fn out_of_range_location_is_rejected() {
        let mut c = controller();
        let err = c.select_location("120", "0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(c.record().coordinate, Coordinate::new("-19.84", "-43.91"));
        c.on_location_select("51.5", "-0.12");
        assert_eq!(c.record().coordinate, Coordinate::new("51.5", "-0.12"));
        assert_eq!(c.map_view().marker, Some((51.5, -0.12)));
    }

    #[test]
    fn manual_round_trip_replaces_record() {
        let mut c = controller();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        c.enter_manual_mode();
        assert_eq!(c.mode(), Mode::Manual);
        assert_eq!(c.buffer(), Some("lat=-19.84\nlon=-43.91\nname=Padaria"));
        assert!(c.edit_field(FormField::Phone, "123").is_err());

        c.set_buffer("lat=-19.85\nlon=-43.92\nname=Padaria Nova\nshop=bakery").unwrap();
        c.leave_manual_mode().unwrap();
        assert_eq!(c.mode(), Mode::Form);
        assert_eq!(c.record().get("name"), Some("Padaria Nova"));
        assert_eq!(c.record().coordinate, Coordinate::new("-19.85", "-43.92"));
        assert!(c.last_error().is_none());
    }

    #[test]
    fn corrupt_buffer_keeps_manual_mode() {
        let mut c = controller();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        let before = c.record().clone();
        c.enter_manual_mode();
        c.set_buffer("lat=1.0\nlon=2.0\nfoo").unwrap();

        let err = c.leave_manual_mode().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
        assert_eq!(c.mode(), Mode::Manual);
        assert_eq!(c.buffer(), Some("lat=1.0\nlon=2.0\nfoo"));
        assert_eq!(c.record(), &before);
        assert_eq!(c.last_error().map(|e| e.kind), Some(ErrorKind::MalformedInput));
    }

    #[test]
    fn out_of_range_buffer_keeps_manual_mode() {
        let mut c = controller();
        c.enter_manual_mode();
        c.set_buffer("lat=100\nlon=2").unwrap();
        assert_eq!(c.leave_manual_mode().unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(c.mode(), Mode::Manual);
    }

    #[test]
    fn stamped_buffer_is_accepted() {
        let mut c = controller();
        c.edit_tag("shop", "bakery").unwrap();
        let exported = c.export_text();
        c.enter_manual_mode();
        c.set_buffer(&exported).unwrap();
        c.leave_manual_mode().unwrap();
        assert_eq!(c.record().get("HBTC"), None);
        assert_eq!(c.export_text(), exported);
    }

    #[test]
    fn reset_discards_manual_edits() {
        let mut c = controller();
        assert!(c.reset_to_generated().is_err());
        c.enter_manual_mode();
        c.set_buffer("garbage").unwrap();
        c.reset_to_generated().unwrap();
        assert_eq!(c.buffer(), Some("lat=-19.84\nlon=-43.91"));
    }

    #[test]
    fn failed_import_keeps_record() {
        let mut c = controller();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        let before = c.record().clone();
        assert_eq!(c.import_xml("<osm></osm>").unwrap_err().kind, ErrorKind::MalformedXml);
        assert_eq!(c.import_line_format("lat=1").unwrap_err().kind, ErrorKind::MissingAttribute);
        assert_eq!(c.record(), &before);

        c.import_xml(r#"<osm><node lat="-19.84" lon="-43.91"><tag k="shop" v="bakery"/></node></osm>"#)
            .unwrap();
        assert_eq!(c.record().get("shop"), Some("bakery"));
        assert_eq!(c.record().get("name"), None);
    }

    #[test]
    fn summary_lists_rows() {
        let mut c = controller();
        c.edit_tag("description", "Fresh bread").unwrap();
        c.edit_tag("image", "https://i.ibb.co/x.png").unwrap();
        c.edit_tag("shop", "bakery").unwrap();
        c.edit_field(FormField::OpeningHours, "Mo-Sa 07:00-19:00").unwrap();
        c.edit_tag("wheelchair", "yes").unwrap();
        let summary = c.summary();
        assert_eq!(summary.title, "Unnamed Location");
        assert_eq!(summary.description.as_deref(), Some("Fresh bread"));
        assert_eq!(summary.image.as_deref(), Some("https://i.ibb.co/x.png"));
        assert_eq!(
            summary.rows,
            vec![
                ("Latitude".to_string(), "-19.84".to_string()),
                ("Longitude".to_string(), "-43.91".to_string()),
                ("Shop".to_string(), "Bakery".to_string()),
                ("Opening Hours".to_string(), "Mo-Sa 07:00-19:00".to_string()),
                ("wheelchair".to_string(), "yes".to_string()),
            ]
        );
    }

    fn candidate(lat: &str, name: &str) -> PlaceCandidate {
        PlaceCandidate {
            lat: lat.to_string(),
            lon: "-43.9".to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn older_search_cannot_overwrite_newer() {
        let mut c = controller();
        let first = c.begin_search("praça").unwrap();
        let second = c.begin_search("praça sete").unwrap();
        assert_eq!(
            c.complete_search(second, Ok(vec![candidate("-19.91", "Praça Sete")])),
            UpdateOutcome::Applied
        );
        assert_eq!(
            c.complete_search(first, Ok(vec![candidate("-19.0", "Praça")])),
            UpdateOutcome::Superseded
        );
        assert_eq!(c.search_results()[0].display_name, "Praça Sete");

        c.select_candidate(0).unwrap();
        assert_eq!(c.record().coordinate, Coordinate::new("-19.91", "-43.9"));
        assert!(c.search_results().is_empty());
    }

    struct Places(Vec<PlaceCandidate>);

    impl PlaceSearch for Places {
        fn search(&self, _query: &str, _limit: usize) -> Result<Vec<PlaceCandidate>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn search_keeps_configured_number_of_results() {
        let config = AppConfig {
            search_limit: 2,
            ..AppConfig::default()
        };
        let mut c = FormController::from_config(&config);
        let places = Places(vec![candidate("1", "a"), candidate("2", "b"), candidate("3", "c")]);
        assert_eq!(c.search(&places, "praça"), UpdateOutcome::Applied);
        assert_eq!(c.search_results().len(), 2);
        assert_eq!(c.search(&places, " "), UpdateOutcome::Applied);
        assert!(c.search_results().is_empty());
    }

    #[test]
    fn blank_search_supersedes_pending() {
        let mut c = controller();
        let pending = c.begin_search("praça").unwrap();
        assert_eq!(c.begin_search("  "), None);
        assert_eq!(
            c.complete_search(pending, Ok(vec![candidate("1", "x")])),
            UpdateOutcome::Superseded
        );
        assert!(c.search_results().is_empty());
    }

    #[test]
    fn failed_search_is_reported() {
        let mut c = controller();
        let token = c.begin_search("praça").unwrap();
        assert_eq!(
            c.complete_search(token, Err(Error::new(ErrorKind::Io, "timed out"))),
            UpdateOutcome::Failed
        );
        assert_eq!(
            c.last_error().map(|e| e.kind),
            Some(ErrorKind::UpstreamUnavailable)
        );
    }

    fn upload(url: &str) -> Result<ImageUpload> {
        Ok(ImageUpload { url: url.to_string() })
    }

    #[test]
    fn image_upload_applies_to_current_record() {
        let mut c = controller();
        let pending = c.begin_image_upload();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        assert_eq!(c.complete_image_upload(pending, upload("https://img/1.png")), UpdateOutcome::Applied);
        assert_eq!(c.record().get(IMAGE), Some("https://img/1.png"));
        assert_eq!(c.record().get("name"), Some("Padaria"));
    }

    #[test]
    fn image_upload_is_late_after_manual_overwrite() {
        let mut c = controller();
        let pending = c.begin_image_upload();
        c.edit_tag(IMAGE, "https://elsewhere/photo.jpg").unwrap();
        assert_eq!(
            c.complete_image_upload(pending, upload("https://img/1.png")),
            UpdateOutcome::Late { value: "https://img/1.png".to_string() }
        );
        assert_eq!(c.record().get(IMAGE), Some("https://elsewhere/photo.jpg"));
    }

    #[test]
    fn image_upload_is_late_in_manual_mode() {
        let mut c = controller();
        let pending = c.begin_image_upload();
        c.enter_manual_mode();
        assert!(matches!(
            c.complete_image_upload(pending, upload("https://img/1.png")),
            UpdateOutcome::Late { .. }
        ));
        assert_eq!(c.record().get(IMAGE), None);
    }

    #[test]
    fn newer_upload_wins() {
        let mut c = controller();
        let first = c.begin_image_upload();
        let second = c.begin_image_upload();
        assert_eq!(c.complete_image_upload(second, upload("https://img/2.png")), UpdateOutcome::Applied);
        assert_eq!(c.complete_image_upload(first, upload("https://img/1.png")), UpdateOutcome::Superseded);
        assert_eq!(c.record().get(IMAGE), Some("https://img/2.png"));
    }

    #[test]
    fn failed_submission_falls_back_to_manual() {
        let mut c = controller();
        c.edit_field(FormField::Name, "Padaria").unwrap();
        let draft = c.draft_issue("", Submitter::default()).unwrap();
        assert_eq!(draft.title, "New OSM location: Padaria");
        let token = c.begin_submission();
        let outcome = c.complete_submission(token, draft.clone(), Err(Error::upstream("rate limited")));
        assert_eq!(outcome, UpdateOutcome::Applied);
        match c.submission() {
            Some(SubmissionResult::Manual { fallback, .. }) => {
                assert_eq!(fallback.issue_body, draft.body);
                assert!(fallback.issue_body.contains(&c.export_text()));
            },
            other => panic!("expected manual fallback, got {:?}", other),
        }
    }
}
