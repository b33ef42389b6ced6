// ── Business → station editor ──
//
// Headless state for the settings screen. Intents mutate local view state
// and may return a `Request`; the caller runs it through `perform` and
// hands the `Outcome` back to `apply`. Cached lists only change after the
// server has confirmed a mutation.

mod notice;
mod requests;

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use linetrack_api::{Business, RecordId, Station};

pub use notice::{Confirmation, Notice, NoticeLevel};
pub use requests::{Outcome, Request, perform};

const MSG_BUSINESS_EMPTY: &str = "Business name cannot be empty.";
const MSG_STATION_EMPTY: &str = "Station name cannot be empty.";
const MSG_SELECT_BUSINESS: &str = "Please select a business first.";

/// Case-insensitive name ordering used for station lists.
///
/// Folding is Unicode lowercase, but the comparison is by code point, not
/// collation: accented initials ("Émile") sort after every ASCII letter.
/// Names equal ignoring case fall back to a reversed byte comparison so
/// lowercase sorts ahead of uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// The editable text fields on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    /// Rename field of the expanded business.
    BusinessName,
    /// Rename field of the station in edit mode.
    StationName,
    NewBusiness,
    NewStation,
}

/// State of the business → station editor.
#[derive(Debug, Default)]
pub struct SettingsEditor {
    businesses: Vec<Business>,
    stations: HashMap<RecordId, Vec<Station>>,
    loaded: bool,

    expanded: Option<RecordId>,
    editing_station: Option<RecordId>,
    show_add_station: bool,
    show_add_business: bool,

    business_name: String,
    station_name: String,
    new_business_name: String,
    new_station_name: String,

    pending_confirm: Option<Confirmation>,
    notices: VecDeque<Notice>,
    retry: Option<Request>,
}

impl SettingsEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request issued when the screen is first shown.
    pub fn mount(&mut self) -> Request {
        self.loaded = false;
        Request::ListBusinesses
    }

    // ── View accessors ───────────────────────────────────────────────

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    /// Whether the business list has been answered at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Cached stations of `business_id`, if they were ever loaded.
    pub fn stations(&self, business_id: &RecordId) -> Option<&[Station]> {
        self.stations.get(business_id).map(Vec::as_slice)
    }

    pub fn expanded(&self) -> Option<&RecordId> {
        self.expanded.as_ref()
    }

    pub fn expanded_business(&self) -> Option<&Business> {
        let id = self.expanded.as_ref()?;
        self.businesses.iter().find(|b| &b.id == id)
    }

    /// Stations of the expanded business.
    pub fn expanded_stations(&self) -> &[Station] {
        self.expanded
            .as_ref()
            .and_then(|id| self.stations(id))
            .unwrap_or_default()
    }

    pub fn editing_station(&self) -> Option<&RecordId> {
        self.editing_station.as_ref()
    }

    pub fn show_add_station(&self) -> bool {
        self.show_add_station
    }

    pub fn show_add_business(&self) -> bool {
        self.show_add_business
    }

    pub fn input(&self, field: InputField) -> &str {
        match field {
            InputField::BusinessName => &self.business_name,
            InputField::StationName => &self.station_name,
            InputField::NewBusiness => &self.new_business_name,
            InputField::NewStation => &self.new_station_name,
        }
    }

    pub fn input_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::BusinessName => &mut self.business_name,
            InputField::StationName => &mut self.station_name,
            InputField::NewBusiness => &mut self.new_business_name,
            InputField::NewStation => &mut self.new_station_name,
        }
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.pending_confirm.as_ref()
    }

    /// Whether a failed mutation is waiting to be retried.
    pub fn can_retry(&self) -> bool {
        self.retry.is_some()
    }

    pub fn pop_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Expand `business_id`, or collapse it if it is already expanded.
    ///
    /// Expanding reloads the business's stations; collapsing keeps the
    /// cache.
    pub fn toggle_business(&mut self, business_id: &RecordId) -> Option<Request> {
        self.editing_station = None;
        self.station_name.clear();
        self.show_add_station = false;

        if self.expanded.as_ref() == Some(business_id) {
            self.expanded = None;
            return None;
        }

        let name = self
            .businesses
            .iter()
            .find(|b| &b.id == business_id)
            .map(|b| b.name.clone())
            .unwrap_or_default();
        self.business_name = name;
        self.expanded = Some(business_id.clone());
        Some(Request::ListStations {
            business_id: business_id.clone(),
        })
    }

    /// Rename the expanded business to the contents of its rename field.
    pub fn submit_business_rename(&mut self) -> Option<Request> {
        let Some(id) = self.expanded.clone() else {
            self.reject(MSG_SELECT_BUSINESS);
            return None;
        };
        let name = self.business_name.trim();
        if name.is_empty() {
            self.reject(MSG_BUSINESS_EMPTY);
            return None;
        }
        Some(Request::RenameBusiness {
            id,
            name: name.to_owned(),
        })
    }

    /// Put a station of the expanded business into edit mode.
    pub fn begin_edit_station(&mut self, station_id: &RecordId) {
        let Some(station) = self
            .expanded_stations()
            .iter()
            .find(|s| &s.id == station_id)
        else {
            debug!(station = %station_id, "edit requested for station outside expanded business");
            return;
        };
        self.station_name = station.name.clone();
        self.editing_station = Some(station_id.clone());
    }

    pub fn cancel_edit_station(&mut self) {
        self.editing_station = None;
        self.station_name.clear();
    }

    /// Rename the station in edit mode.
    pub fn submit_station_rename(&mut self) -> Option<Request> {
        let (Some(business_id), Some(id)) = (self.expanded.clone(), self.editing_station.clone())
        else {
            self.reject(MSG_SELECT_BUSINESS);
            return None;
        };
        let name = self.station_name.trim();
        if name.is_empty() {
            self.reject(MSG_STATION_EMPTY);
            return None;
        }
        Some(Request::RenameStation {
            id,
            business_id,
            name: name.to_owned(),
        })
    }

    /// Show the new-station field. Refused while no business is expanded.
    pub fn open_add_station(&mut self) -> bool {
        if self.expanded.is_none() {
            self.reject(MSG_SELECT_BUSINESS);
            return false;
        }
        self.show_add_station = true;
        true
    }

    pub fn close_add_station(&mut self) {
        self.show_add_station = false;
    }

    /// Add a station named after the new-station field to the expanded
    /// business.
    pub fn submit_add_station(&mut self) -> Option<Request> {
        let name = self.new_station_name.trim();
        if name.is_empty() {
            self.reject(MSG_STATION_EMPTY);
            return None;
        }
        let name = name.to_owned();
        let Some(business_id) = self.expanded.clone() else {
            self.reject(MSG_SELECT_BUSINESS);
            return None;
        };
        Some(Request::CreateStation { business_id, name })
    }

    pub fn open_add_business(&mut self) {
        self.show_add_business = true;
    }

    pub fn close_add_business(&mut self) {
        self.show_add_business = false;
    }

    pub fn submit_add_business(&mut self) -> Option<Request> {
        let name = self.new_business_name.trim();
        if name.is_empty() {
            self.reject(MSG_BUSINESS_EMPTY);
            return None;
        }
        Some(Request::CreateBusiness {
            name: name.to_owned(),
        })
    }

    /// Ask for confirmation before deleting a station of the expanded
    /// business. Nothing is sent until the confirmation is answered.
    pub fn request_delete_station(&mut self, station_id: &RecordId) {
        let Some(business_id) = self.expanded.clone() else {
            self.reject(MSG_SELECT_BUSINESS);
            return;
        };
        let Some(station) = self
            .expanded_stations()
            .iter()
            .find(|s| &s.id == station_id)
        else {
            debug!(station = %station_id, "delete requested for unknown station");
            return;
        };
        self.pending_confirm = Some(Confirmation::DeleteStation {
            id: station.id.clone(),
            business_id,
            name: station.name.clone(),
        });
    }

    /// Answer the pending confirmation. `true` releases the guarded request.
    pub fn answer_confirmation(&mut self, confirmed: bool) -> Option<Request> {
        let confirmation = self.pending_confirm.take()?;
        if !confirmed {
            debug!(%confirmation, "confirmation declined");
            return None;
        }
        match confirmation {
            Confirmation::DeleteStation {
                id, business_id, ..
            } => Some(Request::DeleteStation { id, business_id }),
        }
    }

    /// Re-issue the last mutation that failed.
    pub fn retry_last_failed(&mut self) -> Option<Request> {
        let request = self.retry.take()?;
        info!(?request, "retrying failed request");
        Some(request)
    }

    // ── Outcomes ─────────────────────────────────────────────────────

    /// Fold a finished request into the editor. Returns a follow-up request
    /// when one is needed (station reload after a rename).
    pub fn apply(&mut self, outcome: Outcome) -> Option<Request> {
        if let Some(err) = outcome.error() {
            let request = outcome.request();
            warn!(?request, error = %err, "editor request failed");
            if request.is_mutation() {
                let notice = Notice::error(failure_message(&request));
                if err.is_retryable() {
                    self.notices.push_back(notice.with_retry());
                    self.retry = Some(request);
                } else {
                    self.notices.push_back(notice);
                    self.retry = None;
                }
            }
            return None;
        }

        if self.retry.as_ref() == Some(&outcome.request()) {
            self.retry = None;
        }

        match outcome {
            Outcome::BusinessesLoaded(Ok(businesses)) => {
                debug!(count = businesses.len(), "businesses loaded");
                self.businesses = businesses;
                self.loaded = true;
                None
            }
            Outcome::StationsLoaded {
                business_id,
                result: Ok(mut stations),
            } => {
                stations.sort_by(|a, b| compare_names(&a.name, &b.name));
                debug!(business = %business_id, count = stations.len(), "stations loaded");
                self.stations.insert(business_id, stations);
                None
            }
            Outcome::BusinessCreated {
                result: Ok(business),
                ..
            } => {
                info!(business = %business.id, name = %business.name, "business created");
                self.businesses.push(business);
                self.new_business_name.clear();
                None
            }
            Outcome::BusinessRenamed {
                id,
                name,
                result: Ok(()),
            } => {
                info!(business = %id, %name, "business renamed");
                if let Some(business) = self.businesses.iter_mut().find(|b| b.id == id) {
                    business.name = name;
                }
                if self.expanded.as_ref() == Some(&id) {
                    self.expanded = None;
                    self.editing_station = None;
                    self.show_add_station = false;
                }
                None
            }
            Outcome::StationCreated {
                business_id,
                name,
                result: Ok(id),
            } => {
                info!(business = %business_id, station = %id, %name, "station created");
                let list = self.stations.entry(business_id.clone()).or_default();
                let at = list.partition_point(|s| compare_names(&s.name, &name) != Ordering::Greater);
                list.insert(
                    at,
                    Station {
                        id,
                        name,
                        business_id: Some(business_id),
                    },
                );
                self.new_station_name.clear();
                None
            }
            Outcome::StationRenamed {
                id,
                business_id,
                name,
                result: Ok(()),
            } => {
                info!(station = %id, %name, "station renamed");
                if self.editing_station.as_ref() == Some(&id) {
                    self.editing_station = None;
                    self.station_name.clear();
                }
                Some(Request::ListStations { business_id })
            }
            Outcome::StationDeleted {
                id,
                business_id,
                result: Ok(()),
            } => {
                info!(station = %id, "station deleted");
                if let Some(list) = self.stations.get_mut(&business_id) {
                    list.retain(|s| s.id != id);
                }
                self.editing_station = None;
                self.station_name.clear();
                self.notices
                    .push_back(Notice::success("Station deleted successfully"));
                None
            }
            // Errors were handled above.
            _ => None,
        }
    }

    fn reject(&mut self, message: &str) {
        debug!(message, "input rejected");
        self.notices.push_back(Notice::warning(message));
    }
}

fn failure_message(request: &Request) -> &'static str {
    match request {
        Request::ListBusinesses | Request::ListStations { .. } => "Failed to load data.",
        Request::CreateBusiness { .. } => "Failed to add business. Please try again.",
        Request::RenameBusiness { .. } => "Failed to update business. Please try again.",
        Request::CreateStation { .. } => "Failed to add station. Please try again.",
        Request::RenameStation { .. } => "Failed to update station. Please try again.",
        Request::DeleteStation { .. } => "Failed to delete station. Please try again.",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use linetrack_api::{CounterRecord, Direction};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::LineBackend;
    use crate::error::CoreError;

    fn business(id: i64, name: &str) -> Business {
        Business {
            id: RecordId::from(id),
            name: name.into(),
        }
    }

    fn station(id: i64, name: &str) -> Station {
        Station {
            id: RecordId::from(id),
            name: name.into(),
            business_id: None,
        }
    }

    fn names(stations: &[Station]) -> Vec<&str> {
        stations.iter().map(|s| s.name.as_str()).collect()
    }

    fn rejected(status: u16) -> CoreError {
        CoreError::Rejected {
            status,
            message: "nope".into(),
        }
    }

    /// Backend fake that records every call and answers from fixed data.
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        stations: Vec<Station>,
        delete_status: Option<u16>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl LineBackend for FakeBackend {
        async fn counter_record(
            &self,
            station: &RecordId,
            direction: Direction,
        ) -> Result<Option<CounterRecord>, CoreError> {
            self.record(format!("counter {station} {direction}"));
            Ok(None)
        }

        async fn list_businesses(&self) -> Result<Vec<Business>, CoreError> {
            self.record("list_businesses".into());
            Ok(vec![business(1, "Line A")])
        }

        async fn create_business(&self, name: &str) -> Result<Business, CoreError> {
            self.record(format!("create_business {name}"));
            Ok(Business {
                id: RecordId::from(9),
                name: name.into(),
            })
        }

        async fn rename_business(&self, id: &RecordId, name: &str) -> Result<(), CoreError> {
            self.record(format!("rename_business {id} {name}"));
            Ok(())
        }

        async fn list_stations(&self, business_id: &RecordId) -> Result<Vec<Station>, CoreError> {
            self.record(format!("list_stations {business_id}"));
            Ok(self.stations.clone())
        }

        async fn create_station(
            &self,
            business_id: &RecordId,
            name: &str,
        ) -> Result<RecordId, CoreError> {
            self.record(format!("create_station {business_id} {name}"));
            Ok(RecordId::from(42))
        }

        async fn rename_station(&self, id: &RecordId, name: &str) -> Result<(), CoreError> {
            self.record(format!("rename_station {id} {name}"));
            Ok(())
        }

        async fn delete_station(&self, id: &RecordId) -> Result<(), CoreError> {
            self.record(format!("delete_station {id}"));
            match self.delete_status {
                None => Ok(()),
                Some(status) => Err(rejected(status)),
            }
        }
    }

    /// Run a request and every follow-up it produces.
    async fn drive<B: LineBackend>(backend: &B, editor: &mut SettingsEditor, request: Request) {
        let mut next = Some(request);
        while let Some(request) = next {
            let outcome = perform(backend, request).await;
            next = editor.apply(outcome);
        }
    }

    /// Editor with "Line A" loaded and expanded over Zeta and Alpha.
    async fn expanded_editor(backend: &FakeBackend) -> SettingsEditor {
        let mut editor = SettingsEditor::new();
        let mount = editor.mount();
        drive(backend, &mut editor, mount).await;
        let expand = editor.toggle_business(&RecordId::from(1)).unwrap();
        drive(backend, &mut editor, expand).await;
        editor
    }

    fn zeta_alpha() -> FakeBackend {
        FakeBackend {
            stations: vec![station(5, "Zeta"), station(6, "Alpha")],
            ..FakeBackend::default()
        }
    }

    #[test]
    fn compare_names_ignores_case() {
        let mut list = vec!["beta", "Alpha", "alpha", "Gamma", "delta"];
        list.sort_by(|a, b| compare_names(a, b));
        assert_eq!(list, vec!["alpha", "Alpha", "beta", "delta", "Gamma"]);
    }

    #[test]
    fn compare_names_folds_non_ascii_case_by_code_point() {
        assert_eq!(compare_names("émile", "Émile"), Ordering::Less);
        let mut list = vec!["Zeta", "Émile", "alpha"];
        list.sort_by(|a, b| compare_names(a, b));
        assert_eq!(list, vec!["alpha", "Zeta", "Émile"]);
    }

    #[tokio::test]
    async fn expanding_loads_and_sorts_stations() {
        let backend = zeta_alpha();
        let editor = expanded_editor(&backend).await;

        assert_eq!(backend.calls(), vec!["list_businesses", "list_stations 1"]);
        assert_eq!(editor.expanded(), Some(&RecordId::from(1)));
        assert_eq!(editor.input(InputField::BusinessName), "Line A");
        assert_eq!(names(editor.expanded_stations()), vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn collapsing_keeps_station_cache() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        assert_eq!(editor.toggle_business(&RecordId::from(1)), None);
        assert_eq!(editor.expanded(), None);
        assert_eq!(
            names(editor.stations(&RecordId::from(1)).unwrap()),
            vec!["Alpha", "Zeta"]
        );
    }

    #[test]
    fn expanding_another_business_moves_cursor() {
        let mut editor = SettingsEditor::new();
        editor.apply(Outcome::BusinessesLoaded(Ok(vec![
            business(1, "Line A"),
            business(2, "Line B"),
        ])));
        editor.toggle_business(&RecordId::from(1));
        editor.apply(Outcome::StationsLoaded {
            business_id: RecordId::from(1),
            result: Ok(vec![station(5, "Press")]),
        });
        editor.begin_edit_station(&RecordId::from(5));
        assert!(editor.editing_station().is_some());

        let request = editor.toggle_business(&RecordId::from(2));
        assert_eq!(
            request,
            Some(Request::ListStations {
                business_id: RecordId::from(2)
            })
        );
        assert_eq!(editor.expanded(), Some(&RecordId::from(2)));
        assert_eq!(editor.editing_station(), None);
        assert_eq!(editor.input(InputField::BusinessName), "Line B");
    }

    #[test]
    fn failed_business_load_leaves_list_empty() {
        let mut editor = SettingsEditor::new();
        let follow = editor.apply(Outcome::BusinessesLoaded(Err(CoreError::Unreachable {
            url: "http://localhost:3334/api/business".into(),
            reason: "refused".into(),
        })));
        assert_eq!(follow, None);
        assert!(editor.businesses().is_empty());
        assert!(!editor.is_loaded());
        assert!(editor.take_notices().is_empty());
        assert!(!editor.can_retry());
    }

    #[tokio::test]
    async fn empty_names_block_requests() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        *editor.input_mut(InputField::BusinessName) = "   ".into();
        assert_eq!(editor.submit_business_rename(), None);

        editor.begin_edit_station(&RecordId::from(5));
        *editor.input_mut(InputField::StationName) = String::new();
        assert_eq!(editor.submit_station_rename(), None);

        *editor.input_mut(InputField::NewStation) = "\t".into();
        assert_eq!(editor.submit_add_station(), None);

        assert_eq!(editor.submit_add_business(), None);

        let messages: Vec<String> = editor.take_notices().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            vec![
                MSG_BUSINESS_EMPTY,
                MSG_STATION_EMPTY,
                MSG_STATION_EMPTY,
                MSG_BUSINESS_EMPTY
            ]
        );
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn add_station_requires_expanded_business() {
        let mut editor = SettingsEditor::new();
        *editor.input_mut(InputField::NewStation) = "Oven".into();
        assert_eq!(editor.submit_add_station(), None);
        let notice = editor.pop_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, MSG_SELECT_BUSINESS);
    }

    #[test]
    fn add_station_field_needs_expanded_business() {
        let mut editor = SettingsEditor::new();
        assert!(!editor.open_add_station());
        assert!(!editor.show_add_station());
        assert_eq!(editor.pop_notice().unwrap().message, MSG_SELECT_BUSINESS);
    }

    #[tokio::test]
    async fn rename_business_updates_in_place_and_collapses() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        *editor.input_mut(InputField::BusinessName) = "  Line Z ".into();
        let request = editor.submit_business_rename().unwrap();
        drive(&backend, &mut editor, request).await;

        assert_eq!(backend.calls().last().unwrap(), "rename_business 1 Line Z");
        assert_eq!(editor.businesses()[0].name, "Line Z");
        assert_eq!(editor.expanded(), None);
    }

    #[test]
    fn rename_business_failure_offers_retry() {
        let mut editor = SettingsEditor::new();
        editor.apply(Outcome::BusinessesLoaded(Ok(vec![business(1, "Line A")])));
        editor.toggle_business(&RecordId::from(1));
        *editor.input_mut(InputField::BusinessName) = "Line Z".into();
        let request = editor.submit_business_rename().unwrap();

        editor.apply(Outcome::BusinessRenamed {
            id: RecordId::from(1),
            name: "Line Z".into(),
            result: Err(rejected(500)),
        });

        assert_eq!(editor.businesses()[0].name, "Line A");
        assert_eq!(editor.expanded(), Some(&RecordId::from(1)));
        let notice = editor.pop_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.retryable);
        assert!(editor.can_retry());
        assert_eq!(editor.retry_last_failed(), Some(request));
        assert!(!editor.can_retry());
    }

    #[test]
    fn client_error_failure_is_not_retryable() {
        let mut editor = SettingsEditor::new();
        editor.apply(Outcome::BusinessCreated {
            name: "Line A".into(),
            result: Err(rejected(409)),
        });

        let notice = editor.pop_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(!notice.retryable);
        assert!(!editor.can_retry());
        assert_eq!(editor.retry_last_failed(), None);
    }

    #[tokio::test]
    async fn rename_station_reloads_from_server() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        editor.begin_edit_station(&RecordId::from(5));
        assert_eq!(editor.input(InputField::StationName), "Zeta");
        *editor.input_mut(InputField::StationName) = "Beta".into();
        let request = editor.submit_station_rename().unwrap();
        drive(&backend, &mut editor, request).await;

        assert_eq!(
            backend.calls(),
            vec![
                "list_businesses",
                "list_stations 1",
                "rename_station 5 Beta",
                "list_stations 1"
            ]
        );
        assert_eq!(editor.editing_station(), None);
    }

    #[tokio::test]
    async fn add_station_inserts_sorted_without_reload() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        assert!(editor.open_add_station());
        *editor.input_mut(InputField::NewStation) = "mixer".into();
        let request = editor.submit_add_station().unwrap();
        drive(&backend, &mut editor, request).await;

        assert_eq!(
            backend.calls(),
            vec!["list_businesses", "list_stations 1", "create_station 1 mixer"]
        );
        assert_eq!(names(editor.expanded_stations()), vec!["Alpha", "mixer", "Zeta"]);
        assert_eq!(editor.expanded_stations()[1].id, RecordId::from(42));
        assert_eq!(editor.input(InputField::NewStation), "");
    }

    #[tokio::test]
    async fn add_business_appends_server_object() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        editor.open_add_business();
        *editor.input_mut(InputField::NewBusiness) = "Line B".into();
        let request = editor.submit_add_business().unwrap();
        drive(&backend, &mut editor, request).await;

        let last = editor.businesses().last().unwrap();
        assert_eq!(last.id, RecordId::from(9));
        assert_eq!(last.name, "Line B");
        assert_eq!(editor.input(InputField::NewBusiness), "");
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        editor.request_delete_station(&RecordId::from(6));
        let confirmation = editor.pending_confirmation().unwrap();
        assert!(confirmation.to_string().contains("Alpha"));

        assert_eq!(editor.answer_confirmation(false), None);
        assert_eq!(editor.pending_confirmation(), None);
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(editor.expanded_stations().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_station() {
        let backend = zeta_alpha();
        let mut editor = expanded_editor(&backend).await;

        editor.begin_edit_station(&RecordId::from(6));
        editor.request_delete_station(&RecordId::from(6));
        let request = editor.answer_confirmation(true).unwrap();
        drive(&backend, &mut editor, request).await;

        assert_eq!(backend.calls().last().unwrap(), "delete_station 6");
        assert_eq!(names(editor.expanded_stations()), vec!["Zeta"]);
        assert_eq!(editor.editing_station(), None);
        let notice = editor.pop_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Station deleted successfully");
    }

    #[tokio::test]
    async fn delete_failure_keeps_station() {
        let mut backend = zeta_alpha();
        backend.delete_status = Some(204);
        let mut editor = expanded_editor(&backend).await;

        editor.request_delete_station(&RecordId::from(5));
        let request = editor.answer_confirmation(true).unwrap();
        drive(&backend, &mut editor, request).await;

        assert_eq!(names(editor.expanded_stations()), vec!["Alpha", "Zeta"]);
        let notice = editor.pop_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to delete station. Please try again.");
    }

    #[test]
    fn successful_retry_clears_pending_retry() {
        let mut editor = SettingsEditor::new();
        let failed = Outcome::BusinessCreated {
            name: "Line B".into(),
            result: Err(rejected(503)),
        };
        editor.apply(failed);
        assert!(editor.can_retry());

        let request = editor.retry_last_failed().unwrap();
        assert_eq!(
            request,
            Request::CreateBusiness {
                name: "Line B".into()
            }
        );
        editor.apply(Outcome::BusinessCreated {
            name: "Line B".into(),
            result: Ok(business(3, "Line B")),
        });
        assert!(!editor.can_retry());
        assert_eq!(editor.businesses().len(), 1);
    }
}
