use std::sync::Arc;

use log::{debug, error, Logger};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::record::{Id, Teacher, TeacherFields};
use crate::service::TeacherService;

/// The department choices offered by the form. The store itself does not
/// constrain the field.
pub const DEPARTMENTS: [&str; 11] = [
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "English",
    "History",
    "Economics",
    "Business Administration",
    "Psychology",
    "Engineering",
];

/// The load state of the teacher list.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// The modal currently open, if any.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Modal {
    Add,
    Edit(Id),
}

/// A transient notification for the presentation layer to display.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Holds the state behind the teachers screen and reacts to the intents
/// the presentation layer emits.
///
/// After a successful write the local list is patched with the record the
/// store returned (append on create, in-place replace on update, removal
/// on delete) instead of re-fetching. Every mutating intent takes
/// `&mut self`, so a second submit cannot start while one is in flight.
pub struct TeachersScreen {
    logger: Arc<Logger>,
    service: TeacherService,
    state: LoadState,
    teachers: Vec<Teacher>,
    search: String,
    department_filter: Option<String>,
    modal: Option<Modal>,
    form: TeacherFields,
    pending_delete: Option<Id>,
    notices: Vec<Notice>,
}

impl TeachersScreen {
    pub fn new(environment: &Environment) -> Self {
        TeachersScreen {
            logger: environment.logger.clone(),
            service: TeacherService::new(environment),
            state: LoadState::Loading,
            teachers: vec![],
            search: String::new(),
            department_filter: None,
            modal: None,
            form: TeacherFields::default(),
            pending_delete: None,
            notices: vec![],
        }
    }

    /// Loads the teacher list from the store. Calling it again after a
    /// failure is the retry action.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;

        match self.service.list().await {
            Ok(teachers) => {
                self.teachers = teachers;
                self.state = LoadState::Loaded;
            }
            Err(error) => {
                error!(self.logger, "Failed to load teachers"; "error" => %error);
                self.state = LoadState::Failed(error.to_string());
                self.notify_error("Failed to load teachers");
            }
        }
    }

    /// The teachers matching the current search term and department
    /// filter. A pure projection of loaded state.
    pub fn filtered(&self) -> Vec<&Teacher> {
        self.teachers
            .iter()
            .filter(|teacher| {
                record_matches(teacher, &self.search, self.department_filter.as_deref())
            })
            .collect()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Selects a department to filter by. An empty selection clears the
    /// filter.
    pub fn set_department_filter(&mut self, department: Option<String>) {
        self.department_filter = department.filter(|department| !department.is_empty());
    }

    /// Opens the add modal with a blank form.
    pub fn open_add(&mut self) {
        self.form = TeacherFields::default();
        self.modal = Some(Modal::Add);
    }

    /// Opens the edit modal prefilled from the local record. Unknown IDs
    /// are ignored.
    pub fn open_edit(&mut self, id: Id) {
        if let Some(teacher) = self.teachers.iter().find(|teacher| teacher.id == id) {
            self.form = TeacherFields::from_record(teacher);
            self.modal = Some(Modal::Edit(id));
        }
    }

    /// Closes the modal and resets the form.
    pub fn cancel(&mut self) {
        self.form = TeacherFields::default();
        self.modal = None;
    }

    /// Submits the open form: create under the add modal, replace under
    /// the edit modal. Validates required presence only; anything beyond
    /// that is the input widgets' business.
    pub async fn submit(&mut self) {
        let modal = match self.modal {
            Some(modal) => modal,
            None => return,
        };

        if let Err(error) = validate_required(&self.form) {
            self.notify_error(error.to_string());
            return;
        }

        match modal {
            Modal::Add => {
                debug!(self.logger, "Creating teacher from form...");

                match self.service.create(self.form.clone()).await {
                    Ok(created) => {
                        self.teachers.push(created);
                        self.cancel();
                        self.notify_success("Teacher added successfully");
                    }
                    Err(error) => {
                        error!(self.logger, "Failed to add teacher"; "error" => %error);
                        self.notify_error("Failed to add teacher");
                    }
                }
            }
            Modal::Edit(id) => {
                debug!(self.logger, "Updating teacher from form..."; "id" => id);

                match self.service.update(id, self.form.clone()).await {
                    Ok(updated) => {
                        if let Some(teacher) =
                            self.teachers.iter_mut().find(|teacher| teacher.id == id)
                        {
                            *teacher = updated;
                        }
                        self.cancel();
                        self.notify_success("Teacher updated successfully");
                    }
                    Err(error) => {
                        error!(self.logger, "Failed to update teacher"; "error" => %error);
                        self.notify_error("Failed to update teacher");
                    }
                }
            }
        }
    }

    /// Marks a teacher for deletion, pending explicit confirmation.
    pub fn request_delete(&mut self, id: Id) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the teacher marked by [`request_delete`]. Without a
    /// pending confirmation this does nothing.
    ///
    /// [`request_delete`]: Self::request_delete
    pub async fn confirm_delete(&mut self) {
        let id = match self.pending_delete.take() {
            Some(id) => id,
            None => return,
        };

        match self.service.delete(id).await {
            Ok(_) => {
                self.teachers.retain(|teacher| teacher.id != id);
                self.notify_success("Teacher deleted successfully");
            }
            Err(error) => {
                error!(self.logger, "Failed to delete teacher"; "id" => id, "error" => %error);
                self.notify_error("Failed to delete teacher");
            }
        }
    }

    /// Drains the queued notices for the presentation layer to display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn department_filter(&self) -> Option<&str> {
        self.department_filter.as_deref()
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub fn pending_delete(&self) -> Option<Id> {
        self.pending_delete
    }

    pub fn form(&self) -> &TeacherFields {
        &self.form
    }

    /// Mutable access for the presentation layer's input handlers.
    pub fn form_mut(&mut self) -> &mut TeacherFields {
        &mut self.form
    }

    fn notify_success(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::Success(message.into()));
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::Error(message.into()));
    }
}

/// Whether a record matches a search term and department filter. The
/// search is a case-insensitive substring match over name, email and
/// department; the department filter is an exact match.
fn record_matches(teacher: &Teacher, search: &str, department: Option<&str>) -> bool {
    let search = search.to_lowercase();

    let matches_search = teacher.name.to_lowercase().contains(&search)
        || teacher.email.to_lowercase().contains(&search)
        || teacher.department.to_lowercase().contains(&search);

    let matches_department = department.map_or(true, |department| teacher.department == department);

    matches_search && matches_department
}

fn validate_required(form: &TeacherFields) -> Result<(), BackendError> {
    let mut fields = vec![];

    if form.name.trim().is_empty() {
        fields.push("name");
    }

    if form.email.trim().is_empty() {
        fields.push("email");
    }

    if form.department.trim().is_empty() {
        fields.push("department");
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(BackendError::FieldsMissing { fields })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::record_matches;
    use crate::record::{Id, Metadata, Teacher};

    fn teacher(id: Id, name: &str, email: &str, department: &str) -> Teacher {
        Teacher {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            department: department.to_owned(),
            hire_date: String::new(),
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let records = vec![
            teacher(1, "Ann", "a@x", "Math"),
            teacher(2, "Bo", "b@x", "Physics"),
        ];

        let matching: Vec<&str> = records
            .iter()
            .filter(|record| record_matches(record, "an", None))
            .map(|record| record.name.as_str())
            .collect();

        assert_eq!(matching, vec!["Ann"]);
    }

    #[test]
    fn department_filter_is_exact() {
        let records = vec![
            teacher(1, "Ann", "a@x", "Math"),
            teacher(2, "Bo", "b@x", "Physics"),
        ];

        let matching: Vec<&str> = records
            .iter()
            .filter(|record| record_matches(record, "", Some("Physics")))
            .map(|record| record.name.as_str())
            .collect();

        assert_eq!(matching, vec!["Bo"]);
    }

    #[test]
    fn search_matches_email_and_department_too() {
        let record = teacher(1, "Ann", "ann@school.edu", "Physics");

        assert!(record_matches(&record, "school", None));
        assert!(record_matches(&record, "phys", None));
        assert!(!record_matches(&record, "chemistry", None));
    }

    proptest! {
        #[test]
        fn empty_search_matches_everything(
            name in "[a-zA-Z ]{0,16}",
            email in "[a-z@.]{0,16}",
            department in "[a-zA-Z ]{0,16}",
        ) {
            let record = teacher(1, &name, &email, &department);

            prop_assert!(record_matches(&record, "", None));
        }

        #[test]
        fn matching_ignores_search_case(name in "[a-zA-Z]{1,12}") {
            let record = teacher(1, &name, "a@x", "Math");

            prop_assert!(record_matches(&record, &name.to_uppercase(), None));
            prop_assert!(record_matches(&record, &name.to_lowercase(), None));
        }

        #[test]
        fn department_filter_requires_equality(
            department in "[a-zA-Z]{1,12}",
            other in "[a-zA-Z]{1,12}",
        ) {
            let record = teacher(1, "Ann", "a@x", &department);

            prop_assert_eq!(
                record_matches(&record, "", Some(other.as_str())),
                department == other
            );
        }
    }
}
