use std::sync::Arc;

use once_cell::sync::Lazy;

use log::Logger;

use faculty::environment::{Config, Environment};
use faculty::record::{Id, TeacherFields};
use faculty::screen::{LoadState, Modal, Notice, TeachersScreen, DEPARTMENTS};
use faculty::service::TeacherService;
use faculty::store::mock::MockStore;

static LOGGER: Lazy<Arc<Logger>> = Lazy::new(|| Arc::new(log::initialize_logger()));

fn make_environment(store: Arc<MockStore>) -> Environment {
    Environment::new(LOGGER.clone(), store, Config::new(None))
}

async fn seed(environment: &Environment, name: &str, email: &str, department: &str) -> Id {
    let service = TeacherService::new(environment);

    service
        .create(TeacherFields {
            name: name.to_owned(),
            email: email.to_owned(),
            department: department.to_owned(),
            hire_date: String::new(),
        })
        .await
        .expect("seed teacher")
        .id
}

fn fill_form(
    screen: &mut TeachersScreen,
    name: &str,
    email: &str,
    department: &str,
    hire_date: &str,
) {
    let form = screen.form_mut();
    form.name = name.to_owned();
    form.email = email.to_owned();
    form.department = department.to_owned();
    form.hire_date = hire_date.to_owned();
}

#[tokio::test]
async fn loading_fills_the_screen() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    seed(&environment, "Ann", "a@x", "Mathematics").await;
    seed(&environment, "Bo", "b@x", "Physics").await;

    let mut screen = TeachersScreen::new(&environment);
    assert_eq!(*screen.state(), LoadState::Loading);

    screen.load().await;

    assert_eq!(*screen.state(), LoadState::Loaded);
    assert_eq!(screen.teachers().len(), 2);
}

#[tokio::test]
async fn searching_and_filtering_project_the_list() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    seed(&environment, "Ann", "a@x", "Math").await;
    seed(&environment, "Bo", "b@x", "Physics").await;

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.set_search("an");

    let names: Vec<&str> = screen
        .filtered()
        .into_iter()
        .map(|teacher| teacher.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ann"]);

    screen.set_search("");
    screen.set_department_filter(Some("Physics".to_owned()));

    let names: Vec<&str> = screen
        .filtered()
        .into_iter()
        .map(|teacher| teacher.name.as_str())
        .collect();
    assert_eq!(names, vec!["Bo"]);

    // an empty selection clears the filter
    screen.set_department_filter(Some(String::new()));
    assert_eq!(screen.filtered().len(), 2);
}

#[tokio::test]
async fn submitting_the_add_form_appends_locally() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.open_add();
    assert_eq!(screen.modal(), Some(Modal::Add));

    fill_form(
        &mut screen,
        "Grace Hopper",
        "grace@school.edu",
        DEPARTMENTS[0],
        "2019-08-12",
    );
    screen.submit().await;

    assert_eq!(screen.modal(), None);
    assert_eq!(screen.teachers().len(), 1);

    let created = &screen.teachers()[0];
    assert!(created.id > 0);
    assert_eq!(created.department, "Computer Science");

    assert_eq!(
        screen.take_notices(),
        vec![Notice::Success("Teacher added successfully".to_owned())]
    );

    // the record is also visible through a fresh load
    screen.load().await;
    assert_eq!(screen.teachers().len(), 1);
}

#[tokio::test]
async fn submitting_without_required_fields_is_rejected() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.open_add();
    fill_form(&mut screen, "Ann", "", "Math", "");
    screen.submit().await;

    // nothing was written and the modal stays open for correction
    assert_eq!(screen.modal(), Some(Modal::Add));
    assert!(screen.teachers().is_empty());

    match screen.take_notices().as_slice() {
        [Notice::Error(message)] => assert!(message.contains("email")),
        other => panic!("expected one error notice, got {:?}", other),
    }

    screen.load().await;
    assert!(screen.teachers().is_empty());
}

#[tokio::test]
async fn editing_replaces_the_record_in_place() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    let id = seed(&environment, "Ann", "a@x", "Math").await;
    seed(&environment, "Bo", "b@x", "Physics").await;

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.open_edit(id);
    assert_eq!(screen.modal(), Some(Modal::Edit(id)));
    assert_eq!(screen.form().name, "Ann");

    screen.form_mut().department = "Chemistry".to_owned();
    screen.submit().await;

    assert_eq!(screen.modal(), None);
    assert_eq!(screen.teachers().len(), 2);

    let ann = screen
        .teachers()
        .iter()
        .find(|teacher| teacher.id == id)
        .expect("find Ann");
    assert_eq!(ann.department, "Chemistry");

    assert_eq!(
        screen.take_notices(),
        vec![Notice::Success("Teacher updated successfully".to_owned())]
    );
}

#[tokio::test]
async fn failed_updates_keep_local_state_and_notify() {
    let store = Arc::new(MockStore::rejecting("??"));
    let environment = make_environment(store);

    let id = seed(&environment, "Ann", "a@x", "Math").await;

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.open_edit(id);
    screen.form_mut().name = "Ann ??".to_owned();
    screen.submit().await;

    // the modal stays open and the local record is untouched
    assert_eq!(screen.modal(), Some(Modal::Edit(id)));
    assert_eq!(screen.teachers()[0].name, "Ann");

    assert_eq!(
        screen.take_notices(),
        vec![Notice::Error("Failed to update teacher".to_owned())]
    );
}

#[tokio::test]
async fn deleting_requires_confirmation() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store);

    let id = seed(&environment, "Ann", "a@x", "Math").await;

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    screen.request_delete(id);
    assert_eq!(screen.pending_delete(), Some(id));
    assert_eq!(screen.teachers().len(), 1);

    screen.cancel_delete();
    screen.confirm_delete().await;

    // without a pending confirmation nothing happens
    assert_eq!(screen.teachers().len(), 1);
    assert!(screen.take_notices().is_empty());

    screen.request_delete(id);
    screen.confirm_delete().await;

    assert!(screen.teachers().is_empty());
    assert_eq!(
        screen.take_notices(),
        vec![Notice::Success("Teacher deleted successfully".to_owned())]
    );

    let service = TeacherService::new(&environment);
    assert!(service.retrieve(id).await.expect("retrieve").is_none());
}

#[tokio::test]
async fn load_failures_enter_the_error_state_with_retry() {
    let store = Arc::new(MockStore::new());
    let environment = make_environment(store.clone());

    seed(&environment, "Ann", "a@x", "Math").await;

    store.set_unreachable(true);

    let mut screen = TeachersScreen::new(&environment);
    screen.load().await;

    match screen.state() {
        LoadState::Failed(message) => assert!(message.contains("could not reach")),
        other => panic!("expected the failed state, got {:?}", other),
    }
    assert_eq!(
        screen.take_notices(),
        vec![Notice::Error("Failed to load teachers".to_owned())]
    );

    store.set_unreachable(false);

    // retrying is just loading again
    screen.load().await;

    assert_eq!(*screen.state(), LoadState::Loaded);
    assert_eq!(screen.teachers().len(), 1);
}
