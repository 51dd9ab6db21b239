use tasknest_core::db::open_db_in_memory;
use tasknest_core::{
    CredentialScheme, ListId, ListService, ListServiceError, NewTask, SqliteListRepository,
    SqliteTaskRepository, SqliteUserRepository, TaskId, TaskRepository, TaskService,
    TaskServiceError, TaskUpdate, UserId, UserService,
};

struct PlainScheme;

impl CredentialScheme for PlainScheme {
    fn derive(&self, password: &str) -> String {
        format!("plain${password}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        stored == format!("plain${password}")
    }
}

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn register_user(conn: &rusqlite::Connection, username: &str) -> UserId {
    let service = UserService::new(SqliteUserRepository::new(conn));
    service
        .register(username, &format!("{username}@example.com"), "pw", &PlainScheme)
        .unwrap()
        .uuid
}

fn list_service(conn: &rusqlite::Connection) -> ListService<SqliteListRepository<'_>, SqliteTaskRepository<'_>> {
    ListService::new(SqliteListRepository::new(conn), SqliteTaskRepository::new(conn))
}

fn task_service(conn: &rusqlite::Connection) -> TaskService<SqliteTaskRepository<'_>, SqliteListRepository<'_>> {
    TaskService::new(SqliteTaskRepository::new(conn), SqliteListRepository::new(conn))
}

// One list with one task owned by alice, plus a registered intruder.
fn seed(conn: &rusqlite::Connection) -> (UserId, UserId, ListId, TaskId) {
    let alice = register_user(conn, "alice");
    let mallory = register_user(conn, "mallory");
    let list = list_service(conn).create_list(alice, "Private").unwrap().id;
    let task = task_service(conn)
        .create_task(
            alice,
            &NewTask {
                list_id: list,
                title: "Secret".to_string(),
                ..NewTask::default()
            },
        )
        .unwrap()
        .id;
    (alice, mallory, list, task)
}

#[test]
fn foreign_list_reads_and_deletes_resolve_as_not_found() {
    let conn = setup();
    let (_alice, mallory, list, _task) = seed(&conn);
    let lists = list_service(&conn);

    let err = lists.get_list_view(mallory, list).unwrap_err();
    assert!(matches!(err, ListServiceError::NotFound(id) if id == list));
    assert_eq!(err.status_code(), 404);

    let err = lists.delete_list(mallory, list).unwrap_err();
    assert!(matches!(err, ListServiceError::NotFound(id) if id == list));
}

#[test]
fn foreign_task_reads_resolve_as_not_found() {
    let conn = setup();
    let (_alice, mallory, _list, task) = seed(&conn);
    let tasks = task_service(&conn);

    let err = tasks.get_task_view(mallory, task, true).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn foreign_task_mutations_resolve_as_not_found_and_change_nothing() {
    let conn = setup();
    let (alice, mallory, _list, task) = seed(&conn);
    let tasks = task_service(&conn);

    let err = tasks
        .update_task(
            mallory,
            task,
            &TaskUpdate {
                title: Some("Hijacked".to_string()),
                ..TaskUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));

    let err = tasks.toggle_task(mallory, task).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));

    let err = tasks.set_collapsed(mallory, task, Some(true)).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));

    let err = tasks.delete_task(mallory, task).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));

    let untouched = tasks.get_task_view(alice, task, false).unwrap();
    assert_eq!(untouched.title, "Secret");
    assert!(!untouched.completed);
    assert!(!untouched.collapsed);
}

#[test]
fn foreign_parent_cannot_anchor_a_new_subtask() {
    let conn = setup();
    let (_alice, mallory, _list, task) = seed(&conn);
    let lists = list_service(&conn);
    let tasks = task_service(&conn);

    let own_list = lists.create_list(mallory, "Mine").unwrap().id;
    let err = tasks
        .create_task(
            mallory,
            &NewTask {
                list_id: own_list,
                title: "Rider".to_string(),
                parent_id: Some(task),
                ..NewTask::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::ParentNotFound(id) if id == task));
}

#[test]
fn move_rejects_foreign_task_and_foreign_destination() {
    let conn = setup();
    let (alice, mallory, list, task) = seed(&conn);
    let lists = list_service(&conn);
    let tasks = task_service(&conn);

    let mallory_list = lists.create_list(mallory, "Mine").unwrap().id;

    // Foreign task, owned destination.
    let err = tasks.move_task(mallory, task, mallory_list).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task));

    // Owned task, foreign destination.
    let err = tasks.move_task(alice, task, mallory_list).unwrap_err();
    assert!(matches!(err, TaskServiceError::ListNotFound(id) if id == mallory_list));

    let untouched = SqliteTaskRepository::new(&conn).get_task(task).unwrap().unwrap();
    assert_eq!(untouched.list_uuid, list);
}
