use tasknest_core::db::open_db_in_memory;
use tasknest_core::{
    CredentialScheme, ListId, ListService, NewTask, SqliteListRepository, SqliteTaskRepository,
    SqliteUserRepository, TaskId, TaskRepository, TaskService, TaskView, UserId, UserService,
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

fn create_list(conn: &rusqlite::Connection, user: UserId, name: &str) -> ListId {
    let service = ListService::new(SqliteListRepository::new(conn), SqliteTaskRepository::new(conn));
    service.create_list(user, name).unwrap().id
}

fn task_service(conn: &rusqlite::Connection) -> TaskService<SqliteTaskRepository<'_>, SqliteListRepository<'_>> {
    TaskService::new(SqliteTaskRepository::new(conn), SqliteListRepository::new(conn))
}

fn create(
    service: &TaskService<SqliteTaskRepository<'_>, SqliteListRepository<'_>>,
    user: UserId,
    list: ListId,
    title: &str,
    parent: Option<TaskId>,
) -> TaskView {
    service
        .create_task(
            user,
            &NewTask {
                list_id: list,
                title: title.to_string(),
                parent_id: parent,
                ..NewTask::default()
            },
        )
        .unwrap()
}

fn completed(conn: &rusqlite::Connection, id: TaskId) -> bool {
    SqliteTaskRepository::new(conn)
        .get_task(id)
        .unwrap()
        .unwrap()
        .completed
}

#[test]
fn checking_a_task_completes_every_descendant() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let top = create(&service, user, list, "Top", None);
    let child_a = create(&service, user, list, "Child A", Some(top.id));
    let child_b = create(&service, user, list, "Child B", Some(top.id));
    let grandchild = create(&service, user, list, "Grandchild", Some(child_a.id));

    let toggled = service.toggle_task(user, top.id).unwrap();
    assert!(toggled.completed);
    assert!(completed(&conn, child_a.id));
    assert!(completed(&conn, child_b.id));
    assert!(completed(&conn, grandchild.id));
}

#[test]
fn checking_the_last_sibling_completes_the_parent() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let parent = create(&service, user, list, "Parent", None);
    let first = create(&service, user, list, "First", Some(parent.id));
    let second = create(&service, user, list, "Second", Some(parent.id));

    service.toggle_task(user, first.id).unwrap();
    // One sibling still open; the parent must stay incomplete.
    assert!(!completed(&conn, parent.id));

    service.toggle_task(user, second.id).unwrap();
    assert!(completed(&conn, parent.id));
}

#[test]
fn upward_completion_propagates_through_multiple_levels() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let root = create(&service, user, list, "Root", None);
    let middle = create(&service, user, list, "Middle", Some(root.id));
    let leaf_a = create(&service, user, list, "Leaf A", Some(middle.id));
    let leaf_b = create(&service, user, list, "Leaf B", Some(middle.id));

    service.toggle_task(user, leaf_a.id).unwrap();
    assert!(!completed(&conn, middle.id));
    assert!(!completed(&conn, root.id));

    service.toggle_task(user, leaf_b.id).unwrap();
    assert!(completed(&conn, middle.id));
    assert!(completed(&conn, root.id));
}

#[test]
fn incomplete_cousin_blocks_upward_propagation_midway() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let root = create(&service, user, list, "Root", None);
    let branch = create(&service, user, list, "Branch", Some(root.id));
    let leaf = create(&service, user, list, "Leaf", Some(branch.id));
    let open_cousin = create(&service, user, list, "Open cousin", Some(root.id));

    service.toggle_task(user, leaf.id).unwrap();
    // The branch is fully done, but the root still has an open child.
    assert!(completed(&conn, branch.id));
    assert!(!completed(&conn, root.id));
    assert!(!completed(&conn, open_cousin.id));
}

#[test]
fn unchecking_leaves_descendants_untouched() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let top = create(&service, user, list, "Top", None);
    let child = create(&service, user, list, "Child", Some(top.id));
    let grandchild = create(&service, user, list, "Grandchild", Some(child.id));

    service.toggle_task(user, top.id).unwrap();
    let toggled = service.toggle_task(user, top.id).unwrap();

    assert!(!toggled.completed);
    assert!(completed(&conn, child.id));
    assert!(completed(&conn, grandchild.id));
}

#[test]
fn unchecking_uncompletes_every_completed_ancestor() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let root = create(&service, user, list, "Root", None);
    let middle = create(&service, user, list, "Middle", Some(root.id));
    let leaf_a = create(&service, user, list, "Leaf A", Some(middle.id));
    let leaf_b = create(&service, user, list, "Leaf B", Some(middle.id));

    service.toggle_task(user, root.id).unwrap();
    assert!(completed(&conn, leaf_a.id));
    assert!(completed(&conn, leaf_b.id));

    service.toggle_task(user, leaf_a.id).unwrap();
    // Ancestors flip back even though leaf B is still complete.
    assert!(!completed(&conn, middle.id));
    assert!(!completed(&conn, root.id));
    assert!(completed(&conn, leaf_b.id));
}

#[test]
fn check_then_uncheck_round_trip_over_a_mixed_tree() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    // A -> B -> {C, D}
    let a = create(&service, user, list, "A", None);
    let b = create(&service, user, list, "B", Some(a.id));
    let c = create(&service, user, list, "C", Some(b.id));
    let d = create(&service, user, list, "D", Some(b.id));

    service.toggle_task(user, c.id).unwrap();
    assert!(completed(&conn, c.id));
    assert!(!completed(&conn, b.id));

    service.toggle_task(user, d.id).unwrap();
    assert!(completed(&conn, b.id));
    assert!(completed(&conn, a.id));

    service.toggle_task(user, d.id).unwrap();
    assert!(!completed(&conn, d.id));
    assert!(!completed(&conn, b.id));
    assert!(!completed(&conn, a.id));
    assert!(completed(&conn, c.id));
}

#[test]
fn toggle_reports_final_state_in_the_returned_view() {
    let conn = setup();
    let user = register_user(&conn, "alice");
    let list = create_list(&conn, user, "Inbox");
    let service = task_service(&conn);

    let top = create(&service, user, list, "Top", None);
    let child = create(&service, user, list, "Child", Some(top.id));

    let checked = service.toggle_task(user, top.id).unwrap();
    assert!(checked.completed);
    let nested = checked.subtasks.unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].id, child.id);
    assert!(nested[0].completed);

    let unchecked = service.toggle_task(user, top.id).unwrap();
    assert!(!unchecked.completed);
    assert!(unchecked.subtasks.unwrap()[0].completed);
}
