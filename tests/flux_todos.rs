use std::time::Duration;

use assert_call::{call, CallRecorder};
use unistate::{
    todos::{TodoAction, TodoActions, TodoListView, TodoStore, RELOAD_DELAY},
    Dispatcher, Scheduler,
};

#[test]
fn todo_app() {
    let mut cr = CallRecorder::new();
    let dispatcher = Dispatcher::new();
    let scheduler = Scheduler::new();
    let store = TodoStore::new();
    let _connection = store.connect(&dispatcher);
    let view = TodoListView::new(&store);
    let actions = TodoActions::new(dispatcher.clone(), scheduler.clone());
    let _log = dispatcher.register_scoped(|a: &TodoAction| call!("{}", unistate::Action::action_type(a)));

    actions.create_todo("Walk dog").unwrap();
    cr.verify("CREATE_TODO");
    assert_eq!(view.lines().len(), 3);

    let id = store.get_all()[2].id;
    actions.delete_todo(id).unwrap();
    cr.verify("DELETE_TODO");
    assert_eq!(view.lines(), vec!["Go Shop \u{2716}", "Pay Bills \u{2716}"]);

    let task = actions.reload_todos().unwrap();
    cr.verify("FETCH_TODO");
    assert!(task.is_pending());

    scheduler.advance(RELOAD_DELAY - Duration::from_millis(1));
    cr.verify(());
    scheduler.advance(Duration::from_millis(1));
    cr.verify("RECEIVE_TODOS");
    assert!(!task.is_pending());
    assert_eq!(
        view.lines(),
        vec!["Go Shop Again \u{2716}", "Sleep \u{2716}"]
    );
    assert_eq!(view.render_count(), 5);
}

#[test]
fn stores_on_one_dispatcher_receive_every_action() {
    let dispatcher = Dispatcher::new();
    let a = TodoStore::new();
    let b = TodoStore::with_todos(Vec::new());
    let _a = a.connect(&dispatcher);
    let _b = b.connect(&dispatcher);

    dispatcher
        .dispatch(&TodoAction::CreateTodo { text: "x".into() })
        .unwrap();
    assert_eq!(a.get_all().len(), 3);
    assert_eq!(b.get_all().len(), 1);
}
