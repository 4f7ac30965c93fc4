//! Flux-style todo list.
//!
//! [`TodoActions`] publishes [`TodoAction`]s on a [`Dispatcher`],
//! [`TodoStore`] handles them and emits a change event,
//! and [`TodoListView`] re-renders on each change.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    utils::unix_millis, Action, DispatchError, Dispatcher, Listeners, ScheduledTask, Scheduler,
    Subscription,
};


/// Delay of the simulated fetch started by [`TodoActions::reload_todos`].
pub const RELOAD_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub complete: bool,
}

impl Todo {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            complete: false,
        }
    }

    pub fn icon(&self) -> char {
        if self.complete {
            '\u{2714}'
        } else {
            '\u{2716}'
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoAction {
    CreateTodo { text: String },
    DeleteTodo { id: u64 },
    FetchTodo,
    ReceiveTodos { todos: Vec<Todo> },
}

impl Action for TodoAction {
    fn action_type(&self) -> &str {
        match self {
            TodoAction::CreateTodo { .. } => "CREATE_TODO",
            TodoAction::DeleteTodo { .. } => "DELETE_TODO",
            TodoAction::FetchTodo => "FETCH_TODO",
            TodoAction::ReceiveTodos { .. } => "RECEIVE_TODOS",
        }
    }
}

pub fn initial_todos() -> Vec<Todo> {
    vec![Todo::new(1, "Go Shop"), Todo::new(2, "Pay Bills")]
}

/// The payload delivered by the simulated fetch.
pub fn fetched_todos() -> Vec<Todo> {
    vec![Todo::new(1000, "Go Shop Again"), Todo::new(2000, "Sleep")]
}

/// Owner of the todo list.
///
/// Every mutation replaces the list and emits a change event to the subscribers.
/// [`get_all`](Self::get_all) returns an immutable snapshot.
#[derive(Clone)]
pub struct TodoStore(Rc<TodoStoreNode>);

struct TodoStoreNode {
    todos: RefCell<Rc<[Todo]>>,
    is_loading: Cell<bool>,
    last_id: Cell<u64>,
    changes: RefCell<Listeners<[Todo]>>,
}

impl TodoStore {
    /// Creates a store holding [`initial_todos`].
    pub fn new() -> Self {
        Self::with_todos(initial_todos())
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let last_id = todos.iter().map(|t| t.id).max().unwrap_or(0);
        Self(Rc::new(TodoStoreNode {
            todos: RefCell::new(todos.into()),
            is_loading: Cell::new(false),
            last_id: Cell::new(last_id),
            changes: RefCell::new(Listeners::new()),
        }))
    }

    pub fn get_all(&self) -> Rc<[Todo]> {
        self.0.todos.borrow().clone()
    }

    /// Returns `true` between `FETCH_TODO` and `RECEIVE_TODOS`.
    pub fn is_loading(&self) -> bool {
        self.0.is_loading.get()
    }

    /// Registers a listener for change events.
    pub fn subscribe(&self, f: impl Fn(&[Todo]) + 'static) -> Subscription {
        let id = self.0.changes.borrow_mut().insert(f);
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node| {
            node.changes.borrow_mut().remove(id);
        })
    }

    /// Appends a todo and returns its id.
    ///
    /// Ids are millisecond timestamps, bumped when needed so that they strictly increase.
    /// Returns `None` without emitting a change once the id space is exhausted.
    pub fn create_todo(&self, text: impl Into<String>) -> Option<u64> {
        let Some(next) = self.0.last_id.get().checked_add(1) else {
            tracing::warn!("todo ids exhausted");
            return None;
        };
        let id = unix_millis().max(next);
        self.0.last_id.set(id);
        let todo = Todo::new(id, text);
        self.update(|todos| todos.push(todo));
        Some(id)
    }

    /// Replaces the list with `todos` and ends loading.
    pub fn receive_todos(&self, todos: Vec<Todo>) {
        if let Some(max) = todos.iter().map(|t| t.id).max() {
            self.0.last_id.set(self.0.last_id.get().max(max));
        }
        self.0.is_loading.set(false);
        self.update(|current| *current = todos);
    }

    /// Removes the todo with `id`.
    ///
    /// Returns `false` without emitting a change if there is no such todo.
    pub fn delete_todo(&self, id: u64) -> bool {
        if !self.get_all().iter().any(|t| t.id == id) {
            return false;
        }
        self.update(|todos| todos.retain(|t| t.id != id));
        true
    }

    fn start_loading(&self) {
        self.0.is_loading.set(true);
        self.emit();
    }

    /// Applies an action.
    ///
    /// Each action type runs only its own mutation.
    pub fn handle_action(&self, action: &TodoAction) {
        tracing::trace!(action = action.action_type(), "todo store handling action");
        match action {
            TodoAction::CreateTodo { text } => {
                self.create_todo(text.clone());
            }
            TodoAction::DeleteTodo { id } => {
                self.delete_todo(*id);
            }
            TodoAction::FetchTodo => self.start_loading(),
            TodoAction::ReceiveTodos { todos } => self.receive_todos(todos.clone()),
        }
    }

    /// Registers [`handle_action`](Self::handle_action) with `dispatcher`.
    ///
    /// The registration ends when the returned [`Subscription`] is dropped.
    /// The dispatcher does not keep the store alive.
    pub fn connect(&self, dispatcher: &Dispatcher<TodoAction>) -> Subscription {
        let this = Rc::downgrade(&self.0);
        dispatcher.register_scoped(move |action| {
            if let Some(node) = this.upgrade() {
                TodoStore(node).handle_action(action);
            }
        })
    }

    fn update(&self, f: impl FnOnce(&mut Vec<Todo>)) {
        let mut todos = self.get_all().to_vec();
        f(&mut todos);
        *self.0.todos.borrow_mut() = todos.into();
        self.emit();
    }

    fn emit(&self) {
        Listeners::notify_latest(&self.0.changes, || self.get_all());
    }
}
impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("todos", &self.get_all())
            .field("is_loading", &self.is_loading())
            .finish()
    }
}

/// Action creators for the todo list.
#[derive(Clone, Debug)]
pub struct TodoActions {
    dispatcher: Dispatcher<TodoAction>,
    scheduler: Scheduler,
}

impl TodoActions {
    pub fn new(dispatcher: Dispatcher<TodoAction>, scheduler: Scheduler) -> Self {
        Self {
            dispatcher,
            scheduler,
        }
    }

    pub fn create_todo(&self, text: impl Into<String>) -> Result<(), DispatchError> {
        self.dispatcher
            .dispatch(&TodoAction::CreateTodo { text: text.into() })
    }

    pub fn delete_todo(&self, id: u64) -> Result<(), DispatchError> {
        self.dispatcher.dispatch(&TodoAction::DeleteTodo { id })
    }

    /// Dispatches `FETCH_TODO`, then `RECEIVE_TODOS` with [`fetched_todos`] after [`RELOAD_DELAY`].
    pub fn reload_todos(&self) -> Result<ScheduledTask, DispatchError> {
        self.dispatcher.dispatch(&TodoAction::FetchTodo)?;
        let dispatcher = self.dispatcher.clone();
        Ok(self.scheduler.schedule(RELOAD_DELAY, move || {
            let action = TodoAction::ReceiveTodos {
                todos: fetched_todos(),
            };
            if let Err(e) = dispatcher.dispatch(&action) {
                tracing::warn!(error = %e, "failed to deliver fetched todos");
            }
        }))
    }
}

/// Renders the todo list as text lines and re-renders on each change.
pub struct TodoListView {
    lines: Rc<RefCell<Vec<String>>>,
    renders: Rc<Cell<usize>>,
    _subscription: Subscription,
}

impl TodoListView {
    pub fn new(store: &TodoStore) -> Self {
        let lines = Rc::new(RefCell::new(render(&store.get_all())));
        let renders = Rc::new(Cell::new(1));
        let subscription = store.subscribe({
            let lines = lines.clone();
            let renders = renders.clone();
            move |todos| {
                *lines.borrow_mut() = render(todos);
                renders.set(renders.get() + 1);
            }
        });
        Self {
            lines,
            renders,
            _subscription: subscription,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.get()
    }
}

fn render(todos: &[Todo]) -> Vec<String> {
    todos
        .iter()
        .map(|t| format!("{} {}", t.text, t.icon()))
        .collect()
}
