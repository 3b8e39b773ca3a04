use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{storage::JsonFile, todos::repo_types::Todo};

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Items owned by `username`, in store order.
    async fn list_for(&self, username: &str) -> anyhow::Result<Vec<Todo>>;

    /// Appends a new, not-done item with the next free id.
    async fn create(&self, username: &str, task: &str) -> anyhow::Result<Todo>;

    /// Flips `done` on the item matching both keys; `None` if there is none.
    async fn toggle(&self, id: i64, username: &str) -> anyhow::Result<Option<Todo>>;

    /// Removes the item matching both keys; `false` if there is none.
    async fn delete(&self, id: i64, username: &str) -> anyhow::Result<bool>;
}

fn next_id(todos: &[Todo]) -> anyhow::Result<i64> {
    match todos.iter().map(|t| t.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("todo id space exhausted (max id {max})")),
    }
}

fn push_new(todos: &mut Vec<Todo>, username: &str, task: &str) -> anyhow::Result<Todo> {
    let todo = Todo {
        id: next_id(todos)?,
        username: username.to_string(),
        task: task.to_string(),
        done: false,
    };
    todos.push(todo.clone());
    Ok(todo)
}

fn toggle_in(todos: &mut [Todo], id: i64, username: &str) -> Option<Todo> {
    let todo = todos
        .iter_mut()
        .find(|t| t.id == id && t.username == username)?;
    todo.done = !todo.done;
    Some(todo.clone())
}

fn remove_in(todos: &mut Vec<Todo>, id: i64, username: &str) -> bool {
    let before = todos.len();
    todos.retain(|t| !(t.id == id && t.username == username));
    todos.len() != before
}

fn owned_by(todos: Vec<Todo>, username: &str) -> Vec<Todo> {
    todos.into_iter().filter(|t| t.username == username).collect()
}

/// Todos kept in a flat JSON file; access is serialized per store.
pub struct FileTodoStore {
    file: JsonFile<Todo>,
    lock: Mutex<()>,
}

impl FileTodoStore {
    pub fn new(file: JsonFile<Todo>) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TodoStore for FileTodoStore {
    async fn list_for(&self, username: &str) -> anyhow::Result<Vec<Todo>> {
        let todos = {
            let _guard = self.lock.lock().await;
            self.file.load().await?
        };
        Ok(owned_by(todos, username))
    }

    async fn create(&self, username: &str, task: &str) -> anyhow::Result<Todo> {
        let _guard = self.lock.lock().await;
        let mut todos = self.file.load().await?;
        let todo = push_new(&mut todos, username, task)?;
        self.file.save(&todos).await?;
        Ok(todo)
    }

    async fn toggle(&self, id: i64, username: &str) -> anyhow::Result<Option<Todo>> {
        let _guard = self.lock.lock().await;
        let mut todos = self.file.load().await?;
        let Some(todo) = toggle_in(&mut todos, id, username) else {
            return Ok(None);
        };
        self.file.save(&todos).await?;
        Ok(Some(todo))
    }

    async fn delete(&self, id: i64, username: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut todos = self.file.load().await?;
        if !remove_in(&mut todos, id, username) {
            return Ok(false);
        }
        self.file.save(&todos).await?;
        Ok(true)
    }
}

/// In-process store, used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<Todo>>,
}

#[cfg(test)]
#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list_for(&self, username: &str) -> anyhow::Result<Vec<Todo>> {
        let todos = self.todos.lock().await.clone();
        Ok(owned_by(todos, username))
    }

    async fn create(&self, username: &str, task: &str) -> anyhow::Result<Todo> {
        let mut todos = self.todos.lock().await;
        let todo = push_new(&mut todos, username, task)?;
        Ok(todo)
    }

    async fn toggle(&self, id: i64, username: &str) -> anyhow::Result<Option<Todo>> {
        let mut todos = self.todos.lock().await;
        let todo = toggle_in(&mut todos, id, username);
        Ok(todo)
    }

    async fn delete(&self, id: i64, username: &str) -> anyhow::Result<bool> {
        let mut todos = self.todos.lock().await;
        let removed = remove_in(&mut todos, id, username);
        Ok(removed)
    }
}
