//! SQLite storage of users.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{params, Connection};
use unistate::users::{User, UserId};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name  TEXT NOT NULL,
    user_email TEXT NOT NULL
);
"#;

pub struct UserRepository {
    conn: Mutex<Connection>,
}

impl UserRepository {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every user in id order.
    pub fn all(&self) -> rusqlite::Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, user_name, user_email FROM users ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                user_name: row.get(1)?,
                user_email: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    /// Inserts a user and returns its id.
    pub fn insert(&self, user_name: &str, user_email: &str) -> rusqlite::Result<UserId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (user_name, user_email) VALUES (?1, ?2)",
            params![user_name, user_email],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns the number of updated rows.
    pub fn update(&self, id: UserId, user_name: &str, user_email: &str) -> rusqlite::Result<usize> {
        self.conn().execute(
            "UPDATE users SET user_name = ?2, user_email = ?3 WHERE id = ?1",
            params![id, user_name, user_email],
        )
    }

    /// Returns the number of deleted rows.
    pub fn delete(&self, id: UserId) -> rusqlite::Result<usize> {
        self.conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])
    }
}
