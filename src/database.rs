//! # SQLite
//!
//! Relational store for credentials and feedback rows.
//!
//! ## Schema
//! - `users`: username (**primary key**), email (**unique**), password hash
//! - `feedback`: username (**primary key**), institution, answer_1..answer_10
//!
//! One `feedback` row per respondent across every institution. The primary
//! key on `username` is the single-submission invariant: concurrent duplicate
//! submissions race only to the insert and exactly one wins. Institution
//! names are data, never table or column identifiers, so every query is
//! parameterized.
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub username: String,
    pub institution: String,
    pub answer_1: String,
    pub answer_2: String,
    pub answer_3: String,
    pub answer_4: String,
    pub answer_5: String,
    pub answer_6: String,
    pub answer_7: String,
    pub answer_8: String,
    pub answer_9: String,
    pub answer_10: String,
}

impl FeedbackRow {
    /// Answer cells in question order, identity and institution excluded.
    pub fn answers(&self) -> [&str; 10] {
        [
            &self.answer_1,
            &self.answer_2,
            &self.answer_3,
            &self.answer_4,
            &self.answer_5,
            &self.answer_6,
            &self.answer_7,
            &self.answer_8,
            &self.answer_9,
            &self.answer_10,
        ]
    }
}

pub async fn init_pool(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_db(&pool).await?;

    Ok(pool)
}

pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS feedback (
            username TEXT PRIMARY KEY,
            institution TEXT NOT NULL,
            answer_1 TEXT NOT NULL DEFAULT '',
            answer_2 TEXT NOT NULL DEFAULT '',
            answer_3 TEXT NOT NULL DEFAULT '',
            answer_4 TEXT NOT NULL DEFAULT '',
            answer_5 TEXT NOT NULL DEFAULT '',
            answer_6 TEXT NOT NULL DEFAULT '',
            answer_7 TEXT NOT NULL DEFAULT '',
            answer_8 TEXT NOT NULL DEFAULT '',
            answer_9 TEXT NOT NULL DEFAULT '',
            answer_10 TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

pub async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn fetch_user(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as("SELECT username, email, password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn insert_feedback(
    pool: &SqlitePool,
    username: &str,
    institution: &str,
    answers: &[String],
) -> Result<(), sqlx::Error> {
    let mut query = sqlx::query(
        "INSERT INTO feedback (
            username, institution,
            answer_1, answer_2, answer_3, answer_4, answer_5,
            answer_6, answer_7, answer_8, answer_9, answer_10
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(institution);

    for answer in answers {
        query = query.bind(answer);
    }

    query.execute(pool).await?;

    Ok(())
}

/// Institution a respondent already submitted for, if any.
pub async fn find_submission(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT institution FROM feedback WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_institution_rows(
    pool: &SqlitePool,
    institution: &str,
) -> Result<Vec<FeedbackRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT username, institution,
            answer_1, answer_2, answer_3, answer_4, answer_5,
            answer_6, answer_7, answer_8, answer_9, answer_10
        FROM feedback WHERE institution = ? ORDER BY username",
    )
    .bind(institution)
    .fetch_all(pool)
    .await
}

/// Single-connection in-memory pool so every test query sees one database.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    init_db(&pool).await.unwrap();

    pool
}
