use regex::Regex;
use sqlx::SqlitePool;

use crate::{
    database::{find_submission, insert_feedback, is_unique_violation},
    error::AppError,
};

pub const ANSWER_COUNT: usize = 10;

/// Fixed survey, one answer cell per question.
pub const QUESTIONS: [&str; ANSWER_COUNT] = [
    "How satisfied are you with the faculty?",
    "How would you rate the course material?",
    "Are the facilities sufficient?",
    "Is the learning environment good?",
    "How would you rate the extracurricular activities?",
    "How accessible is student support?",
    "How satisfied are you with the online resources?",
    "How practical is the coursework?",
    "Would you recommend this college to others?",
    "Overall, how satisfied are you with the college experience?",
];

/// Normalize question text into a column-style identifier: lowercased,
/// punctuation stripped, spaces to underscores.
pub fn column_ident(question: &str) -> String {
    let strip = Regex::new(r"[^a-z0-9 ]").unwrap();
    let s = strip.replace_all(&question.to_lowercase(), "").into_owned();

    let collapse = Regex::new(r" +").unwrap();
    collapse
        .replace_all(s.trim(), " ")
        .into_owned()
        .replace(' ', "_")
}

/// Store one respondent's answers for an institution.
///
/// The pre-check names the prior institution in the error message; the
/// primary key on `feedback.username` is what actually holds under
/// concurrent duplicate submissions.
pub async fn submit(
    pool: &SqlitePool,
    username: &str,
    institution: &str,
    answers: &[String],
) -> Result<(), AppError> {
    if username.trim().is_empty() || institution.trim().is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    if answers.len() != ANSWER_COUNT {
        return Err(AppError::Validation(format!(
            "Expected {ANSWER_COUNT} answers, got {}",
            answers.len()
        )));
    }

    if let Some(prior) = find_submission(pool, username).await? {
        return Err(already_submitted(&prior));
    }

    insert_feedback(pool, username, institution, answers)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                already_submitted("another institution")
            } else {
                AppError::Database(e)
            }
        })
}

/// Institution the respondent already submitted for, if any.
pub async fn check_submission(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<String>, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    Ok(find_submission(pool, username).await?)
}

fn already_submitted(institution: &str) -> AppError {
    AppError::AlreadySubmitted(format!(
        "You have already submitted feedback for {institution}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{fetch_institution_rows, memory_pool};

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_column_ident() {
        assert_eq!(
            column_ident("How satisfied are you with the faculty?"),
            "how_satisfied_are_you_with_the_faculty"
        );
        assert_eq!(
            column_ident("Overall, how satisfied are you with the college experience?"),
            "overall_how_satisfied_are_you_with_the_college_experience"
        );
        assert_eq!(column_ident("  Mixed   CASE!?  "), "mixed_case");
    }

    #[test]
    fn test_column_idents_unique() {
        let idents: std::collections::HashSet<String> =
            QUESTIONS.iter().map(|q| column_ident(q)).collect();

        assert_eq!(idents.len(), QUESTIONS.len());
    }

    #[tokio::test]
    async fn test_submit_and_check() {
        let pool = memory_pool().await;

        submit(&pool, "alice", "Acme", &vec![String::from("Great"); 10])
            .await
            .unwrap();

        assert_eq!(
            check_submission(&pool, "alice").await.unwrap().as_deref(),
            Some("Acme")
        );
        assert_eq!(check_submission(&pool, "bob").await.unwrap(), None);

        let rows = fetch_institution_rows(&pool, "Acme").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
    }

    #[tokio::test]
    async fn test_single_submission_across_institutions() {
        let pool = memory_pool().await;
        let blank = vec![String::new(); 10];

        submit(&pool, "alice", "Acme", &blank).await.unwrap();

        let err = submit(&pool, "alice", "Globex", &blank).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadySubmitted(_)));

        assert!(fetch_institution_rows(&pool, "Globex")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_leave_one_row() {
        let pool = memory_pool().await;
        let blank = vec![String::new(); 10];

        let (first, second) = tokio::join!(
            submit(&pool, "alice", "Acme", &blank),
            submit(&pool, "alice", "Globex", &blank),
        );

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);

        let acme = fetch_institution_rows(&pool, "Acme").await.unwrap().len();
        let globex = fetch_institution_rows(&pool, "Globex").await.unwrap().len();
        assert_eq!(acme + globex, 1);
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let pool = memory_pool().await;
        let blank = vec![String::new(); 10];

        let err = submit(&pool, "", "Acme", &blank).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = submit(&pool, "alice", "  ", &blank).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = submit(&pool, "alice", "Acme", &answers(&["only", "four", "answers", "here"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
