use sqlx::SqlitePool;

use crate::{
    database::fetch_institution_rows,
    error::AppError,
    feedback::{QUESTIONS, column_ident},
};

/// Serialize an institution's stored rows to CSV, values verbatim.
///
/// The identity column is included unredacted, matching the raw-table
/// export contract.
pub async fn export_csv(pool: &SqlitePool, institution: &str) -> Result<Vec<u8>, AppError> {
    let rows = fetch_institution_rows(pool, institution).await?;

    if rows.is_empty() {
        return Err(AppError::NotFound("No feedback available".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["username".to_string(), "institution".to_string()];
    header.extend(QUESTIONS.iter().map(|q| column_ident(q)));
    writer
        .write_record(&header)
        .map_err(|e| AppError::Internal(e.into()))?;

    for row in &rows {
        let mut record = vec![row.username.as_str(), row.institution.as_str()];
        record.extend(row.answers());
        writer
            .write_record(&record)
            .map_err(|e| AppError::Internal(e.into()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(Box::new(std::io::Error::other(e.to_string()))))
}

/// Attachment name for the download, institution normalized for safety.
pub fn export_filename(institution: &str) -> String {
    format!("{}_feedback.csv", column_ident(institution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::memory_pool, feedback::submit};

    #[tokio::test]
    async fn test_export_round_trips_values_verbatim() {
        let pool = memory_pool().await;
        let answers: Vec<String> = (1..=10).map(|i| format!("answer, with commas {i}")).collect();

        submit(&pool, "alice", "Acme", &answers).await.unwrap();

        let bytes = export_csv(&pool, "Acme").await.unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "username");
        assert_eq!(&headers[1], "institution");
        assert_eq!(&headers[2], "how_satisfied_are_you_with_the_faculty");

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "alice");
        assert_eq!(&records[0][1], "Acme");
        for (i, answer) in answers.iter().enumerate() {
            assert_eq!(&records[0][i + 2], answer.as_str());
        }
    }

    #[tokio::test]
    async fn test_export_unknown_institution_is_not_found() {
        let pool = memory_pool().await;

        let err = export_csv(&pool, "Nowhere").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Acme University"), "acme_university_feedback.csv");
    }
}
