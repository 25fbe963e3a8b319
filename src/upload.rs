use log::{error, info};
use serde::Serialize;

use crate::api::RestApi;
use crate::error::ImportError;
use crate::models::{OwnedRow, UploadSummary, UserId};

/// Sends `entries` to `table` in chunks of `batch_size`, each row tagged with
/// `user_id`. Stops at the first rejected chunk; chunks sent before it stay
/// applied on the remote side.
pub fn upload_entries<T: Serialize>(
    api: &dyn RestApi,
    table: &str,
    entries: &[T],
    user_id: &UserId,
    batch_size: usize,
) -> Result<UploadSummary, ImportError> {
    if entries.is_empty() {
        info!("no {} entries to upload", table);
        return Ok(UploadSummary {
            table: table.to_string(),
            uploaded: 0,
            batches: 0,
        });
    }

    debug_assert!(batch_size > 0, "batch size is validated by ImportConfig");
    let total_batches = entries.len().div_ceil(batch_size);

    for (index, chunk) in entries.chunks(batch_size).enumerate() {
        let batch = index + 1;
        let rows: Vec<OwnedRow<'_, T>> = chunk
            .iter()
            .map(|entry| OwnedRow { entry, user_id })
            .collect();
        let body = serde_json::to_value(&rows)?;

        let response = api.upsert(table, &body)?;
        if !response.is_success() {
            error!(
                "{} batch {}: {} {}",
                table, batch, response.status, response.body
            );
            return Err(ImportError::Upload {
                table: table.to_string(),
                batch,
                status: response.status,
                body: response.body,
            });
        }

        info!(
            "{} batch {}/{} uploaded ({} rows)",
            table,
            batch,
            total_batches,
            chunk.len()
        );
    }

    info!("{} {} entries uploaded", entries.len(), table);
    Ok(UploadSummary {
        table: table.to_string(),
        uploaded: entries.len(),
        batches: total_batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, RecordingApi};
    use crate::models::TemperatureEntry;
    use chrono::{Duration, NaiveDate};
    use serde_json::Value;

    fn readings(count: usize) -> Vec<TemperatureEntry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| TemperatureEntry {
                date: start + Duration::days(i as i64),
                temperature: 36.2 + (i % 10) as f64 / 10.0,
            })
            .collect()
    }

    fn upserted_rows(calls: &[Call]) -> Vec<Vec<Value>> {
        calls
            .iter()
            .map(|call| match call {
                Call::Upsert { rows, .. } => rows.as_array().cloned().unwrap_or_default(),
                Call::Get(path) => panic!("unexpected GET {path}"),
            })
            .collect()
    }

    #[test]
    fn empty_input_makes_no_requests() {
        let api = RecordingApi::new();
        let user = UserId::new("u-1");
        let entries: Vec<TemperatureEntry> = Vec::new();

        let summary = upload_entries(&api, "temperature_entries", &entries, &user, 50).unwrap();

        assert_eq!(summary.uploaded, 0);
        assert_eq!(summary.batches, 0);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn splits_into_batches_of_fifty_with_user_id_on_every_row() {
        let api = RecordingApi::new();
        let user = UserId::new("u-1");

        let summary = upload_entries(&api, "temperature_entries", &readings(120), &user, 50).unwrap();

        assert_eq!(summary.uploaded, 120);
        assert_eq!(summary.batches, 3);

        let batches = upserted_rows(&api.calls());
        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(batches
            .iter()
            .flatten()
            .all(|row| row["user_id"] == "u-1"));
        assert_eq!(batches[0][0]["date"], "2024-01-01");
        assert_eq!(batches[2][19]["date"], "2024-04-29");
    }

    #[test]
    fn exact_multiple_does_not_send_an_empty_batch() {
        let api = RecordingApi::new();
        let user = UserId::new("u-1");

        upload_entries(&api, "temperature_entries", &readings(100), &user, 50).unwrap();
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn rejected_batch_stops_the_upload() {
        let api = RecordingApi::new()
            .respond(201, "")
            .respond(409, r#"{"code":"23505"}"#)
            .respond(201, "");
        let user = UserId::new("u-1");

        let err = upload_entries(&api, "period_entries", &readings(150), &user, 50).unwrap_err();

        match err {
            ImportError::Upload {
                table,
                batch,
                status,
                body,
            } => {
                assert_eq!(table, "period_entries");
                assert_eq!(batch, 2);
                assert_eq!(status, 409);
                assert!(body.contains("23505"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.calls().len(), 2);
    }

    #[test]
    fn posts_to_the_given_table() {
        let api = RecordingApi::new();
        let user = UserId::new("u-1");

        upload_entries(&api, "period_entries", &readings(1), &user, 50).unwrap();

        assert!(matches!(
            api.calls().as_slice(),
            [Call::Upsert { table, .. }] if table == "period_entries"
        ));
    }
}
