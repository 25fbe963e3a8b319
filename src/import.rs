use log::{error, info};

use crate::api::RestApi;
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::models::{ExtractedEntries, UploadSummary, UserId};
use crate::spreadsheet;
use crate::upload;
use crate::users;

#[derive(Debug)]
pub struct ImportOutcome {
    pub user_id: UserId,
    pub extracted: ExtractedEntries,
    pub temperatures: Result<UploadSummary, ImportError>,
    pub periods: Result<UploadSummary, ImportError>,
}

impl ImportOutcome {
    pub fn is_complete(&self) -> bool {
        self.temperatures.is_ok() && self.periods.is_ok()
    }
}

/// Resolver, extractor, then one upload per table. Lookup and extraction
/// failures abort the run; an upload failure only ends that table's upload.
pub fn run_import(api: &dyn RestApi, config: &ImportConfig) -> Result<ImportOutcome, ImportError> {
    config.validate()?;

    info!("looking up user {}", config.user_email);
    let user_id = users::resolve_user_id(api, &config.user_email)?;

    let extracted = spreadsheet::read_entries(&config.spreadsheet, config.sheet.as_deref())?;
    info!(
        "found {} temperature entries and {} period entries",
        extracted.temperatures.len(),
        extracted.periods.len()
    );

    let temperatures = upload::upload_entries(
        api,
        &config.temperature_table,
        &extracted.temperatures,
        &user_id,
        config.batch_size,
    );
    if let Err(err) = &temperatures {
        error!("{}", err);
    }

    let periods = upload::upload_entries(
        api,
        &config.period_table,
        &extracted.periods,
        &user_id,
        config.batch_size,
    );
    if let Err(err) = &periods {
        error!("{}", err);
    }

    Ok(ImportOutcome {
        user_id,
        extracted,
        temperatures,
        periods,
    })
}
