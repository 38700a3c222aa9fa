//! Sample appender

use dlstats_core::{storable_count, Sample};
use tracing::{debug, instrument};

use crate::error::{expect_single_row, DbResult};
use crate::ledger::LedgerTransaction;

/// Persist one download-count observation
///
/// # Errors
/// * `DbError::Domain` - The count does not fit the store's column
/// * `DbError::UnexpectedRowCount` - The insert did not affect exactly one row,
///   including when the asset name is not registered
#[instrument(skip(tx, sample), fields(asset = %sample.asset_name, count = sample.download_count))]
pub async fn append_sample(tx: &mut dyn LedgerTransaction, sample: &Sample) -> DbResult<()> {
    let count = storable_count(&sample.asset_name, sample.download_count)?;

    let affected = tx
        .insert_sample(&sample.asset_name, sample.recorded_at.as_datetime(), count)
        .await?;
    expect_single_row("append sample", &sample.asset_name, affected)?;

    debug!("Sample appended");
    Ok(())
}
