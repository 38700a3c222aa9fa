//! Asset registry accessor
//!
//! Maps an asset name to its stable surrogate identifier, registering names the
//! first time they are seen. Holds no state between calls; everything happens
//! inside the caller's transaction.

use dlstats_core::{validate_asset_name, AssetId};
use tracing::{debug, instrument};

use crate::error::{expect_single_row, DbError, DbResult};
use crate::ledger::LedgerTransaction;

/// Result of resolving an asset name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Identifier the name resolves to
    pub asset_id: AssetId,

    /// Whether this call created the registry row
    pub newly_registered: bool,
}

/// Resolve `name` to its identifier, inserting a registry row if it is unseen
///
/// # Errors
/// * `DbError::Domain` - The name is blank
/// * `DbError::UnexpectedRowCount` - The insert did not affect exactly one row
/// * `DbError::UnresolvedAsset` - The inserted row could not be resolved afterwards
#[instrument(skip(tx))]
pub async fn ensure_registered(
    tx: &mut dyn LedgerTransaction,
    name: &str,
) -> DbResult<Registration> {
    validate_asset_name(name)?;

    if let Some(asset_id) = tx.find_asset_id(name).await? {
        debug!(%asset_id, "Asset already registered");
        return Ok(Registration {
            asset_id,
            newly_registered: false,
        });
    }

    let affected = tx.insert_asset(name).await?;
    expect_single_row("register asset", name, affected)?;

    let asset_id = tx
        .find_asset_id(name)
        .await?
        .ok_or_else(|| DbError::UnresolvedAsset(name.to_string()))?;

    debug!(%asset_id, "Registered new asset");
    Ok(Registration {
        asset_id,
        newly_registered: true,
    })
}
