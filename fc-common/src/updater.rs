//! One-time fill-in of an allocated application
//!
//! An application can be filled in exactly once. The check for "still
//! unassigned" is repeated inside the store's conditional update, so two
//! concurrent submissions for the same number cannot both succeed.

use tracing::{info, warn};

use crate::db::models::{application_ref, FilledApplication, MAX_APPLICATION_ID};
use crate::sanitize::{clean_integer, sanitize, RawApplication};
use crate::store::ApplicationStore;
use crate::{Error, Result};

/// Parse an application number from a path segment
///
/// Anything that is not a digits-only integer within the allocatable range
/// cannot name an application, so it is reported as not found.
pub fn parse_application_id(raw_id: &str) -> Result<u32> {
    clean_integer(raw_id)
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| *id <= MAX_APPLICATION_ID)
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", raw_id)))
}

/// Look up an application that can still be filled in
///
/// Fails with [`Error::NotFound`] for ids that were never allocated and with
/// [`Error::Conflict`] for applications that have already been submitted.
pub async fn find_unassigned<S>(store: &S, raw_id: &str) -> Result<u32>
where
    S: ApplicationStore + ?Sized,
{
    let id = parse_application_id(raw_id)?;

    let record = store
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;

    if record.is_assigned() {
        return Err(Error::Conflict(format!(
            "Application {} has already been submitted",
            id
        )));
    }

    Ok(id)
}

/// Write the cleaned body into an application found by [`find_unassigned`]
pub async fn fill_in<S>(store: &S, id: u32, body: &RawApplication) -> Result<FilledApplication>
where
    S: ApplicationStore + ?Sized,
{
    let patch = sanitize(body);
    if patch.is_empty() {
        warn!(id, "Fill-in body has no valid fields");
    }

    if !store.fill_unassigned(id, &patch).await? {
        // Someone else may have filled it in between our read and write
        return match store.find(id).await? {
            Some(current) if current.is_assigned() => {
                warn!(id, "Lost race to fill in application");
                Err(Error::Conflict(format!(
                    "Application {} has already been submitted",
                    id
                )))
            }
            _ => Err(Error::Internal(format!(
                "Update of application {} affected no rows",
                id
            ))),
        };
    }

    info!(id, fields = patch.columns().len(), "Application filled in");

    Ok(FilledApplication {
        fields: patch,
        application_ref: application_ref(id),
    })
}

/// Fill in an allocated, unassigned application from a raw request body
pub async fn submit<S>(store: &S, raw_id: &str, body: &RawApplication) -> Result<FilledApplication>
where
    S: ApplicationStore + ?Sized,
{
    let id = find_unassigned(store, raw_id).await?;
    fill_in(store, id, body).await
}
