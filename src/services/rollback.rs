use crate::models::{BACKUP_SUFFIX, OperationError, OperationOutcome};
use crate::services::substitution::is_regular_file;
use camino::{Utf8Path, Utf8PathBuf};

/// Sibling backup path for `path`: the full file name plus `.envs`.
pub fn backup_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}{}", path, BACKUP_SUFFIX))
}

/// Restore `path` from its backup and remove the backup.
///
/// Once the backup is gone, repeated calls report [`OperationOutcome::NoBackup`].
pub async fn rollback(path: &Utf8Path) -> OperationOutcome {
    match try_rollback(path).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!("Rollback failed for {}: {}", path, error);
            OperationOutcome::Failed { error }
        }
    }
}

async fn try_rollback(path: &Utf8Path) -> Result<OperationOutcome, OperationError> {
    if !is_regular_file(path).await? {
        tracing::debug!("Skipping {} (not a regular file)", path);
        return Ok(OperationOutcome::Skipped);
    }

    let backup = backup_path(path);
    if !is_regular_file(&backup).await? {
        tracing::debug!("No backup for {}", path);
        return Ok(OperationOutcome::NoBackup);
    }

    let original = tokio::fs::read(&backup)
        .await
        .map_err(|e| OperationError::io(&backup, e))?;

    tokio::fs::write(path, &original)
        .await
        .map_err(|e| OperationError::io(path, e))?;

    tokio::fs::remove_file(&backup)
        .await
        .map_err(|e| OperationError::io(&backup, e))?;

    tracing::info!("Rolled back {}", path);
    Ok(OperationOutcome::RolledBack)
}
