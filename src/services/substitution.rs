use crate::models::{
    OperationError, OperationOutcome, ReplacementCounts, ReplacementRecord, SubstitutionConfig,
};
use crate::services::env::EnvLookup;
use crate::services::matcher::{ReferenceMatcher, resolve_position};
use crate::services::rollback::backup_path;
use camino::Utf8Path;
use std::io::ErrorKind;

/// Bytes produced by one substitution pass over a file's content.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// `None` when no reference changed the content
    pub content: Option<Vec<u8>>,
    pub counts: ReplacementCounts,
    pub total: usize,
    pub changes: Vec<ReplacementRecord>,
}

/// Substitution engine.
///
/// Holds the resolved configuration and the compiled reference matcher so a
/// single instance can be shared by every file task in a batch.
#[derive(Debug, Clone)]
pub struct SubstitutionService {
    config: SubstitutionConfig,
    matcher: ReferenceMatcher,
}

impl SubstitutionService {
    pub fn new(config: SubstitutionConfig) -> Result<Self, regex::Error> {
        let matcher = ReferenceMatcher::new(&config.prefix)?;
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &SubstitutionConfig {
        &self.config
    }

    /// Apply the substitution policy to `content` without touching the disk.
    ///
    /// Any disallowed or unset reference fails the whole pass, so callers never
    /// see a partially rewritten file. Bytes outside the references are copied
    /// unchanged, whether or not they are valid UTF-8.
    pub fn rewrite(&self, content: &[u8], env: &dyn EnvLookup) -> Result<Rewrite, OperationError> {
        let mut rewrite = Rewrite::default();
        let mut output = Vec::with_capacity(content.len());
        let mut copied_to = 0;

        for occurrence in self.matcher.scan(content) {
            let name = occurrence.name;

            if !self.config.allow_list.is_allowed(name) {
                if self.config.ignore_other {
                    tracing::debug!("Leaving {} untouched (not in allow-list)", occurrence.matched);
                    continue;
                }
                let (line, column) = resolve_position(content, occurrence.offset);
                return Err(OperationError::VariableNotAllowed {
                    name: name.to_string(),
                    line,
                    column,
                });
            }

            let replacement = match env.lookup(name).filter(|v| !v.is_empty()) {
                Some(value) => serde_json::to_string(&value).map_err(|source| {
                    OperationError::Render {
                        name: name.to_string(),
                        source,
                    }
                })?,
                None if self.config.allow_missing => {
                    tracing::warn!("{} is not set, using {}", name, self.config.missing_literal);
                    self.config.missing_literal.clone()
                }
                None => {
                    let (line, column) = resolve_position(content, occurrence.offset);
                    return Err(OperationError::VariableNotSet {
                        name: name.to_string(),
                        line,
                        column,
                    });
                }
            };

            if self.config.verbose {
                let (line, column) = resolve_position(content, occurrence.offset);
                rewrite.changes.push(ReplacementRecord {
                    line,
                    column,
                    old: occurrence.matched.to_string(),
                    new: replacement.clone(),
                });
            }

            output.extend_from_slice(&content[copied_to..occurrence.offset]);
            output.extend_from_slice(replacement.as_bytes());
            copied_to = occurrence.end();

            *rewrite.counts.entry(name.to_string()).or_insert(0) += 1;
            rewrite.total += 1;
        }

        if rewrite.total > 0 {
            output.extend_from_slice(&content[copied_to..]);
            rewrite.content = Some(output);
        }

        Ok(rewrite)
    }

    /// Substitute every reference in the file at `path`.
    ///
    /// Never returns an error directly; failures become
    /// [`OperationOutcome::Failed`] and leave the file and its backup as they were.
    pub async fn substitute(&self, path: &Utf8Path, env: &dyn EnvLookup) -> OperationOutcome {
        match self.try_substitute(path, env).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!("Substitution failed for {}: {}", path, error);
                OperationOutcome::Failed { error }
            }
        }
    }

    async fn try_substitute(
        &self,
        path: &Utf8Path,
        env: &dyn EnvLookup,
    ) -> Result<OperationOutcome, OperationError> {
        if !is_regular_file(path).await? {
            tracing::debug!("Skipping {} (not a regular file)", path);
            return Ok(OperationOutcome::Skipped);
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| OperationError::io(path, e))?;

        let rewrite = self.rewrite(&content, env)?;

        let Some(new_content) = rewrite.content else {
            tracing::debug!("No replacements in {}", path);
            return Ok(OperationOutcome::Untouched);
        };

        let backup = backup_path(path);
        if is_regular_file(&backup).await? {
            tracing::warn!(
                "Backup {} already exists, keeping it as the rollback source",
                backup
            );
        } else {
            tokio::fs::write(&backup, &content)
                .await
                .map_err(|e| OperationError::io(&backup, e))?;
            tracing::debug!("Wrote backup {}", backup);
        }

        tokio::fs::write(path, &new_content)
            .await
            .map_err(|e| OperationError::io(path, e))?;

        tracing::info!("Replaced {} references in {}", rewrite.total, path);

        Ok(OperationOutcome::Replaced {
            counts: rewrite.counts,
            total: rewrite.total,
            changes: rewrite.changes,
        })
    }
}

/// True when `path` resolves (following symlinks) to a regular file.
/// A missing path is not an error.
pub(crate) async fn is_regular_file(path: &Utf8Path) -> Result<bool, OperationError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OperationError::io(path, e)),
    }
}
