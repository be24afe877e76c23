use crate::models::{RunOptions, Settings, SubstitutionConfig};
use crate::services::AllowList;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "envstamp.yaml";

const SETTINGS_HEADER: &str = "\
# envstamp settings
#
# vars: allow-list of variable names, `*` matches any run of characters
# ignore_other: leave references outside the allow-list untouched
# allow_missing: replace unset variables with missing_literal
# progress: print one status line per file
# prefix: namespace of the references to replace (prefix.NAME)
";

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub vars: Option<String>,
    pub ignore_other: bool,
    pub allow_missing: bool,
    pub verbose: bool,
    pub rollback: bool,
    pub no_progress: bool,
}

/// Loads the optional YAML settings file and resolves it against CLI overrides.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Utf8PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Use `settings_path` if given, otherwise `envstamp.yaml` in the working directory.
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn new(settings_path: Option<&Utf8Path>) -> Self {
        match settings_path {
            Some(path) => Self {
                settings_path: path.to_path_buf(),
                explicit: true,
            },
            None => Self {
                settings_path: Utf8PathBuf::from(DEFAULT_SETTINGS_FILE),
                explicit: false,
            },
        }
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The loaded Settings, or defaults if the default file doesn't exist
    pub fn load_settings(&self) -> Result<Settings> {
        if !self.settings_path.exists() {
            if self.explicit {
                bail!("Settings file not found: {}", self.settings_path);
            }
            tracing::debug!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(Settings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        // An empty file deserializes to unit, not to a mapping
        if file_contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings: Settings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the settings file.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, format!("{}{}", SETTINGS_HEADER, yaml_string))
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Write a default settings file, refusing to overwrite an existing one.
    pub fn write_default_settings(&self) -> Result<()> {
        if self.settings_path.exists() {
            bail!("Settings file already exists: {}", self.settings_path);
        }
        self.save_settings(&Settings::default())
    }

    /// Load the settings file and apply command-line overrides.
    pub fn resolve(&self, overrides: &Overrides) -> Result<(SubstitutionConfig, RunOptions)> {
        let settings = self.load_settings()?;
        resolve(settings, overrides)
    }
}

/// Merge `settings` with `overrides`: CLI flags win over the file, the file
/// wins over built-in defaults.
pub fn resolve(settings: Settings, overrides: &Overrides) -> Result<(SubstitutionConfig, RunOptions)> {
    let allow_list = match overrides.vars.as_deref() {
        Some(vars) if !vars.trim().is_empty() => AllowList::parse(vars),
        _ => AllowList::from_tokens(&settings.vars),
    }
    .context("Invalid allow-list")?;

    if settings.prefix.trim().is_empty() {
        bail!("Reference prefix must not be empty");
    }

    let config = SubstitutionConfig {
        allow_list,
        ignore_other: overrides.ignore_other || settings.ignore_other,
        allow_missing: overrides.allow_missing || settings.allow_missing,
        verbose: overrides.verbose,
        prefix: settings.prefix,
        missing_literal: settings.missing_literal,
    };

    let options = RunOptions {
        rollback: overrides.rollback,
        progress: settings.progress && !overrides.no_progress,
    };

    tracing::debug!(
        "Resolved config: allow_list={:?}, ignore_other={}, allow_missing={}, prefix={}",
        config.allow_list.tokens(),
        config.ignore_other,
        config.allow_missing,
        config.prefix
    );

    Ok((config, options))
}
