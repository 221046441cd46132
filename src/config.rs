//! Configuration file handling for gastos.
//!
//! The configuration file is stored at `$GASTOS_HOME/config.json` and contains the storage key the
//! expenses are kept under, the detail used when none is given, backup settings and where PDF
//! exports find their fonts.

use crate::backup::Backup;
use crate::export::{FontSource, DEFAULT_FONT_FAMILY};
use crate::model::DEFAULT_DETAIL;
use crate::session::Session;
use crate::store::{FileSlot, RecordStore, STORAGE_KEY};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "gastos";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const SLOTS: &str = "slots";
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const FONTS: &str = "fonts";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$GASTOS_HOME` and from there it loads `$GASTOS_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the data home.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    slots: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` with default
    /// settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/gastos`
    ///
    /// # Errors
    /// - Returns an error if `dir` already holds a `config.json` or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the gastos home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        // Create the subdirectories
        let slots = root.join(SLOTS);
        utils::make_dir(&slots).await?;
        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        // Create and save an initial ConfigFile in the datastore
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            slots,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `gastos_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the slots and backups directories exist
    /// - return the loaded configuration object
    pub async fn load(gastos_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = gastos_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Gastos Home is missing, run 'gastos init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            slots: root.join(SLOTS),
            backups: root.join(BACKUPS),
            config_path,
            config_file,
        };
        if !config.slots.is_dir() {
            bail!("The slots directory is missing '{}'", config.slots.display())
        }
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn slots(&self) -> &Path {
        &self.slots
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn storage_key(&self) -> &str {
        &self.config_file.storage_key
    }

    pub fn default_detail(&self) -> &str {
        &self.config_file.default_detail
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// The record store backed by the slot directory of this data home.
    pub fn store(&self) -> RecordStore {
        RecordStore::new(FileSlot::new(&self.slots), self.storage_key()).with_backup(self.backup())
    }

    /// Where PDF exports look for fonts: `pdf_font_dir` when set (relative to the data home),
    /// `$GASTOS_HOME/fonts`, then the system font directories.
    pub fn font_source(&self) -> FontSource {
        let mut dirs = Vec::new();
        if let Some(dir) = &self.config_file.pdf_font_dir {
            dirs.push(self.root.join(dir));
        }
        dirs.push(self.root.join(FONTS));
        FontSource::new(&self.config_file.pdf_font_family, dirs).with_system_dirs()
    }

    /// Loads the records and opens a session on the current month.
    pub async fn session(&self) -> Session {
        Session::open(self.store(), self.default_detail()).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "gastos",
///   "config_version": 1,
///   "storage_key": "synergy-expenses-v1",
///   "default_detail": "Peajes",
///   "backup_copies": 5,
///   "pdf_font_family": "LiberationSans"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "gastos"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The slot the expense list is stored under
    #[serde(default = "default_storage_key")]
    storage_key: String,

    /// The detail given to expenses added without one
    #[serde(default = "default_detail")]
    default_detail: String,

    /// Number of backup copies to keep, 0 disables backups
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// A directory holding the PDF font family, searched before the defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pdf_font_dir: Option<PathBuf>,

    /// The font family used for PDF exports, as `<family>-Regular.ttf` and so on
    #[serde(default = "default_pdf_font_family")]
    pdf_font_family: String,
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_detail() -> String {
    DEFAULT_DETAIL.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_pdf_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            storage_key: default_storage_key(),
            default_detail: default_detail(),
            backup_copies: BACKUP_COPIES,
            pdf_font_dir: None,
            pdf_font_family: default_pdf_font_family(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a gastos config
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} in {}",
            config.config_version,
            path.display()
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
