//! These structs provide the CLI interface for the gastos CLI.

use crate::export::ReportFormat;
use crate::model::MonthKey;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// gastos: Record expenses and produce monthly expense reports.
///
/// Each expense has a date, an event, a free-text detail and three amounts: food, fuel and other.
/// Reports cover one calendar month and show the expenses of the month, their totals, how the
/// total splits across the three categories and how spending evolved day by day.
///
/// Amounts are in Dominican pesos and are displayed as RD$1,815.00.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. The data directory is --gastos-home, by default
    /// $HOME/gastos. Until the first expense is added, reports show the sample expenses of
    /// September 2025.
    Init,
    /// Add an expense.
    Add(AddArgs),
    /// Delete an expense by its id. The ids are shown by the report command.
    Delete(DeleteArgs),
    /// Show the report for a month.
    Report(ReportArgs),
    /// List the months that have expenses.
    Months,
    /// Write the report for a month to a file named Reporte-<month>.<ext>.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where gastos data and configuration is held. Defaults to ~/gastos
    #[arg(long, env = "GASTOS_HOME", default_value_t = default_gastos_home())]
    gastos_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, gastos_home: PathBuf) -> Self {
        Self {
            log_level,
            gastos_home: gastos_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn gastos_home(&self) -> &DisplayPath {
        &self.gastos_home
    }
}

/// Args for the `gastos add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The date of the expense, e.g. 2025-09-30.
    #[arg(long)]
    date: String,

    /// What the expense was for, e.g. the game that was attended.
    #[arg(long)]
    event: String,

    /// A free-text detail. Defaults to the default_detail in config.json.
    #[arg(long)]
    detail: Option<String>,

    /// The food amount. Blank means 0.
    #[arg(long, default_value = "")]
    food: String,

    /// The fuel amount. Blank means 0.
    #[arg(long, default_value = "")]
    fuel: String,

    /// Any other amount, e.g. tolls. Blank means 0.
    #[arg(long, default_value = "")]
    other: String,
}

impl AddArgs {
    pub fn new(date: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            event: event.into(),
            detail: None,
            food: String::new(),
            fuel: String::new(),
            other: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_amounts(
        mut self,
        food: impl Into<String>,
        fuel: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        self.food = food.into();
        self.fuel = fuel.into();
        self.other = other.into();
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn food(&self) -> &str {
        &self.food
    }

    pub fn fuel(&self) -> &str {
        &self.fuel
    }

    pub fn other(&self) -> &str {
        &self.other
    }
}

/// Args for the `gastos delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the expense to delete.
    id: String,

    /// Delete without asking for confirmation.
    #[arg(long, short)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>, yes: bool) -> Self {
        Self { id: id.into(), yes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// How the `report` command prints the report.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Tables and a daily bar chart.
    #[default]
    Table,
    /// The whole report as JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Args for the `gastos report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The month to report on as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<MonthKey>,

    /// How to print the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ReportArgs {
    pub fn new(month: Option<MonthKey>, format: OutputFormat) -> Self {
        Self { month, format }
    }

    pub fn month(&self) -> Option<MonthKey> {
        self.month
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `gastos export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The month to export as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<MonthKey>,

    /// The file format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Md)]
    format: ReportFormat,

    /// The directory to write the report to. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

impl ExportArgs {
    pub fn new(month: Option<MonthKey>, format: ReportFormat, out: impl Into<PathBuf>) -> Self {
        Self {
            month,
            format,
            out: out.into(),
        }
    }

    pub fn month(&self) -> Option<MonthKey> {
        self.month
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn out(&self) -> &Path {
        &self.out
    }
}

fn default_gastos_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("gastos"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --gastos-home or GASTOS_HOME instead of relying on the default \
                gastos home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("gastos")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
