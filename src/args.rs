//! These structs provide the CLI interface for the caderneta CLI.

use crate::model::{Amount, Kind, MonthKey, DEFAULT_TAG_COLOR};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// caderneta: A command-line tool for a household budget kept in a spreadsheet.
///
/// The purpose of this program is to read and edit the registro, metas and organizadores tabs of
/// a household budget spreadsheet through the small web proxy that fronts it. It can show a
/// monthly dashboard, list the raw rows of any tab, and append, update or delete rows.
///
/// Run `caderneta init --proxy-url <URL>` first to record the proxy deployment URL.
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
    /// This is the first command you should run when setting up the caderneta CLI. You need a
    /// couple of things ready beforehand.
    ///
    /// - Decide what directory you want to store configuration in and pass this as --home. By
    ///   default, it will be $HOME/caderneta. If you want it somewhere else then you should
    ///   specify it.
    ///
    /// - Get the URL of the web proxy deployment that fronts your budget spreadsheet and pass it
    ///   as --proxy-url.
    ///
    Init(InitArgs),
    /// Show the dashboard for a month: totals, expenses by tag, and meta progress.
    Show(ShowArgs),
    /// List the raw rows of one of the sheet tabs.
    List(ListArgs),
    /// Append a row to one of the sheet tabs.
    Insert(InsertArgs),
    /// Change one cell of an existing row.
    Update(UpdateArgs),
    /// Delete a meta or organizador row. Registro rows cannot be deleted.
    Delete(DeleteArgs),
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

    /// The directory where caderneta configuration is held. Defaults to ~/caderneta
    #[arg(long, env = "CADERNETA_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `caderneta init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the web proxy deployment that fronts your budget spreadsheet. It looks like
    /// this: https://script.google.com/macros/s/AKfycbxExample/exec
    #[arg(long)]
    proxy_url: String,
}

impl InitArgs {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

/// Args for the `caderneta show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The month to show, e.g. 08/2026 or 08/26. Defaults to the latest month that has a dated
    /// registro row.
    #[arg(long)]
    month: Option<MonthKey>,
}

impl ShowArgs {
    pub fn new(month: Option<MonthKey>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<MonthKey> {
        self.month
    }
}

/// Args for the `caderneta list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// Which tab to list: "registros", "metas" or "tags"
    entity: ListEntity,
}

impl ListArgs {
    pub fn new(entity: ListEntity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> ListEntity {
        self.entity
    }
}

#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEntity {
    #[default]
    Registros,
    Metas,
    Tags,
}

serde_plain::derive_display_from_serialize!(ListEntity);
serde_plain::derive_fromstr_from_deserialize!(ListEntity);

/// Args for the `caderneta insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn new(entity: InsertSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Append a registro row.
    Transaction(InsertTransactionArgs),
    /// Append a meta row.
    Goal(InsertGoalArgs),
    /// Append an organizador row.
    Tag(InsertTagArgs),
}

/// Args for the `caderneta insert transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertTransactionArgs {
    /// The date of the transaction, e.g. 2026-08-25
    #[arg(long)]
    date: NaiveDate,

    /// What the money was for, e.g. "Supermercado Zona Sul"
    #[arg(long)]
    description: String,

    /// The amount in reais. Accepts "1.234,56", "1234,56" and "R$ 1.234,56".
    #[arg(long)]
    amount: Amount,

    /// Whether this is money in or money out: "Receita" or "Despesa"
    #[arg(long)]
    kind: Kind,

    /// A tag for the transaction. Repeat for up to four tags; the first one is the primary tag
    /// used in expense breakdowns.
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl InsertTransactionArgs {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        kind: Kind,
        tags: Vec<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            kind,
            tags,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Args for the `caderneta insert goal` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertGoalArgs {
    /// The month the meta applies to, e.g. 08/2026 or 08/26
    #[arg(long)]
    month: MonthKey,

    /// The tag the meta constrains, e.g. "Mercado"
    #[arg(long)]
    tag: String,

    /// The spending ceiling for the month, in reais
    #[arg(long)]
    target: Amount,
}

impl InsertGoalArgs {
    pub fn new(month: MonthKey, tag: impl Into<String>, target: Amount) -> Self {
        Self {
            month,
            tag: tag.into(),
            target,
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn target(&self) -> Amount {
        self.target
    }
}

/// Args for the `caderneta insert tag` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertTagArgs {
    /// The tag name, e.g. "Mercado"
    #[arg(long)]
    name: String,

    /// The chart color for the tag as a hex code, e.g. "#e8743b"
    #[arg(long, default_value = DEFAULT_TAG_COLOR)]
    color: String,

    /// The kind of money the tag represents: "Receita" or "Despesa"
    #[arg(long)]
    kind: Option<String>,
}

impl InsertTagArgs {
    pub fn new(name: impl Into<String>, color: impl Into<String>, kind: Option<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

/// Args for the `caderneta update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn new(entity: UpdateSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Change one cell of a registro row.
    Transaction(UpdateFieldArgs),
    /// Change one cell of a meta row.
    Goal(UpdateFieldArgs),
    /// Change one cell of an organizador row.
    Tag(UpdateFieldArgs),
}

/// Identifies one cell by row and column, and provides its replacement value.
#[derive(Debug, Parser, Clone)]
pub struct UpdateFieldArgs {
    /// The ROW_NUMBER of the row to change, as reported by `caderneta list`
    #[arg(long)]
    row: u64,

    /// The header of the column to change, e.g. "Valor" or "Meta"
    #[arg(long)]
    field: String,

    /// The replacement value, in the same format you would type into the sheet
    #[arg(long)]
    value: String,
}

impl UpdateFieldArgs {
    pub fn new(row: u64, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn row(&self) -> u64 {
        self.row
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Args for the `caderneta delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn new(entity: DeleteSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete a meta row.
    Goal(DeleteRowArgs),
    /// Delete an organizador row.
    Tag(DeleteRowArgs),
}

/// Identifies one row to delete.
#[derive(Debug, Parser, Clone)]
pub struct DeleteRowArgs {
    /// The ROW_NUMBER of the row to delete, as reported by `caderneta list`
    #[arg(long)]
    row: u64,
}

impl DeleteRowArgs {
    pub fn new(row: u64) -> Self {
        Self { row }
    }

    pub fn row(&self) -> u64 {
        self.row
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("caderneta"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or CADERNETA_HOME instead of relying on the default \
                caderneta home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("caderneta")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_with_month() {
        let args = Args::try_parse_from(["caderneta", "show", "--month", "08/2026"]).unwrap();
        match args.command() {
            Command::Show(show_args) => {
                let month = show_args.month().unwrap();
                assert_eq!("08/2026", month.to_string());
            }
            other => panic!("Expected the show command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_rejects_garbage_month() {
        assert!(Args::try_parse_from(["caderneta", "show", "--month", "13/2026"]).is_err());
        assert!(Args::try_parse_from(["caderneta", "show", "--month", "agosto"]).is_err());
    }

    #[test]
    fn test_parse_list_entities() {
        for (raw, expected) in [
            ("registros", "registros"),
            ("metas", "metas"),
            ("tags", "tags"),
        ] {
            let args = Args::try_parse_from(["caderneta", "list", raw]).unwrap();
            match args.command() {
                Command::List(list_args) => {
                    assert_eq!(expected, list_args.entity().to_string());
                }
                other => panic!("Expected the list command, got {other:?}"),
            }
        }
        assert!(Args::try_parse_from(["caderneta", "list", "contas"]).is_err());
    }

    #[test]
    fn test_parse_insert_transaction_with_repeated_tags() {
        let args = Args::try_parse_from([
            "caderneta",
            "insert",
            "transaction",
            "--date",
            "2026-08-25",
            "--description",
            "Padaria Imperial",
            "--amount",
            "38,90",
            "--kind",
            "Despesa",
            "--tag",
            "Mercado",
            "--tag",
            "Padaria",
        ])
        .unwrap();
        match args.command() {
            Command::Insert(insert_args) => match insert_args.entity() {
                InsertSubcommand::Transaction(t) => {
                    assert_eq!("Padaria Imperial", t.description());
                    assert_eq!(Kind::Expense, t.kind());
                    assert_eq!(&["Mercado".to_string(), "Padaria".to_string()], t.tags());
                }
                other => panic!("Expected insert transaction, got {other:?}"),
            },
            other => panic!("Expected the insert command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_insert_tag_default_color() {
        let args =
            Args::try_parse_from(["caderneta", "insert", "tag", "--name", "Mercado"]).unwrap();
        match args.command() {
            Command::Insert(insert_args) => match insert_args.entity() {
                InsertSubcommand::Tag(t) => {
                    assert_eq!("Mercado", t.name());
                    assert_eq!(DEFAULT_TAG_COLOR, t.color());
                    assert_eq!(None, t.kind());
                }
                other => panic!("Expected insert tag, got {other:?}"),
            },
            other => panic!("Expected the insert command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_and_delete() {
        let args = Args::try_parse_from([
            "caderneta", "update", "goal", "--row", "3", "--field", "Meta", "--value", "750",
        ])
        .unwrap();
        match args.command() {
            Command::Update(update_args) => match update_args.entity() {
                UpdateSubcommand::Goal(u) => {
                    assert_eq!(3, u.row());
                    assert_eq!("Meta", u.field());
                    assert_eq!("750", u.value());
                }
                other => panic!("Expected update goal, got {other:?}"),
            },
            other => panic!("Expected the update command, got {other:?}"),
        }

        // Deleting a registro row is not a command that exists.
        assert!(Args::try_parse_from(["caderneta", "delete", "transaction", "--row", "2"]).is_err());
        assert!(Args::try_parse_from(["caderneta", "delete", "goal", "--row", "2"]).is_ok());
    }
}
