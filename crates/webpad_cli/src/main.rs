//! Command-line host for the WebPad core.
//!
//! # Responsibility
//! - Drive preview composition and project persistence without a browser.
//! - Map core failures to a non-zero exit status with one stderr line.
//!
//! # Invariants
//! - Documents and project JSON go to stdout or `--out`; diagnostics go to stderr.

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use webpad_core::db::{open_db, DbError};
use webpad_core::service::project_service::apply;
use webpad_core::{
    init_logging, Action, ConfigError, DetachedWindows, DirectoryDownloads, LogTarget,
    LoggingError, MemoryKeyValueStore, Playground, PlaygroundConfig, PreviewError, PreviewWindow,
    Project, ProjectLoadError, ProjectStore, RestoreOutcome, SaveError, SqliteKeyValueStore,
    Workspace,
};

#[derive(Debug, Parser)]
#[command(name = "webpad", version, about = "HTML/CSS/JS playground tools")]
struct Cli {
    /// JSON config file; `WEBPAD_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the preview document composed from a project file.
    Compose {
        #[command(flatten)]
        project: ProjectArg,
        /// Append the project's test code after its script.
        #[arg(long)]
        tests: bool,
    },
    /// Write the full-window preview (no tests) to a file.
    Preview {
        #[command(flatten)]
        project: ProjectArg,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a project file in canonical form.
    Normalize {
        #[command(flatten)]
        project: ProjectArg,
    },
    /// Store a project under the storage key and export it as a download.
    Save {
        #[command(flatten)]
        project: ProjectArg,
        /// SQLite database standing in for browser storage.
        #[arg(long)]
        db: Option<PathBuf>,
        /// Directory receiving the exported file.
        #[arg(long, default_value = ".")]
        download_dir: PathBuf,
    },
    /// Print the project saved in the database, as restored at startup.
    Restore {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print core version information.
    Version,
}

#[derive(Debug, Args)]
struct ProjectArg {
    /// Project JSON file (current or legacy layout).
    #[arg(long = "project", value_name = "FILE")]
    path: PathBuf,
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Read { path: PathBuf, source: std::io::Error },
    Project(ProjectLoadError),
    Db(DbError),
    MissingDb,
    Save(SaveError),
    Preview(PreviewError),
    NothingSaved,
    RestoreFailed,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Logging(err) => write!(f, "logging: {err}"),
            Self::Read { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Project(err) => write!(f, "invalid project file: {err}"),
            Self::Db(err) => write!(f, "storage: {err}"),
            Self::MissingDb => write!(f, "no database given (use --db or WEBPAD_DB_PATH)"),
            Self::Save(err) => write!(f, "unable to save: {err}"),
            Self::Preview(err) => write!(f, "unable to open preview: {err}"),
            Self::NothingSaved => write!(f, "no saved project"),
            Self::RestoreFailed => write!(f, "saved project could not be restored"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Read { source, .. } => Some(source),
            Self::Project(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Save(err) => Some(err),
            Self::Preview(err) => Some(err),
            Self::MissingDb | Self::NothingSaved | Self::RestoreFailed => None,
        }
    }
}

impl From<ProjectLoadError> for CliError {
    fn from(value: ProjectLoadError) -> Self {
        Self::Project(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Writes the detached preview to a single file.
struct FileWindow {
    path: PathBuf,
    /// Result of the last open; `None` until the preview is opened.
    outcome: Option<Result<(), std::io::ErrorKind>>,
}

impl FileWindow {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            outcome: None,
        }
    }
}

impl PreviewWindow for FileWindow {
    fn open_document(&mut self, document: &str) -> Result<(), PreviewError> {
        let written = fs::write(&self.path, document);
        self.outcome = Some(match &written {
            Ok(()) => Ok(()),
            Err(err) => Err(err.kind()),
        });
        written.map_err(PreviewError::from)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("webpad: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = PlaygroundConfig::load(cli.config.as_deref()).map_err(CliError::Config)?;
    init_logging(&config.log_level, &LogTarget::from_dir(config.log_dir.as_deref()))
        .map_err(CliError::Logging)?;
    execute(cli.command, &config)
}

fn execute(command: Command, config: &PlaygroundConfig) -> Result<String, CliError> {
    match command {
        Command::Compose { project, tests } => {
            let project = read_project(&project.path)?;
            let mut playground = session(config, &project, DetachedWindows::new());
            playground.dispatch(if tests { Action::RunTests } else { Action::Run });
            Ok(playground.frame().document().unwrap_or_default().to_string())
        }
        Command::Preview { project, out } => {
            let project = read_project(&project.path)?;
            let mut playground = session(config, &project, FileWindow::new(out));
            playground.dispatch(Action::OpenPreview);
            let window = playground.window();
            match window.outcome {
                Some(Ok(())) => {
                    info!("event=cli_preview module=cli status=ok");
                    Ok(format!("wrote {}", window.path.display()))
                }
                Some(Err(kind)) => Err(CliError::Preview(PreviewError::Io(kind.into()))),
                None => Err(CliError::Preview(PreviewError::WindowBlocked)),
            }
        }
        Command::Normalize { project } => {
            let project = read_project(&project.path)?;
            project
                .to_pretty_json()
                .map_err(|err| CliError::Save(SaveError::Serialize(err)))
        }
        Command::Save {
            project,
            db,
            download_dir,
        } => {
            let project = read_project(&project.path)?;
            let conn = open_db(db_path(db, config)?)?;
            let storage = SqliteKeyValueStore::new(&conn).with_quota(config.storage_quota_bytes);
            let mut store =
                ProjectStore::new(storage, DirectoryDownloads::new(download_dir), config);
            let mut workspace: Workspace = Workspace::default();
            apply(&mut workspace, &project);
            store.try_save(&workspace).map_err(CliError::Save)?;
            let target = store.downloads().dir().join(&config.download_file_name);
            Ok(format!("saved {}", target.display()))
        }
        Command::Restore { db } => {
            let conn = open_db(db_path(db, config)?)?;
            let store = ProjectStore::new(
                SqliteKeyValueStore::new(&conn),
                DirectoryDownloads::new("."),
                config,
            );
            let mut workspace: Workspace = Workspace::default();
            match store.restore(&mut workspace) {
                RestoreOutcome::Restored => {
                    webpad_core::service::project_service::to_project(&workspace)
                        .to_pretty_json()
                        .map_err(|err| CliError::Save(SaveError::Serialize(err)))
                }
                RestoreOutcome::Absent => Err(CliError::NothingSaved),
                RestoreOutcome::Failed => Err(CliError::RestoreFailed),
            }
        }
        Command::Version => Ok(format!(
            "webpad_core ping={} version={}",
            webpad_core::ping(),
            webpad_core::core_version()
        )),
    }
}

fn read_project(path: &Path) -> Result<Project, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Project::from_json_str(&text)?)
}

fn db_path(flag: Option<PathBuf>, config: &PlaygroundConfig) -> Result<PathBuf, CliError> {
    flag.or_else(|| config.db_path.clone())
        .ok_or(CliError::MissingDb)
}

/// A headless session holding `project`, without restoring from storage.
fn session<W: PreviewWindow>(
    config: &PlaygroundConfig,
    project: &Project,
    window: W,
) -> Playground<MemoryKeyValueStore, DirectoryDownloads, W> {
    let mut workspace: Workspace = Workspace::default();
    apply(&mut workspace, project);
    Playground::new(
        config,
        workspace,
        MemoryKeyValueStore::new(),
        DirectoryDownloads::new("."),
        window,
    )
}
