mod app;
mod calendar;
mod dates;
mod form;
mod help;
mod prompt;
mod session;
mod store;
mod tasks;
mod theme;
use crate::app::App;
use crate::dates::parse_date_key;
use crate::session::Session;
use crate::store::{AnnotationKind, FileStorage, TaskStore};
use anyhow::Context;
use env_logger::{Builder, Target, WriteStyle};
use lexopt::{Arg, Parser, ValueExt};
use log::LevelFilter;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

static DEFAULT_STORE: &str = "taskcal.json";
static STORE_ENV: &str = "TASKCAL_STORE";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        date: Option<Date>,
        store: Option<PathBuf>,
        history: bool,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        let mut store = None;
        let mut history = false;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("store") => store = Some(PathBuf::from(parser.value()?)),
                Arg::Long("history") => history = true,
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match parse_date_key(&value) {
                        Some(d) => date = Some(d),
                        None => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: "expected a date in YYYY-MM-DD format".into(),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            date,
            store,
            history,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                date,
                store,
                history,
                log_file,
            } => {
                if let Some(path) = log_file {
                    init_logging(&path)?;
                }
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let storage = FileStorage::new(store_path(store));
                log::info!("Using task store at {}", storage.path().display());
                let kind = if history {
                    AnnotationKind::History
                } else {
                    AnnotationKind::Note
                };
                let mut session = Session::new(TaskStore::load(storage, kind), today);
                if let Some(date) = date {
                    session = session.start_date(date);
                }
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(session).run(&mut terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: taskcal [options] [YYYY-MM-DD]");
                println!();
                println!("Terminal calendar for keeping track of dated tasks");
                println!();
                println!("Options:");
                println!("  --store FILE      Keep tasks in FILE [default: ${STORE_ENV} or {DEFAULT_STORE}]");
                println!("  --history         Give new tasks a history log instead of a note");
                println!("  --log-file FILE   Write log messages to FILE (level from RUST_LOG)");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn store_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(STORE_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
}

/// Sends log output to `path`, since the terminal belongs to the UI
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .try_init()
        .context("failed to initialize logging")?;
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
