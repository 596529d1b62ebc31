use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use txmatch_adapters::SqliteStore;
use txmatch_app::{
    Catalog, CollectUseCase, CreatePredicateUseCase, CreateSuiteUseCase, CreateTestCaseUseCase,
    RecordTransactionUseCase, ReportUseCase, RunLocks, SubmitRunRequest, SubmitRunUseCase,
    SystemClock, render_report_markdown, render_suite_summary,
};
use txmatch_config::{Overrides, Settings};
use txmatch_types::{
    Predicate, TestCaseSpec, TestRunRecord, TestStatus, TestSuiteSpec, Transaction,
};

const LOG_ENV: &str = "TXMATCH_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "txmatch",
    version,
    about = "Match captured HTTP transactions against test suites and report per-case verdicts"
)]
struct Cli {
    /// Config file (default: ./txmatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Predicate,
    TestCase,
    TestSuite,
    TestRun,
    Transaction,
}

/// Kinds that can be created from a JSON document. Runs are created with `run submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CreateKind {
    Predicate,
    TestCase,
    TestSuite,
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Markdown,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a document read from a JSON file; an id is generated when absent.
    Create {
        kind: CreateKind,

        /// JSON document path, or `-` for stdin
        #[arg(long)]
        file: PathBuf,
    },

    /// Print one document. Test cases, suites and runs are printed resolved.
    Get { kind: Kind, id: String },

    /// Print every stored document of a kind.
    List { kind: Kind },

    /// Delete one document.
    Delete { kind: Kind, id: String },

    /// Submit, collect and report on test runs.
    Run {
        #[command(subcommand)]
        cmd: RunCommand,
    },

    /// Inspect test suites.
    Suite {
        #[command(subcommand)]
        cmd: SuiteCommand,
    },
}

#[derive(Debug, Subcommand)]
enum RunCommand {
    /// Create a run for a test suite.
    Submit {
        #[arg(long)]
        suite: String,

        /// Opaque correlation key stored with the run
        #[arg(long, default_value = "")]
        api_key: String,
    },

    /// Match the run's transactions against its suite and store the results.
    Collect { run_id: String },

    /// Compile a report for a collected run.
    Report {
        run_id: String,

        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,

        /// Output path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Exit 2 unless every test case succeeded
        #[arg(long, default_value_t = false)]
        fail_on_failure: bool,
    },
}

#[derive(Debug, Subcommand)]
enum SuiteCommand {
    /// Print a plain-text summary of a suite's test cases and criteria.
    Summary { suite_id: String },
}

fn main() -> ExitCode {
    init_tracing();
    if let Err(err) = real_main() {
        eprintln!("error: {err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("resolve current directory")?;
    let settings = txmatch_config::resolve(
        &cwd,
        &Overrides {
            config: cli.config,
            db: cli.db,
            pretty: cli.pretty,
        },
    )?;
    tracing::debug!(db = %settings.db_path.display(), config = ?settings.source, "resolved settings");

    let store = SqliteStore::open(&settings.db_path)
        .with_context(|| format!("open store {}", settings.db_path.display()))?;
    let catalog = Catalog::new(&store);

    match cli.cmd {
        Command::Create { kind, file } => {
            let input = read_input(&file)?;
            let pretty = settings.pretty;
            match kind {
                CreateKind::Predicate => {
                    let doc: Predicate = parse_json(&input, &file)?;
                    let created = CreatePredicateUseCase::new(catalog).execute(doc)?;
                    print_json(&created, pretty)
                }
                CreateKind::TestCase => {
                    let doc: TestCaseSpec = parse_json(&input, &file)?;
                    let created = CreateTestCaseUseCase::new(catalog).execute(doc)?;
                    print_json(&created, pretty)
                }
                CreateKind::TestSuite => {
                    let doc: TestSuiteSpec = parse_json(&input, &file)?;
                    let created = CreateSuiteUseCase::new(catalog).execute(doc)?;
                    print_json(&created, pretty)
                }
                CreateKind::Transaction => {
                    let doc: Transaction = parse_json(&input, &file)?;
                    let created = RecordTransactionUseCase::new(catalog, SystemClock).execute(doc)?;
                    print_json(&created, pretty)
                }
            }
        }

        Command::Get { kind, id } => {
            let pretty = settings.pretty;
            match kind {
                Kind::Predicate => print_json(&catalog.get::<Predicate>(&id)?, pretty),
                Kind::TestCase => print_json(&catalog.load_test_case(&id.into())?, pretty),
                Kind::TestSuite => print_json(&catalog.load_test_suite(&id.into())?, pretty),
                Kind::TestRun => print_json(&catalog.load_test_run(&id.into())?, pretty),
                Kind::Transaction => print_json(&catalog.get::<Transaction>(&id)?, pretty),
            }
        }

        Command::List { kind } => {
            let pretty = settings.pretty;
            match kind {
                Kind::Predicate => print_json(&catalog.list::<Predicate>()?, pretty),
                Kind::TestCase => print_json(&catalog.list::<TestCaseSpec>()?, pretty),
                Kind::TestSuite => print_json(&catalog.list::<TestSuiteSpec>()?, pretty),
                Kind::TestRun => print_json(&catalog.list::<TestRunRecord>()?, pretty),
                Kind::Transaction => print_json(&catalog.list::<Transaction>()?, pretty),
            }
        }

        Command::Delete { kind, id } => {
            match kind {
                Kind::Predicate => catalog.delete::<Predicate>(&id)?,
                Kind::TestCase => catalog.delete::<TestCaseSpec>(&id)?,
                Kind::TestSuite => catalog.delete::<TestSuiteSpec>(&id)?,
                Kind::TestRun => catalog.delete::<TestRunRecord>(&id)?,
                Kind::Transaction => catalog.delete::<Transaction>(&id)?,
            }
            Ok(())
        }

        Command::Run { cmd } => run_command(cmd, catalog, &settings),

        Command::Suite {
            cmd: SuiteCommand::Summary { suite_id },
        } => {
            let suite = catalog.load_test_suite(&suite_id.into())?;
            print!("{}", render_suite_summary(&suite));
            Ok(())
        }
    }
}

fn run_command(
    cmd: RunCommand,
    catalog: Catalog<&SqliteStore>,
    settings: &Settings,
) -> anyhow::Result<()> {
    match cmd {
        RunCommand::Submit { suite, api_key } => {
            let run = SubmitRunUseCase::new(catalog, SystemClock).execute(SubmitRunRequest {
                suite: suite.into(),
                api_key,
            })?;
            print_json(&run, settings.pretty)
        }

        RunCommand::Collect { run_id } => {
            let usecase = CollectUseCase::new(
                catalog,
                SystemClock,
                settings.policy,
                Arc::new(RunLocks::new()),
            );
            let run = usecase.execute(&run_id.into())?;
            print_json(&run, settings.pretty)
        }

        RunCommand::Report {
            run_id,
            format,
            out,
            fail_on_failure,
        } => {
            let report = ReportUseCase::new(catalog)
                .execute(&run_id.into())
                .context("compile report")?;

            let rendered = match format {
                ReportFormat::Json => json_string(&report, settings.pretty)?,
                ReportFormat::Markdown => render_report_markdown(&report),
            };

            match out {
                Some(path) => write_output(&path, rendered.as_bytes())?,
                None => print!("{rendered}"),
            }

            let all_passed = report
                .test_case_reports
                .iter()
                .all(|c| c.status == TestStatus::Success);
            if fail_on_failure && !all_passed {
                std::io::stdout().flush().ok();
                std::process::exit(2);
            }
            Ok(())
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn parse_json<T: serde::de::DeserializeOwned>(input: &str, path: &Path) -> anyhow::Result<T> {
    serde_json::from_str(input).with_context(|| format!("parse json {}", path.display()))
}

fn json_string<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let mut s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    s.push('\n');
    Ok(s)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    print!("{}", json_string(value, pretty)?);
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }
    atomic_write(path, bytes)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = parent.to_path_buf();
    tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
