use std::fmt;
use std::io::{self, Write};

use rand::SeedableRng;
use rand::rngs::StdRng;

use services::{ResultReporter, SurveyController, SurveyState};
use storage::session_store::SessionStore;
use survey_core::Clock;
use survey_core::model::{Category, ParticipantId, RatingDraft, SurveyConfig};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidParticipant { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidParticipant { raw } => {
                write!(f, "invalid --participant value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run    [--db <sqlite_url>] [--participant <abc>]");
    eprintln!("  cargo run -p app -- export [--db <sqlite_url>] --participant <abc>");
    eprintln!("  cargo run -p app -- stats  [--db <sqlite_url>] --participant <abc>");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>] --participant <abc>");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:survey.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SURVEY_DB_URL, SURVEY_PARTICIPANT, SURVEY_REPORT_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Export,
    Stats,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "export" => Some(Self::Export),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    participant: Option<ParticipantId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SURVEY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://survey.sqlite3".into(), normalize_sqlite_url);
        let mut participant = std::env::var("SURVEY_PARTICIPANT")
            .ok()
            .and_then(|value| ParticipantId::parse(&value).ok());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--participant" => {
                    let value = require_value(args, "--participant")?;
                    let parsed = ParticipantId::parse(&value)
                        .map_err(|_| ArgsError::InvalidParticipant { raw: value.clone() })?;
                    participant = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            participant,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_participant(preset: Option<ParticipantId>) -> io::Result<ParticipantId> {
    if let Some(id) = preset {
        return Ok(id);
    }
    loop {
        let raw = prompt("Enter your 3-letter id: ")?;
        match ParticipantId::parse(&raw) {
            Ok(id) => return Ok(id),
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn parse_guess(raw: &str) -> Option<Category> {
    match raw {
        "n" | "noisy" => Some(Category::Noisy),
        "o" | "original" => Some(Category::Original),
        "d" | "denoised" => Some(Category::Denoised),
        _ => None,
    }
}

fn print_stats(controller: &SurveyController) {
    let Some(stats) = controller.stats() else {
        eprintln!("no session found");
        return;
    };
    println!("responses: {}", stats.total());
    println!("accuracy:  {:.1}%", stats.accuracy_percent());
    for category in Category::ALL {
        println!(
            "mean quality ({}): {:.2}  [{} rated]",
            category,
            stats.mean_quality(category),
            stats.category_count(category),
        );
    }
}

async fn run_survey(
    controller: &mut SurveyController,
    preset: Option<ParticipantId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let participant = prompt_participant(preset)?;

    if controller.has_saved_session(&participant).await? {
        let answer = prompt("A saved session exists. Resume it? [Y/n] ")?;
        if answer.eq_ignore_ascii_case("n") {
            let mut rng = StdRng::from_os_rng();
            controller
                .start_session(participant, &SurveyConfig::default(), &mut rng)
                .await;
        } else {
            controller.resume(participant).await?;
        }
    } else {
        let mut rng = StdRng::from_os_rng();
        controller
            .start_session(participant, &SurveyConfig::default(), &mut rng)
            .await;
    }

    println!();
    println!("Rate each image's quality from 1 (worst) to 10 (best),");
    println!("then guess its category: [n]oisy, [o]riginal, or [d]enoised.");
    println!();

    while controller.state() == SurveyState::InProgress {
        let (answered, total) = controller.progress();
        let Some(trial) = controller.current_trial() else {
            break;
        };
        println!("[{}/{}] {}", answered + 1, total, trial.filename);

        let quality = prompt("  quality (1-10): ")?.parse::<u8>().ok();
        let guessed_category = parse_guess(&prompt("  category [n/o/d]: ")?);
        let comment = prompt("  comment (optional): ")?;

        let draft = RatingDraft {
            quality,
            guessed_category,
            comment,
        };
        match controller.submit_response(draft).await {
            Ok(result) if result.is_complete => {
                println!();
                println!("Session complete. Thank you!");
                print_stats(controller);
            }
            Ok(_) => {}
            Err(err) => eprintln!("  {err}"),
        }
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run the survey when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue
    // so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let store = SessionStore::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Run => {
            let mut controller = SurveyController::new(Clock::default_clock(), store)
                .with_reporter(ResultReporter::from_env());
            run_survey(&mut controller, parsed.participant).await
        }
        Command::Export => {
            let participant = parsed.participant.ok_or("export requires --participant")?;
            let mut controller = SurveyController::new(Clock::default_clock(), store);
            if !controller.resume(participant).await? {
                return Err("no session found for that participant".into());
            }
            let csv = controller.export_csv().unwrap_or_default();
            print!("{csv}");
            Ok(())
        }
        Command::Stats => {
            let participant = parsed.participant.ok_or("stats requires --participant")?;
            let mut controller = SurveyController::new(Clock::default_clock(), store);
            if !controller.resume(participant).await? {
                return Err("no session found for that participant".into());
            }
            print_stats(&controller);
            Ok(())
        }
        Command::Reset => {
            let participant = parsed.participant.ok_or("reset requires --participant")?;
            let mut controller = SurveyController::new(Clock::default_clock(), store);
            if !controller.resume(participant.clone()).await? {
                eprintln!("no session found for {participant}; nothing to reset");
                return Ok(());
            }
            controller.reset().await;
            println!("cleared session for {participant}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
