use std::fmt;
use std::sync::Arc;

use gameplan_core::geo::Coordinates;
use gameplan_core::model::{
    StudentId, StudentProfile, Task, TaskBoard, TaskCategory, TaskId, TrainerId,
};
use serde_json::json;
use services::tracker::TRAINERS_COLLECTION;
use services::{
    AppServices, Clock, DashboardTracker, DashboardView, FixedLocationProvider, LocationProvider,
    Notice, Notifier, RecordingNavigator,
};
use storage::repository::Storage;
use storage::sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCoordinate { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    InvalidCategory(String),
    InvalidTaskId(String),
    MissingTask,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCoordinate { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCategory(raw) => write!(f, "invalid task category: {raw}"),
            ArgsError::InvalidTaskId(raw) => write!(f, "invalid task id: {raw}"),
            ArgsError::MissingTask => write!(f, "toggle needs <category> <task-id>"),
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
    eprintln!("  cargo run -p app -- status [options]");
    eprintln!("  cargo run -p app -- toggle <Exercise|Practice> <task-id> [options]");
    eprintln!("  cargo run -p app -- attend [options]");
    eprintln!("  cargo run -p app -- save   [options]");
    eprintln!("  cargo run -p app -- seed   [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>       (default sqlite://gameplan.sqlite3)");
    eprintln!("  --student-id <id>");
    eprintln!("  --student-name <name>");
    eprintln!("  --trainer-id <id>");
    eprintln!("  --lat <deg> --lon <deg> current device position");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GAMEPLAN_DB_URL, GAMEPLAN_STUDENT_ID, GAMEPLAN_TRAINER_ID");
    eprintln!("  GAMEPLAN_TARGET_LAT, GAMEPLAN_TARGET_LON, GAMEPLAN_TARGET_RADIUS_M");
    eprintln!("  GAMEPLAN_DOCS_BASE_URL, GAMEPLAN_DOCS_API_KEY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Toggle,
    Attend,
    Save,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "toggle" => Some(Self::Toggle),
            "attend" => Some(Self::Attend),
            "save" => Some(Self::Save),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    student_id: String,
    student_name: String,
    trainer_id: String,
    lat: Option<f64>,
    lon: Option<f64>,
    positional: Vec<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("GAMEPLAN_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://gameplan.sqlite3".into(), normalize_sqlite_url);
        let mut student_id = std::env::var("GAMEPLAN_STUDENT_ID").unwrap_or_default();
        let mut student_name = String::new();
        let mut trainer_id = std::env::var("GAMEPLAN_TRAINER_ID").unwrap_or_default();
        let mut lat = None;
        let mut lon = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--student-id" => student_id = require_value(args, "--student-id")?,
                "--student-name" => student_name = require_value(args, "--student-name")?,
                "--trainer-id" => trainer_id = require_value(args, "--trainer-id")?,
                "--lat" => lat = Some(parse_coordinate(args, "--lat")?),
                "--lon" => lon = Some(parse_coordinate(args, "--lon")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        Ok(Self {
            db_url,
            student_id,
            student_name,
            trainer_id,
            lat,
            lon,
            positional,
        })
    }

    fn student(&self) -> StudentProfile {
        StudentProfile::new(
            StudentId::new(self.student_id.clone()),
            self.student_name.clone(),
            TrainerId::new(self.trainer_id.clone()),
        )
    }

    fn location(&self) -> Result<FixedLocationProvider, Box<dyn std::error::Error>> {
        Ok(match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => FixedLocationProvider::granted(Coordinates::new(lat, lon)?),
            _ => FixedLocationProvider::without_fix(),
        })
    }

    fn task(&self) -> Result<(TaskCategory, TaskId), ArgsError> {
        let [category, id] = self.positional.as_slice() else {
            return Err(ArgsError::MissingTask);
        };
        let category = category
            .parse()
            .map_err(|_| ArgsError::InvalidCategory(category.clone()))?;
        let id = id.parse().map_err(|_| ArgsError::InvalidTaskId(id.clone()))?;
        Ok((category, id))
    }
}

fn parse_coordinate(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<f64, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidCoordinate { flag, raw: value })
}

/// Prints every notice as it is raised.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("[{}] {}", notice.title, notice.message);
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

fn sample_board() -> TaskBoard {
    TaskBoard::new()
        .with_tasks(
            TaskCategory::Exercise,
            vec![
                Task::new(TaskId::new(1), "Push-ups (3 x 15)"),
                Task::new(TaskId::new(2), "Plank (1 min)"),
                Task::new(TaskId::new(3), "Sprint intervals"),
            ],
        )
        .with_tasks(
            TaskCategory::Practice,
            vec![
                Task::new(TaskId::new(1), "Dribbling drills"),
                Task::new(TaskId::new(2), "Free throws"),
            ],
        )
}

async fn seed(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let trainer_id = if args.trainer_id.trim().is_empty() {
        "T-001"
    } else {
        args.trainer_id.trim()
    };
    repo.put_document(
        TRAINERS_COLLECTION,
        trainer_id,
        &json!({ "trainerID": trainer_id, "name": "Coach Rivera", "sport": "Basketball" }),
    )
    .await?;

    let storage = Storage::from_sqlite(repo);
    storage.progress().save(&sample_board()).await?;

    tracing::info!(db = %args.db_url, trainer_id, "seeded sample data");
    println!("seeded {} (trainer {trainer_id})", args.db_url);
    Ok(())
}

fn print_view(view: &DashboardView) {
    println!("{} ({})  [{}]", view.student_name, view.student_id, view.initial);
    match &view.trainer {
        Some(trainer) => println!("Trainer: {} ({})", trainer.name, trainer.id),
        None => println!("Trainer: -"),
    }
    println!("{}", view.streak_label);
    println!(
        "{}{}",
        view.attendance_button.label,
        if view.attendance_button.enabled {
            ""
        } else {
            " (disabled)"
        }
    );
    for category in &view.categories {
        println!("{}:", category.category);
        for task in &category.tasks {
            let mark = if task.completed { 'x' } else { ' ' };
            println!("  [{mark}] {} {}", task.id, task.name);
        }
    }
    if !view.marked_dates.is_empty() {
        let dates: Vec<String> = view.marked_dates.iter().map(ToString::to_string).collect();
        println!("Attended: {}", dates.join(", "));
    }
    println!(
        "Save progress: {}",
        if view.save_enabled { "ready" } else { "tasks open" }
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => Command::Status,
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;

    if cmd == Command::Seed {
        return seed(&parsed).await;
    }

    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    let location: Arc<dyn LocationProvider> = Arc::new(parsed.location()?);
    let deps = services.tracker_deps(
        location,
        Arc::new(RecordingNavigator::new()),
        Arc::new(ConsoleNotifier),
    );
    let mut tracker = DashboardTracker::initialize(deps, Some(parsed.student())).await?;

    match cmd {
        Command::Status | Command::Seed => {}
        Command::Toggle => {
            let (category, id) = parsed.task()?;
            if tracker.toggle_task(category, id).await?.is_none() {
                println!("no task {id} in {category}");
            }
        }
        Command::Attend => {
            if tracker.evaluate_configured_location().await?.is_none() {
                println!("no target location configured; set GAMEPLAN_TARGET_*");
            }
            tracker.mark_attendance().await?;
        }
        Command::Save => {
            tracker.save_progress().await?;
        }
    }

    print_view(&tracker.snapshot());
    Ok(())
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

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
