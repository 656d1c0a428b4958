use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use liftlog::analytics::AnalyticsEngine;
use liftlog::charts::{ChartBuilder, ChartMetric, ChartSeries};
use liftlog::config::{AppConfig, OutputFormat};
use liftlog::database::{Database, HistoryQuery};
use liftlog::error::{ErrorSeverity, LiftLogError, ValidationError};
use liftlog::goals;
use liftlog::locale::Locale;
use liftlog::logging::{init_logging, LogLevel};
use liftlog::models::{FitnessGoal, GoalType, GridCell, TrainingGrid, WorkingSet};
use liftlog::one_rm::{OneRmCalculator, OneRmRequest};
use liftlog::program_plan::{day_of_week, month_bounds, PlanDayGenerator};
use liftlog::requests::{
    BodyWeightRequest, ExerciseRequest, GoalProgressRequest, GoalRequest, PersonalRecordRequest,
    ProfileRequest, ProgramExerciseRequest, ProgramSessionRequest, SessionExerciseRequest,
    TrainingProgramRequest, TrainingRecordRequest, TrainingSessionRequest,
};
use liftlog::validation::{parse_date, Pagination, Validate, DEFAULT_PAGE_SIZE};

/// LiftLog - personal strength training log
///
/// Keeps profiles, logged training, programs, goals and body measurements in
/// a local SQLite database and derives analytics, progress charts and
/// percentage-based working sets from them.
#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author = "LiftLog Contributors")]
#[command(version)]
#[command(about = "Strength training log and analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and LIFTLOG_DATABASE)
    #[arg(long, value_name = "FILE", global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Language of recommendations and labels (ru, en)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a one-rep max and prescribe six working sets
    OneRm {
        /// Weight lifted (kg)
        #[arg(long)]
        weight: Decimal,

        /// Reps performed (1-20)
        #[arg(long)]
        reps: u32,

        /// Target intensity, % of 1RM (50-100)
        #[arg(long, default_value = "80")]
        percentage: Decimal,

        /// Estimation formula (brzycki, epley, lander)
        #[arg(long, default_value = "brzycki")]
        formula: String,
    },

    /// Manage profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Manage the exercise catalog
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Manage 4-week training records
    #[command(subcommand)]
    Training(TrainingCommand),

    /// Profile statistics, muscle-group balance and recommendations
    Analytics {
        #[arg(short, long)]
        profile: i64,
    },

    /// Weekly progress chart over the training records
    Charts {
        #[arg(short, long)]
        profile: i64,

        /// weight, volume or intensity
        #[arg(long, default_value = "weight")]
        metric: ChartMetric,

        /// Restrict the chart to these exercises (repeatable)
        #[arg(long = "exercise")]
        exercises: Vec<String>,

        /// Period label echoed in the result
        #[arg(long, default_value = "all")]
        period: String,
    },

    /// Distinct exercises a profile has logged
    Exercises {
        #[arg(short, long)]
        profile: i64,
    },

    /// Body weight log
    #[command(subcommand)]
    BodyWeight(BodyWeightCommand),

    /// Personal records
    #[command(subcommand)]
    Pr(PrCommand),

    /// Training goals
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Training sessions and history
    #[command(subcommand)]
    Session(SessionCommand),

    /// Training programs
    #[command(subcommand)]
    Program(ProgramCommand),

    /// Show or create the configuration file
    Config {
        /// Write the effective configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    age: Option<u16>,
    #[arg(long)]
    gender: Option<String>,
    /// Body weight (kg)
    #[arg(long)]
    weight: Option<Decimal>,
    /// Height (cm)
    #[arg(long)]
    height: Option<u16>,
    /// strength, mass, endurance, weight_loss or other
    #[arg(long)]
    goal: Option<FitnessGoal>,
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum ProfileCommand {
    Add(ProfileArgs),
    List,
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        args: ProfileArgs,
    },
    /// Delete a profile and everything it owns
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a custom exercise
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        muscle_group: String,
    },
    List,
    /// Delete a custom exercise
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum TrainingCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        exercise: String,
        /// JSON file holding the 4x6 grid of {"reps", "kg"} cells
        #[arg(long, value_name = "FILE")]
        grid: Option<PathBuf>,
    },
    List {
        #[arg(short, long)]
        profile: i64,
    },
    /// Set one grid cell of a record
    SetCell {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        /// 1-4
        #[arg(long)]
        week: usize,
        /// 1-6
        #[arg(long)]
        day: usize,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        kg: u32,
    },
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum BodyWeightCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        weight: Decimal,
        #[arg(long, default_value = "")]
        notes: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
    },
    List {
        #[arg(short, long)]
        profile: i64,
    },
    Update {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        weight: Decimal,
        #[arg(long, default_value = "")]
        notes: String,
        /// YYYY-MM-DD, keeps the recorded date when omitted
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
    },
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum PrCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        exercise: String,
        #[arg(long)]
        weight: Decimal,
        #[arg(long)]
        reps: u32,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
    },
    List {
        #[arg(short, long)]
        profile: i64,
    },
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum GoalCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// weight, reps, volume, body_weight or custom
        #[arg(long = "type")]
        goal_type: GoalType,
        #[arg(long, default_value = "")]
        exercise: String,
        #[arg(long)]
        target: Decimal,
        /// Defaults to the unit of the goal type
        #[arg(long, default_value = "")]
        unit: String,
        /// YYYY-MM-DD, defaults to one month from today
        #[arg(long, value_parser = parse_cli_date)]
        target_date: Option<NaiveDate>,
    },
    List {
        #[arg(short, long)]
        profile: i64,
    },
    /// Rewrite a goal's definition, keeping its current value
    Update {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "type")]
        goal_type: GoalType,
        #[arg(long, default_value = "")]
        exercise: String,
        #[arg(long)]
        target: Decimal,
        /// Keeps the stored unit when empty
        #[arg(long, default_value = "")]
        unit: String,
        /// YYYY-MM-DD, keeps the stored date when omitted
        #[arg(long, value_parser = parse_cli_date)]
        target_date: Option<NaiveDate>,
    },
    /// Record the current value of a goal
    Progress {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        value: Decimal,
    },
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum SessionCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
        /// Minutes
        #[arg(long, default_value_t = 0)]
        duration: u32,
        #[arg(long, default_value = "")]
        notes: String,
        /// 1-10
        #[arg(long, default_value_t = 0)]
        energy: u8,
        /// 1-10
        #[arg(long, default_value_t = 0)]
        mood: u8,
        /// 1-10
        #[arg(long, default_value_t = 0)]
        soreness: u8,
    },
    /// Add an exercise with its sets to a session
    AddExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        session: i64,
        #[arg(long)]
        exercise: String,
        /// WEIGHTxREPS[@RPE], repeatable (e.g. 100x5@8)
        #[arg(long = "set", value_parser = parse_working_set)]
        sets: Vec<WorkingSet>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Paginated history, newest first
    List {
        #[arg(short, long)]
        profile: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(long, value_parser = parse_cli_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_cli_date)]
        to: Option<NaiveDate>,
    },
    Show {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
    Update {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        /// YYYY-MM-DD, keeps the recorded date when omitted
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        duration: u32,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value_t = 0)]
        energy: u8,
        #[arg(long, default_value_t = 0)]
        mood: u8,
        #[arg(long, default_value_t = 0)]
        soreness: u8,
    },
    /// Replace an exercise of a session with new sets
    UpdateExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        session: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        exercise: String,
        #[arg(long = "set", value_parser = parse_working_set)]
        sets: Vec<WorkingSet>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    DeleteExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        session: i64,
        #[arg(long)]
        id: i64,
    },
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProgramCommand {
    Add {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_parser = parse_cli_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_cli_date)]
        end: NaiveDate,
        /// Make this the active program
        #[arg(long)]
        active: bool,
    },
    List {
        #[arg(short, long)]
        profile: i64,
    },
    /// Rewrite a program. `--active` deactivates the others.
    Update {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_parser = parse_cli_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_cli_date)]
        end: NaiveDate,
        #[arg(long)]
        active: bool,
    },
    /// Make a program the only active one
    Activate {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
    /// Delete a program with its exercises and sessions
    Delete {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        id: i64,
    },
    AddExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        exercise: String,
        /// 1 = Monday .. 7 = Sunday
        #[arg(long)]
        day: u8,
        #[arg(long, default_value_t = 1)]
        order: u32,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long, default_value = "0")]
        weight: Decimal,
        #[arg(long, default_value = "")]
        notes: String,
    },
    UpdateExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        exercise: String,
        /// 1 = Monday .. 7 = Sunday
        #[arg(long)]
        day: u8,
        #[arg(long, default_value_t = 1)]
        order: u32,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long, default_value = "0")]
        weight: Decimal,
        #[arg(long, default_value = "")]
        notes: String,
    },
    DeleteExercise {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        id: i64,
    },
    Exercises {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
    },
    /// Calendar of planned days in a month
    PlanDays {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    LogSession {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        completed: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    UpdateSession {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        id: i64,
        /// YYYY-MM-DD, keeps the logged date when omitted
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        completed: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    DeleteSession {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long)]
        id: i64,
    },
    Sessions {
        #[arg(short, long)]
        profile: i64,
        #[arg(long)]
        program: i64,
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
}

fn parse_cli_date(value: &str) -> std::result::Result<NaiveDate, ValidationError> {
    parse_date("date", value)
}

/// Parse `WEIGHTxREPS[@RPE]`
fn parse_working_set(value: &str) -> std::result::Result<WorkingSet, String> {
    let invalid = || format!("Invalid set '{}'. Use WEIGHTxREPS[@RPE], e.g. 100x5@8", value);

    let (load, rpe) = match value.split_once('@') {
        Some((load, rpe)) => (load, rpe.trim().parse::<u8>().map_err(|_| invalid())?),
        None => (value, 0),
    };
    let (weight, reps) = load
        .to_lowercase()
        .split_once(&['x', '×'][..])
        .map(|(w, r)| (w.trim().to_string(), r.trim().to_string()))
        .ok_or_else(invalid)?;

    Ok(WorkingSet {
        weight: weight.parse::<Decimal>().map_err(|_| invalid())?,
        reps: reps.parse::<u32>().map_err(|_| invalid())?,
        rpe,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    config.logging.level = LogLevel::from_verbosity(config.logging.level, cli.verbose);
    init_logging(&config.logging).context("Failed to initialize logging")?;

    if let Some(locale) = cli.locale {
        config.settings.locale = locale;
    }
    let format = cli.format.unwrap_or(config.settings.output_format);

    if let Commands::Config { init } = cli.command {
        return run_config(&mut config, cli.config.as_deref(), init);
    }

    let database_path = cli.database.unwrap_or_else(|| config.database_path());
    if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    let db = Database::new(&database_path)
        .map_err(LiftLogError::from)
        .with_context(|| format!("Failed to open database: {}", database_path.display()))?
        .with_locale(config.settings.locale);

    let mut app = App {
        db,
        config,
        output: Output { format },
    };

    if let Err(err) = app.run(cli.command) {
        match err.severity() {
            ErrorSeverity::Warning => tracing::warn!(error = %err, "Command rejected"),
            ErrorSeverity::Error => tracing::error!(error = %err, "Command failed"),
        }
        eprintln!("{} {}", "✗".red().bold(), err.user_message().red());
        std::process::exit(1);
    }

    Ok(())
}

fn run_config(config: &mut AppConfig, path: Option<&Path>, init: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_config_path);

    if init {
        config.save_to_file(&path)?;
        println!("{} {}", "✓ Configuration written to".green(), path.display());
    } else {
        println!("{} {}", "Configuration file:".bold(), path.display());
        let database_path = config.database_path();
        println!("{} {}", "Database:".bold(), database_path.display());
        if database_path.exists() {
            let stats = Database::new(&database_path)
                .with_context(|| format!("Failed to open database: {}", database_path.display()))?
                .get_stats()?;
            println!(
                "  {} profiles, {} exercises, {} training records, {} sessions, {} programs",
                stats.profile_count,
                stats.exercise_count,
                stats.training_record_count,
                stats.session_count,
                stats.program_count
            );
        }
        println!();
        println!("{}", toml::to_string_pretty(config).context("Failed to render configuration")?);
    }
    Ok(())
}

struct App {
    db: Database,
    config: AppConfig,
    output: Output,
}

impl App {
    fn run(&mut self, command: Commands) -> liftlog::Result<()> {
        match command {
            Commands::OneRm {
                weight,
                reps,
                percentage,
                formula,
            } => self.one_rm(OneRmRequest {
                weight,
                reps,
                percentage,
                formula,
            }),
            Commands::Profile(command) => self.profile(command),
            Commands::Exercise(command) => self.exercise(command),
            Commands::Training(command) => self.training(command),
            Commands::Analytics { profile } => self.analytics(profile),
            Commands::Charts {
                profile,
                metric,
                exercises,
                period,
            } => self.charts(profile, metric, &exercises, period),
            Commands::Exercises { profile } => {
                self.db.get_profile(profile)?;
                let names = self.db.profile_exercises(profile)?;
                self.output.render(&names, "Logged exercises", || {
                    names
                        .iter()
                        .map(|name| NameRow { name: name.clone() })
                        .collect()
                })
            }
            Commands::BodyWeight(command) => self.body_weight(command),
            Commands::Pr(command) => self.personal_records(command),
            Commands::Goal(command) => self.goal(command),
            Commands::Session(command) => self.session(command),
            Commands::Program(command) => self.program(command),
            Commands::Config { .. } => Ok(()),
        }
    }

    fn one_rm(&self, request: OneRmRequest) -> liftlog::Result<()> {
        request.validate()?;
        let response = OneRmCalculator::calculate(&request);

        match self.output.format {
            OutputFormat::Json => self.output.json(&response),
            OutputFormat::Table => {
                println!(
                    "{} {} kg ({})",
                    "Estimated 1RM:".bold().cyan(),
                    response.one_rm,
                    response.formula.as_str()
                );
                println!(
                    "{} {} kg × {} @ {}%",
                    "Target:".bold(),
                    response.target_weight,
                    response.target_reps,
                    response.percentage
                );
                let rows: Vec<SetRow> = response
                    .sets
                    .iter()
                    .enumerate()
                    .map(|(i, set)| SetRow {
                        set: i + 1,
                        reps: set.reps,
                        kg: set.weight.to_string(),
                    })
                    .collect();
                println!("{}", styled(Table::new(rows)));
                Ok(())
            }
        }
    }

    fn profile(&mut self, command: ProfileCommand) -> liftlog::Result<()> {
        match command {
            ProfileCommand::Add(args) => {
                let request = ProfileRequest {
                    name: args.name.unwrap_or_default(),
                    age: args.age,
                    gender: args.gender,
                    weight: args.weight,
                    height: args.height,
                    goal: args.goal,
                    experience: args.experience,
                    notes: args.notes,
                };
                request.validate()?;
                let profile = self.db.create_profile(&request)?;
                self.output.render(&profile, "Profile created", || {
                    vec![ProfileRow::from(&profile)]
                })
            }
            ProfileCommand::List => {
                let profiles = self.db.list_profiles()?;
                self.output.render(&profiles, "Profiles", || {
                    profiles.iter().map(ProfileRow::from).collect()
                })
            }
            ProfileCommand::Update { id, args } => {
                let current = self.db.get_profile(id)?;
                let request = ProfileRequest {
                    name: args.name.unwrap_or(current.name),
                    age: args.age.or(current.age),
                    gender: args.gender.or(current.gender),
                    weight: args.weight.or(current.weight),
                    height: args.height.or(current.height),
                    goal: args.goal.or(current.goal),
                    experience: args.experience.or(current.experience),
                    notes: args.notes.or(current.notes),
                };
                request.validate()?;
                let profile = self.db.update_profile(id, &request)?;
                self.output.render(&profile, "Profile updated", || {
                    vec![ProfileRow::from(&profile)]
                })
            }
            ProfileCommand::Delete { id } => {
                self.db.delete_profile(id)?;
                self.output.deleted("profile", id)
            }
        }
    }

    fn exercise(&mut self, command: ExerciseCommand) -> liftlog::Result<()> {
        match command {
            ExerciseCommand::Add {
                name,
                description,
                category,
                muscle_group,
            } => {
                let request = ExerciseRequest {
                    name,
                    description,
                    category,
                    muscle_group,
                };
                request.validate()?;
                let exercise = self.db.create_exercise(&request)?;
                self.output.render(&exercise, "Exercise created", || {
                    vec![ExerciseRow::from(&exercise)]
                })
            }
            ExerciseCommand::List => {
                let exercises = self.db.list_exercises()?;
                self.output.render(&exercises, "Exercise catalog", || {
                    exercises.iter().map(ExerciseRow::from).collect()
                })
            }
            ExerciseCommand::Delete { id } => {
                self.db.delete_exercise(id)?;
                self.output.deleted("exercise", id)
            }
        }
    }

    fn training(&mut self, command: TrainingCommand) -> liftlog::Result<()> {
        match command {
            TrainingCommand::Add {
                profile,
                exercise,
                grid,
            } => {
                let grid = match grid {
                    Some(path) => read_grid(&path)?,
                    None => TrainingGrid::default(),
                };
                let request = TrainingRecordRequest { exercise, grid };
                request.validate()?;
                let record = self.db.create_training_record(profile, &request)?;
                self.output.render(&record, "Training record created", || {
                    vec![RecordRow::from(&record)]
                })
            }
            TrainingCommand::List { profile } => {
                self.db.get_profile(profile)?;
                let records = self.db.list_training_records(profile)?;
                self.output.render(&records, "Training records", || {
                    records.iter().map(RecordRow::from).collect()
                })
            }
            TrainingCommand::SetCell {
                profile,
                id,
                week,
                day,
                reps,
                kg,
            } => {
                let mut record = self.db.get_training_record(profile, id)?;
                record.grid.set_cell(week, day, GridCell::new(reps, kg))?;
                self.db.update_training_record(profile, &record)?;
                self.output.render(&record, "Training record updated", || {
                    vec![RecordRow::from(&record)]
                })
            }
            TrainingCommand::Delete { profile, id } => {
                self.db.delete_training_record(profile, id)?;
                self.output.deleted("training record", id)
            }
        }
    }

    fn analytics(&self, profile_id: i64) -> liftlog::Result<()> {
        let profile = self.db.get_profile(profile_id)?;
        let records = self.db.list_training_records(profile_id)?;
        let catalog = self.db.exercise_catalog()?;

        let engine = AnalyticsEngine::with_config(self.config.analytics.clone())
            .with_locale(self.config.settings.locale);
        let result = engine.compute(&profile, &records, &catalog);

        match self.output.format {
            OutputFormat::Json => self.output.json(&result),
            OutputFormat::Table => {
                println!("{} {}", "Analytics for".bold().cyan(), profile.name.bold());

                let mut summary = vec![
                    KeyValueRow::new("Workouts", result.profile.total_workouts),
                    KeyValueRow::new("Exercises", result.profile.total_exercises),
                    KeyValueRow::new("Total volume (kg)", result.profile.total_volume),
                ];
                if let Some(bmi) = result.profile.bmi {
                    summary.push(KeyValueRow::new("BMI", bmi.round_dp(1)));
                }
                summary.push(KeyValueRow::new("Workouts per week", result.progress.frequency_per_week));
                if !result.progress.most_improved_exercise.is_empty() {
                    summary.push(KeyValueRow::new(
                        "Most improved",
                        format!(
                            "{} (+{}%)",
                            result.progress.most_improved_exercise, result.progress.weight_progress
                        ),
                    ));
                }
                println!("{}", styled(Table::new(summary)));

                if !result.muscle_group_balance.is_empty() {
                    println!("{}", "Muscle-group balance".bold());
                    let rows: Vec<BalanceRow> = result
                        .muscle_group_balance
                        .iter()
                        .map(|stat| BalanceRow {
                            muscle_group: stat.muscle_group.clone(),
                            records: stat.count,
                            volume: stat.volume.to_string(),
                            share: format!("{}%", stat.percentage),
                        })
                        .collect();
                    println!("{}", styled(Table::new(rows)));
                }

                if !result.exercise_stats.is_empty() {
                    println!("{}", "Exercises".bold());
                    let rows: Vec<ExerciseStatRow> = result
                        .exercise_stats
                        .iter()
                        .map(|stat| ExerciseStatRow {
                            exercise: stat.exercise.clone(),
                            max_kg: stat.max_weight.to_string(),
                            volume: stat.total_volume.to_string(),
                        })
                        .collect();
                    println!("{}", styled(Table::new(rows)));
                }

                if !result.recommendations.is_empty() {
                    println!("{}", "Recommendations".bold());
                    for recommendation in &result.recommendations {
                        println!("  {} {}", "•".yellow(), recommendation);
                    }
                }
                Ok(())
            }
        }
    }

    fn charts(&self, profile_id: i64, metric: ChartMetric, filter: &[String], period: String) -> liftlog::Result<()> {
        self.db.get_profile(profile_id)?;
        let records = self.db.list_training_records(profile_id)?;
        let series = ChartBuilder::new()
            .with_locale(self.config.settings.locale)
            .with_period(period)
            .build(&records, metric, filter);

        match self.output.format {
            OutputFormat::Json => self.output.json(&series),
            OutputFormat::Table => {
                println!(
                    "{} {} ({})",
                    "Progress chart:".bold().cyan(),
                    series.chart_type.as_str(),
                    series.period
                );
                if series.exercises.is_empty() {
                    println!("{}", "(no exercises)".dimmed());
                } else {
                    println!("{}", styled(chart_table(&series)));
                }
                Ok(())
            }
        }
    }

    fn body_weight(&mut self, command: BodyWeightCommand) -> liftlog::Result<()> {
        match command {
            BodyWeightCommand::Add {
                profile,
                weight,
                notes,
                date,
            } => {
                let request = BodyWeightRequest { weight, notes, date };
                request.validate()?;
                let entry = self.db.add_body_weight(profile, &request)?;
                self.output.render(&entry, "Body weight recorded", || {
                    vec![BodyWeightRow {
                        id: entry.id,
                        date: entry.date.to_string(),
                        weight: entry.weight.to_string(),
                        notes: entry.notes.clone(),
                    }]
                })
            }
            BodyWeightCommand::List { profile } => {
                self.db.get_profile(profile)?;
                let entries = self.db.list_body_weights(profile)?;
                self.output.render(&entries, "Body weight", || {
                    entries
                        .iter()
                        .map(|entry| BodyWeightRow {
                            id: entry.id,
                            date: entry.date.to_string(),
                            weight: entry.weight.to_string(),
                            notes: entry.notes.clone(),
                        })
                        .collect()
                })
            }
            BodyWeightCommand::Update {
                profile,
                id,
                weight,
                notes,
                date,
            } => {
                let request = BodyWeightRequest { weight, notes, date };
                request.validate()?;
                let entry = self.db.update_body_weight(profile, id, &request)?;
                self.output.render(&entry, "Body weight updated", || {
                    vec![BodyWeightRow {
                        id: entry.id,
                        date: entry.date.to_string(),
                        weight: entry.weight.to_string(),
                        notes: entry.notes.clone(),
                    }]
                })
            }
            BodyWeightCommand::Delete { profile, id } => {
                self.db.delete_body_weight(profile, id)?;
                self.output.deleted("body weight entry", id)
            }
        }
    }

    fn personal_records(&mut self, command: PrCommand) -> liftlog::Result<()> {
        match command {
            PrCommand::Add {
                profile,
                exercise,
                weight,
                reps,
                date,
            } => {
                let request = PersonalRecordRequest {
                    exercise,
                    weight,
                    reps,
                    date,
                };
                request.validate()?;
                let record = self.db.add_personal_record(profile, &request)?;
                self.output.render(&record, "Personal record saved", || {
                    vec![PrRow {
                        id: record.id,
                        date: record.date.to_string(),
                        exercise: record.exercise.clone(),
                        weight: record.weight.to_string(),
                        reps: record.reps,
                    }]
                })
            }
            PrCommand::List { profile } => {
                self.db.get_profile(profile)?;
                let records = self.db.list_personal_records(profile)?;
                self.output.render(&records, "Personal records", || {
                    records
                        .iter()
                        .map(|record| PrRow {
                            id: record.id,
                            date: record.date.to_string(),
                            exercise: record.exercise.clone(),
                            weight: record.weight.to_string(),
                            reps: record.reps,
                        })
                        .collect()
                })
            }
            PrCommand::Delete { profile, id } => {
                self.db.delete_personal_record(profile, id)?;
                self.output.deleted("personal record", id)
            }
        }
    }

    fn goal(&mut self, command: GoalCommand) -> liftlog::Result<()> {
        match command {
            GoalCommand::Add {
                profile,
                title,
                description,
                goal_type,
                exercise,
                target,
                unit,
                target_date,
            } => {
                let request = GoalRequest {
                    title,
                    description,
                    goal_type,
                    exercise,
                    target_value: target,
                    unit,
                    target_date,
                };
                request.validate()?;
                let goal = self.db.create_goal(profile, &request)?;
                self.output.render(&goal, "Goal created", || vec![GoalRow::from(&goal)])
            }
            GoalCommand::List { profile } => {
                self.db.get_profile(profile)?;
                let goals = self.db.list_goals(profile)?;
                self.output.render(&goals, "Goals", || goals.iter().map(GoalRow::from).collect())
            }
            GoalCommand::Update {
                profile,
                id,
                title,
                description,
                goal_type,
                exercise,
                target,
                unit,
                target_date,
            } => {
                let request = GoalRequest {
                    title,
                    description,
                    goal_type,
                    exercise,
                    target_value: target,
                    unit,
                    target_date,
                };
                request.validate()?;
                let was_achieved = self.db.get_goal(profile, id)?.achieved;
                let goal = self.db.update_goal(profile, id, &request)?;
                if goal.achieved && !was_achieved && self.output.format == OutputFormat::Table {
                    println!("{} {}", "🏆 Goal achieved:".green().bold(), goal.title);
                }
                self.output.render(&goal, "Goal updated", || vec![GoalRow::from(&goal)])
            }
            GoalCommand::Progress { profile, id, value } => {
                let request = GoalProgressRequest { current_value: value };
                request.validate()?;
                let was_achieved = self.db.get_goal(profile, id)?.achieved;
                let goal = self.db.update_goal_progress(profile, id, &request)?;
                if goal.achieved && !was_achieved && self.output.format == OutputFormat::Table {
                    println!("{} {}", "🏆 Goal achieved:".green().bold(), goal.title);
                }
                self.output.render(&goal, "Goal progress", || vec![GoalRow::from(&goal)])
            }
            GoalCommand::Delete { profile, id } => {
                self.db.delete_goal(profile, id)?;
                self.output.deleted("goal", id)
            }
        }
    }

    fn session(&mut self, command: SessionCommand) -> liftlog::Result<()> {
        match command {
            SessionCommand::Add {
                profile,
                date,
                duration,
                notes,
                energy,
                mood,
                soreness,
            } => {
                let request = TrainingSessionRequest {
                    date,
                    duration,
                    notes,
                    energy,
                    mood,
                    soreness,
                };
                let session = self.db.create_session(profile, &request)?;
                self.output.render(&session, "Session created", || {
                    vec![SessionRow {
                        id: session.id,
                        date: session.date.to_string(),
                        minutes: session.duration,
                        energy_mood_soreness: format!("{}/{}/{}", session.energy, session.mood, session.soreness),
                        exercises: 0,
                        volume: "0".to_string(),
                    }]
                })
            }
            SessionCommand::AddExercise {
                profile,
                session,
                exercise,
                sets,
                notes,
            } => {
                let request = SessionExerciseRequest { exercise, sets, notes };
                request.validate()?;
                let added = self.db.add_session_exercise(profile, session, &request)?;
                self.output.render(&added, "Exercise added", || {
                    added
                        .sets
                        .iter()
                        .enumerate()
                        .map(|(i, set)| WorkingSetRow::new(&added.exercise, i + 1, set))
                        .collect()
                })
            }
            SessionCommand::List {
                profile,
                page,
                page_size,
                from,
                to,
            } => {
                self.db.get_profile(profile)?;
                let query = HistoryQuery {
                    pagination: Pagination::new(page, page_size),
                    date_from: from,
                    date_to: to,
                };
                let history = self.db.training_history(profile, &query)?;

                match self.output.format {
                    OutputFormat::Json => self.output.json(&history),
                    OutputFormat::Table => {
                        println!(
                            "{} page {} ({} of {} sessions)",
                            "Training history".bold().cyan(),
                            history.page,
                            history.sessions.len(),
                            history.total_count
                        );
                        let rows: Vec<SessionRow> = history
                            .sessions
                            .iter()
                            .map(|entry| SessionRow {
                                id: entry.session.id,
                                date: entry.session.date.to_string(),
                                minutes: entry.session.duration,
                                energy_mood_soreness: format!(
                                    "{}/{}/{}",
                                    entry.session.energy, entry.session.mood, entry.session.soreness
                                ),
                                exercises: entry.exercises.len(),
                                volume: entry
                                    .exercises
                                    .iter()
                                    .flat_map(|e| e.sets.iter())
                                    .map(|set| set.weight * Decimal::from(set.reps))
                                    .sum::<Decimal>()
                                    .to_string(),
                            })
                            .collect();
                        println!("{}", styled(Table::new(rows)));
                        if history.has_more {
                            println!("{}", format!("More sessions on page {}", history.page + 1).dimmed());
                        }
                        Ok(())
                    }
                }
            }
            SessionCommand::Show { profile, id } => {
                let session = self.db.get_session(profile, id)?;
                match self.output.format {
                    OutputFormat::Json => self.output.json(&session),
                    OutputFormat::Table => {
                        println!(
                            "{} {} ({} min)",
                            "Session".bold().cyan(),
                            session.session.date,
                            session.session.duration
                        );
                        if !session.session.notes.is_empty() {
                            println!("{}", session.session.notes.dimmed());
                        }
                        let rows: Vec<WorkingSetRow> = session
                            .exercises
                            .iter()
                            .flat_map(|exercise| {
                                exercise
                                    .sets
                                    .iter()
                                    .enumerate()
                                    .map(move |(i, set)| WorkingSetRow::new(&exercise.exercise, i + 1, set))
                            })
                            .collect();
                        println!("{}", styled(Table::new(rows)));
                        Ok(())
                    }
                }
            }
            SessionCommand::Update {
                profile,
                id,
                date,
                duration,
                notes,
                energy,
                mood,
                soreness,
            } => {
                let request = TrainingSessionRequest {
                    date,
                    duration,
                    notes,
                    energy,
                    mood,
                    soreness,
                };
                let session = self.db.update_session(profile, id, &request)?;
                let exercises = self.db.get_session(profile, id)?.exercises;
                self.output.render(&session, "Session updated", || {
                    vec![SessionRow {
                        id: session.id,
                        date: session.date.to_string(),
                        minutes: session.duration,
                        energy_mood_soreness: format!("{}/{}/{}", session.energy, session.mood, session.soreness),
                        exercises: exercises.len(),
                        volume: exercises
                            .iter()
                            .flat_map(|e| e.sets.iter())
                            .map(|set| set.weight * Decimal::from(set.reps))
                            .sum::<Decimal>()
                            .to_string(),
                    }]
                })
            }
            SessionCommand::UpdateExercise {
                profile,
                session,
                id,
                exercise,
                sets,
                notes,
            } => {
                let request = SessionExerciseRequest { exercise, sets, notes };
                request.validate()?;
                let updated = self.db.update_session_exercise(profile, session, id, &request)?;
                self.output.render(&updated, "Exercise updated", || {
                    updated
                        .sets
                        .iter()
                        .enumerate()
                        .map(|(i, set)| WorkingSetRow::new(&updated.exercise, i + 1, set))
                        .collect()
                })
            }
            SessionCommand::DeleteExercise { profile, session, id } => {
                self.db.delete_session_exercise(profile, session, id)?;
                self.output.deleted("session exercise", id)
            }
            SessionCommand::Delete { profile, id } => {
                self.db.delete_session(profile, id)?;
                self.output.deleted("session", id)
            }
        }
    }

    fn program(&mut self, command: ProgramCommand) -> liftlog::Result<()> {
        match command {
            ProgramCommand::Add {
                profile,
                name,
                description,
                start,
                end,
                active,
            } => {
                let request = TrainingProgramRequest {
                    name,
                    description,
                    start_date: start,
                    end_date: end,
                    is_active: active,
                };
                request.validate()?;
                let program = self.db.create_program(profile, &request)?;
                self.output.render(&program, "Program created", || {
                    vec![ProgramRow::from(&program)]
                })
            }
            ProgramCommand::List { profile } => {
                self.db.get_profile(profile)?;
                let programs = self.db.list_programs(profile)?;
                self.output.render(&programs, "Programs", || {
                    programs.iter().map(ProgramRow::from).collect()
                })
            }
            ProgramCommand::Update {
                profile,
                id,
                name,
                description,
                start,
                end,
                active,
            } => {
                let request = TrainingProgramRequest {
                    name,
                    description,
                    start_date: start,
                    end_date: end,
                    is_active: active,
                };
                request.validate()?;
                let program = self.db.update_program(profile, id, &request)?;
                self.output.render(&program, "Program updated", || {
                    vec![ProgramRow::from(&program)]
                })
            }
            ProgramCommand::Activate { profile, id } => {
                let program = self.db.activate_program(profile, id)?;
                self.output.render(&program, "Program activated", || {
                    vec![ProgramRow::from(&program)]
                })
            }
            ProgramCommand::Delete { profile, id } => {
                self.db.delete_program(profile, id)?;
                self.output.deleted("program", id)
            }
            ProgramCommand::AddExercise {
                profile,
                program,
                exercise,
                day,
                order,
                sets,
                reps,
                weight,
                notes,
            } => {
                let request = ProgramExerciseRequest {
                    exercise,
                    day_of_week: day,
                    order,
                    sets,
                    reps,
                    weight,
                    notes,
                };
                request.validate()?;
                let added = self.db.add_program_exercise(profile, program, &request)?;
                self.output.render(&added, "Program exercise added", || {
                    vec![ProgramExerciseRow::from(&added)]
                })
            }
            ProgramCommand::UpdateExercise {
                profile,
                program,
                id,
                exercise,
                day,
                order,
                sets,
                reps,
                weight,
                notes,
            } => {
                let request = ProgramExerciseRequest {
                    exercise,
                    day_of_week: day,
                    order,
                    sets,
                    reps,
                    weight,
                    notes,
                };
                request.validate()?;
                let updated = self.db.update_program_exercise(profile, program, id, &request)?;
                self.output.render(&updated, "Program exercise updated", || {
                    vec![ProgramExerciseRow::from(&updated)]
                })
            }
            ProgramCommand::DeleteExercise { profile, program, id } => {
                self.db.delete_program_exercise(profile, program, id)?;
                self.output.deleted("program exercise", id)
            }
            ProgramCommand::Exercises { profile, program } => {
                let exercises = self.db.list_program_exercises(profile, program)?;
                self.output.render(&exercises, "Program exercises", || {
                    exercises.iter().map(ProgramExerciseRow::from).collect()
                })
            }
            ProgramCommand::PlanDays {
                profile,
                program,
                year,
                month,
            } => {
                let program = self.db.get_program(profile, program)?;
                let exercises = self.db.list_program_exercises(profile, program.id)?;
                let days = PlanDayGenerator::plan_days(&program, &exercises, year, month)?;
                self.output.render(&days, &format!("{} {:04}-{:02}", program.name, year, month), || {
                    days.iter()
                        .map(|day| PlanDayRow {
                            date: day.date.to_string(),
                            weekday: day_of_week(day.date),
                            exercises: day
                                .exercises
                                .iter()
                                .map(|e| format!("{} {}×{} @ {} kg", e.exercise, e.sets, e.reps, e.weight))
                                .collect::<Vec<_>>()
                                .join(", "),
                        })
                        .collect()
                })
            }
            ProgramCommand::LogSession {
                profile,
                program,
                date,
                completed,
                notes,
            } => {
                let request = ProgramSessionRequest { date, completed, notes };
                let session = self.db.log_program_session(profile, program, &request)?;
                self.output.render(&session, "Program session logged", || {
                    vec![ProgramSessionRow {
                        id: session.id,
                        date: session.date.to_string(),
                        completed: session.completed,
                        notes: session.notes.clone(),
                    }]
                })
            }
            ProgramCommand::UpdateSession {
                profile,
                program,
                id,
                date,
                completed,
                notes,
            } => {
                let request = ProgramSessionRequest { date, completed, notes };
                let session = self.db.update_program_session(profile, program, id, &request)?;
                self.output.render(&session, "Program session updated", || {
                    vec![ProgramSessionRow {
                        id: session.id,
                        date: session.date.to_string(),
                        completed: session.completed,
                        notes: session.notes.clone(),
                    }]
                })
            }
            ProgramCommand::DeleteSession { profile, program, id } => {
                self.db.delete_program_session(profile, program, id)?;
                self.output.deleted("program session", id)
            }
            ProgramCommand::Sessions {
                profile,
                program,
                year,
                month,
            } => {
                let range = match (year, month) {
                    (Some(year), Some(month)) => Some(month_bounds(year, month)?),
                    _ => None,
                };
                let sessions = self.db.list_program_sessions(profile, program, range)?;
                self.output.render(&sessions, "Program sessions", || {
                    sessions
                        .iter()
                        .map(|session| ProgramSessionRow {
                            id: session.id,
                            date: session.date.to_string(),
                            completed: session.completed,
                            notes: session.notes.clone(),
                        })
                        .collect()
                })
            }
        }
    }
}

fn read_grid(path: &Path) -> liftlog::Result<TrainingGrid> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

struct Output {
    format: OutputFormat,
}

impl Output {
    fn json<T: Serialize + ?Sized>(&self, value: &T) -> liftlog::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// JSON of `value`, or a titled table built from `rows`
    fn render<T, R, F>(&self, value: &T, title: &str, rows: F) -> liftlog::Result<()>
    where
        T: Serialize + ?Sized,
        R: Tabled,
        F: FnOnce() -> Vec<R>,
    {
        match self.format {
            OutputFormat::Json => self.json(value),
            OutputFormat::Table => {
                println!("{}", title.bold().cyan());
                let rows = rows();
                if rows.is_empty() {
                    println!("{}", "(none)".dimmed());
                } else {
                    println!("{}", styled(Table::new(rows)));
                }
                Ok(())
            }
        }
    }

    fn deleted(&self, what: &str, id: i64) -> liftlog::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "deleted": what, "id": id })),
            OutputFormat::Table => {
                println!("{}", format!("✓ Deleted {} {}", what, id).green());
                Ok(())
            }
        }
    }
}

fn styled(mut table: Table) -> Table {
    table.with(Style::rounded());
    table
}

/// One row per week, one column per charted exercise
fn chart_table(series: &ChartSeries) -> Table {
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(series.exercises.iter().cloned());
    builder.push_record(header);

    for point in &series.chart_data {
        let mut row = vec![point.week.clone()];
        row.extend(series.exercises.iter().map(|exercise| {
            point
                .exercise_data
                .get(exercise)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        builder.push_record(row);
    }

    builder.build()
}

#[derive(Tabled)]
struct NameRow {
    name: String,
}

#[derive(Tabled)]
struct SetRow {
    set: usize,
    reps: u32,
    kg: String,
}

#[derive(Tabled)]
struct KeyValueRow {
    metric: String,
    value: String,
}

impl KeyValueRow {
    fn new(metric: &str, value: impl ToString) -> Self {
        KeyValueRow {
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ProfileRow {
    id: i64,
    name: String,
    age: String,
    #[tabled(rename = "weight (kg)")]
    weight: String,
    #[tabled(rename = "height (cm)")]
    height: String,
    goal: String,
    bmi: String,
}

impl From<&liftlog::Profile> for ProfileRow {
    fn from(profile: &liftlog::Profile) -> Self {
        ProfileRow {
            id: profile.id,
            name: profile.name.clone(),
            age: display_opt(profile.age),
            weight: display_opt(profile.weight),
            height: display_opt(profile.height),
            goal: profile.goal.map(|g| g.as_str().to_string()).unwrap_or_default(),
            bmi: display_opt(profile.bmi().map(|bmi| bmi.round_dp(1))),
        }
    }
}

#[derive(Tabled)]
struct ExerciseRow {
    id: i64,
    name: String,
    category: String,
    #[tabled(rename = "muscle group")]
    muscle_group: String,
    custom: bool,
}

impl From<&liftlog::ExerciseCatalogEntry> for ExerciseRow {
    fn from(entry: &liftlog::ExerciseCatalogEntry) -> Self {
        ExerciseRow {
            id: entry.id,
            name: entry.name.clone(),
            category: entry.category.clone(),
            muscle_group: entry.muscle_group.clone(),
            custom: entry.is_custom,
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    id: i64,
    exercise: String,
    #[tabled(rename = "max kg")]
    max_kg: u32,
    volume: String,
    #[tabled(rename = "days logged")]
    days_logged: usize,
}

impl From<&liftlog::TrainingRecord> for RecordRow {
    fn from(record: &liftlog::TrainingRecord) -> Self {
        RecordRow {
            id: record.id,
            exercise: record.exercise.clone(),
            max_kg: record.grid.max_weight(),
            volume: record.grid.total_volume().to_string(),
            days_logged: record.grid.cells().filter(|cell| !cell.is_empty()).count(),
        }
    }
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "muscle group")]
    muscle_group: String,
    records: usize,
    volume: String,
    share: String,
}

#[derive(Tabled)]
struct ExerciseStatRow {
    exercise: String,
    #[tabled(rename = "max kg")]
    max_kg: String,
    volume: String,
}

#[derive(Tabled)]
struct BodyWeightRow {
    id: i64,
    date: String,
    #[tabled(rename = "weight (kg)")]
    weight: String,
    notes: String,
}

#[derive(Tabled)]
struct PrRow {
    id: i64,
    date: String,
    exercise: String,
    #[tabled(rename = "weight (kg)")]
    weight: String,
    reps: u32,
}

#[derive(Tabled)]
struct GoalRow {
    id: i64,
    title: String,
    #[tabled(rename = "type")]
    goal_type: String,
    progress: String,
    #[tabled(rename = "done %")]
    done: String,
    due: String,
    achieved: bool,
}

impl From<&liftlog::Goal> for GoalRow {
    fn from(goal: &liftlog::Goal) -> Self {
        let days_left = goals::days_until_target(goal, Utc::now().date_naive());
        GoalRow {
            id: goal.id,
            title: goal.title.clone(),
            goal_type: goal.goal_type.as_str().to_string(),
            progress: format!("{} / {} {}", goal.current_value, goal.target_value, goal.unit),
            done: goals::completion_percentage(goal).round_dp(1).to_string(),
            due: format!("{} ({}d)", goal.target_date, days_left),
            achieved: goal.achieved,
        }
    }
}

#[derive(Tabled)]
struct SessionRow {
    id: i64,
    date: String,
    minutes: u32,
    #[tabled(rename = "energy/mood/soreness")]
    energy_mood_soreness: String,
    exercises: usize,
    volume: String,
}

#[derive(Tabled)]
struct WorkingSetRow {
    exercise: String,
    set: usize,
    kg: String,
    reps: u32,
    rpe: String,
}

impl WorkingSetRow {
    fn new(exercise: &str, number: usize, set: &WorkingSet) -> Self {
        WorkingSetRow {
            exercise: exercise.to_string(),
            set: number,
            kg: set.weight.to_string(),
            reps: set.reps,
            rpe: if set.rpe == 0 { String::new() } else { set.rpe.to_string() },
        }
    }
}

#[derive(Tabled)]
struct ProgramRow {
    id: i64,
    name: String,
    start: String,
    end: String,
    active: bool,
}

impl From<&liftlog::TrainingProgram> for ProgramRow {
    fn from(program: &liftlog::TrainingProgram) -> Self {
        ProgramRow {
            id: program.id,
            name: program.name.clone(),
            start: program.start_date.to_string(),
            end: program.end_date.to_string(),
            active: program.is_active,
        }
    }
}

#[derive(Tabled)]
struct ProgramExerciseRow {
    id: i64,
    day: u8,
    order: u32,
    exercise: String,
    sets: u32,
    reps: u32,
    kg: String,
}

impl From<&liftlog::ProgramExercise> for ProgramExerciseRow {
    fn from(exercise: &liftlog::ProgramExercise) -> Self {
        ProgramExerciseRow {
            id: exercise.id,
            day: exercise.day_of_week,
            order: exercise.order,
            exercise: exercise.exercise.clone(),
            sets: exercise.sets,
            reps: exercise.reps,
            kg: exercise.weight.to_string(),
        }
    }
}

#[derive(Tabled)]
struct PlanDayRow {
    date: String,
    weekday: u8,
    exercises: String,
}

#[derive(Tabled)]
struct ProgramSessionRow {
    id: i64,
    date: String,
    completed: bool,
    notes: String,
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_working_set() {
        let set = parse_working_set("102.5x5@8").unwrap();
        assert_eq!(set.weight, dec!(102.5));
        assert_eq!(set.reps, 5);
        assert_eq!(set.rpe, 8);

        let set = parse_working_set("60X12").unwrap();
        assert_eq!(set.weight, dec!(60));
        assert_eq!(set.rpe, 0);

        assert!(parse_working_set("60").is_err());
        assert!(parse_working_set("heavy x 5").is_err());
        assert!(parse_working_set("100x5@hard").is_err());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "liftlog", "--format", "json", "program", "plan-days", "-p", "1", "--program", "2",
            "--year", "2024", "--month", "3",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Program(ProgramCommand::PlanDays { year: 2024, month: 3, .. })
        ));
    }

    #[test]
    fn test_cli_parses_child_row_updates() {
        let cli = Cli::try_parse_from([
            "liftlog", "session", "update-exercise", "-p", "1", "--session", "2", "--id", "3",
            "--exercise", "Squat", "--set", "100x5@8", "--set", "105x3",
        ])
        .unwrap();
        match cli.command {
            Commands::Session(SessionCommand::UpdateExercise { session, id, sets, .. }) => {
                assert_eq!((session, id), (2, 3));
                assert_eq!(sets.len(), 2);
                assert_eq!(sets[1].weight, dec!(105));
            }
            _ => panic!("expected session update-exercise"),
        }

        let cli = Cli::try_parse_from([
            "liftlog", "program", "delete-session", "-p", "1", "--program", "4", "--id", "9",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Program(ProgramCommand::DeleteSession { program: 4, id: 9, .. })
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_metric() {
        let result = Cli::try_parse_from(["liftlog", "charts", "-p", "1", "--metric", "speed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "liftlog", "body-weight", "add", "-p", "1", "--weight", "80", "--date", "01/02/2024",
        ]);
        assert!(result.is_err());
    }
}
