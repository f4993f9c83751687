//! Taskpilot - heuristic task analysis and build tracking.
//!
//! Scores task complexity, ranks assignees, breaks work into phases and
//! reports project health from the command line.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskpilot::core::Config;
use taskpilot::{
    AssigneeRanking, BuildStatus, ComplexityResult, Engine, FeaturePlan, ProjectFile,
    ProjectSource, ReportWindow, SubtaskTemplate, TaskDraft, TaskText,
};

/// Heuristic task analysis and build tracking
#[derive(Parser)]
#[command(name = "taskpilot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true, env = "TASKPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Rules file replacing the built-in keyword tables
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a task's complexity, priority and effort
    Analyze {
        /// Task title
        #[arg(required_unless_present = "task")]
        title: Option<String>,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Task id to read from the project file
        #[arg(long, requires = "project")]
        task: Option<String>,

        /// Project file (YAML or JSON)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rank team members for a task
    Assign {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Project file holding the team
        #[arg(short, long)]
        project: PathBuf,

        /// Only consider this department
        #[arg(long)]
        department: Option<String>,

        /// Maximum number of suggestions
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Break a task into phase-based sub-tasks
    Decompose {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Hours to split; analyzed from the text when omitted
        #[arg(long)]
        hours: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Build a task draft from a free-text description
    Draft {
        /// Free-text description
        description: String,

        /// Project file holding the team
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Only consider this department
        #[arg(long)]
        department: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Plan the tasks for a new feature
    Feature {
        /// Feature name
        name: String,

        /// Feature description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Report velocity, forecast and health of a project
    Status {
        /// Project file (YAML or JSON)
        #[arg(short, long)]
        project: PathBuf,

        /// Window start (RFC 3339), overriding the project file
        #[arg(long, requires = "until")]
        since: Option<DateTime<Utc>>,

        /// Window end (RFC 3339), overriding the project file
        #[arg(long, requires = "since")]
        until: Option<DateTime<Utc>>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the active keyword tables as TOML
    Rules,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Config { path } => return cmd_config(cli.config.as_deref(), path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref(), cli.rules)?;
    let engine = Engine::with_config(&config).context("Failed to load rules")?;

    match cli.command {
        Commands::Analyze { title, description, task, project, format } => {
            let text = match (task, project) {
                (Some(id), Some(project)) => load_project(&project)?.fetch_task(&id)?,
                _ => TaskText::new(title.unwrap_or_default(), description),
            };
            let result = engine.analyze_complexity(&text.title, &text.description)?;
            emit(format, &result, print_complexity)?;
        }
        Commands::Assign { title, description, project, department, limit, format } => {
            let project = load_project(&project)?;
            let candidates = project.fetch_candidates(department.as_deref())?;
            let text = TaskText::new(title, description);
            let mut ranking = engine.suggest_assignees(&text, &candidates, department.as_deref())?;
            ranking.truncate(limit.unwrap_or(config.general.max_suggestions));
            emit(format, &ranking, print_ranking)?;
        }
        Commands::Decompose { title, description, hours, format } => {
            let subtasks = engine.decompose_task(&TaskText::new(title, description), hours)?;
            emit(format, &subtasks, |s| print_subtasks(s))?;
        }
        Commands::Draft { description, project, department, format } => {
            let candidates = match &project {
                Some(path) => Some(load_project(path)?.fetch_candidates(department.as_deref())?),
                None => None,
            };
            let draft = engine.build_task_from_description(
                &description,
                candidates.as_deref(),
                department.as_deref(),
            )?;
            emit(format, &draft, print_draft)?;
        }
        Commands::Feature { name, description, format } => {
            let plan = engine.feature_plan(&name, &description)?;
            emit(format, &plan, print_feature)?;
        }
        Commands::Status { project, since, until, format } => {
            let window = since.zip(until).map(|(start, end)| ReportWindow::new(start, end));
            let snapshot = load_project(&project)?.fetch_project_snapshot(window)?;
            let status = engine.project_build_status(&snapshot)?;
            emit(format, &status, print_status)?;
        }
        Commands::Rules => {
            print!("{}", engine.tables().to_toml_string()?);
        }
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load configuration, honoring command-line overrides.
fn load_config(path: Option<&Path>, rules: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    if rules.is_some() {
        config.rules.path = rules;
    }
    Ok(config)
}

fn load_project(path: &Path) -> Result<ProjectFile> {
    ProjectFile::load(path).with_context(|| format!("Failed to read project {}", path.display()))
}

/// Print a value as pretty JSON or through a text renderer.
fn emit<T: Serialize + ?Sized>(format: OutputFormat, value: &T, text: impl Fn(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

fn print_complexity(result: &ComplexityResult) {
    println!("Score:       {}/10", result.score);
    println!("Priority:    {}", result.priority);
    println!("Estimate:    {}h", result.estimated_hours);
    println!("Confidence:  {:.0}%", result.confidence * 100.0);
    println!("Reasoning:   {}", result.reasoning);
}

fn print_ranking(ranking: &AssigneeRanking) {
    if ranking.ranked.is_empty() {
        println!("No candidates.");
        return;
    }

    let required: Vec<_> = ranking.required_skills.iter().map(|s| s.as_str()).collect();
    if !required.is_empty() {
        println!("Required skills: {}", required.join(", "));
    }
    for (i, suggestion) in ranking.ranked.iter().enumerate() {
        let skills: Vec<_> = suggestion.matched_skills.iter().map(|s| s.as_str()).collect();
        println!(
            "{:>2}. {:<20} {:.2}  {} ({})",
            i + 1,
            suggestion.display_name,
            suggestion.score,
            suggestion.candidate_id,
            if skills.is_empty() { "-".to_string() } else { skills.join(", ") }
        );
    }
    println!("Confidence: {:.0}%", ranking.confidence * 100.0);
}

fn print_subtasks(subtasks: &[SubtaskTemplate]) {
    for subtask in subtasks {
        println!(
            "[{:<9}] {:<50} {:>6.1}h  {}",
            subtask.phase.to_string(),
            subtask.title,
            subtask.estimated_hours,
            subtask.priority
        );
    }
}

fn print_draft(draft: &TaskDraft) {
    println!("Title:       {}", draft.title);
    println!("Priority:    {} (complexity {})", draft.priority, draft.complexity.priority);
    println!("Score:       {}/10", draft.complexity.score);
    println!("Estimate:    {}h", draft.estimated_hours);
    println!("Confidence:  {:.0}%", draft.confidence * 100.0);
    if let Some(assignee) = &draft.suggested_assignee {
        println!("Assignee:    {} ({:.2})", assignee.display_name, assignee.score);
    }
    println!();
    print_subtasks(&draft.subtasks);
}

fn print_feature(plan: &FeaturePlan) {
    println!("Feature:     {}", plan.name);
    println!("Score:       {}/10", plan.complexity.score);
    println!("Total:       {}h", plan.total_hours());
    println!();
    print_subtasks(&plan.tasks);
}

fn print_status(status: &BuildStatus) {
    let counts = &status.counts;
    println!("Tasks:       {} total", status.total_tasks);
    println!(
        "             {} todo, {} in progress, {} review, {} completed, {} blocked",
        counts.todo, counts.in_progress, counts.review, counts.completed, counts.blocked
    );
    println!("Completion:  {:.1}%", status.completion_pct);
    println!("Velocity:    {:.2} tasks/week over {:.2} weeks", status.velocity, status.weeks_elapsed);
    match status.predicted_completion {
        Some(date) => println!("Forecast:    {}", date.format("%Y-%m-%d")),
        None => println!("Forecast:    unknown"),
    }
    if let Some(due) = status.latest_due {
        println!("Due:         {}", due.format("%Y-%m-%d"));
    }
    println!("On track:    {}", if status.on_track { "yes" } else { "no" });
    println!(
        "Effort:      {:.1}h logged of {:.1}h estimated",
        status.total_actual_hours, status.total_estimated_hours
    );
    println!("Health:      {}/100 ({})", status.health_score, status.health_status);
    for deduction in &status.deductions {
        println!("             -{} {}", deduction.points, deduction.reason);
    }
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "taskpilot", &mut io::stdout());
}

/// Show configuration.
fn cmd_config(path: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        match path {
            Some(path) => println!("{}", path.display()),
            None => {
                if let Some(dir) = Config::config_dir() {
                    println!("{}", dir.join("config.toml").display());
                }
            }
        }
        return Ok(());
    }

    let config = load_config(path, None)?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");
    Ok(())
}
