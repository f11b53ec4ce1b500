use careerforge::career::LetterKind;
use careerforge::cli::CommandContext;
use careerforge::cli::commands::{self, ats::AtsArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse letter kind from string
fn parse_letter_kind(s: &str) -> Result<LetterKind, String> {
    s.parse::<LetterKind>().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "careerforge")]
#[command(
    version,
    about = "AI career tools for resumes, ATS checks, letters and job search"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Explicit config file (replaces the project file)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Three short suggestions for improving a profile
    Insights {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
    },

    /// Write a professional summary from a profile
    Summary {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
    },

    /// Suggest skills the profile does not list yet
    Skills {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
        #[arg(long, short, help = "Target job title (default: profile job title)")]
        title: Option<String>,
    },

    /// Draft content for a resume section
    Section {
        #[arg(help = "Section title, e.g. \"Volunteering\"")]
        title: String,
        #[arg(long, short, help = "Target job title")]
        job_title: String,
    },

    /// Rewrite an experience description in STAR form
    Optimize {
        #[arg(help = "Experience description")]
        text: Option<String>,
        #[arg(long, help = "Read the description from a file")]
        file: Option<PathBuf>,
    },

    /// Score a resume against a job description
    Ats {
        #[arg(help = "Profile JSON export")]
        profile: Option<PathBuf>,
        #[arg(long, help = "Resume document (PDF) instead of a profile")]
        file: Option<PathBuf>,
        #[arg(long, help = "Job description text")]
        jd: Option<String>,
        #[arg(long, help = "Read the job description from a file")]
        jd_file: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Rewrite a profile to match a job description
    Fix {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
        #[arg(long, help = "Job description text")]
        jd: Option<String>,
        #[arg(long, help = "Read the job description from a file")]
        jd_file: Option<PathBuf>,
        #[arg(long, short, help = "Where to write the optimized profile")]
        output: PathBuf,
    },

    /// Write a cover, referral or thank-you letter
    Letter {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
        #[arg(long, short, value_parser = parse_letter_kind, default_value = "cover", help = "Letter kind: cover, referral, thank-you")]
        kind: LetterKind,
        #[arg(long, help = "Job description text")]
        jd: Option<String>,
        #[arg(long, help = "Read the job description from a file")]
        jd_file: Option<PathBuf>,
    },

    /// Ask the career assistant a question
    Ask {
        #[arg(help = "Question")]
        query: String,
        #[arg(long, help = "Earlier conversation turns, one per line")]
        history: Option<PathBuf>,
    },

    /// Find matching openings near a location
    Jobs {
        #[arg(help = "Profile JSON export")]
        profile: PathBuf,
        #[arg(long, short, help = "Location (default: profile location)")]
        location: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Create and inspect profile files
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create an empty profile
    New {
        path: PathBuf,
        #[arg(long, help = "Full name")]
        name: Option<String>,
        #[arg(long, help = "Target job title")]
        title: Option<String>,
        #[arg(long, help = "Overwrite existing file")]
        force: bool,
    },
    /// Summarize a profile and check entry ids
    Check {
        path: PathBuf,
        #[arg(long, short, help = "Write a copy with repaired ids")]
        output: Option<PathBuf>,
    },
    /// Show or apply the style override
    Style {
        path: PathBuf,
        #[arg(long, help = "Style JSON file to apply")]
        apply: Option<PathBuf>,
        #[arg(long, short, help = "Write to this path instead of in place")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
    /// Send a probe request through the provider chain
    Check,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mCareer Forge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    // Commands that never reach a provider
    match cli.command {
        Commands::Profile { action } => {
            match action {
                ProfileAction::New {
                    path,
                    name,
                    title,
                    force,
                } => commands::profile::new(&path, name, title, force)?,
                ProfileAction::Check { path, output } => {
                    commands::profile::check(&path, output.as_deref())?
                }
                ProfileAction::Style {
                    path,
                    apply,
                    output,
                } => commands::profile::style(&path, apply.as_deref(), output.as_deref())?,
            }
            return Ok(());
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show { format } => commands::config::show(config_path, &format)?,
                ConfigAction::Path => commands::config::path(config_path)?,
                ConfigAction::Init { global, force } => commands::config::init(global, force)?,
                ConfigAction::Check => {
                    let rt = Runtime::new()?;
                    rt.block_on(commands::config::check(config_path))?;
                }
            }
            return Ok(());
        }
        command => {
            let ctx = CommandContext::load(config_path)?;
            let rt = Runtime::new()?;
            rt.block_on(run_task(&ctx, command))?;
        }
    }

    Ok(())
}

async fn run_task(ctx: &CommandContext, command: Commands) -> careerforge::Result<()> {
    match command {
        Commands::Insights { profile } => commands::tasks::insights(ctx, &profile).await,
        Commands::Summary { profile } => commands::tasks::summary(ctx, &profile).await,
        Commands::Skills { profile, title } => commands::tasks::skills(ctx, &profile, title).await,
        Commands::Section { title, job_title } => {
            commands::tasks::section(ctx, &title, &job_title).await
        }
        Commands::Optimize { text, file } => {
            commands::tasks::optimize(ctx, text, file.as_ref()).await
        }
        Commands::Ats {
            profile,
            file,
            jd,
            jd_file,
            format,
        } => {
            commands::ats::analyze(
                ctx,
                AtsArgs {
                    profile,
                    file,
                    jd,
                    jd_file,
                    format,
                },
            )
            .await
        }
        Commands::Fix {
            profile,
            jd,
            jd_file,
            output,
        } => commands::ats::fix(ctx, &profile, jd, jd_file.as_ref(), &output).await,
        Commands::Letter {
            profile,
            kind,
            jd,
            jd_file,
        } => commands::tasks::letter(ctx, &profile, kind, jd, jd_file.as_ref()).await,
        Commands::Ask { query, history } => {
            commands::tasks::ask(ctx, &query, history.as_deref()).await
        }
        Commands::Jobs {
            profile,
            location,
            format,
        } => commands::jobs::run(ctx, &profile, location, &format).await,
        Commands::Profile { .. } | Commands::Config { .. } => Ok(()),
    }
}
