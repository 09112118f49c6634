mod dashboard;

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodmate_core::config::MoodmateConfig;
use moodmate_core::llm::LlmService;
use moodmate_core::model::MoodLabel;
use moodmate_core::pipeline::Companion;
use moodmate_core::report::MoodReport;
use moodmate_core::sentiment::{classify, LexiconScorer};
use moodmate_core::session::SessionState;
use moodmate_core::support::SupportCatalog;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "moodmate",
    about = "Moodmate: a supportive companion that tracks your mood",
    version
)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Start a conversation (default)
    Chat,
    /// Classify the mood of a piece of text, offline
    Classify {
        /// Text to classify
        text: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// List relaxation tips and crisis helplines
    Tips,
    /// Show the effective configuration (API key masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let config = load_config_or_exit();
            cmd_chat(&config).await
        }
        Command::Classify { text, json } => cmd_classify(&text, json),
        Command::Tips => {
            let config = load_config_or_exit();
            cmd_tips(&config);
            Ok(())
        }
        Command::Config => cmd_config(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config_or_exit() -> MoodmateConfig {
    let cwd = std::env::current_dir().ok();
    match MoodmateConfig::load(cwd.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}

fn paint(mood: MoodLabel, text: &str) -> String {
    match mood {
        MoodLabel::Positive => text.green().to_string(),
        MoodLabel::Neutral => text.yellow().to_string(),
        MoodLabel::Negative => text.red().to_string(),
    }
}

fn print_assistant(text: &str) {
    println!("{} {}", "Moodmate:".cyan().bold(), text);
    println!();
}

// -- chat --

async fn cmd_chat(config: &MoodmateConfig) -> Result<()> {
    let service = match LlmService::from_config(&config.llm) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            eprintln!(
                "       {} configure [llm] in .moodmate/config.toml or export the provider's API key",
                "hint:".dimmed()
            );
            std::process::exit(1);
        }
    };
    tracing::info!(provider = service.provider_name(), model = service.model(), "starting chat");

    let companion = Companion::new(service, SupportCatalog::from_config(&config.support));
    let mut session = SessionState::new(config.session.greeting.clone());
    let interactive = std::io::stdin().is_terminal();

    println!("{}", "Moodmate".bold());
    println!(
        "{}",
        "Not a substitute for medical advice. In an emergency, contact local emergency services."
            .dimmed()
    );
    println!("{}", "Commands: /mood  /tips  /quit".dimmed());
    println!();
    print_assistant(&config.session.greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("{} ", "You:".bold());
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/mood" => {
                print_dashboard(&session, config.session.recent_suggestions);
                continue;
            }
            "/tips" => {
                print_support(companion.support());
                continue;
            }
            _ => {}
        }

        let outcome = companion.respond(&mut session, input).await?;

        if interactive {
            println!(
                "  {}",
                paint(
                    outcome.mood,
                    &format!("[{} {:+.2}]", outcome.mood, outcome.polarity)
                )
            );
        } else {
            println!("{} {}", "You:".bold(), paint(outcome.mood, input));
        }
        print_assistant(&outcome.reply);

        if outcome.activated {
            println!(
                "{}",
                "Mood tracking is on. Type /mood to see your dashboard.".dimmed()
            );
            println!();
        }
    }

    println!();
    print_dashboard(&session, config.session.recent_suggestions);
    println!("{}", "Take care of yourself.".cyan());
    Ok(())
}

fn print_dashboard(session: &SessionState, recent: usize) {
    if !session.suggestion_active() || session.mood_log().is_empty() {
        println!(
            "{}",
            "No mood data yet. Keep chatting and your trend will appear here.".dimmed()
        );
        println!();
        return;
    }

    let report = MoodReport::from_log(session.mood_log(), recent);

    println!("{}", "Mood Dashboard".bold());
    println!("{}", "==============".dimmed());

    println!("{}", "Distribution".bold());
    for ((label, _), line) in report
        .distribution
        .iter()
        .zip(dashboard::distribution_lines(&report))
    {
        println!("  {}", paint(label, &line));
    }
    println!();

    println!("{}", "Timeline".bold());
    for (point, line) in report.timeline.iter().zip(dashboard::timeline_lines(&report)) {
        println!("  {}", paint(point.mood, &line));
    }
    println!();

    println!("{}", "Daily average".bold());
    for (day, line) in report
        .daily_averages
        .iter()
        .zip(dashboard::daily_lines(&report))
    {
        println!("  {}", paint(MoodLabel::from_polarity(day.average), &line));
    }
    println!();

    println!("{}", format!("Last {} suggestions", report.recent_suggestions.len()).bold());
    for line in dashboard::suggestion_lines(&report) {
        println!("  {line}");
    }
    println!();
}

fn print_support(catalog: &SupportCatalog) {
    println!("{}", "Relaxation tips".bold());
    for tip in catalog.tips() {
        println!("  - {tip}");
    }
    println!();
    println!("{}", "Crisis support lines".bold());
    for line in dashboard::helpline_lines(catalog.helplines()) {
        println!("  {}", line.red());
    }
    println!();
}

// -- classify --

fn cmd_classify(text: &str, json: bool) -> Result<()> {
    let result = classify(&LexiconScorer, text);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}  {:+.2}",
            paint(result.mood, &result.mood.to_string()),
            result.polarity
        );
    }
    Ok(())
}

// -- tips --

fn cmd_tips(config: &MoodmateConfig) {
    print_support(&SupportCatalog::from_config(&config.support));
}

// -- config --

fn cmd_config() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, warnings) = match MoodmateConfig::load_checked(Some(&cwd)) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    };

    println!("{}", config.to_display_toml()?);

    match LlmService::from_config(&config.llm) {
        Ok(service) => println!(
            "  {}  {} / {}",
            "LLM:".dimmed(),
            service.provider_name().cyan(),
            service.model()
        ),
        Err(e) => println!("  {}  {}", "LLM:".dimmed(), format!("NOT READY: {e}").red()),
    }

    for w in &warnings {
        println!("  {} {}", "warning:".yellow(), w);
    }
    Ok(())
}
