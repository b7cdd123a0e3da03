//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use stratbuilder_core::pipeline::{PipelineOptions, StageReporter};
use stratbuilder_export::ExportFormat;
use stratbuilder_shared::{StrategySummary, init_config, load_brand_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// StratBuilder — content strategies built for AI-mediated search.
#[derive(Parser)]
#[command(
    name = "stratbuilder",
    version,
    about = "Generate entity-driven content strategies for AI search visibility.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a full strategy from a brand configuration file.
    Generate {
        /// Path to the brand configuration (TOML).
        config: PathBuf,

        /// Output directory for export files (defaults to the configured
        /// export directory).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Export format: json, markdown, csv, or all.
        #[arg(short, long, default_value = "all")]
        format: String,
    },

    /// Validate a brand configuration without running the pipeline.
    Validate {
        /// Path to the brand configuration (TOML).
        config: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize the app config file with defaults.
    Init,
    /// Show resolved application configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "stratbuilder=info",
        1 => "stratbuilder=debug",
        _ => "stratbuilder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate { config, out, format } => {
            cmd_generate(&config, out.as_deref(), &format).await
        }
        Command::Validate { config } => cmd_validate(&config),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(config_path: &Path, out: Option<&Path>, format: &str) -> Result<()> {
    let app_config = load_config()?;
    let brand_config = load_brand_config(config_path)?;

    let output_dir = match out {
        Some(p) => p.to_path_buf(),
        None => expand_home(&app_config.defaults.output_dir),
    };

    info!(
        brand = %brand_config.brand_name,
        mode = ?brand_config.source_mode,
        out = %output_dir.display(),
        "generating strategy"
    );

    let opts = PipelineOptions {
        sitemap_timeout_secs: app_config.defaults.sitemap_timeout_secs,
    };

    let reporter = CliProgress::new();
    let output = stratbuilder_core::run(&brand_config, &opts, &reporter).await?;

    let files = if format.eq_ignore_ascii_case("all") {
        stratbuilder_export::all_exports(&output)?
    } else {
        let parsed: ExportFormat = format.parse()?;
        stratbuilder_export::export(&output, parsed)?
    };

    std::fs::create_dir_all(&output_dir)
        .map_err(|e| eyre!("cannot create output directory '{}': {e}", output_dir.display()))?;
    for file in &files {
        let path = output_dir.join(&file.filename);
        std::fs::write(&path, &file.content)
            .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
    }

    let coverage = stratbuilder_core::queries::intent_coverage(&output.query_clusters);

    let s = &output.summary;
    println!();
    println!("  Strategy generated for {}", output.brand_name);
    println!("  Entities:      {}", s.total_entities);
    println!("  Relationships: {}", s.total_relationships);
    println!("  Queries:       {}", s.total_queries);
    println!("  Hub pages:     {}", s.hub_pages);
    println!("  Personas:      {}", s.personas);
    println!("  KPIs:          {}", s.kpis);
    println!("  Intent coverage: {:.0}%", coverage.overall * 100.0);
    println!();
    println!("  Exports written to {}:", output_dir.display());
    for file in &files {
        println!("    {}", file.filename);
    }

    let entity_gaps = stratbuilder_core::expansion::find_entity_gaps(&output.ontology, &brand_config);
    if !entity_gaps.is_empty() {
        println!();
        println!("  Entity gaps (uncovered topics):");
        for gap in entity_gaps {
            println!("    - {gap}");
        }
    }

    let content_gaps = stratbuilder_core::hubs::suggest_content_gaps(&output.taxonomy, &output.hubs);
    if !content_gaps.is_empty() {
        println!();
        println!("  Content gap suggestions:");
        for gap in content_gaps {
            println!("    - {gap}");
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn cmd_validate(config_path: &Path) -> Result<()> {
    let brand_config = load_brand_config(config_path)?;
    brand_config.validate()?;

    println!("  Configuration is valid.");
    println!("  Brand:  {}", brand_config.brand_name);
    println!("  Niche:  {}", brand_config.primary_niche);
    println!("  Mode:   {:?}", brand_config.source_mode);
    println!("  Seeds:  {}", brand_config.trimmed_seeds().len());
    println!("  Goals:  {}", brand_config.business_goals.len());

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("  Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| eyre!("cannot render configuration: {e}"))?;
    println!("{rendered}");
    Ok(())
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(rest),
        },
        None => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Pipeline progress rendered as an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl StageReporter for CliProgress {
    fn stage(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _summary: &StrategySummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
