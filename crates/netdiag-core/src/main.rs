//! netdiag - Office network fault diagnosis
//!
//! The main entry point for the `netdiag` binary, handling:
//! - Naive-Bayes diagnosis from observed symptom ids
//! - Catalog and rule inspection
//! - Reference scenario runs against the active knowledge base
//! - Configuration checks and JSON Schema export

use clap::{Args, CommandFactory, Parser, Subcommand};
use netdiag_common::error::format_error_human;
use netdiag_common::{OutputFormat, StructuredError, SCHEMA_VERSION};
use netdiag_core::config::{load_config, ConfigOptions, ResolvedConfig};
use netdiag_core::diagnose::DiagnosticService;
use netdiag_core::exit_codes::ExitCode;
use netdiag_core::output::{
    format_percent, render_causes_markdown, render_diagnosis_summary, render_markdown,
    render_rules_markdown, render_snapshot_markdown, render_summary, render_symptoms_markdown,
    DiagnosisPayload, Envelope, ErrorPayload,
};
use netdiag_core::scenarios::run_scenarios;
use netdiag_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Diagnose office network faults from observed symptoms
#[derive(Parser)]
#[command(name = "netdiag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Override config directory
    #[arg(long, global = true, env = "NETDIAG_CONFIG")]
    config: Option<PathBuf>,

    /// Knowledge file to use instead of <config>/knowledge.json
    #[arg(long, global = true)]
    knowledge: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level (overrides -v/-q and NETDIAG_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank likely causes for the observed symptoms
    Diagnose(DiagnoseArgs),

    /// List the symptom catalog
    Symptoms,

    /// List the cause catalog with priors and remediation steps
    Causes,

    /// Evaluate troubleshooting rules against free-text facts
    Rules(RulesArgs),

    /// Run the reference scenarios against the active knowledge base
    Scenarios,

    /// Load and validate configuration
    Check,

    /// Print JSON Schema for output and knowledge-file types
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug)]
struct DiagnoseArgs {
    /// Observed symptom ids (e.g. S1 S2, or S1,S2)
    #[arg(required = true, value_delimiter = ',')]
    symptoms: Vec<String>,

    /// Include the per-factor evidence ledger
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug)]
struct RulesArgs {
    /// A fact that currently holds (repeatable)
    #[arg(long = "fact", required = true)]
    facts: Vec<String>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name (see --list)
    name: Option<String>,

    /// Print every schema as one JSON object
    #[arg(long, conflicts_with = "name")]
    all: bool,

    /// List available schema names
    #[arg(long, conflicts_with_all = ["name", "all"])]
    list: bool,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Diagnose(_) => "diagnose",
            Commands::Symptoms => "symptoms",
            Commands::Causes => "causes",
            Commands::Rules(_) => "rules",
            Commands::Scenarios => "scenarios",
            Commands::Check => "check",
            Commands::Schema(_) => "schema",
            Commands::Completions { .. } => "completions",
            Commands::Version => "version",
        }
    }
}

use netdiag_core::log_event;
use netdiag_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                // --help and --version
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = cli
        .global
        .log_level
        .or_else(|| LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet));
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let ctx = LogContext::new(generate_run_id(), cli.command.name());
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "starting",
        format = cli.global.format.to_string().as_str()
    );

    let exit_code = match &cli.command {
        Commands::Diagnose(args) => run_diagnose(&cli.global, &ctx, args),
        Commands::Symptoms => run_symptoms(&cli.global, &ctx),
        Commands::Causes => run_causes(&cli.global, &ctx),
        Commands::Rules(args) => run_rules(&cli.global, &ctx, args),
        Commands::Scenarios => run_scenario_batch(&cli.global, &ctx),
        Commands::Check => run_check(&cli.global, &ctx),
        Commands::Schema(args) => run_schema(&cli.global, args),
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "netdiag",
                &mut std::io::stdout(),
            );
            ExitCode::Clean
        }
        Commands::Version => print_version(&cli.global),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_diagnose(global: &GlobalOpts, ctx: &LogContext, args: &DiagnoseArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let service = DiagnosticService::new(config.knowledge);

    let ids: Vec<&str> = args
        .symptoms
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let diagnosis = match service.diagnose_detailed(&ids) {
        Ok(diagnosis) => diagnosis,
        Err(err) => {
            let err = netdiag_common::Error::from(err);
            log_event!(
                ctx,
                WARN,
                event_names::INFER_FAILED,
                Stage::Infer,
                "diagnosis failed",
                code = err.code()
            );
            return output_error(global, ctx, &err);
        }
    };

    let top = &diagnosis.result.most_probable_cause;
    log_event!(
        ctx,
        INFO,
        event_names::INFER_FINISHED,
        Stage::Infer,
        "diagnosis ready",
        cause = top.cause_id.as_str(),
        probability = top.probability,
        ignored = diagnosis.ignored_symptoms.len()
    );

    match global.format {
        OutputFormat::Json => print_envelope(ctx, DiagnosisPayload::new(&diagnosis, args.explain)),
        OutputFormat::Md => {
            print!("{}", render_markdown(&diagnosis, args.explain));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            println!("{}", render_diagnosis_summary(&diagnosis));
            ExitCode::Clean
        }
        OutputFormat::Exitcode => ExitCode::Clean,
    }
}

#[derive(Serialize)]
struct SymptomRow<'a> {
    id: &'a str,
    description: &'a str,
    frequency: String,
    estimated_reliability: f64,
    suggested_action: Option<&'a str>,
}

fn run_symptoms(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let kb = &config.knowledge;

    match global.format {
        OutputFormat::Json => {
            let rows: Vec<SymptomRow<'_>> = kb
                .symptoms()
                .iter()
                .map(|s| SymptomRow {
                    id: s.id.as_str(),
                    description: &s.description,
                    frequency: s.frequency.to_string(),
                    estimated_reliability: s.estimated_reliability,
                    suggested_action: kb.suggested_action(s.id.as_str()),
                })
                .collect();
            print_envelope(ctx, rows)
        }
        OutputFormat::Md => {
            print!("{}", render_symptoms_markdown(kb));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            for s in kb.symptoms() {
                println!("{} {}", s.id, s.description);
            }
            ExitCode::Clean
        }
        OutputFormat::Exitcode => ExitCode::Clean,
    }
}

#[derive(Serialize)]
struct CauseRow<'a> {
    id: &'a str,
    description: &'a str,
    prior_probability: f64,
    remediations: &'a [String],
}

fn run_causes(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let kb = &config.knowledge;

    match global.format {
        OutputFormat::Json => {
            let rows: Vec<CauseRow<'_>> = kb
                .causes()
                .iter()
                .map(|c| CauseRow {
                    id: c.id.as_str(),
                    description: &c.description,
                    prior_probability: c.prior_probability,
                    remediations: kb.remediations(c.id.as_str()),
                })
                .collect();
            print_envelope(ctx, rows)
        }
        OutputFormat::Md => {
            print!("{}", render_causes_markdown(kb));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            for c in kb.causes() {
                println!(
                    "{} {} ({})",
                    c.id,
                    c.description,
                    format_percent(c.prior_probability)
                );
            }
            ExitCode::Clean
        }
        OutputFormat::Exitcode => ExitCode::Clean,
    }
}

fn run_rules(global: &GlobalOpts, ctx: &LogContext, args: &RulesArgs) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let matches = config.knowledge.matching_rules(&args.facts);
    log_event!(
        ctx,
        DEBUG,
        event_names::RULES_EVALUATED,
        Stage::Infer,
        "rules evaluated",
        facts = args.facts.len(),
        matched = matches.len()
    );

    match global.format {
        OutputFormat::Json => print_envelope(
            ctx,
            serde_json::json!({
                "facts": args.facts,
                "matches": matches,
            }),
        ),
        OutputFormat::Md => {
            print!("{}", render_rules_markdown(&matches));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            for m in &matches {
                println!("{}", m.conclusion);
            }
            ExitCode::Clean
        }
        OutputFormat::Exitcode => ExitCode::Clean,
    }
}

fn run_scenario_batch(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let service = DiagnosticService::new(config.knowledge);
    let reports = run_scenarios(&service);

    // First failing scenario decides the exit code.
    let exit_code = reports
        .iter()
        .find_map(|r| r.error.as_ref())
        .map(scenario_exit_code)
        .unwrap_or(ExitCode::Clean);

    match global.format {
        OutputFormat::Json => {
            let printed = print_envelope(ctx, &reports);
            if printed.is_success() {
                exit_code
            } else {
                printed
            }
        }
        OutputFormat::Md => {
            for report in &reports {
                println!("## {} ({})", report.scenario.title, report.scenario.name);
                println!();
                match (&report.result, &report.error) {
                    (Some(result), _) => {
                        for entry in &result.ranked_causes {
                            println!(
                                "- {} ({}): {}",
                                entry.description,
                                entry.cause_id,
                                format_percent(entry.probability)
                            );
                        }
                    }
                    (None, Some(err)) => println!("Error: {}", err.message),
                    (None, None) => {}
                }
                println!();
            }
            exit_code
        }
        OutputFormat::Summary => {
            for report in &reports {
                match (&report.result, &report.error) {
                    (Some(result), _) => {
                        println!("{}: {}", report.scenario.name, render_summary(result))
                    }
                    (None, Some(err)) => {
                        println!("{}: error {} {}", report.scenario.name, err.code, err.message)
                    }
                    (None, None) => {}
                }
            }
            exit_code
        }
        OutputFormat::Exitcode => exit_code,
    }
}

fn scenario_exit_code(err: &StructuredError) -> ExitCode {
    match err.code {
        30 => ExitCode::NoValidSymptoms,
        31 => ExitCode::ModelError,
        _ => ExitCode::InternalError,
    }
}

fn run_check(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let config = match load(global, ctx) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let snapshot = config.snapshot();

    match global.format {
        OutputFormat::Json => print_envelope(ctx, &snapshot),
        OutputFormat::Md => {
            print!("{}", render_snapshot_markdown(&snapshot));
            ExitCode::Clean
        }
        OutputFormat::Summary => {
            let source = snapshot
                .knowledge_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string());
            println!(
                "ok | knowledge: {} | {} symptoms, {} causes, {} rules",
                source, snapshot.symptom_count, snapshot.cause_count, snapshot.rule_count
            );
            ExitCode::Clean
        }
        OutputFormat::Exitcode => ExitCode::Clean,
    }
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    if args.list {
        for (name, description) in available_schemas() {
            println!("{:<18} {}", name, description);
        }
        return ExitCode::Clean;
    }

    let value = if args.all {
        serde_json::to_value(generate_all_schemas()).ok()
    } else {
        let name = args.name.as_deref().unwrap_or("DiagnosticResult");
        match generate_schema(name) {
            Some(schema) => Some(schema),
            None => {
                if global.format != OutputFormat::Exitcode {
                    eprintln!("Unknown schema type: {}", name);
                    eprintln!("Use --list to see available types.");
                }
                return ExitCode::ArgsError;
            }
        }
    };

    match value.map(|v| serde_json::to_string_pretty(&v)) {
        Some(Ok(text)) => {
            if global.format != OutputFormat::Exitcode {
                println!("{}", text);
            }
            ExitCode::Clean
        }
        _ => ExitCode::InternalError,
    }
}

fn print_version(global: &GlobalOpts) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "netdiag_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            match serde_json::to_string_pretty(&version_info) {
                Ok(text) => println!("{}", text),
                Err(_) => return ExitCode::InternalError,
            }
        }
        OutputFormat::Exitcode => {}
        _ => {
            println!("netdiag {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
    ExitCode::Clean
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve configuration, reporting failures in the requested format.
fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedConfig, ExitCode> {
    let options = ConfigOptions {
        config_dir: global.config.clone(),
        knowledge_path: global.knowledge.clone(),
    };
    load_config(&options).map_err(|err| {
        let err = netdiag_common::Error::from(err);
        log_event!(
            ctx,
            ERROR,
            event_names::CONFIG_ERROR,
            Stage::Load,
            "configuration rejected",
            code = err.code()
        );
        output_error(global, ctx, &err)
    })
}

fn print_envelope<T: Serialize>(ctx: &LogContext, data: T) -> ExitCode {
    match Envelope::new(&ctx.run_id, &ctx.command, data).to_json_pretty() {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(err) => {
            log_event!(
                ctx,
                ERROR,
                event_names::INTERNAL_ERROR,
                Stage::Report,
                "payload serialization failed",
                error = err.to_string().as_str()
            );
            ExitCode::InternalError
        }
    }
}

/// Report an error: a JSON error payload on stdout in JSON mode, a human
/// message on stderr otherwise.
fn output_error(global: &GlobalOpts, ctx: &LogContext, err: &netdiag_common::Error) -> ExitCode {
    let exit_code = ExitCode::from(err);

    match global.format {
        OutputFormat::Json => {
            let payload = ErrorPayload {
                error: StructuredError::from(err),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_name(),
            };
            if !print_envelope(ctx, payload).is_success() {
                return ExitCode::InternalError;
            }
        }
        OutputFormat::Exitcode => {}
        _ => eprintln!("{}", format_error_human(err, use_color(global))),
    }

    exit_code
}

fn use_color(global: &GlobalOpts) -> bool {
    !global.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}
