//! TrustBot CLI - Headless front end
//!
//! Commands: types, fields, identifier, generate, greet
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when generation fails

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use trustbot_core::{
    print::FileSurface,
    store::{recommendation, JsonFileStore},
    AnswerSet, DraftSession, FailureMode, GenerationPipeline, GeneratorConfig, PrintStyle,
    SchemaRegistry, UserProfile,
};

#[derive(Parser)]
#[command(name = "trustbot-cli")]
#[command(about = "TrustBot CLI - Trust draft generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Generator config (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema document (JSON); built-in trust types when omitted
    #[arg(short, long)]
    schema: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List document types
    Types,

    /// Show fields and defaults for a document type
    Fields {
        #[arg(short = 't', long = "type")]
        type_id: String,
    },

    /// Print today's document identifier
    Identifier,

    /// Generate a draft
    Generate {
        #[arg(short = 't', long = "type")]
        type_id: String,

        /// JSON object of field id -> value
        #[arg(short, long, default_value = "{}")]
        answers: String,

        /// Refuse to render when required fields are empty
        #[arg(long)]
        strict: bool,

        /// Write a printable HTML page here
        #[arg(short, long)]
        print: Option<PathBuf>,
    },

    /// Store name/region and show the greeting
    Greet {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        region: String,

        /// Profile store file
        #[arg(long, default_value = "trustbot-profile.json")]
        store: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pipeline = match build_pipeline(&cli) {
        Ok(p) => p,
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e }));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Types => {
            let types: Vec<_> = pipeline
                .list_document_types()
                .iter()
                .map(|t| serde_json::json!({
                    "id": t.id,
                    "label": t.label,
                    "template": t.selector,
                    "fields": t.fields.len(),
                }))
                .collect();
            print_json(&types);
            ExitCode::SUCCESS
        }

        Commands::Fields { type_id } => match pipeline.render_fields(&type_id) {
            Ok(fields) => {
                print_json(&fields);
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                ExitCode::FAILURE
            }
        },

        Commands::Identifier => match pipeline.current_identifier(Utc::now()) {
            Ok(id) => {
                print_json(&serde_json::json!({ "identifier": id }));
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                ExitCode::FAILURE
            }
        },

        Commands::Generate { type_id, answers, strict, print } => {
            let answers: AnswerSet = match serde_json::from_str(&answers) {
                Ok(a) => a,
                Err(e) => {
                    print_json(&serde_json::json!({
                        "success": false,
                        "error": format!("Invalid answers: {}", e),
                    }));
                    return ExitCode::FAILURE;
                }
            };

            let pipeline = if strict {
                pipeline.with_failure_mode(FailureMode::Block)
            } else {
                pipeline
            };

            generate_draft(&pipeline, &type_id, &answers, print)
        }

        Commands::Greet { name, region, store } => {
            let result = JsonFileStore::open(&store).and_then(|mut s| {
                UserProfile::save(&mut s, &name, &region)?;
                UserProfile::load(&s)
            });
            match result {
                Ok(profile) => {
                    print_json(&serde_json::json!({
                        "profile": profile,
                        "recommendation": recommendation(&profile),
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn build_pipeline(cli: &Cli) -> Result<GenerationPipeline, String> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path).map_err(|e| e.to_string())?,
        None => GeneratorConfig::default(),
    };
    match &cli.schema {
        Some(path) => {
            let registry = SchemaRegistry::load_from_file(path).map_err(|e| e.to_string())?;
            GenerationPipeline::new(config, registry).map_err(|e| e.to_string())
        }
        None => GenerationPipeline::builtin(config).map_err(|e| e.to_string()),
    }
}

/// Both plain and printed drafts go through the session, so the answer set
/// is always the field defaults overlaid with the submitted values.
fn generate_draft(
    pipeline: &GenerationPipeline,
    type_id: &str,
    answers: &AnswerSet,
    print: Option<PathBuf>,
) -> ExitCode {
    let mut session = match DraftSession::prefilled(pipeline, type_id, answers) {
        Ok(s) => s,
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            return ExitCode::from(2);
        }
    };

    let result = session.generate(pipeline).cloned();
    let result = result.and_then(|doc| match &print {
        Some(path) => {
            session.export(&mut FileSurface::new(path), &PrintStyle::default())?;
            Ok(serde_json::json!({
                "success": true,
                "metadata": doc.metadata,
                "printable": path.display().to_string(),
            }))
        }
        None => Ok(serde_json::json!({ "success": true, "document": doc })),
    });

    match result {
        Ok(output) => {
            print_json(&output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            ExitCode::from(2)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}
