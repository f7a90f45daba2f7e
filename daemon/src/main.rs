//! KYC daemon: entry point for the verification engine.

use anyhow::Context;
use clap::Parser;
use kyc_types::{
    BiometricType, DocumentType, StepType, UploadedFile, UserId, VerificationLevel,
};
use kyc_utils::{format_duration, init_logging, LogFormat};
use kyc_verification::{
    AuthMethod, AuthenticatedUser, ReviewDecision, ServiceConfig, StaticAuthProvider, StepData,
    VerificationConfig, VerificationService,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kyc-daemon", about = "KYC verification engine")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KYC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYC_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the steps each verification level requires and the document
    /// intake limits, as JSON.
    Levels,

    /// Print the effective configuration as TOML.
    Config,

    /// Run a scripted verification for one user and print the final session.
    Demo {
        /// User to verify.
        #[arg(long, default_value = "usr_demo")]
        user: String,

        /// Level to verify at: basic, standard, enhanced or premium.
        #[arg(long, default_value = "standard")]
        level: VerificationLevel,

        /// Reviewer decision: "approve" or "reject".
        #[arg(long, default_value = "approve")]
        review: String,

        /// Skip the simulated processing delays.
        #[arg(long)]
        no_delay: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn levels_json(requirements: &VerificationConfig) -> serde_json::Value {
    let levels: Vec<_> = VerificationLevel::ALL
        .iter()
        .map(|&level| {
            let table = requirements.level(level);
            json!({
                "level": level,
                "required": table.required,
                "optional": table.optional,
            })
        })
        .collect();
    let documents: Vec<_> = DocumentType::ALL
        .iter()
        .filter_map(|&document_type| {
            requirements.document(document_type).map(|c| {
                json!({
                    "document_type": document_type,
                    "accepted_formats": c.accepted_formats,
                    "max_size_bytes": c.max_size_bytes,
                })
            })
        })
        .collect();
    json!({ "levels": levels, "documents": documents })
}

fn step_data(step_type: StepType, user: &str) -> Option<StepData> {
    let mut data = StepData::new();
    match step_type {
        StepType::EmailVerification => {
            data.insert("email".into(), json!(format!("{user}@example.com")));
        }
        StepType::PhoneVerification => {
            data.insert("phone".into(), json!("+15555550100"));
        }
        StepType::PersonalInformation => {
            data.insert("full_name".into(), json!("Demo User"));
            data.insert("date_of_birth".into(), json!("1990-01-01"));
        }
        _ => return None,
    }
    Some(data)
}

async fn run_demo(
    config: ServiceConfig,
    user: String,
    level: VerificationLevel,
    review: &str,
) -> anyhow::Result<()> {
    let decision = match review {
        "approve" => ReviewDecision::Approve,
        "reject" => ReviewDecision::Reject {
            reason: "rejected by demo reviewer".into(),
        },
        other => anyhow::bail!("unknown review decision: {other}"),
    };

    let auth = StaticAuthProvider::new(AuthenticatedUser::new(user.as_str()), AuthMethod::Email);
    let service = VerificationService::builder(Arc::new(auth))
        .config(config)
        .build();
    let user_id = UserId::new(user.as_str());

    let session = service.start_verification(&user_id, level).await?;
    tracing::info!(
        "Session {} expires in {}",
        session.id,
        format_duration(session.started_at.elapsed_since(session.expires_at))
    );
    if let Some(step) = session.current() {
        tracing::info!("First step: {}", step.step_type);
    }

    for step in session.steps.iter().filter(|s| s.required) {
        match step.step_type {
            StepType::DocumentUpload => {
                let file = UploadedFile::new("passport.jpg", 512 * 1024, "image/jpeg");
                service
                    .upload_document(&session.id, DocumentType::Passport, file)
                    .await?;
            }
            StepType::AddressVerification => {
                let file = UploadedFile::new("utility_bill.pdf", 256 * 1024, "application/pdf");
                service
                    .upload_document(&session.id, DocumentType::UtilityBill, file)
                    .await?;
            }
            StepType::SelfieVerification => {
                service
                    .submit_biometric(&session.id, BiometricType::Selfie, vec![0xAB; 64 * 1024])
                    .await?;
            }
            StepType::LivenessCheck => {
                service
                    .submit_biometric(
                        &session.id,
                        BiometricType::LivenessVideo,
                        vec![0xCD; 256 * 1024],
                    )
                    .await?;
            }
            _ => {}
        }
        service
            .complete_step(&session.id, &step.id, step_data(step.step_type, &user))
            .await?;
    }

    service.settle().await;
    let settled = service
        .get_session(&session.id)?
        .context("session disappeared during the demo")?;
    let unsettled = settled
        .documents
        .iter()
        .map(|d| d.status)
        .chain(settled.biometrics.iter().map(|b| b.status))
        .filter(|status| !status.is_terminal())
        .count();
    if unsettled > 0 {
        tracing::warn!(unsettled, "records still processing before review");
    }
    let session = service.review_session(&session.id, decision).await?;

    for event in service.drain_events() {
        tracing::debug!(?event, "event");
    }
    println!("{}", serde_json::to_string_pretty(&session)?);
    tracing::info!(stats = ?service.stats().snapshot(), "demo finished");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Levels => {
            let requirements = VerificationConfig::standard();
            println!("{}", serde_json::to_string_pretty(&levels_json(&requirements))?);
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Demo {
            user,
            level,
            review,
            no_delay,
        } => {
            if no_delay {
                config.document_processing_delay_ms = 0;
                config.biometric_processing_delay_ms = 0;
            }
            tracing::info!("Running {} verification demo for {}", level, user);
            run_demo(config, user, level, &review).await?;
        }
    }

    Ok(())
}
