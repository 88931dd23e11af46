use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use veridoc::models::{DecisionKind, Severity};
use veridoc::oracle::GeminiOracle;
use veridoc::pipeline::{fingerprint, RetryOrchestrator, VerificationRunner};
use veridoc::{ArbiterDecision, ClassificationOutput, Context, DocumentBundle, Result, VerificationReport, VeridocConfig};

#[derive(Parser)]
#[command(name = "veridoc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classification verification pipeline", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a classification against its source document
    Verify {
        /// Path to the ClassificationOutput JSON
        #[arg(short, long)]
        classification: PathBuf,

        /// Path to the DocumentBundle JSON
        #[arg(short, long)]
        bundle: PathBuf,

        /// Run one verification pass without the fix/retry loop
        #[arg(long)]
        single_pass: bool,

        /// Emit the final report and decision as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write per-validator snapshot artifacts
        #[arg(long)]
        artifacts: bool,
    },

    /// Print the structural fingerprint of a classification
    Fingerprint {
        /// Path to the ClassificationOutput JSON
        #[arg(short, long)]
        classification: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    match runtime.block_on(run_async(cli)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(2);
        }
    }
}

async fn run_async(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Verify {
            classification,
            bundle,
            single_pass,
            json,
            artifacts,
        } => {
            verify(
                &classification,
                &bundle,
                single_pass,
                json,
                artifacts,
            )
            .await
        }
        Commands::Fingerprint { classification } => {
            let classification: ClassificationOutput = load_json(&classification)?;
            println!("{}", fingerprint(&classification)?);
            Ok(0)
        }
    }
}

async fn verify(
    classification_path: &Path,
    bundle_path: &Path,
    single_pass: bool,
    json: bool,
    artifacts: bool,
) -> Result<i32> {
    let config = VeridocConfig::load(Path::new("."))?;
    let classification: ClassificationOutput = load_json(classification_path)?;
    let bundle: DocumentBundle = load_json(bundle_path)?;

    let oracle = Arc::new(GeminiOracle::from_config(&config.oracle)?);
    let mut runner = VerificationRunner::new(oracle, config.share_tolerance);

    if artifacts {
        let store = veridoc::artifacts::ArtifactStore::create(&config.artifacts_dir, &bundle.doc_id)?;
        if !json {
            println!("Artifacts: {}", store.run_dir().display());
        }
        runner = runner.with_artifacts(store);
    }

    let (report, decision) = if single_pass {
        runner.run_all(&classification, &bundle, 1).await
    } else {
        let orchestrator = RetryOrchestrator::new(runner, config.max_retries);
        let outcome = orchestrator.verify_with_retry(&classification, &bundle).await?;
        if !json && !outcome.retry_log.is_empty() {
            println!(
                "{}",
                format!("Applied fixes across {} attempt(s):", outcome.retry_log.len()).bold()
            );
            for record in &outcome.retry_log {
                for fix in &record.fixes_applied {
                    println!("  attempt {}: {}", record.attempt, fix);
                }
            }
        }
        (outcome.report, outcome.decision)
    };

    if json {
        let payload = serde_json::json!({
            "report": report,
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_summary(&report, &decision);
    }

    Ok(match decision.decision {
        DecisionKind::AutoAccept => 0,
        _ => 1,
    })
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_summary(report: &VerificationReport, decision: &ArbiterDecision) {
    println!();
    println!("{}", "VERIFICATION REPORT".bold());
    println!("{}", "=".repeat(50));
    println!("Schema valid:       {}", report.schema_passed);
    println!("Consistency score:  {:.2}", report.consistency_score);
    println!("Traps triggered:    {}", report.traps_triggered);
    println!("Evidence score:     {:.2}", report.evidence_score);
    println!("Oracle calls:       {}", report.oracle_calls);
    println!(
        "Issues:             {} ({} blocker, {} major, {} minor)",
        report.total_issues,
        report.count_by_severity(Severity::Blocker),
        report.count_by_severity(Severity::Major),
        report.count_by_severity(Severity::Minor),
    );
    for issue in &report.issues {
        println!("  {}", issue.format());
    }
    println!("{}", "=".repeat(50));

    let label = match decision.decision {
        DecisionKind::AutoAccept => decision.decision.name().green().bold(),
        DecisionKind::AutoRetry => decision.decision.name().yellow().bold(),
        DecisionKind::EscalateToSme => decision.decision.name().red().bold(),
    };
    println!("Decision: {} ({})", label, decision.reason);
}
