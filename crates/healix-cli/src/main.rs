mod display;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use healix_ai::{Engine, EngineConfig};
use healix_store::HistoryLog;
use tracing_subscriber::EnvFilter;

use display::{DiagnosisCard, HistoryTable, ModelTable, RemedyCard};

/// Symptom-to-disease inference over a classifier ensemble.
#[derive(Parser, Debug)]
#[command(name = "healix", version, about)]
struct Cli {
    /// Artifact bundle directory (holds manifest.json)
    #[arg(long, env = "HEALIX_BUNDLE", default_value = "models/demo", global = true)]
    bundle: PathBuf,

    /// Remedy table overriding the bundle's
    #[arg(long, env = "HEALIX_REMEDIES", global = true)]
    remedies: Option<PathBuf>,

    /// JSON-lines diagnosis history; diagnoses are not logged when unset
    #[arg(long, env = "HEALIX_HISTORY", global = true)]
    history: Option<PathBuf>,

    /// Verbosity (-v = info, -vv = debug, -vvv = trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Diagnose a set of symptoms
    Diagnose {
        /// Symptom identifiers from the catalog
        #[arg(required_unless_present = "stdin")]
        symptoms: Vec<String>,

        /// Read the symptom list as a JSON array from stdin
        #[arg(long, conflicts_with = "symptoms")]
        stdin: bool,

        /// Print the JSON wire result instead of a card
        #[arg(long)]
        json: bool,

        /// Subject recorded with the diagnosis in history
        #[arg(long)]
        subject: Option<String>,
    },
    /// List the symptom catalog in feature order
    Symptoms,
    /// Show remedies and exercises for a disease label
    Remedies { label: String },
    /// List ensemble members in vote order
    Models,
    /// Show logged diagnoses, newest first
    History {
        #[arg(long)]
        subject: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("healix v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::History { ref subject } => {
            let path = cli
                .history
                .as_ref()
                .context("no history log configured (set --history or HEALIX_HISTORY)")?;
            let log = HistoryLog::open(path)?;
            let entries = match subject {
                Some(s) => log.entries_for(s)?,
                None => log.entries()?,
            };
            print!("{}", HistoryTable(&entries));
            Ok(())
        }
        Command::Diagnose {
            ref symptoms,
            stdin,
            json,
            ref subject,
        } => {
            let engine = load_engine(&cli)?;
            let diagnosis = if stdin {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("reading symptoms from stdin")?;
                let value: serde_json::Value =
                    serde_json::from_str(&raw).context("parsing symptoms from stdin")?;
                engine.diagnose_json_for(subject.as_deref(), &value)?
            } else {
                engine.diagnose_for(subject.as_deref(), symptoms.as_slice())?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&diagnosis)?);
            } else {
                print!("{}", DiagnosisCard(&diagnosis));
            }
            Ok(())
        }
        Command::Symptoms => {
            let engine = load_engine(&cli)?;
            for symptom in engine.symptoms()? {
                println!("{symptom}");
            }
            Ok(())
        }
        Command::Remedies { ref label } => {
            let engine = load_engine(&cli)?;
            let recommendations = engine.state()?.remedies().lookup(label);
            print!(
                "{}",
                RemedyCard {
                    label,
                    recommendations: &recommendations,
                }
            );
            Ok(())
        }
        Command::Models => {
            let engine = load_engine(&cli)?;
            print!("{}", ModelTable(engine.state()?.ensemble()));
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the engine and attach the history log when one is configured. An
/// unavailable engine is returned as is; its error surfaces on first use.
fn load_engine(cli: &Cli) -> anyhow::Result<Engine> {
    let mut config = EngineConfig::new(&cli.bundle);
    if let Some(path) = &cli.remedies {
        config = config.with_remedies(path);
    }

    let engine = Engine::load(&config);
    match &cli.history {
        Some(path) => {
            let log = HistoryLog::open(path)
                .with_context(|| format!("opening history log {}", path.display()))?;
            Ok(engine.with_history(Arc::new(log)))
        }
        None => Ok(engine),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn diagnose_accepts_symptoms_and_flags() {
        let cli = Cli::try_parse_from([
            "healix", "diagnose", "fever", "cough", "--json", "--subject", "ana",
        ])
        .unwrap();
        match cli.command {
            Command::Diagnose {
                symptoms,
                json,
                subject,
                stdin,
            } => {
                assert_eq!(symptoms, vec!["fever", "cough"]);
                assert!(json);
                assert!(!stdin);
                assert_eq!(subject.as_deref(), Some("ana"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn diagnose_requires_symptoms_or_stdin() {
        assert!(Cli::try_parse_from(["healix", "diagnose"]).is_err());
        assert!(Cli::try_parse_from(["healix", "diagnose", "--stdin"]).is_ok());
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from(["healix", "models", "--bundle", "/tmp/b", "-vv"]).unwrap();
        assert_eq!(cli.bundle, PathBuf::from("/tmp/b"));
        assert_eq!(cli.verbose, 2);
    }
}
