use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use triage_cli::commands::{self, CliError};
use triage_cli::config::DEFAULT_CONFIG_FILE;
use triage_cli::{init_logging, PipelineConfig};
use triage_model::ModelError;

#[derive(Debug, Parser)]
#[command(
    name = "triage",
    version,
    about = "Synthetic patient triage: rule-labeled data, a neural classifier, and inference",
    long_about = "triage generates synthetic patient records labeled by a deterministic\n\
        triage rule engine, trains a feed-forward classifier to reproduce those\n\
        labels, and serves predictions from the saved model and scaler.\n\n\
        EXAMPLES:\n\
        \n  triage run                              Generate, train and predict the sample patient\n\
        \n  triage generate --records 2000 --seed 7 Write a reproducible dataset\n\
        \n  triage predict --record patient.json    Predict one patient from JSON\n\
        \n  triage -v train --epochs 10             Train with per-epoch logging"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pipeline configuration file (defaults to ./triage.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a rule-labeled synthetic dataset
    Generate(GenerateArgs),
    /// Print record count, label balance and vital ranges of a dataset
    Summary(SummaryArgs),
    /// Fit the preprocessing pipeline, train the classifier and save artifacts
    Train(TrainArgs),
    /// Predict the triage level of one patient
    Predict(PredictArgs),
    /// Generate, train and predict the sample patient in one go
    Run(RunArgs),
    /// Write a commented configuration template
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args, Clone)]
struct GenerateArgs {
    /// Number of records
    #[arg(short = 'n', long, value_name = "N")]
    records: Option<usize>,

    /// Seed for a reproducible dataset
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Probability that each symptom is present
    #[arg(long, value_name = "P")]
    symptom_probability: Option<f64>,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct SummaryArgs {
    /// Dataset CSV file
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct TrainArgs {
    /// Dataset CSV file
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Where to write the model artifact
    #[arg(long, value_name = "FILE")]
    model_out: Option<PathBuf>,

    /// Where to write the fitted scaler
    #[arg(long, value_name = "FILE")]
    scaler_out: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    epochs: Option<usize>,

    /// Weight-initialization and shuffling seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
struct PredictArgs {
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    scaler: Option<PathBuf>,

    /// Patient record as JSON (defaults to the built-in sample patient)
    #[arg(short, long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Emit the prediction as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args, Clone)]
struct RunArgs {
    #[arg(short = 'n', long, value_name = "N")]
    records: Option<usize>,

    /// Dataset seed
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    #[arg(long, value_name = "N")]
    epochs: Option<usize>,
}

#[derive(Debug, Args, Clone)]
struct InitConfigArgs {
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    out: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

fn apply_generate(cfg: &mut PipelineConfig, args: &GenerateArgs) {
    if let Some(n) = args.records {
        cfg.generation.records = n;
    }
    if args.seed.is_some() {
        cfg.generation.seed = args.seed;
    }
    if let Some(p) = args.symptom_probability {
        cfg.generation.symptom_probability = p;
    }
    if let Some(out) = &args.out {
        cfg.artifacts.dataset = out.clone();
    }
}

fn apply_train(cfg: &mut PipelineConfig, args: &TrainArgs) {
    if let Some(data) = &args.data {
        cfg.artifacts.dataset = data.clone();
    }
    if let Some(p) = &args.model_out {
        cfg.artifacts.model = p.clone();
    }
    if let Some(p) = &args.scaler_out {
        cfg.artifacts.scaler = p.clone();
    }
    if let Some(e) = args.epochs {
        cfg.training.epochs = e;
    }
    if let Some(s) = args.seed {
        cfg.training.seed = s;
    }
}

fn apply_run(cfg: &mut PipelineConfig, args: &RunArgs) {
    if let Some(n) = args.records {
        cfg.generation.records = n;
    }
    if args.seed.is_some() {
        cfg.generation.seed = args.seed;
    }
    if let Some(e) = args.epochs {
        cfg.training.epochs = e;
    }
}

fn execute(cli: Cli) -> Result<(), CliError> {
    if let Command::InitConfig(args) = &cli.command {
        commands::init_config(&args.out, args.force)?;
        println!("wrote {}", args.out.display());
        return Ok(());
    }

    let mut cfg = PipelineConfig::discover(cli.config.as_deref())?;
    match cli.command {
        Command::Generate(args) => {
            apply_generate(&mut cfg, &args);
            cfg.validate()?;
            let summary = commands::generate(&cfg)?;
            println!("wrote {}", cfg.artifacts.dataset.display());
            print!("{summary}");
        }
        Command::Summary(args) => {
            let path = args.data.unwrap_or(cfg.artifacts.dataset);
            print!("{}", commands::summarize(&path)?);
        }
        Command::Train(args) => {
            apply_train(&mut cfg, &args);
            cfg.validate()?;
            println!("{}", commands::train(&cfg)?);
        }
        Command::Predict(args) => {
            let model = args.model.unwrap_or(cfg.artifacts.model);
            let scaler = args.scaler.unwrap_or(cfg.artifacts.scaler);
            let record = match &args.record {
                Some(path) => commands::read_record(path)?,
                None => commands::sample_patient(),
            };
            let report = commands::predict(&model, &scaler, record)?;
            if args.json {
                let json = serde_json::to_string_pretty(&report).map_err(ModelError::from)?;
                println!("{json}");
            } else {
                println!("{report}");
            }
        }
        Command::Run(args) => {
            apply_run(&mut cfg, &args);
            cfg.validate()?;
            let (summary, report, prediction) = commands::run(&cfg)?;
            print!("{summary}");
            println!("{report}");
            println!("sample patient:");
            println!("{prediction}");
        }
        Command::InitConfig(_) => {}
    }
    Ok(())
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match execute(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn main() {
    std::process::exit(run_cli());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_version_is_set() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let version = cmd.get_version().expect("version should be set");
        assert!(!version.is_empty());
        cmd.debug_assert();
    }

    #[test]
    fn cli_parses_verbose_flag() {
        let cli = Cli::try_parse_from(["triage", "-vvv", "run"]).unwrap();
        assert_eq!(cli.verbose, 3, "verbose count should be 3 for -vvv");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["triage"]).is_err());
    }

    #[test]
    fn generate_flags_override_config() {
        let cli = Cli::try_parse_from([
            "triage", "generate", "--records", "100", "--seed", "7", "--out", "d.csv",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        let mut cfg = PipelineConfig::default();
        apply_generate(&mut cfg, &args);
        assert_eq!(cfg.generation.records, 100);
        assert_eq!(cfg.generation.seed, Some(7));
        assert_eq!(cfg.artifacts.dataset, PathBuf::from("d.csv"));
        assert_eq!(cfg.generation.symptom_probability, 0.3);
    }

    #[test]
    fn train_flags_override_config() {
        let cli = Cli::try_parse_from([
            "triage",
            "train",
            "--epochs",
            "3",
            "--model-out",
            "m.json",
            "--scaler-out",
            "s.json",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected Train command");
        };
        let mut cfg = PipelineConfig::default();
        apply_train(&mut cfg, &args);
        assert_eq!(cfg.training.epochs, 3);
        assert_eq!(cfg.artifacts.model, PathBuf::from("m.json"));
        assert_eq!(cfg.artifacts.scaler, PathBuf::from("s.json"));
        assert_eq!(cfg.training.seed, 42);
    }

    #[test]
    fn predict_parses_record_and_json() {
        let cli = Cli::try_parse_from(["triage", "predict", "--record", "p.json", "--json"]).unwrap();
        match cli.command {
            Command::Predict(args) => {
                assert_eq!(args.record, Some(PathBuf::from("p.json")));
                assert!(args.json);
            }
            _ => panic!("expected Predict command"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["triage", "summary", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn init_config_defaults_to_triage_toml() {
        let cli = Cli::try_parse_from(["triage", "init-config"]).unwrap();
        match cli.command {
            Command::InitConfig(args) => {
                assert_eq!(args.out, PathBuf::from("triage.toml"));
                assert!(!args.force);
            }
            _ => panic!("expected InitConfig command"),
        }
    }
}
