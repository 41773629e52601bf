use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

const DEFAULT_OUTPUT_DIR: &str = "translated";

#[derive(Parser, Debug)]
#[command(name = "brewvert", version)]
#[command(about = "Translate espresso extraction profiles between machine JSON schemas.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a single source profile to the target schema.
    Translate(TranslateArgs),
    /// Translate every *.json profile in a directory.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input source-profile JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path. Defaults to translated/<input filename>.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Transition mode policy.
    #[arg(long, value_enum, default_value_t = ModeChoice::Smart)]
    mode: ModeChoice,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory containing source-profile JSON files.
    #[arg(long = "in-dir")]
    in_dir: PathBuf,

    /// Output directory. Defaults to translated/.
    #[arg(long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Transition mode policy, applied to the whole batch.
    #[arg(long, value_enum, default_value_t = ModeChoice::Smart)]
    mode: ModeChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Smart,
    Preserve,
    Linear,
    Instant,
}

impl From<ModeChoice> for brewvert::TransitionMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Smart => Self::Smart,
            ModeChoice::Preserve => Self::Preserve,
            ModeChoice::Linear => Self::Linear,
            ModeChoice::Instant => Self::Instant,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Translate(args) => cmd_translate(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn read_source_json(path: &Path) -> anyhow::Result<brewvert::SourceProfile> {
    let f = File::open(path).with_context(|| format!("open profile '{}'", path.display()))?;
    let r = BufReader::new(f);
    let profile: brewvert::SourceProfile =
        serde_json::from_reader(r).with_context(|| format!("parse profile '{}'", path.display()))?;
    Ok(profile)
}

fn write_target_json(profile: &brewvert::TargetProfile, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, profile)
        .with_context(|| format!("write profile '{}'", path.display()))?;
    Ok(())
}

fn translate_file(
    in_path: &Path,
    out_path: &Path,
    mode: brewvert::TransitionMode,
) -> anyhow::Result<Vec<brewvert::Warning>> {
    let source = read_source_json(in_path)?;
    let options = brewvert::TranslateOptions {
        transition_mode: mode,
        ..brewvert::TranslateOptions::default()
    };
    let result = brewvert::translate(&source, &options)?;
    result.profile.validate()?;
    write_target_json(&result.profile, out_path)?;
    Ok(result.warnings)
}

fn default_out_path(in_path: &Path) -> PathBuf {
    let name = in_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("profile.json"));
    Path::new(DEFAULT_OUTPUT_DIR).join(name)
}

fn cmd_translate(args: TranslateArgs) -> anyhow::Result<()> {
    let out = args.out.unwrap_or_else(|| default_out_path(&args.in_path));
    let warnings = translate_file(&args.in_path, &out, args.mode.into())?;

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn discover_profiles(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    // Deterministic processing and summary order.
    files.sort();
    Ok(files)
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let files = discover_profiles(&args.in_dir)?;
    if files.is_empty() {
        anyhow::bail!("no .json profiles found in '{}'", args.in_dir.display());
    }

    let mut failed = 0usize;
    for in_path in &files {
        let name = in_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| in_path.display().to_string());
        let out_path = out_dir.join(
            in_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("profile.json")),
        );

        // One bad file never stops the rest of the batch.
        match translate_file(in_path, &out_path, args.mode.into()) {
            Ok(warnings) => {
                for warning in &warnings {
                    eprintln!("warning: {name}: {warning}");
                }
                eprintln!("ok     {name} -> {}", out_path.display());
            }
            Err(err) => {
                failed += 1;
                eprintln!("failed {name}: {err:#}");
            }
        }
    }

    let total = files.len();
    eprintln!("processed {total}, successful {}, failed {failed}", total - failed);
    if failed > 0 {
        anyhow::bail!("{failed} of {total} profiles failed translation");
    }
    Ok(())
}
