use anyhow::Context as _;
use clap::Parser as _;
use helm_repo_prune::types::{DEFAULT_KEEP, DEFAULT_PROTECT_FILE};
use helm_repo_prune::{HelmIndexRebuilder, PruneError, PruneOptions, prune_repository};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Prune a Helm chart repo directory to keep only the last N versions per chart.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Options {
    /// Path to the helm repo directory (contains index.yaml and *.tgz)
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,
    /// How many latest versions to keep per chart
    #[arg(long, default_value_t = DEFAULT_KEEP)]
    keep: usize,
    /// Base URL for helm repo index generation
    #[arg(long)]
    url: String,
    /// File listing chart versions to always keep, relative to the repo directory
    #[arg(long, default_value = DEFAULT_PROTECT_FILE)]
    protect_file: String,
    /// Show what would be deleted, but don't delete or reindex
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Helm executable used to regenerate index.yaml
    #[arg(long, env = "HELM_BIN", default_value = "helm")]
    helm: PathBuf,

    /// Use verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let options = Options::parse();

    let level = match options.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = real_main(options) {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<PruneError>()
            .map(PruneError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn real_main(options: Options) -> anyhow::Result<()> {
    let repo_dir = options
        .repo_dir
        .canonicalize()
        .unwrap_or_else(|_| options.repo_dir.clone());
    let protect_file = resolve_protect_file(&repo_dir, &options.protect_file);

    tracing::debug!(
        "Pruning {} (keep {}, protect file {:?})",
        repo_dir.display(),
        options.keep,
        protect_file
    );

    let prune_options = PruneOptions {
        repo_dir,
        keep: options.keep,
        url: options.url,
        protect_file,
        dry_run: options.dry_run,
    };
    let rebuilder = HelmIndexRebuilder::new(options.helm);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    prune_repository(&prune_options, &rebuilder, &mut out).with_context(|| {
        format!(
            "failed to prune `{}`",
            prune_options.repo_dir.display()
        )
    })?;

    Ok(())
}

/// An empty `--protect-file` disables protections; anything else is joined
/// onto the repo directory (absolute paths replace it).
fn resolve_protect_file(repo_dir: &Path, protect_file: &str) -> Option<PathBuf> {
    if protect_file.is_empty() {
        None
    } else {
        Some(repo_dir.join(protect_file))
    }
}
