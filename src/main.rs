//! UProfile: Multi-Centroid User Interest Profiles
//!
//! Command-line entry point for building, inspecting, and configuring
//! interest profile runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uprofile::{
    centroid::l2_norm,
    config::{Config, LogFormat},
    io::{read_profiles, read_records, write_profiles},
    profile::ProfileBuilder,
};

#[derive(Parser)]
#[command(name = "uprofile")]
#[command(about = "Multi-centroid user interest profile builder")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "uprofile.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a profile from an interaction snapshot
    Build {
        /// Input JSON file of interaction records
        input: PathBuf,

        /// Output JSON file for the centroid profile
        output: PathBuf,

        /// Clustering sensitivity override (minimum cluster size)
        #[arg(long)]
        min_cluster_size: Option<usize>,
    },

    /// Summarize a previously built profile
    Inspect {
        /// Profile JSON file
        path: PathBuf,
    },

    /// Initialize a new UProfile configuration
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config first so the verbosity flag can override its log level
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    let log_level = match cli.verbose {
        0 => config.logging.level.to_tracing(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(subscriber.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(subscriber.json().finish())?,
    }

    match cli.command {
        Commands::Build {
            input,
            output,
            min_cluster_size,
        } => build_profile(config, input, output, min_cluster_size),
        Commands::Inspect { path } => inspect_profile(path),
        Commands::Init { path } => init_config(path),
    }
}

fn build_profile(
    mut config: Config,
    input: PathBuf,
    output: PathBuf,
    min_cluster_size: Option<usize>,
) -> Result<()> {
    if let Some(size) = min_cluster_size {
        config.clustering.min_cluster_size = size;
        config.validate()?;
    }

    let records = read_records(&input)?;
    info!(records = records.len(), input = %input.display(), "Read interaction snapshot");

    let builder = ProfileBuilder::new(&config);
    let profiles = builder.build(records);

    write_profiles(&output, &profiles)?;
    info!(centroids = profiles.len(), output = %output.display(), "Wrote profile");

    Ok(())
}

fn inspect_profile(path: PathBuf) -> Result<()> {
    let profiles = read_profiles(&path)?;

    println!("\nProfile Summary");
    println!("===============");
    println!("File: {}", path.display());
    if profiles.is_empty() {
        println!("(empty profile)");
        return Ok(());
    }

    let total_posts: usize = profiles.iter().map(|p| p.post_count).sum();
    println!("Centroids: {}", profiles.len());
    println!("Posts represented: {}", total_posts);
    println!();
    for profile in &profiles {
        println!(
            "Cluster {:>3}: {:>4} posts, weight {:.3}, centroid norm {:.4}",
            profile.cluster_id,
            profile.post_count,
            profile.weight,
            l2_norm(&profile.centroid),
        );
    }

    Ok(())
}

fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("uprofile.toml");

    let toml_content = format!(
        r#"# UProfile Configuration

[profile]
dimensions = {}
max_centroids = {}
min_points_for_clustering = {}
min_noise_cluster_size = {}

[clustering]
backend = "{}"
min_cluster_size = {}
min_samples = {}
metric = "euclidean"
selection_method = "eom"

[weights]
like = {:.1}
repost = {:.1}
request_more = {:.1}
request_less = {:.1}
default = {:.1}

[logging]
format = "text"
level = "info"
"#,
        config.profile.dimensions,
        config.profile.max_centroids,
        config.profile.min_points_for_clustering,
        config.profile.min_noise_cluster_size,
        config.clustering.backend,
        config.clustering.min_cluster_size,
        config.clustering.min_samples,
        config.weights.like,
        config.weights.repost,
        config.weights.request_more,
        config.weights.request_less,
        config.weights.default,
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
