use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use phash_core::{logging, Config, EncodedFingerprint, Error, Fingerprint, ImageHasher};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "phash")]
#[command(about = "Compute and compare perceptual image fingerprints")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the fingerprint of each image
    Hash {
        /// Image files to fingerprint
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash one file at a time on the main thread
        #[arg(long)]
        sync: bool,
    },

    /// Hamming distance between two encoded fingerprints
    Distance {
        a: String,
        b: String,
    },

    /// Fingerprint two images and report how similar they are
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Maximum distance to report as similar (defaults to the config value)
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Print the deprecated 32-bit fingerprint
    OldHash {
        path: PathBuf,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "phash.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    // Rotated file logs when configured, stderr otherwise
    match &config.log_dir {
        Some(dir) => logging::init_logger(dir, config.log_level)
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?,
        None => env_logger::init(),
    }

    match cli.command {
        Commands::Hash { paths, sync } => {
            let mut hasher = ImageHasher::new(config)?;
            let failures = if sync {
                hash_sync(&hasher, &paths)
            } else {
                hash_async(&mut hasher, &paths)?
            };

            if failures > 0 {
                warn!("{} of {} files could not be hashed", failures, paths.len());
                anyhow::bail!("{} file(s) could not be hashed", failures);
            }
            Ok(())
        }

        Commands::Distance { a, b } => {
            let a: Fingerprint = a.parse()?;
            let b: Fingerprint = b.parse()?;
            println!("{}", a.distance(&b));
            Ok(())
        }

        Commands::Compare { a, b, threshold } => {
            if let Some(threshold) = threshold {
                config.similarity_threshold = threshold;
            }
            let hasher = ImageHasher::new(config)?;

            let distance = hasher.compare_files(&a, &b)?;
            let similar = distance <= hasher.config().similarity_threshold;
            println!(
                "distance: {}\nsimilar: {}",
                distance,
                if similar { "yes" } else { "no" }
            );
            Ok(())
        }

        Commands::OldHash { path } => {
            let hasher = ImageHasher::new(config)?;
            #[allow(deprecated)]
            let value = hasher.old_hash(&path);
            println!("{}", value);
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Hash in order on this thread. Returns the number of failures.
fn hash_sync(hasher: &ImageHasher, paths: &[PathBuf]) -> usize {
    let mut failures = 0;
    for path in paths {
        match hasher.fingerprint(path) {
            Ok(fingerprint) => println!("{}\t{}", fingerprint, path.display()),
            Err(e) => {
                eprintln!("{}", e);
                println!("0\t{}", path.display());
                failures += 1;
            }
        }
    }
    failures
}

/// Hash on the worker pool; lines appear in completion order
fn hash_async(hasher: &mut ImageHasher, paths: &[PathBuf]) -> Result<usize, Error> {
    let failures = Rc::new(Cell::new(0usize));

    for path in paths {
        let failures = failures.clone();
        let display = path.display().to_string();
        hasher.image_hash(
            path,
            Some(move |error: Option<Error>, value: EncodedFingerprint| {
                if let Some(e) = error {
                    eprintln!("{}", e);
                    failures.set(failures.get() + 1);
                }
                println!("{}\t{}", value, display);
            }),
        )?;
    }
    debug!("Submitted {} jobs", paths.len());

    let delivered = hasher.wait_all();
    info!("Hashed {} files", delivered);

    Ok(failures.get())
}
