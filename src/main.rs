use clap::{Parser, Subcommand};
use std::path::PathBuf;

use runboard::error::StoreError;
use runboard::ranking::SortKey;
use runboard::record::{Photo, RecordDraft, RecordPatch, RecordStatus};
use runboard::store::Store;

const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;
const EXIT_STORAGE: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_UPLOAD: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the ranked leaderboard (default if no subcommand)
    Rank {
        /// Sort key: score, distance or pace
        #[arg(short, long, default_value = "score")]
        sort: String,
    },
    /// List every stored record in insertion order (admin view)
    List,
    /// Aggregate statistics: total distance, athlete count, average pace
    Stats,
    /// Add a new running record
    Add {
        #[arg(long)]
        name: String,
        /// Distance in kilometers
        #[arg(long)]
        distance: f64,
        /// Pace as minutes:seconds per km, e.g. "5:30"
        #[arg(long)]
        pace: String,
        /// Session date (ISO 8601); defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        reflections: Option<String>,
        /// Path to a photo to upload before saving the record
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Update fields on an existing record
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        distance: Option<f64>,
        #[arg(long)]
        pace: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        reflections: Option<String>,
        /// Moderation status: pending, approved or rejected
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a record by id
    Delete { id: String },
}

#[derive(Parser, Debug)]
#[command(name = "runboard")]
#[command(about = "Running club leaderboard CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/runboard/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the record data file (overrides config)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Rank {
        sort: "score".to_string(),
    });

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match runboard::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let data_path = cli
        .data
        .or_else(|| config.data.clone())
        .unwrap_or_else(runboard::config::default_data_path);

    if cli.verbose {
        eprintln!("Data file: {}", data_path.display());
    }

    let store = Store::open(&data_path);
    if let Some(warning) = store.get_all().warning {
        eprintln!("Warning: {}", warning);
    }

    let use_colors = runboard::output::should_use_colors();

    match command {
        Commands::Rank { sort } => {
            let key: SortKey = match sort.parse() {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
            };

            let snapshot = store.get_all();
            let ranked = runboard::ranking::rank(&snapshot.records, key);
            println!("{}", runboard::output::format_leaderboard(&ranked, use_colors));

            if cli.verbose {
                eprintln!();
                eprintln!("{} records ranked by {}", ranked.len(), key.as_str());
            }
        }
        Commands::List => {
            let snapshot = store.get_all();
            println!(
                "{}",
                runboard::output::format_admin_table(&snapshot.records, use_colors)
            );
        }
        Commands::Stats => {
            let snapshot = store.get_all();
            let stats = runboard::ranking::stats(&snapshot.records);
            println!("{}", runboard::output::format_stats(&stats, use_colors));
        }
        Commands::Add {
            name,
            distance,
            pace,
            date,
            reflections,
            photo,
        } => {
            // Upload the photo first; a failed upload aborts the submission
            // rather than silently saving without it.
            let photo = match photo {
                Some(path) => match upload_photo(&config, &path, cli.verbose).await {
                    Ok(p) => Some(p),
                    Err(message) => {
                        eprintln!("Photo upload failed: {}", message);
                        eprintln!("The record was not saved. Retry, or run again without --photo.");
                        std::process::exit(EXIT_UPLOAD);
                    }
                },
                None => None,
            };

            let draft = RecordDraft {
                name,
                distance,
                pace,
                date,
                reflections,
                photo,
                status: None,
            };

            match store.create(&draft) {
                Ok(record) => {
                    println!("Added record {} for {}", record.id, record.name);
                }
                Err(e) => exit_store_error(e),
            }
        }
        Commands::Update {
            id,
            name,
            distance,
            pace,
            date,
            reflections,
            status,
        } => {
            let status = match status.as_deref().map(str::parse::<RecordStatus>) {
                Some(Ok(s)) => Some(s),
                Some(Err(e)) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
                None => None,
            };

            let patch = RecordPatch {
                name,
                distance,
                pace,
                date,
                reflections,
                photo: None,
                status,
            };

            match store.update(&id, &patch) {
                Ok(record) => {
                    println!("Updated record {}", record.id);
                }
                Err(e) => exit_store_error(e),
            }
        }
        Commands::Delete { id } => match store.delete(&id) {
            Ok(()) => {
                println!("Deleted record {}", id);
            }
            Err(e) => exit_store_error(e),
        },
    }

    std::process::exit(EXIT_SUCCESS);
}

async fn upload_photo(
    config: &runboard::config::Config,
    path: &PathBuf,
    verbose: bool,
) -> Result<Photo, String> {
    let cloudinary = config
        .cloudinary
        .as_ref()
        .ok_or_else(|| "no cloudinary section in config".to_string())?;

    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string());

    if verbose {
        eprintln!("Uploading {} ({} bytes)", filename, bytes.len());
    }

    let uploader = runboard::upload::CloudinaryUploader::new(
        cloudinary.cloud_name.clone(),
        cloudinary.upload_preset.clone(),
    )
    .map_err(|e| e.to_string())?;

    uploader
        .upload(bytes, &filename)
        .await
        .map_err(|e| e.to_string())
}

fn exit_store_error(err: StoreError) -> ! {
    eprintln!("{}", err);
    match err {
        StoreError::Validation(_) => std::process::exit(EXIT_VALIDATION),
        StoreError::NotFound(_) => std::process::exit(EXIT_NOT_FOUND),
        StoreError::Storage(_) => std::process::exit(EXIT_STORAGE),
    }
}
