//! imgvault CLI: operate an image store directly on the local filesystem.
//!
//! Configuration comes from IMAGES_* environment variables (or a .env file);
//! IMAGES_UPLOAD_ROOT is required.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use imgvault_cli::{init_tracing, read_upload, seed_directory};
use imgvault_core::ImageConfig;
use imgvault_services::ImageStorageService;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "imgvault", about = "Store, fetch and delete images with thumbnails")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store an image file
    Store {
        /// Path to the image
        file: PathBuf,
        /// Declared content type (inferred from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Copy a stored image (or its thumbnail) to a file
    Get {
        /// Image identifier
        id: String,
        /// Fetch the thumbnail instead of the resized original
        #[arg(long)]
        thumbnail: bool,
        /// Destination path
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Delete images by URL or identifier
    Delete {
        /// Image URLs, e.g. http://host/api/images/view/{id}.png
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// List stored image identifiers
    List,
    /// Store every file in a directory
    Seed {
        /// Directory of sample images
        dir: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = ImageConfig::from_env()
        .context("Failed to load configuration. Set IMAGES_UPLOAD_ROOT")?;
    let service = ImageStorageService::new(config)?;

    match cli.command {
        Commands::Store { file, content_type } => {
            let candidate = read_upload(&file, content_type).await?;
            let id = service.store(candidate).await?;
            print_json(&serde_json::json!({ "id": id }))?;
        }
        Commands::Get {
            id,
            thumbnail,
            output,
        } => {
            let stored = service
                .get(&id, thumbnail)
                .await
                .with_context(|| format!("Image {} not found", id))?;
            let content_type = stored.content_type;
            let data = stored.read_all().await?;
            tokio::fs::write(&output, &data)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_json(&serde_json::json!({
                "id": id,
                "thumbnail": thumbnail,
                "content_type": content_type,
                "size_bytes": data.len(),
                "output": output,
            }))?;
        }
        Commands::Delete { urls } => {
            service.delete_bulk(&urls).await;
            print_json(&serde_json::json!({ "success": true, "requested": urls.len() }))?;
        }
        Commands::List => {
            let ids = service.list_ids().await?;
            print_json(&ids)?;
        }
        Commands::Seed { dir } => {
            let report = seed_directory(&service, &dir).await?;
            print_json(&report)?;
        }
    }

    Ok(())
}
