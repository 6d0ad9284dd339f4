use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use realview::classifier::OpenAiGateway;
use realview::io::load_images_from_folder;
use realview::{GatewayConfig, PipelineConfig, PropertyProcessor, ReviewService, Store};

#[derive(Parser)]
#[command(name = "realview", about = "Property inspection photo pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline on a folder of images and store the case record.
    Run {
        /// Folder containing the property's images
        #[arg(long)]
        folder: PathBuf,
        /// Property id; defaults to the folder name
        #[arg(long)]
        property_id: Option<String>,
        /// Directory holding case records and the feedback log
        #[arg(long, default_value = "out")]
        data_dir: PathBuf,
    },
    /// Print the benchmark summary for the stored cases and feedback log.
    Summary {
        #[arg(long, default_value = "out")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    realview::utils::logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            folder,
            property_id,
            data_dir,
        } => {
            let property_id = match property_id {
                Some(id) => id,
                None => folder
                    .file_name()
                    .and_then(|name| name.to_str())
                    .context("cannot derive property id from folder name; pass --property-id")?
                    .to_string(),
            };

            let gateway_config = GatewayConfig::from_env()?;
            let gateway = Arc::new(OpenAiGateway::new(gateway_config)?);
            let processor = PropertyProcessor::new(gateway, PipelineConfig::default());

            let images = load_images_from_folder(&folder)?;
            info!(
                "Processing {} images from {} as property {property_id}",
                images.len(),
                folder.display()
            );

            let case = processor.process_property(&property_id, images).await;
            let store = Store::new(data_dir)?;
            store.upsert_case(case.clone()).await?;

            println!(
                "Run complete: {} images ({} target, {} review), {} rooms",
                case.images.len(),
                case.target_images.len(),
                case.review_images.len(),
                case.rooms.len()
            );
        }
        Command::Summary { data_dir } => {
            let store = Store::new(data_dir)?;
            let service = ReviewService::new(store, PipelineConfig::default());
            let summary = service.benchmark_summary().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
