use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use imgbb_uploader_lib::screenshots::encoding;
use imgbb_uploader_lib::storage::history::{unpack_file_name, SqliteHistory};
use imgbb_uploader_lib::storage::secure_store;
use imgbb_uploader_lib::utils::logging;
use imgbb_uploader_lib::{ImgurUploader, UploadEvent, UploaderConfig};

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload screenshots to imgbb and keep a local history"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an image file
    Upload {
        #[clap(help = "Image to upload, or base64 capture with --base64")]
        path: PathBuf,

        #[clap(long, help = "The file holds a base64-encoded capture")]
        base64: bool,
    },
    /// List previous uploads, newest first
    History,
    /// Open the deletion page for a history entry and forget it locally
    Delete {
        #[clap(help = "Packed history identifier as shown by `history`")]
        identifier: String,
    },
    /// Store the imgbb API key in the system keyring
    SetKey { key: String },
    /// Remove the stored API key from the system keyring
    ClearKey,
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::SetKey { key } => secure_store::store_api_key(&key),
        Command::ClearKey => secure_store::delete_api_key(),
        Command::History => {
            let config = UploaderConfig::from_env();
            let history = SqliteHistory::open(&config.history_path, config.history_limit)?;
            for entry in history.list()? {
                println!(
                    "{}  {}  {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.packed_name,
                    entry.file_name
                );
            }
            Ok(())
        }
        Command::Upload { path, base64 } => {
            let capture = if base64 {
                let data = std::fs::read_to_string(&path)?;
                encoding::decode_base64(&data)?
            } else {
                encoding::load_file(&path)?
            };

            let config = UploaderConfig::from_env();
            let history = Arc::new(SqliteHistory::open(
                &config.history_path,
                config.history_limit,
            )?);
            let (uploader, mut events) = ImgurUploader::new(config, history)?;
            uploader.upload(&capture).await?;

            while let Some(event) = events.recv().await {
                match event {
                    UploadEvent::UploadSucceeded(url) => {
                        println!("{}", url);
                        return Ok(());
                    }
                    UploadEvent::UploadFailed(error) => {
                        return Err(anyhow::anyhow!(error));
                    }
                    _ => {}
                }
            }
            Err(anyhow::anyhow!("Uploader stopped without a reply"))
        }
        Command::Delete { identifier } => {
            let config = UploaderConfig::from_env();
            let history = Arc::new(SqliteHistory::open(
                &config.history_path,
                config.history_limit,
            )?);

            let entry = history
                .get(&identifier)?
                .ok_or_else(|| anyhow::anyhow!("No history entry named {}", identifier))?;
            let unpacked = unpack_file_name(&entry.packed_name);
            if unpacked.delete_token.is_empty() {
                return Err(anyhow::anyhow!("{} has no delete token", identifier));
            }

            let (uploader, mut events) = ImgurUploader::new(config, history.clone())?;
            uploader.delete_image(&unpacked.file_name, &unpacked.delete_token);

            while let Some(event) = events.recv().await {
                if event == UploadEvent::DeletionCompleted {
                    history.remove(&entry.packed_name)?;
                    println!("Removed {} from history", entry.packed_name);
                    break;
                }
            }
            Ok(())
        }
    }
}
