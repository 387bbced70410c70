//! MicroJPEG CLI — command-line client for the MicroJPEG image API.
//!
//! Set MICROJPEG_API_KEY (or pass --api-key). MICROJPEG_API_URL overrides the
//! endpoint. Results are printed as JSON; `--output` also saves the artifact.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use microjpeg_cli::{init_tracing, input_source};
use microjpeg_client::{
    ApiClient, BackgroundRemovalOptions, ClientConfig, CompressOptions, DownloadReference,
    EnhanceOptions, EnhanceScale, InputSource, ResizeMode,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "microjpeg", about = "MicroJPEG image API CLI")]
struct Cli {
    /// API key (overrides MICROJPEG_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// API base URL (overrides MICROJPEG_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a local file or a remote image URL
    Compress {
        /// File path, or an http(s) URL for the service to fetch
        input: String,
        /// Output quality (1-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Output format: jpeg, png, webp, avif
        #[arg(long)]
        format: Option<String>,
        /// Resize width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Resize height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Resize mode: fit, cover, scalewidth, scaleheight, thumb
        #[arg(long)]
        mode: Option<ResizeMode>,
        /// Save the processed image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert an image to another format
    Convert {
        /// File path, or an http(s) URL for the service to fetch
        input: String,
        /// Target format
        #[arg(long)]
        format: String,
        /// Output quality (1-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Save the processed image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove the background of an image
    RemoveBackground {
        /// Path to the image
        file: PathBuf,
        /// Output format
        #[arg(long)]
        format: Option<String>,
        /// Output quality (1-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Save the processed image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// AI upscale an image
    Enhance {
        /// Path to the image
        file: PathBuf,
        /// Upscaling factor: 2, 4 or 8
        #[arg(long, default_value = "2")]
        scale: EnhanceScale,
        /// Enable face enhancement
        #[arg(long)]
        face_enhance: bool,
        /// Output format
        #[arg(long)]
        format: Option<String>,
        /// Output quality (1-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Save the processed image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show account tier, usage and limits
    Usage,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let api_key = cli.api_key.clone();
    let config = ClientConfig::from_lookup(|name| match (name, &api_key) {
        ("MICROJPEG_API_KEY", Some(key)) => Some(key.clone()),
        _ => std::env::var(name).ok(),
    })?;

    Ok(match &cli.api_url {
        Some(url) => config.with_base_url(url.as_str()),
        None => config,
    })
}

async fn save_artifact<R>(client: &ApiClient, reference: &R, output: Option<&Path>) -> anyhow::Result<()>
where
    R: DownloadReference + ?Sized,
{
    if let Some(path) = output {
        let size = client
            .save_to_file(reference, path)
            .await
            .with_context(|| format!("Failed to save artifact to {}", path.display()))?;
        tracing::info!(path = %path.display(), size_bytes = size, "Saved processed image");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(&cli)
        .context("Failed to load configuration. Set MICROJPEG_API_KEY or pass --api-key")?;
    let client = ApiClient::from_config(config).context("Failed to create API client")?;

    match cli.command {
        Commands::Compress {
            input,
            quality,
            format,
            width,
            height,
            mode,
            output,
        } => {
            let options = CompressOptions {
                quality,
                output_format: format,
                resize_width: width,
                resize_height: height,
                resize_mode: mode,
            };
            let envelope = client
                .compress(input_source(&input), Some(&options))
                .await?;
            print_json(&envelope)?;
            save_artifact(&client, &envelope, output.as_deref()).await?;
        }
        Commands::Convert {
            input,
            format,
            quality,
            output,
        } => {
            let envelope = client
                .convert(input_source(&input), &format, quality)
                .await?;
            print_json(&envelope)?;
            save_artifact(&client, &envelope, output.as_deref()).await?;
        }
        Commands::RemoveBackground {
            file,
            format,
            quality,
            output,
        } => {
            let options = BackgroundRemovalOptions {
                output_format: format,
                quality,
            };
            let envelope = client
                .remove_background(InputSource::file(file), Some(&options))
                .await?;
            print_json(&envelope)?;
            save_artifact(&client, &envelope, output.as_deref()).await?;
        }
        Commands::Enhance {
            file,
            scale,
            face_enhance,
            format,
            quality,
            output,
        } => {
            let options = EnhanceOptions {
                scale,
                face_enhance,
                output_format: format,
                quality,
            };
            let envelope = client
                .enhance(InputSource::file(file), Some(&options))
                .await?;
            print_json(&envelope)?;
            save_artifact(&client, &envelope, output.as_deref()).await?;
        }
        Commands::Usage => {
            let usage = client.get_usage().await?;
            print_json(&usage)?;
        }
    }

    Ok(())
}
