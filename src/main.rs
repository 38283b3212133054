use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use remote_image::domain::ImageStatus;
use remote_image::infrastructure::{
    AppConfig, CliArgs, HttpImageFetcher, RemoteImageLoader, StorageManager, build_cache,
};
use remote_image::presentation::{RemoteTexture, load_fallback};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent().map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf),
        ),
        None => StorageManager::new()?,
    };
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_textures(config: &AppConfig, urls: &[String]) -> Result<Vec<Arc<RemoteTexture>>> {
    let fallback = config
        .fallback_image
        .as_deref()
        .map(|path| {
            load_fallback(path)
                .wrap_err_with(|| format!("failed to load fallback image {}", path.display()))
        })
        .transpose()?;

    Ok(urls
        .iter()
        .map(|url| {
            Arc::new(match &fallback {
                Some(image) => RemoteTexture::with_fallback(url.clone(), image.clone()),
                None => RemoteTexture::new(url.clone()),
            })
        })
        .collect())
}

fn write_outputs(dir: &Path, textures: &[Arc<RemoteTexture>]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (index, texture) in textures.iter().enumerate() {
        if !texture.status().is_ready() {
            continue;
        }
        if let Some(image) = texture.current_image() {
            let path = dir.join(format!("{index:03}.png"));
            image
                .save(&path)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(url = texture.url(), path = %path.display(), "Saved image");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = remote_image::VERSION, "Starting {}", remote_image::NAME);

    let cache = build_cache(&config.cache)?;
    let fetcher = Arc::new(HttpImageFetcher::new(config.loader.timeout())?);
    let mut loader = RemoteImageLoader::new(&config.loader, cache, fetcher, Handle::current());

    let textures = create_textures(&config, &args.urls)?;
    for texture in &textures {
        let ticket = loader.load_remote_image(texture.clone(), texture.url());
        texture.set_loading(ticket);
    }

    let deadline = Instant::now() + Duration::from_secs(args.deadline_secs);
    let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    while loader.registered() > 0 {
        if Instant::now() >= deadline {
            warn!(remaining = loader.registered(), "Deadline reached, cancelling loads");
            loader.cancel_all();
            break;
        }
        interval.tick().await;
        let now = Instant::now();
        loader.process(now - last);
        last = now;
    }

    for texture in &textures {
        match texture.status() {
            ImageStatus::Ready => {
                if let Some(image) = texture.current_image() {
                    println!("ok\t{}x{}\t{}", image.width(), image.height(), texture.url());
                }
            }
            ImageStatus::Failed(error) => println!("error\t{error}\t{}", texture.url()),
            ImageStatus::NotStarted | ImageStatus::Loading => {
                println!("cancelled\t-\t{}", texture.url());
            }
        }
    }

    if let Some(dir) = &args.output {
        write_outputs(dir, &textures)?;
    }

    Ok(())
}
