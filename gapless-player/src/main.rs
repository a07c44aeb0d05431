//! `gapless`: play an album manifest on a UPnP/DLNA renderer.

mod cli;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::thread::JoinHandle;

use clap::Parser;
use tracing::{info, warn};

use avtransport::{AvTransportClient, MediaOrigin, PlayableTrack};
use gapless_player::logging::{init_logging, LoggingMode};
use gapless_player::{
    net, Catalog, ManifestCatalog, Orchestrator, PlaybackReport, PlaybackSession, PlayerConfig,
    PlayerError, ThreadSleeper,
};
use media_origin::{DownloadConfig, DownloadReport, Downloader, MediaCache, MediaServer, ServerConfig};

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    let mode = if args.debug { LoggingMode::Debug } else { LoggingMode::Development };
    if let Err(e) = init_logging(mode, args.log_level.as_deref()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), PlayerError> {
    let config = args.config();
    config.validate()?;

    let catalog = ManifestCatalog::from_path(&args.manifest)?;
    let album_id = catalog.album_id().to_string();
    let tracks = catalog.album(&album_id)?;
    info!(album = %catalog.manifest().title, tracks = tracks.len(), "album loaded");

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| PlayerError::Config(format!("Failed to start async runtime: {}", e)))?;

    let cache = MediaCache::new(&config.cache_dir);
    let server_config = ServerConfig {
        port: config.port,
        ..ServerConfig::default()
    };
    let server = runtime.block_on(MediaServer::bind(&cache, &server_config))?;

    let downloads = Downloader::new(cache.clone(), DownloadConfig::default()).spawn(tracks.clone())?;

    let outcome = play(args, &config, &cache, server.port(), tracks);

    runtime.block_on(server.shutdown());
    close_cache(&cache, &album_id, &config, downloads);

    let report = outcome?;
    println!(
        "Played {} track(s), {} queued gaplessly.",
        report.tracks_played,
        report.next_uri_calls - report.next_uri_failures
    );
    Ok(())
}

fn play(
    args: &Args,
    config: &PlayerConfig,
    cache: &MediaCache,
    port: u16,
    tracks: Vec<PlayableTrack>,
) -> Result<PlaybackReport, PlayerError> {
    let endpoint = choose_renderer(args, config)?;
    let local_ip = net::local_ip_as_seen_by(&endpoint)?;
    let origin = MediaOrigin::new(local_ip, port);
    info!(%endpoint, origin = %origin.base_url(), "renderer selected");

    if let Some(first) = tracks.first() {
        cache.wait_ready(first, config.first_track_timeout)?;
    }

    let renderer = AvTransportClient::with_config(endpoint.as_str(), &config.soap_config());
    let session = PlaybackSession::new(tracks, endpoint, origin, config.poll_interval)?;
    let report = Orchestrator::new(&renderer, ThreadSleeper, session, config).run()?;

    wait_for_enter("Press Enter to close.");
    Ok(report)
}

fn choose_renderer(args: &Args, config: &PlayerConfig) -> Result<String, PlayerError> {
    if let Some(url) = &args.control_url {
        return Ok(url.clone());
    }

    let renderers = renderer_discovery::discover_with_timeout(config.discovery_timeout)?;
    let endpoint = match args.renderer {
        Some(index) => renderer_discovery::select(&renderers, index)?,
        None => {
            let stdin = io::stdin();
            renderer_discovery::prompt_selection(&renderers, stdin.lock(), io::stdout())?
        }
    };
    Ok(endpoint)
}

fn wait_for_enter(prompt: &str) {
    print!("{} ", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

/// Purge the album unless asked to keep it; never while files are still being written.
fn close_cache(
    cache: &MediaCache,
    album_id: &str,
    config: &PlayerConfig,
    downloads: JoinHandle<DownloadReport>,
) {
    if config.keep_cache {
        return;
    }
    if !downloads.is_finished() {
        warn!(dir = %cache.root().display(), "downloads still running; cache left in place");
        return;
    }
    match downloads.join() {
        Ok(report) => info!(
            downloaded = report.downloaded,
            reused = report.reused,
            failed = report.failed,
            "downloads complete"
        ),
        Err(_) => warn!("download worker panicked"),
    }
    if let Err(e) = cache.purge(album_id) {
        warn!(error = %e, "failed to purge album cache");
    }
}
