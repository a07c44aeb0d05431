//! Command-line argument parsing for the `gapless` binary.

use std::path::PathBuf;

use clap::Parser;

use gapless_player::PlayerConfig;

/// Play an album gaplessly on a UPnP/DLNA renderer.
#[derive(Parser, Debug)]
#[command(name = "gapless")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Album manifest (JSON) to play.
    pub manifest: PathBuf,

    /// Index of the renderer to use instead of asking.
    #[arg(short, long)]
    pub renderer: Option<usize>,

    /// AVTransport control URL; skips discovery.
    #[arg(long, conflicts_with = "renderer")]
    pub control_url: Option<String>,

    /// Port of the local media server.
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Download cache directory.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Keep downloaded tracks after playback.
    #[arg(long)]
    pub keep_cache: bool,

    /// Send SetPlayMode NORMAL before starting.
    #[arg(long)]
    pub normal_play_mode: bool,

    /// Log filter, e.g. `info` or `gapless_player=debug`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Verbose logging with source locations.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Defaults overridden by whatever was given on the command line.
    pub fn config(&self) -> PlayerConfig {
        let mut config = PlayerConfig::default()
            .with_port(self.port)
            .with_keep_cache(self.keep_cache)
            .with_set_play_mode(self.normal_play_mode);
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir);
        }
        config
    }
}
