use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lyricscrape",
    about = "HTTP API for searching AZLyrics and scraping lyrics through headless Chromium",
    long_about = None,
    version,
)]
pub struct Args {
    /// Path to YAML config file (default search: ./lyricscrape.yaml, ~/.config/lyricscrape/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,
}
