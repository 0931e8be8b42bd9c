use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Network,
    File,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "mediactl")]
#[command(about = "Drive a media player controller against the simulated engine")]
pub struct Cli {
    /// Media URI, or a filesystem path with `--kind file`.
    #[arg(long, default_value = "https://media.example/demo.mp4")]
    pub uri: String,

    #[arg(long, value_enum, default_value_t = SourceArg::Network)]
    pub kind: SourceArg,

    /// Extra request header as `KEY=VALUE`; repeatable, network sources only.
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Length of the simulated media.
    #[arg(long, default_value_t = 3_000)]
    pub duration_ms: u64,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    #[arg(long)]
    pub looping: bool,

    #[arg(long)]
    pub volume: Option<f64>,

    #[arg(long)]
    pub speed: Option<f64>,

    /// Seek here before starting playback.
    #[arg(long)]
    pub start_ms: Option<u64>,

    /// Stop after this long even if playback has not completed.
    #[arg(long, default_value_t = 10_000)]
    pub run_ms: u64,

    /// Print the final player value as JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
