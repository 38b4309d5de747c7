use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Download Clay NAIP embeddings for a specific state and year", long_about = None)]
pub struct Cli {
    /// State code (e.g. 'or')
    #[arg(short, long, value_parser = parse_segment)]
    pub state: String,

    /// Year (e.g. '2020'). If not provided, downloads all years
    #[arg(short, long, value_parser = parse_segment)]
    pub year: Option<String>,

    /// Local base folder for downloads
    #[arg(short, long, default_value = "data/clay_naip")]
    pub dest: PathBuf,
}

/// State and year both become a single key segment and a single directory.
fn parse_segment(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("value must not be empty".to_string());
    }
    if value.contains('/') || value.contains('\\') {
        return Err(format!("'{}' must not contain path separators", value));
    }
    if value == "." || value == ".." {
        return Err(format!("'{}' is not a valid path segment", value));
    }
    Ok(value.to_string())
}
