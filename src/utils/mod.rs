use std::path::PathBuf;

/// Split the link box into one URL per line, dropping blank lines
pub fn parse_url_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty form fields mean "not provided", never an empty path
pub fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// `~/Downloads/Gamdl`, or a relative `Gamdl` if there is no home directory
pub fn default_output_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads").join("Gamdl"))
        .unwrap_or_else(|| PathBuf::from("Gamdl"))
}
