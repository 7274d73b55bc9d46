//! Path display helpers

/// Shortens long paths for display, keeping the last two components
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match components.as_slice() {
        [.., parent, last] if components.len() > 2 => {
            let prefix = if path.starts_with("./") { "./" } else { "" };
            format!("{prefix}.../{parent}/{last}")
        }
        // Too few components to shorten meaningfully
        _ => path.to_string(),
    }
}
