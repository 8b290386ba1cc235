// src/utils/html_debug.rs
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use crate::utils::error::AppError;

/// Raw-markup patterns for the listing card layout, paired with a highlight type.
pub const LISTING_DEBUG_PATTERNS: [(&str, &str); 7] = [
    (r#"class="\s*relative\s+xl:z-10\s*""#, "listing"),
    (r#"class="\s*mt-1\s+mr-10\s*""#, "title"),
    (r#"class="\s*flex\s+flex-wrap\s+gap-1\.5\s+mt-2\s+w-full\s*""#, "details"),
    (r#"class="[^"]*\bline-clamp-2\b[^"]*""#, "location"),
    (r#"class="\s*line-clamp-3\s+font-light\s*""#, "company"),
    (r#"class="\s*line-clamp-5\s+font-light\s*""#, "qualifications"),
    (r#"class="\s*flex\s+space-x-1\s*""#, "tools"),
];

/// Saves a HTML document to a file with debug highlights
pub fn save_debug_html<P: AsRef<Path>>(html: &str, filename: P, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let path = filename.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;

    // Add debug styling in head
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str(".highlight-listing { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-title { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-details { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-tools { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, highlight_type) in sorted_highlights {
        // Overlaps with an earlier highlight are dropped
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "listing" => "highlight-listing",
            "title" => "highlight-title",
            "details" => "highlight-details",
            "tools" => "highlight-tools",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    // Add any remaining content
    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }

    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates a debug version of an HTML document with locations of specified regex patterns highlighted
pub fn create_debug_html<P: AsRef<Path>>(html: &str, filename: P, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    tracing::debug!("Found {} debug highlights", highlights.len());
    save_debug_html(html, filename, &highlights)
}
