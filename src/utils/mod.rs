use std::sync::OnceLock;

use regex::Regex;

/// Instagram post/reel URL shape accepted by the form.
const POST_URL_PATTERN: &str = r"^https?://(?:www\.)?instagram\.com/(?:p|reel)/[\w-]+/?$";

fn post_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(POST_URL_PATTERN).expect("post URL pattern is valid"))
}

/// Check whether the (trimmed) input is a valid Instagram post or reel URL.
pub fn validate_instagram_url(raw: &str) -> bool {
    post_url_regex().is_match(raw.trim())
}

/// Extract the media shortcode from a post/reel URL.
pub fn extract_shortcode(url: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"/(?:p|reel)/([\w-]+)").expect("shortcode pattern is valid"));
    re.captures(url.trim()).map(|caps| caps[1].to_string())
}

/// Build a save-dialog filename from the post shortcode and the media URL's
/// extension. Falls back to a generic stem and `.bin` when either is missing.
pub fn suggested_filename(post_url: &str, media_url: &str) -> String {
    let stem = extract_shortcode(post_url).unwrap_or_else(|| "instagram-media".to_string());
    let ext = media_url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or("bin");
    format!("{}.{}", sanitize_filename(&stem), ext)
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Random progress-ramp step in percent, within `[0, 10)`.
/// Degrades to a fixed mid-range step if the OS RNG is unavailable.
pub fn random_step() -> f32 {
    let mut buf = [0u8; 4];
    match getrandom::fill(&mut buf) {
        Ok(()) => (u32::from_le_bytes(buf) % 1000) as f32 / 100.0,
        Err(_) => 5.0,
    }
}
