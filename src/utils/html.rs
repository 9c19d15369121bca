/// Escape stored post and comment text for embedding in an HTML page.
///
/// Content is kept exactly as the author wrote it; this runs at render time
/// so markup in the text shows up literally instead of being interpreted.
pub fn escape_html(text: &str) -> String {
    ammonia::clean_text(text)
}
