/// Derive an anchor id from heading text.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters becomes one hyphen, and hyphens at either end are dropped.
/// Applying it to its own output changes nothing.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
