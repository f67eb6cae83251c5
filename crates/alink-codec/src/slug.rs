/// Derive a slug from a human title: lowercase, spaces become `-`, and
/// everything outside `[a-z0-9-]` is dropped.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}
