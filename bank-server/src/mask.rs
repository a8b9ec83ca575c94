/// Mask username suitable for use in logs.
pub fn username(name: &str) -> String {
    const DEFAULT_MASK: &str = "*****";
    match name.chars().next() {
        Some(first) if name.chars().count() > 2 => format!("{}{}", first, DEFAULT_MASK),
        _ => DEFAULT_MASK.to_string(),
    }
}
