use uuid::Uuid;

/// Build a short random identifier: `prefix` followed by `len` lowercase hex characters
pub fn generate_id(prefix: &str, len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    let len = len.min(hex.len());
    format!("{}{}", prefix, &hex[..len])
}
