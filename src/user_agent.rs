//! Default User-Agent string.

/// Returns `<crate name>/<crate version>`, e.g. `http_requests/0.1.0`.
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_format() {
        let ua = default_user_agent();
        let (name, version) = ua.split_once('/').expect("name/version");
        assert_eq!(name, "http_requests");
        assert!(!version.is_empty());
    }
}
