//! Member identifier sanitization.

/// Reduce a member identifier to the characters allowed in storage keys.
///
/// Storage keys embed the member id as a path segment, so everything outside
/// `[A-Za-z0-9_]` is stripped. The result may be empty; callers must treat an
/// empty id as invalid.
pub fn sanitize_member_id(member_id: &str) -> String {
    member_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_for_clean_ids() {
        assert_eq!(sanitize_member_id("abc123"), "abc123");
        assert_eq!(sanitize_member_id("user_42"), "user_42");
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(sanitize_member_id("ab c!123"), "abc123");
        assert_eq!(sanitize_member_id("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_member_id("user@example.com"), "userexamplecom");
    }

    #[test]
    fn test_can_become_empty() {
        assert_eq!(sanitize_member_id("!!!"), "");
        assert_eq!(sanitize_member_id(""), "");
    }
}
