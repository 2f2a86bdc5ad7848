const MASKED: &str = "***";
const VISIBLE_TOKEN_CHARS: usize = 4;
const MIN_TOKEN_LEN_FOR_SUFFIX: usize = 8;

/// Keeps only the tail of a token so audit rows can be correlated without
/// storing the secret. Short values are masked entirely.
pub fn token_suffix(token: &str) -> String {
    let len = token.chars().count();
    if len < MIN_TOKEN_LEN_FOR_SUFFIX {
        return MASKED.to_string();
    }
    let suffix: String = token.chars().skip(len - VISIBLE_TOKEN_CHARS).collect();
    format!("{MASKED}{suffix}")
}

/// Replaces the token segment of `/api/tokens/{token}/...` paths.
pub fn redact_path(path: &str) -> String {
    let mut previous = "";
    path.split('/')
        .map(|segment| {
            let out = if previous == "tokens" && !segment.is_empty() && segment != "generate" {
                token_suffix(segment)
            } else {
                segment.to_string()
            };
            previous = segment;
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn mask_ip(ip: &str) -> String {
    if ip.contains(':') {
        let mut parts = ip.split(':').collect::<Vec<_>>();
        if parts.len() > 4 {
            parts.truncate(4);
        }
        return format!("{}::/64", parts.join(":"));
    }

    let parts = ip.split('.').collect::<Vec<_>>();
    if parts.len() == 4 {
        return format!("{}.0/24", parts[..3].join("."));
    }

    MASKED.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_suffix_keeps_last_four_chars() {
        assert_eq!(token_suffix("Zk3vQ9wLm2pR8sT1uV4xYa"), "***4xYa");
    }

    #[test]
    fn token_suffix_masks_short_values() {
        assert_eq!(token_suffix(""), "***");
        assert_eq!(token_suffix("abc1234"), "***");
    }

    #[test]
    fn redact_path_hides_token_segment() {
        assert_eq!(
            redact_path("/api/tokens/Zk3vQ9wLm2pR8sT1uV4xYa/validate"),
            "/api/tokens/***4xYa/validate"
        );
    }

    #[test]
    fn redact_path_leaves_other_paths_alone() {
        assert_eq!(redact_path("/api/tokens/generate"), "/api/tokens/generate");
        assert_eq!(redact_path("/api/check-in"), "/api/check-in");
        assert_eq!(redact_path("/"), "/");
    }

    #[test]
    fn mask_ip_handles_v4_and_v6() {
        assert_eq!(mask_ip("203.0.113.42"), "203.0.113.0/24");
        assert_eq!(mask_ip("2001:db8:1:2:3:4:5:6"), "2001:db8:1:2::/64");
        assert_eq!(mask_ip("unknown"), "***");
    }
}
