//! Coordinator configuration.

/// Tunables for a [`Coordinator`](crate::Coordinator) instance.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum stored length for move and reset comments. Longer comments
    /// are truncated on a character boundary, not rejected.
    pub max_comment_len: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_comment_len: 256,
        }
    }
}

impl CoordinatorConfig {
    /// Applies the comment length limit.
    pub(crate) fn clip_comment(&self, comment: &str) -> String {
        if comment.chars().count() <= self.max_comment_len {
            comment.to_string()
        } else {
            comment.chars().take(self.max_comment_len).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_comment_passes_short_comments_through() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.clip_comment("mistake"), "mistake");
    }

    #[test]
    fn test_clip_comment_truncates_on_char_boundary() {
        let config = CoordinatorConfig {
            max_comment_len: 3,
        };
        assert_eq!(config.clip_comment("ありがとう"), "ありが");
        assert_eq!(config.clip_comment("abcdef"), "abc");
    }
}
