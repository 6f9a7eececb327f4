//! Command trigger matching.

use crate::domain::entities::MessageType;

/// Decides whether a message's text invokes the converter.
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    keyword: String,
    wake_prefixes: Vec<String>,
}

impl CommandMatcher {
    /// Creates a matcher. An empty prefix list accepts the bare keyword.
    #[must_use]
    pub fn new(keyword: impl Into<String>, wake_prefixes: Vec<String>) -> Self {
        let wake_prefixes = if wake_prefixes.is_empty() {
            vec![String::new()]
        } else {
            wake_prefixes
        };

        Self {
            keyword: keyword.into().trim().to_string(),
            wake_prefixes,
        }
    }

    /// Command keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns true if `text` is `<prefix><keyword>`, optionally followed by arguments.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        if self.keyword.is_empty() {
            return false;
        }

        let text = text.trim();
        self.wake_prefixes
            .iter()
            .any(|prefix| self.matches_after(text, prefix))
    }

    /// Like [`matches`](Self::matches), except that private chats may omit the wake prefix.
    #[must_use]
    pub fn matches_in(&self, text: &str, message_type: MessageType) -> bool {
        match message_type {
            MessageType::Private => {
                self.matches(text) || (!self.keyword.is_empty() && self.matches_after(text.trim(), ""))
            }
            MessageType::Group => self.matches(text),
        }
    }

    fn matches_after(&self, text: &str, prefix: &str) -> bool {
        text.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(self.keyword.as_str()))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn matcher() -> CommandMatcher {
        CommandMatcher::new("转换", vec!["/".to_string()])
    }

    #[test_case("/转换", true ; "exact")]
    #[test_case("  /转换  ", true ; "surrounding_whitespace")]
    #[test_case("/转换 png", true ; "with_argument")]
    #[test_case("转换", false ; "missing_prefix")]
    #[test_case("/转换器", false ; "longer_word")]
    #[test_case("/help", false ; "other_command")]
    #[test_case("", false ; "empty")]
    fn test_slash_prefix(text: &str, expected: bool) {
        assert_eq!(matcher().matches(text), expected);
    }

    #[test]
    fn test_empty_prefix_list_accepts_bare_keyword() {
        let matcher = CommandMatcher::new("转换", Vec::new());
        assert!(matcher.matches("转换"));
        assert!(!matcher.matches("/转换"));
    }

    #[test]
    fn test_multiple_prefixes() {
        let matcher = CommandMatcher::new("转换", vec!["/".to_string(), "#".to_string()]);
        assert!(matcher.matches("#转换"));
        assert!(matcher.matches("/转换"));
        assert!(!matcher.matches("!转换"));
    }

    #[test_case("转换", MessageType::Private, true ; "bare_keyword_in_private")]
    #[test_case("/转换", MessageType::Private, true ; "prefixed_in_private")]
    #[test_case("转换器", MessageType::Private, false ; "longer_word_in_private")]
    #[test_case("转换", MessageType::Group, false ; "bare_keyword_in_group")]
    #[test_case("/转换", MessageType::Group, true ; "prefixed_in_group")]
    fn test_prefix_is_optional_in_private_chats(
        text: &str,
        message_type: MessageType,
        expected: bool,
    ) {
        assert_eq!(matcher().matches_in(text, message_type), expected);
    }

    #[test]
    fn test_blank_keyword_never_matches() {
        let matcher = CommandMatcher::new("  ", Vec::new());
        assert!(!matcher.matches(""));
        assert!(!matcher.matches("anything"));
        assert!(!matcher.matches_in("", MessageType::Private));
    }
}
