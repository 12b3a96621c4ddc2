use std::collections::HashSet;

/// Turns raw vendor text into a canonical form for comparison.
///
/// Lowercases, drops every character that is neither alphanumeric nor
/// whitespace, removes stopwords (whole tokens only) and collapses
/// whitespace. Missing or empty input yields an empty string.
#[derive(Debug, Clone, Default)]
pub struct VendorNormalizer {
    stopwords: HashSet<String>,
}

impl VendorNormalizer {
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Stopwords go through the same cleanup so "Inc." still removes "inc".
        let stopwords = stopwords
            .into_iter()
            .flat_map(|s| clean_tokens(s.as_ref()))
            .collect();
        Self { stopwords }
    }

    pub fn normalize(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };
        clean_tokens(raw)
            .into_iter()
            .filter(|token| !self.stopwords.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn clean_tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::DEFAULT_STOPWORDS;

    fn normalizer() -> VendorNormalizer {
        VendorNormalizer::new(DEFAULT_STOPWORDS)
    }

    #[test]
    fn lowercases_and_drops_stopwords() {
        assert_eq!(normalizer().normalize(Some("Staples Inc")), "staples");
    }

    #[test]
    fn strips_punctuation_before_stopword_check() {
        assert_eq!(normalizer().normalize(Some("Staples, Inc.")), "staples");
        assert_eq!(normalizer().normalize(Some("AT&T Mobility LLC")), "att mobility");
    }

    #[test]
    fn stopwords_match_whole_tokens_only() {
        // "inc" inside "incredible" and "co" inside "costco" survive.
        assert_eq!(normalizer().normalize(Some("Incredible Costco")), "incredible costco");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(
            normalizer().normalize(Some("  Acme \t  Payment\n Widgets  ")),
            "acme widgets"
        );
    }

    #[test]
    fn missing_and_empty_normalize_to_empty() {
        assert_eq!(normalizer().normalize(None), "");
        assert_eq!(normalizer().normalize(Some("")), "");
        assert_eq!(normalizer().normalize(Some(" .,& ")), "");
        assert_eq!(normalizer().normalize(Some("Online Transfer")), "");
    }

    #[test]
    fn custom_stopwords_are_cleaned() {
        let n = VendorNormalizer::new(["GmbH."]);
        assert_eq!(n.normalize(Some("Bosch GmbH")), "bosch");
    }

    #[test]
    fn no_stopwords_keeps_every_token() {
        let n = VendorNormalizer::default();
        assert_eq!(n.normalize(Some("Staples Inc")), "staples inc");
    }

    #[test]
    fn keeps_digits_and_non_ascii_letters() {
        assert_eq!(normalizer().normalize(Some("Café 24/7")), "café 247");
    }

    #[test]
    fn deterministic() {
        let n = normalizer();
        assert_eq!(n.normalize(Some("Foo-Bar Ltd")), n.normalize(Some("Foo-Bar Ltd")));
    }
}
