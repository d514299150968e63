//! "Did you mean" suggestions for unknown options and enum values.

/// Proposes known names close to an unrecognized one.
pub trait SuggestionStrategy: Send + Sync {
    /// Candidates from `names` for `unknown`, best first. Empty when nothing is close.
    fn suggest(&self, names: &[&str], unknown: &str) -> Vec<String>;
}

/// Edit-distance based suggestions, compared case-insensitively.
#[derive(Debug, Clone, Copy)]
pub struct LevenshteinSuggestions {
    max_distance: usize,
    max_results: usize,
}

impl Default for LevenshteinSuggestions {
    fn default() -> Self {
        Self {
            max_distance: 3,
            max_results: 3,
        }
    }
}

impl LevenshteinSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_distance(mut self, distance: usize) -> Self {
        self.max_distance = distance;
        self
    }

    pub fn max_results(mut self, results: usize) -> Self {
        self.max_results = results;
        self
    }
}

impl SuggestionStrategy for LevenshteinSuggestions {
    fn suggest(&self, names: &[&str], unknown: &str) -> Vec<String> {
        let target = unknown.to_lowercase();
        // short names would match almost anything at the full distance
        let limit = self.max_distance.min(target.chars().count() / 2).max(1);

        let mut scored: Vec<(usize, usize, &str)> = names
            .iter()
            .enumerate()
            .filter_map(|(order, name)| {
                let distance = strsim::levenshtein(&name.to_lowercase(), &target);
                (distance <= limit).then_some((distance, order, *name))
            })
            .collect();
        scored.sort_unstable();
        scored
            .into_iter()
            .take(self.max_results)
            .map(|(_, _, name)| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_declaration_order() {
        let names = ["delay", "relay", "period"];
        let suggestions = LevenshteinSuggestions::new().suggest(&names, "xelay");
        assert_eq!(suggestions, ["delay", "relay"]);
    }

    #[test]
    fn suggests_close_option_names() {
        let names = ["period", "delay", "repeatCount", "fixedRate"];
        let suggestions = LevenshteinSuggestions::new().suggest(&names, "perid");
        assert_eq!(suggestions, ["period"]);
    }

    #[test]
    fn matching_ignores_case() {
        let names = ["Never", "IfReplyExpected", "Always"];
        let suggestions = LevenshteinSuggestions::new().suggest(&names, "always");
        assert_eq!(suggestions, ["Always"]);
    }

    #[test]
    fn nothing_close_is_empty() {
        let names = ["period", "delay"];
        assert!(LevenshteinSuggestions::new()
            .suggest(&names, "blah")
            .is_empty());
    }

    #[test]
    fn limits_results() {
        let names = ["abcd", "abce", "abcf", "abcg"];
        let suggestions = LevenshteinSuggestions::new()
            .max_results(2)
            .suggest(&names, "abcx");
        assert_eq!(suggestions, ["abcd", "abce"]);
    }
}
