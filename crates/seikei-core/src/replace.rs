use crate::RulesError;
use crate::types::ReplacementRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUILTIN_RULES: [(&str, &str); 9] = [
    ("剣士", "犬種"),
    ("甘棒", "甘えん坊"),
    ("天子", "犬種"),
    ("しけも", "しつけも"),
    ("個人さ", "個体差"),
    ("買い やすい", "買いやすい"),
    ("お 伝え", "お伝え"),
    ("お 出かけ", "お出かけ"),
    ("地は", "チワワ"),
];

/// Apply rules in order, each replacing every non-overlapping occurrence
/// before the next one runs. The result is trimmed.
///
/// Rules with an empty `find` are skipped.
pub fn apply_replacements(text: &str, rules: &[ReplacementRule]) -> String {
    let mut out = text.to_string();
    for rule in rules {
        if rule.find.is_empty() {
            continue;
        }
        out = out.replace(&rule.find, &rule.replace);
    }
    out.trim().to_string()
}

/// Ordered list of replacement rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    rules: Vec<ReplacementRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ReplacementRule>) -> Result<Self, RulesError> {
        let set = Self { rules };
        set.validate()?;
        Ok(set)
    }

    /// The demo's transcript cleanup rules.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES
                .iter()
                .map(|(find, replace)| ReplacementRule::new(*find, *replace))
                .collect(),
        }
    }

    /// Parse a TOML document of `[[rules]]` tables with `find` and `replace`.
    pub fn from_toml_str(content: &str) -> Result<Self, RulesError> {
        let set: RuleSet = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn rules(&self) -> &[ReplacementRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        apply_replacements(text, &self.rules)
    }

    fn validate(&self) -> Result<(), RulesError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.find.is_empty() {
                return Err(RulesError::Validation(format!(
                    "rules[{index}].find must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<ReplacementRule> {
        pairs
            .iter()
            .map(|(find, replace)| ReplacementRule::new(*find, *replace))
            .collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let out = apply_replacements("天子と天子", &rules(&[("天子", "犬種")]));
        assert_eq!(out, "犬種と犬種");
    }

    #[test]
    fn later_rules_see_earlier_output() {
        let chained = rules(&[("a", "b"), ("b", "c")]);
        assert_eq!(apply_replacements("a", &chained), "c");

        let reversed = rules(&[("b", "c"), ("a", "b")]);
        assert_eq!(apply_replacements("a", &reversed), "b");
    }

    #[test]
    fn result_is_trimmed() {
        assert_eq!(apply_replacements("  x \n", &[]), "x");
    }

    #[test]
    fn empty_find_is_skipped() {
        assert_eq!(apply_replacements("ab", &rules(&[("", "-")])), "ab");
    }

    #[test]
    fn builtin_rules_clean_demo_sentence() {
        let cleaned = RuleSet::builtin().apply("この剣士は甘棒で人なつっこい天子です。");
        assert_eq!(cleaned, "この犬種は甘えん坊で人なつっこい犬種です。");
    }

    #[test]
    fn builtin_rules_join_split_words() {
        let cleaned = RuleSet::builtin().apply("お 出かけ が 買い やすい");
        assert_eq!(cleaned, "お出かけ が 買いやすい");
    }

    #[test]
    fn builtin_rules_keep_order() {
        let set = RuleSet::builtin();
        assert_eq!(set.len(), 9);
        assert_eq!(set.rules()[0].find, "剣士");
        assert_eq!(set.rules()[8].replace, "チワワ");
    }

    #[test]
    fn toml_rules_preserve_order() {
        let content = r#"
[[rules]]
find = "a"
replace = "b"

[[rules]]
find = "b"
replace = "c"
"#;
        let set = RuleSet::from_toml_str(content).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.apply("a"), "c");
    }

    #[test]
    fn toml_rules_reject_empty_find() {
        let content = "[[rules]]\nfind = \"\"\nreplace = \"x\"\n";
        assert!(matches!(
            RuleSet::from_toml_str(content),
            Err(RulesError::Validation(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rules.toml");
        fs::write(&path, "[[rules]]\nfind = \"甘棒\"\nreplace = \"甘えん坊\"\n").unwrap();
        let set = RuleSet::load(&path).unwrap();
        assert_eq!(set.apply("甘棒"), "甘えん坊");
        assert!(matches!(
            RuleSet::load(&temp.path().join("missing.toml")),
            Err(RulesError::Io(_))
        ));
    }
}
