use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, RuleSide};

/// Rating adjustment for a band of rating differences.
///
/// `range` is inclusive on both ends; a `None` upper bound is unbounded.
/// `strong` applies when the side being adjusted was the higher rated one
/// before the match, `weak` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRule {
    pub range: (i32, Option<i32>),
    pub strong: i32,
    pub weak: i32,
}

impl DeltaRule {
    pub fn new(min: i32, max: Option<i32>, strong: i32, weak: i32) -> Self {
        Self { range: (min, max), strong, weak }
    }

    pub fn min(&self) -> i32 {
        self.range.0
    }

    pub fn max(&self) -> Option<i32> {
        self.range.1
    }

    pub fn contains(&self, delta: i32) -> bool {
        delta >= self.min() && self.max().is_none_or(|max| delta <= max)
    }

    pub fn delta_for(&self, is_stronger: bool) -> i32 {
        if is_stronger { self.strong } else { self.weak }
    }
}

pub fn find_rule(rules: &[DeltaRule], delta: i32, side: RuleSide) -> Result<&DeltaRule, EngineError> {
    rules
        .iter()
        .find(|rule| rule.contains(delta))
        .ok_or(EngineError::NoMatchingRule { side, delta })
}

/// A usable rule set starts at 0, has no gaps or overlaps and ends unbounded,
/// so every possible rating difference finds exactly one rule.
pub fn validate_rule_set(rules: &[DeltaRule]) -> Result<(), EngineError> {
    let first = rules
        .first()
        .ok_or_else(|| EngineError::InvalidRuleSet("rule set is empty".to_string()))?;

    if first.min() != 0 {
        return Err(EngineError::InvalidRuleSet(format!(
            "first range must start at 0, starts at {}",
            first.min()
        )));
    }

    for pair in rules.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let Some(max) = current.max() else {
            return Err(EngineError::InvalidRuleSet(format!(
                "unbounded range starting at {} is not the last rule",
                current.min()
            )));
        };
        if max < current.min() {
            return Err(EngineError::InvalidRuleSet(format!(
                "range [{}, {}] is inverted",
                current.min(),
                max
            )));
        }
        if max.checked_add(1) != Some(next.min()) {
            return Err(EngineError::InvalidRuleSet(format!(
                "range after [{}, {}] starts at {}, expected {}",
                current.min(),
                max,
                next.min(),
                i64::from(max) + 1
            )));
        }
    }

    match rules.last().and_then(|rule| rule.max()) {
        None => Ok(()),
        Some(max) => Err(EngineError::InvalidRuleSet(format!(
            "last range ends at {}, must be unbounded",
            max
        ))),
    }
}

/// Parses an authored JSON rule table and rejects it unless it covers every
/// rating difference.
pub fn parse_rule_set(json: &str) -> Result<Vec<DeltaRule>> {
    let rules: Vec<DeltaRule> =
        serde_json::from_str(json).context("Failed to parse delta rule set")?;
    validate_rule_set(&rules)?;
    Ok(rules)
}

pub fn default_winner_rules() -> Vec<DeltaRule> {
    vec![
        DeltaRule::new(0, Some(50), 25, 25),
        DeltaRule::new(51, Some(100), 20, 30),
        DeltaRule::new(101, Some(200), 15, 35),
        DeltaRule::new(201, None, 10, 40),
    ]
}

pub fn default_loser_rules() -> Vec<DeltaRule> {
    vec![
        DeltaRule::new(0, Some(50), -25, -25),
        DeltaRule::new(51, Some(100), -30, -20),
        DeltaRule::new(101, Some(200), -35, -15),
        DeltaRule::new(201, None, -40, -10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_are_inclusive() {
        let rules = default_winner_rules();

        assert_eq!(find_rule(&rules, 200, RuleSide::Winner).unwrap().min(), 101);
        assert_eq!(find_rule(&rules, 201, RuleSide::Winner).unwrap().min(), 201);
        assert_eq!(find_rule(&rules, 0, RuleSide::Winner).unwrap().min(), 0);
        assert_eq!(find_rule(&rules, 50, RuleSide::Winner).unwrap().min(), 0);
        assert_eq!(find_rule(&rules, 5000, RuleSide::Winner).unwrap().min(), 201);
    }

    #[test]
    fn test_uncovered_delta_fails() {
        let rules = vec![DeltaRule::new(0, Some(100), 10, 10)];
        assert_eq!(
            find_rule(&rules, 150, RuleSide::Loser).unwrap_err(),
            EngineError::NoMatchingRule { side: RuleSide::Loser, delta: 150 }
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_rule_set(&default_winner_rules()).is_ok());
        assert!(validate_rule_set(&default_loser_rules()).is_ok());
    }

    #[test]
    fn test_validation_rejects_gaps_overlaps_and_bounds() {
        let gap = vec![
            DeltaRule::new(0, Some(50), 1, 1),
            DeltaRule::new(52, None, 1, 1),
        ];
        let overlap = vec![
            DeltaRule::new(0, Some(50), 1, 1),
            DeltaRule::new(50, None, 1, 1),
        ];
        let bounded = vec![DeltaRule::new(0, Some(50), 1, 1)];
        let late_start = vec![DeltaRule::new(10, None, 1, 1)];
        let early_unbounded = vec![
            DeltaRule::new(0, None, 1, 1),
            DeltaRule::new(51, None, 1, 1),
        ];
        let past_max = vec![
            DeltaRule::new(0, Some(i32::MAX), 1, 1),
            DeltaRule::new(i32::MIN, None, 1, 1),
        ];

        for rules in [gap, overlap, bounded, late_start, early_unbounded, past_max, vec![]] {
            assert!(matches!(
                validate_rule_set(&rules),
                Err(EngineError::InvalidRuleSet(_))
            ));
        }
    }

    #[test]
    fn test_parse_rule_set_from_json() {
        let json = r#"[
            {"range": [0, 100], "strong": 10, "weak": 20},
            {"range": [101, null], "strong": 5, "weak": 30}
        ]"#;
        let rules = parse_rule_set(json).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1], DeltaRule::new(101, None, 5, 30));
    }

    #[test]
    fn test_parse_rule_set_rejects_gap() {
        let json = r#"[{"range": [0, 100], "strong": 10, "weak": 20}]"#;
        assert!(parse_rule_set(json).is_err());
    }
}
