// Threshold classification of values into display categories
use serde::Deserialize;

/// A named display bucket with its chart color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Half-open range `[lower, upper)`; a missing bound is unbounded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdRule {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
    pub category: Category,
}

impl ThresholdRule {
    pub fn new(lower: Option<f64>, upper: Option<f64>, category: Category) -> Self {
        Self {
            lower,
            upper,
            category,
        }
    }

    fn matches(&self, value: f64) -> bool {
        let above = self.lower.is_none_or(|lower| value >= lower);
        let below = self.upper.is_none_or(|upper| value < upper);
        above && below
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<ThresholdRule>,
    pub default: Category,
}

impl RuleSet {
    pub fn new(rules: Vec<ThresholdRule>, default: Category) -> Self {
        Self { rules, default }
    }

    /// Temperature buckets used by the indoor temperature chart.
    pub fn temperature() -> Self {
        let cold = Category::new("cold", "rgba(88, 166, 245, 0.2)");
        let normal = Category::new("normal", "rgba(7, 219, 24, 0.2)");
        let warm = Category::new("warm", "rgba(250, 209, 7, 0.2)");
        let critical = Category::new("critical", "rgba(245, 15, 15, 0.2)");

        Self::new(
            vec![
                ThresholdRule::new(None, Some(16.0), cold),
                ThresholdRule::new(Some(16.0), Some(28.0), normal.clone()),
                ThresholdRule::new(Some(28.0), Some(35.0), warm),
                ThresholdRule::new(Some(35.0), None, critical),
            ],
            normal,
        )
    }
}

/// Map a value to its display category.
pub fn classify(value: f64, rules: &RuleSet) -> &Category {
    rules
        .rules
        .iter()
        .find(|rule| rule.matches(value))
        .map(|rule| &rule.category)
        .unwrap_or(&rules.default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_boundaries() {
        let rules = RuleSet::temperature();
        let cases = [
            (15.9, "cold"),
            (16.0, "normal"),
            (27.9, "normal"),
            (28.0, "warm"),
            (34.9, "warm"),
            (35.0, "critical"),
            (-40.0, "cold"),
            (120.0, "critical"),
        ];

        for (value, expected) in cases {
            assert_eq!(classify(value, &rules).name, expected, "value {}", value);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let rules = RuleSet::new(
            vec![
                ThresholdRule::new(None, Some(10.0), Category::new("first", "red")),
                ThresholdRule::new(None, Some(20.0), Category::new("second", "blue")),
            ],
            Category::new("fallback", "grey"),
        );

        assert_eq!(classify(5.0, &rules).name, "first");
        assert_eq!(classify(15.0, &rules).name, "second");
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let rules = RuleSet::new(
            vec![ThresholdRule::new(Some(0.0), Some(1.0), Category::new("unit", "red"))],
            Category::new("normal", "green"),
        );

        assert_eq!(classify(2.0, &rules).name, "normal");
        assert_eq!(classify(f64::NAN, &rules).name, "normal");
        assert_eq!(classify(f64::NAN, &RuleSet::temperature()).name, "normal");
    }
}
