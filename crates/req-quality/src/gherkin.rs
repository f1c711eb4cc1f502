//! Gherkin structure validation.
//!
//! A scenario must carry at least one GIVEN, WHEN, and THEN step, and its
//! THEN steps must be concrete enough to test. These are hard violations.

use req_core::entities::GherkinScenario;

/// THEN-step words that usually mean the outcome is not observable.
const WEAK_THEN_WORDS: &[&str] = &[
    "work",
    "handle",
    "support",
    "appropriate",
    "user-friendly",
    "fast",
    "easily",
];

/// Validate a single scenario. Returns the list of violations, empty when
/// the scenario is structurally sound.
#[must_use]
pub fn validate_scenario(scenario: &GherkinScenario) -> Vec<String> {
    let mut violations = Vec::new();
    let id = &scenario.scenario_id;

    if scenario.given.is_empty() {
        violations.push(format!("{id}: missing GIVEN step(s)."));
    }
    if scenario.when.is_empty() {
        violations.push(format!("{id}: missing WHEN step(s)."));
    }
    if scenario.then.is_empty() {
        violations.push(format!("{id}: missing THEN step(s)."));
    }

    for then in &scenario.then {
        let lower = then.to_lowercase();
        if WEAK_THEN_WORDS.iter().any(|w| lower.contains(w)) {
            violations.push(format!("{id}: THEN may be non-testable/vague: '{then}'."));
        }
    }

    violations
}

/// Validate every scenario. Returns `(all_valid, violations)`.
#[must_use]
pub fn validate_all(scenarios: &[GherkinScenario]) -> (bool, Vec<String>) {
    let violations: Vec<String> = scenarios.iter().flat_map(validate_scenario).collect();
    (violations.is_empty(), violations)
}
