use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::data::character::{load_character_file, CharacterFile, COMMON_POWERS_PER_CHARACTER};
use crate::data::power::{load_power_file, PowerFile, PowerKind, MAX_POWER_LEVEL};
use crate::error::DataError;
use crate::powers::normalize_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Loads both definition files and reports every problem found instead of
/// stopping at the first one.
pub fn validate_dataset(
    powers_path: impl AsRef<Path>,
    characters_path: impl AsRef<Path>,
) -> Result<ValidationReport, DataError> {
    let powers = load_power_file(powers_path)?;
    let characters = load_character_file(characters_path)?;
    let report = validate_records(&powers, &characters);
    for diag in report
        .diagnostics
        .iter()
        .filter(|diag| diag.severity != ValidationSeverity::Info)
    {
        warn!(severity = %diag.severity, context = %diag.context, "{}", diag.message);
    }
    Ok(report)
}

pub fn validate_records(powers: &PowerFile, characters: &CharacterFile) -> ValidationReport {
    let mut report = ValidationReport::default();
    let kinds = validate_powers(&mut report, powers);
    validate_characters(&mut report, characters, &kinds);
    report.push(
        ValidationSeverity::Info,
        "dataset",
        format!(
            "{} powers, {} characters",
            powers.powers.len(),
            characters.characters.len()
        ),
    );
    report
}

fn validate_powers(report: &mut ValidationReport, file: &PowerFile) -> HashMap<String, PowerKind> {
    let mut kinds = HashMap::new();
    for (index, record) in file.powers.iter().enumerate() {
        let context = format!("powers[{index}] name='{}'", record.name);
        if record.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, context, "missing non-empty 'name'");
            continue;
        }
        if kinds.insert(normalize_key(&record.name), record.kind).is_some() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                format!("duplicate power '{}'", record.name),
            );
        }

        if record.kind == PowerKind::Special && record.levels.len() != usize::from(MAX_POWER_LEVEL) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.levels"),
                format!(
                    "special power defines {} levels; expected {MAX_POWER_LEVEL}",
                    record.levels.len()
                ),
            );
        }

        for level in &record.levels {
            if level.effects.is_empty() {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.level[{}]", level.level),
                    "level has no structured effects",
                );
            }
            for (effect_index, effect) in level.effects.iter().enumerate() {
                if let Err(err) = effect.resolve() {
                    report.push(
                        ValidationSeverity::Error,
                        format!("{context}.level[{}].effects[{effect_index}]", level.level),
                        err.to_string(),
                    );
                }
            }
        }

        if let Err(err) = record.resolve() {
            // Effect-level failures are already reported above.
            if record.levels.iter().all(|level| level.effects.iter().all(|e| e.resolve().is_ok())) {
                report.push(ValidationSeverity::Error, context, err.to_string());
            }
        }
    }
    kinds
}

fn validate_characters(
    report: &mut ValidationReport,
    file: &CharacterFile,
    kinds: &HashMap<String, PowerKind>,
) {
    let mut seen_ids = HashSet::new();
    for (index, record) in file.characters.iter().enumerate() {
        let context = format!("characters[{index}] id='{}'", record.id);
        if record.id.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "missing non-empty 'id'");
        } else if !seen_ids.insert(record.id.clone()) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.id"),
                format!("duplicate id '{}'", record.id),
            );
        }
        if record.name.trim().is_empty() {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.name"),
                "missing name; the id is used instead",
            );
        }
        if record.common_powers.len() != COMMON_POWERS_PER_CHARACTER {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.common_powers"),
                format!(
                    "expected {COMMON_POWERS_PER_CHARACTER} common powers, found {}",
                    record.common_powers.len()
                ),
            );
        }

        let refs = std::iter::once((&record.special_power, PowerKind::Special))
            .chain(record.common_powers.iter().map(|power| (power, PowerKind::Common)));
        for (power, expected_kind) in refs {
            match kinds.get(&normalize_key(&power.name)) {
                None => report.push(
                    ValidationSeverity::Error,
                    format!("{context}.powers"),
                    format!("unknown power '{}'", power.name),
                ),
                Some(kind) if *kind != expected_kind => report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.powers"),
                    format!("power '{}' is {kind:?} but equipped as {expected_kind:?}", power.name),
                ),
                Some(_) => {}
            }
        }

        if let Err(err) = record.resolve() {
            if record.common_powers.len() == COMMON_POWERS_PER_CHARACTER {
                report.push(ValidationSeverity::Error, context, err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POWERS: &str = r#"
powers:
  - name: Marksman
    levels:
      - level: 1
        effects:
          - { type: dice_addition, green: 1, when: attacking }
      - level: 2
        effects: []
  - name: Marksman
    levels: []
  - name: Dark Blessing
    kind: special
    levels:
      - level: 1
        effects:
          - { type: levitation }
"#;

    const CHARACTERS: &str = r#"
characters:
  - id: rasputin
    name: Rasputin
    special_power: { name: Dark Blessing }
    common_powers:
      - { name: Marksman }
  - id: rasputin
    name: Rasputin Again
    special_power: { name: Unknown Gift }
    common_powers:
      - { name: Marksman }
      - { name: Dark Blessing }
"#;

    fn report() -> ValidationReport {
        let powers: PowerFile = serde_yaml::from_str(POWERS).unwrap();
        let characters: CharacterFile = serde_yaml::from_str(CHARACTERS).unwrap();
        validate_records(&powers, &characters)
    }

    fn has(report: &ValidationReport, severity: ValidationSeverity, needle: &str) -> bool {
        report
            .diagnostics
            .iter()
            .any(|diag| diag.severity == severity && diag.message.contains(needle))
    }

    #[test]
    fn reports_power_problems() {
        let report = report();
        assert!(report.has_errors());
        assert!(has(&report, ValidationSeverity::Error, "duplicate power 'Marksman'"));
        assert!(has(&report, ValidationSeverity::Error, "special power defines 1 levels"));
        assert!(has(&report, ValidationSeverity::Error, "levitation"));
        assert!(has(&report, ValidationSeverity::Warning, "no structured effects"));
    }

    #[test]
    fn reports_character_problems() {
        let report = report();
        assert!(has(&report, ValidationSeverity::Error, "expected 2 common powers, found 1"));
        assert!(has(&report, ValidationSeverity::Error, "duplicate id 'rasputin'"));
        assert!(has(&report, ValidationSeverity::Error, "unknown power 'Unknown Gift'"));
        assert!(has(&report, ValidationSeverity::Warning, "is Special but equipped as Common"));
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }
}
