//! Selection state and the read-set enforcement used by derivations.

use fip_core::Period;
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("period {0} is not selectable")]
    UnknownPeriod(Period),

    #[error("unknown toggle {0:?}")]
    UnknownToggle(String),

    #[error("no selectable periods")]
    NoPeriods,

    #[error("unknown derivation {0:?}")]
    UnknownDerivation(String),

    #[error("derivation {0:?} is already registered")]
    DuplicateDerivation(String),

    #[error("derivation {derivation:?} read {dependency} without declaring it")]
    UndeclaredRead {
        derivation: String,
        dependency: Dependency,
    },
}

/// An input a derivation can read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    Period,
    Toggle(String),
}

impl Dependency {
    pub fn toggle(name: impl Into<String>) -> Self {
        Dependency::Toggle(name.into())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Period => f.write_str("period"),
            Dependency::Toggle(name) => write!(f, "toggle {name:?}"),
        }
    }
}

/// The value an input holds; `Toggle(None)` for a toggle the selection
/// does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputValue {
    Period(Period),
    Toggle(Option<bool>),
}

/// One requested change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Period(Period),
    Toggle(String, bool),
}

/// The current period and toggle values.
///
/// The selectable periods and the toggle names are fixed at construction;
/// every mutation is checked against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    periods: Vec<Period>,
    period: Period,
    toggles: IndexMap<String, bool>,
}

impl Selection {
    /// Start at the earliest period with the given toggle defaults.
    pub fn new<I, S>(periods: &[Period], toggles: I) -> Result<Selection, SelectionError>
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let mut periods = periods.to_vec();
        periods.sort();
        periods.dedup();
        let period = *periods.first().ok_or(SelectionError::NoPeriods)?;
        Ok(Selection {
            periods,
            period,
            toggles: toggles.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Selectable periods, ascending.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn toggle(&self, name: &str) -> Result<bool, SelectionError> {
        self.toggles
            .get(name)
            .copied()
            .ok_or_else(|| SelectionError::UnknownToggle(name.to_string()))
    }

    /// Toggle names and values, in declaration order.
    pub fn toggles(&self) -> impl Iterator<Item = (&str, bool)> {
        self.toggles.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn has_toggle(&self, name: &str) -> bool {
        self.toggles.contains_key(name)
    }

    /// Check a change without applying it.
    pub fn validate(&self, change: &SelectionChange) -> Result<(), SelectionError> {
        match change {
            SelectionChange::Period(period) => {
                if self.periods.binary_search(period).is_err() {
                    return Err(SelectionError::UnknownPeriod(*period));
                }
            }
            SelectionChange::Toggle(name, _) => {
                if !self.has_toggle(name) {
                    return Err(SelectionError::UnknownToggle(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Validate every change, then apply them all.
    ///
    /// Returns the inputs whose value differs afterwards; a batch that sets
    /// a value and then restores it reports nothing for that input. On error
    /// the selection is untouched.
    pub fn apply(&mut self, changes: &[SelectionChange]) -> Result<Vec<Dependency>, SelectionError> {
        for change in changes {
            self.validate(change)?;
        }
        let before = self.clone();
        for change in changes {
            match change {
                SelectionChange::Period(period) => self.period = *period,
                SelectionChange::Toggle(name, value) => {
                    if let Some(slot) = self.toggles.get_mut(name) {
                        *slot = *value;
                    }
                }
            }
        }

        let mut changed = Vec::new();
        if before.period != self.period {
            changed.push(Dependency::Period);
        }
        for ((name, old), new) in before.toggles.iter().zip(self.toggles.values()) {
            if old != new {
                changed.push(Dependency::Toggle(name.clone()));
            }
        }
        Ok(changed)
    }

    /// Current value of `dependency`.
    pub fn value_of(&self, dependency: &Dependency) -> InputValue {
        match dependency {
            Dependency::Period => InputValue::Period(self.period),
            Dependency::Toggle(name) => InputValue::Toggle(self.toggles.get(name).copied()),
        }
    }
}

/// What a derivation sees of the selection: only the inputs it declared.
#[derive(Debug, Clone, Copy)]
pub struct Reads<'a> {
    derivation: &'a str,
    declared: &'a [Dependency],
    selection: &'a Selection,
}

impl<'a> Reads<'a> {
    pub(crate) fn new(derivation: &'a str, declared: &'a [Dependency], selection: &'a Selection) -> Self {
        Self {
            derivation,
            declared,
            selection,
        }
    }

    pub fn period(&self) -> Result<Period, SelectionError> {
        self.check(&Dependency::Period)?;
        Ok(self.selection.period())
    }

    pub fn toggle(&self, name: &str) -> Result<bool, SelectionError> {
        let dependency = Dependency::toggle(name);
        self.check(&dependency)?;
        self.selection.toggle(name)
    }

    fn check(&self, dependency: &Dependency) -> Result<(), SelectionError> {
        if self.declared.contains(dependency) {
            Ok(())
        } else {
            Err(SelectionError::UndeclaredRead {
                derivation: self.derivation.to_string(),
                dependency: dependency.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        Period::from_date_str(s).unwrap()
    }

    fn selection() -> Selection {
        Selection::new(
            &[p("2019-02"), p("2019-01"), p("2019-03")],
            [("include_lima", true), ("include_personal_loans", false)],
        )
        .unwrap()
    }

    #[test]
    fn starts_at_earliest_period() {
        let selection = selection();
        assert_eq!(selection.period(), p("2019-01"));
        assert_eq!(selection.periods(), [p("2019-01"), p("2019-02"), p("2019-03")]);
        assert!(selection.toggle("include_lima").unwrap());
        assert!(!selection.toggle("include_personal_loans").unwrap());
    }

    #[test]
    fn no_periods_is_an_error() {
        let err = Selection::new(&[], [("include_lima", true)]).unwrap_err();
        assert_eq!(err, SelectionError::NoPeriods);
    }

    #[test]
    fn apply_reports_changed_inputs() {
        let mut selection = selection();
        let changed = selection
            .apply(&[
                SelectionChange::Period(p("2019-03")),
                SelectionChange::Toggle("include_lima".into(), false),
                SelectionChange::Toggle("include_personal_loans".into(), false),
            ])
            .unwrap();
        assert_eq!(changed, vec![Dependency::Period, Dependency::toggle("include_lima")]);
        assert_eq!(selection.period(), p("2019-03"));
    }

    #[test]
    fn restoring_a_value_in_one_batch_changes_nothing() {
        let mut selection = selection();
        let changed = selection
            .apply(&[
                SelectionChange::Toggle("include_lima".into(), false),
                SelectionChange::Toggle("include_lima".into(), true),
            ])
            .unwrap();
        assert!(changed.is_empty());
    }

    #[test]
    fn invalid_batch_is_rejected_whole() {
        let mut selection = selection();
        let before = selection.clone();
        let err = selection
            .apply(&[
                SelectionChange::Toggle("include_lima".into(), false),
                SelectionChange::Period(p("2024-01")),
            ])
            .unwrap_err();
        assert_eq!(err, SelectionError::UnknownPeriod(p("2024-01")));
        assert_eq!(selection, before);

        let err = selection
            .apply(&[SelectionChange::Toggle("include_callao".into(), true)])
            .unwrap_err();
        assert_eq!(err, SelectionError::UnknownToggle("include_callao".into()));
    }

    #[test]
    fn value_of_reports_current_inputs() {
        let mut selection = selection();
        assert_eq!(selection.value_of(&Dependency::Period), InputValue::Period(p("2019-01")));
        assert_eq!(
            selection.value_of(&Dependency::toggle("include_lima")),
            InputValue::Toggle(Some(true))
        );
        assert_eq!(
            selection.value_of(&Dependency::toggle("include_callao")),
            InputValue::Toggle(None)
        );

        selection
            .apply(&[SelectionChange::Toggle("include_lima".into(), false)])
            .unwrap();
        assert_eq!(
            selection.value_of(&Dependency::toggle("include_lima")),
            InputValue::Toggle(Some(false))
        );
    }

    #[test]
    fn reads_enforce_declarations() {
        let selection = selection();
        let declared = [Dependency::Period];
        let reads = Reads::new("sum_loans", &declared, &selection);
        assert_eq!(reads.period().unwrap(), p("2019-01"));

        let err = reads.toggle("include_lima").unwrap_err();
        assert_eq!(
            err,
            SelectionError::UndeclaredRead {
                derivation: "sum_loans".into(),
                dependency: Dependency::toggle("include_lima"),
            }
        );
        assert_eq!(
            err.to_string(),
            "derivation \"sum_loans\" read toggle \"include_lima\" without declaring it"
        );
    }
}
