//! Memoized derivations over a shared context and a [`Selection`].

use crate::selection::{
    Dependency, InputValue, Reads, Selection, SelectionChange, SelectionError,
};
use fip_core::Period;
use indexmap::IndexMap;
use std::sync::Arc;

/// A pure compute function: same context and same declared inputs, same output.
pub type Compute<C, V> = Box<dyn Fn(&C, &Reads<'_>) -> anyhow::Result<V> + Send + Sync>;

struct Derivation<C, V> {
    dependencies: Vec<Dependency>,
    compute: Compute<C, V>,
    /// Input values of the last successful run and its result.
    memo: Option<(Vec<InputValue>, Arc<V>)>,
    runs: usize,
}

/// Named derivations over an immutable context `C`, producing values `V`.
///
/// `get` recomputes a derivation only when the values of its declared
/// dependencies differ from those of its last run. Mutations return the
/// names of the derivations whose inputs they changed.
pub struct SelectionStore<C, V> {
    context: Arc<C>,
    selection: Selection,
    derivations: IndexMap<String, Derivation<C, V>>,
}

impl<C, V> SelectionStore<C, V> {
    pub fn new(context: Arc<C>, selection: Selection) -> Self {
        Self {
            context,
            selection,
            derivations: IndexMap::new(),
        }
    }

    /// Register a derivation that may read only `dependencies`.
    ///
    /// Toggle dependencies must name toggles the selection knows.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        dependencies: Vec<Dependency>,
        compute: F,
    ) -> Result<(), SelectionError>
    where
        F: Fn(&C, &Reads<'_>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.derivations.contains_key(&name) {
            return Err(SelectionError::DuplicateDerivation(name));
        }
        for dependency in &dependencies {
            if let Dependency::Toggle(toggle) = dependency {
                if !self.selection.has_toggle(toggle) {
                    return Err(SelectionError::UnknownToggle(toggle.clone()));
                }
            }
        }
        self.derivations.insert(
            name,
            Derivation {
                dependencies,
                compute: Box::new(compute),
                memo: None,
                runs: 0,
            },
        );
        Ok(())
    }

    /// Current value of `name`, recomputed only if its inputs changed.
    ///
    /// A failed computation leaves the previous memo in place and is
    /// retried on the next call.
    pub fn get(&mut self, name: &str) -> anyhow::Result<Arc<V>> {
        let selection = &self.selection;
        let context = &self.context;
        let (_, name, derivation) = self
            .derivations
            .get_full_mut(name)
            .ok_or_else(|| SelectionError::UnknownDerivation(name.to_string()))?;

        let inputs = read_values(selection, &derivation.dependencies);
        if let Some((memo_inputs, value)) = &derivation.memo {
            if *memo_inputs == inputs {
                log::debug!("store: {name} cached");
                return Ok(Arc::clone(value));
            }
        }

        let reads = Reads::new(name, &derivation.dependencies, selection);
        let value = Arc::new((derivation.compute)(&**context, &reads)?);
        derivation.runs += 1;
        derivation.memo = Some((inputs, Arc::clone(&value)));
        let runs = derivation.runs;
        log::debug!("store: {name} recomputed (run {runs})");
        Ok(value)
    }

    pub fn set_period(&mut self, period: Period) -> Result<Vec<String>, SelectionError> {
        self.apply(&[SelectionChange::Period(period)])
    }

    pub fn set_toggle(&mut self, name: &str, value: bool) -> Result<Vec<String>, SelectionError> {
        self.apply(&[SelectionChange::Toggle(name.to_string(), value)])
    }

    /// Apply a batch atomically; returns the derivations it invalidated.
    pub fn apply(&mut self, changes: &[SelectionChange]) -> Result<Vec<String>, SelectionError> {
        let changed = self.selection.apply(changes)?;
        let invalidated: Vec<String> = self
            .derivations
            .iter()
            .filter(|(_, d)| d.dependencies.iter().any(|dep| changed.contains(dep)))
            .map(|(name, _)| name.clone())
            .collect();
        if !changed.is_empty() {
            let (inputs, derivations) = (changed.len(), invalidated.len());
            log::debug!("store: {inputs} input(s) changed, {derivations} derivation(s) invalidated");
        }
        Ok(invalidated)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// How many times `name` has actually been computed.
    pub fn runs(&self, name: &str) -> Option<usize> {
        self.derivations.get(name).map(|d| d.runs)
    }
}

fn read_values(selection: &Selection, dependencies: &[Dependency]) -> Vec<InputValue> {
    dependencies.iter().map(|d| selection.value_of(d)).collect()
}
