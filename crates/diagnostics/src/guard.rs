//! Usage guard enforcing statistical legality of variable usage.
//!
//! Prevents non-stationary series from entering analyses that require
//! I(0) inputs (PCA, clustering, regressions, regime inference). The
//! guard reads the persisted classification table through an injected
//! [`ClassificationSource`] and holds no state of its own: a successful
//! check has no observable effect, a failed check is the one hard stop
//! in the system.

use regime_lab_data::classification::ClassificationSource;
use regime_lab_data::models::Transform;
use thiserror::Error;

/// Aggregated policy violations from one guard check.
///
/// Every violating variable is reported, not just the first, so a caller
/// can fix all inputs at once.
#[derive(Debug, Error)]
#[error("stationarity guard failed:\n{}", .failures.join("\n"))]
pub struct GuardError {
    /// One reason per violating variable, in request order.
    pub failures: Vec<String>,
}

/// Precondition check against a persisted stationarity classification.
pub struct UsageGuard<'a, S: ClassificationSource> {
    source: &'a S,
    relax_ambiguous: bool,
}

impl<'a, S: ClassificationSource> UsageGuard<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            relax_ambiguous: false,
        }
    }

    /// Accept ambiguous labels as well as the confident stationary one.
    /// Ambiguous classifications fail the guard unless relaxed here.
    #[must_use]
    pub fn relax_ambiguous(mut self, relax: bool) -> Self {
        self.relax_ambiguous = relax;
        self
    }

    /// Checks that every requested variable is classified stationary
    /// under `required_form`.
    ///
    /// # Errors
    /// Returns a [`GuardError`] naming every variable that is missing
    /// from the table or fails the required integration order. The check
    /// never short-circuits.
    pub fn check<I, T>(&self, variables: I, required_form: Transform) -> Result<(), GuardError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut failures = Vec::new();

        for variable in variables {
            let name = variable.as_ref();
            match self.source.classification(name, required_form) {
                None => {
                    failures.push(format!("{name}: not found in classification table"));
                }
                Some(record) => {
                    let allowed = record.label.is_stationary()
                        || (self.relax_ambiguous && record.label.is_ambiguous());
                    if !allowed {
                        let form = match required_form {
                            Transform::Diff => "Δseries",
                            Transform::Level => "level",
                        };
                        failures.push(format!("{name}: {form} not stationary"));
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GuardError { failures })
        }
    }
}
