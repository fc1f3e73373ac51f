use crate::error::SubmitError;

// ---------------------------------------------------------------------------
// Selection: target column + algorithm identifier
// ---------------------------------------------------------------------------

/// The user's choice of target column and algorithm.
///
/// Values are stored as given; validity is always judged against the current
/// columns and algorithm catalog, so a target that disappears after a reparse
/// is kept but reported invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    target: Option<String>,
    algorithm: Option<String>,
}

impl Selection {
    /// Set the target column. An empty string clears it.
    pub fn set_target(&mut self, name: impl Into<String>) {
        self.target = non_empty(name.into());
    }

    /// Set the algorithm identifier. An empty string clears it.
    pub fn set_algorithm(&mut self, id: impl Into<String>) {
        self.algorithm = non_empty(id.into());
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// Whether the chosen target is a member of `columns` (false when unset).
    pub fn target_in(&self, columns: &[String]) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| columns.iter().any(|c| c == t))
    }

    pub fn is_valid(&self, columns: &[String], algorithms: &[String]) -> bool {
        self.validate(columns, algorithms).is_ok()
    }

    /// Check both fields, naming the first requirement that fails.
    pub fn validate<'a>(
        &'a self,
        columns: &[String],
        algorithms: &[String],
    ) -> Result<(&'a str, &'a str), SubmitError> {
        let target = match self.target.as_deref() {
            None => return Err(SubmitError::validation("please select a target variable")),
            Some(t) if !columns.iter().any(|c| c == t) => {
                return Err(SubmitError::validation(format!(
                    "target variable '{t}' is not a column of the current dataset"
                )))
            }
            Some(t) => t,
        };

        let algorithm = match self.algorithm.as_deref() {
            None => return Err(SubmitError::validation("please select an algorithm")),
            Some(a) if !algorithms.iter().any(|known| known == a) => {
                return Err(SubmitError::validation(format!(
                    "algorithm '{a}' is not supported"
                )))
            }
            Some(a) => a,
        };

        Ok((target, algorithm))
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_only_with_known_target_and_algorithm() {
        let columns = strings(&["a", "b", "target"]);
        let algos = strings(&["Random Forest", "Decision Tree"]);
        let mut sel = Selection::default();
        assert!(!sel.is_valid(&columns, &algos));

        sel.set_target("target");
        assert!(!sel.is_valid(&columns, &algos));

        sel.set_algorithm("Random Forest");
        assert!(sel.is_valid(&columns, &algos));
        assert_eq!(sel.validate(&columns, &algos).unwrap(), ("target", "Random Forest"));
    }

    #[test]
    fn empty_strings_clear_fields() {
        let mut sel = Selection::default();
        sel.set_target("a");
        sel.set_target("");
        sel.set_algorithm("   ");
        assert_eq!(sel.target(), None);
        assert_eq!(sel.algorithm(), None);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let mut sel = Selection::default();
        sel.set_target("a");
        sel.set_algorithm("K-Nearest Neighbours");
        let err = sel.validate(&strings(&["a"]), &strings(&["Random Forest"])).unwrap_err();
        assert!(matches!(err, SubmitError::Validation { .. }));
    }

    #[test]
    fn target_survives_schema_change_but_becomes_invalid() {
        let algos = strings(&["Random Forest"]);
        let mut sel = Selection::default();
        sel.set_target("label");
        sel.set_algorithm("Random Forest");
        assert!(sel.is_valid(&strings(&["x", "label"]), &algos));

        let new_columns = strings(&["x", "y"]);
        assert!(!sel.is_valid(&new_columns, &algos));
        assert!(!sel.target_in(&new_columns));
        assert_eq!(sel.target(), Some("label"));
    }

    #[test]
    fn missing_target_message_names_the_field() {
        let err = Selection::default()
            .validate(&strings(&["a"]), &strings(&["Random Forest"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "please select a target variable");
    }
}
