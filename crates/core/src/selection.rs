//! Preference-form selection state.
//!
//! Owns the mode radio and the chosen-theatre set, and provides the pure
//! helpers the UI renders from: row view-models, the summary label, the
//! search filter, and the chosen-first reordering applied after a saved
//! preference is loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AlertMode, PreferenceRecord, TheatreRow};

/// Summary label shown when nothing is chosen.
pub const SUMMARY_PLACEHOLDER: &str = "Choose theatres";

/// Validation failures surfaced to the user before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The movie-name field is empty.
    #[error("Please enter a movie name")]
    EmptyMovieName,
    /// Preferred mode with nothing chosen.
    #[error("Please select at least one theatre")]
    NoTheatresChosen,
}

/// In-memory selection state for the preference form.
///
/// `chosen` preserves selection order and never contains duplicates;
/// toggling the mode leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    mode: AlertMode,
    chosen: Vec<String>,
}

impl Selection {
    /// Current alert mode.
    pub fn mode(&self) -> AlertMode {
        self.mode
    }

    /// Switch the alert mode. Idempotent and side-effect free on the
    /// chosen set.
    pub fn set_mode(&mut self, mode: AlertMode) {
        self.mode = mode;
    }

    /// Whether the chosen-set editor should be visible.
    pub fn editor_visible(&self) -> bool {
        self.mode.is_preferred()
    }

    /// Chosen theatre names in selection order.
    pub fn chosen(&self) -> &[String] {
        &self.chosen
    }

    /// True when the given row is in the chosen set.
    pub fn is_chosen(&self, name: &str) -> bool {
        self.chosen.iter().any(|entry| entry == name)
    }

    /// Flip a row's checkbox.
    pub fn toggle(&mut self, name: &str) {
        if let Some(pos) = self.chosen.iter().position(|entry| entry == name) {
            self.chosen.remove(pos);
        } else {
            self.chosen.push(name.to_string());
        }
    }

    /// Summary label for the chosen set: placeholder when empty, the sole
    /// name for one entry, `"<first> +<N-1>"` otherwise.
    pub fn summary_label(&self) -> String {
        match self.chosen.as_slice() {
            [] => SUMMARY_PLACEHOLDER.to_string(),
            [only] => only.clone(),
            [first, rest @ ..] => format!("{first} +{}", rest.len()),
        }
    }

    /// Restore the form defaults: any-theatre mode, nothing chosen.
    pub fn reset(&mut self) {
        self.mode = AlertMode::default();
        self.chosen.clear();
    }

    /// Check the state is submittable for the given movie name.
    pub fn validate(&self, movie_name: &str) -> Result<(), ValidationError> {
        if movie_name.trim().is_empty() {
            return Err(ValidationError::EmptyMovieName);
        }
        if self.mode.is_preferred() && self.chosen.is_empty() {
            return Err(ValidationError::NoTheatresChosen);
        }
        Ok(())
    }

    /// Overwrite the state with a fetched preference record.
    ///
    /// The form is reset to defaults first, then the fetched mode is
    /// applied. In preferred mode the chosen set is rebuilt from `names`
    /// (the catalog rows), matching saved entries trimmed and
    /// case-insensitively; saved names absent from the catalog are
    /// dropped. In any-theatre mode the chosen set stays empty.
    pub fn apply_record(&mut self, record: &PreferenceRecord, names: &[String]) {
        self.reset();
        self.mode = record.mode;
        if !record.mode.is_preferred() {
            return;
        }

        let saved: Vec<String> = record
            .chosen
            .iter()
            .map(|entry| entry.trim().to_lowercase())
            .collect();
        self.chosen = names
            .iter()
            .filter(|name| saved.contains(&name.trim().to_lowercase()))
            .cloned()
            .collect();
    }
}

/// Render catalog rows into checkbox view-models, insertion order
/// preserved.
pub fn render_rows(names: &[String], selection: &Selection) -> Vec<TheatreRow> {
    names
        .iter()
        .map(|name| TheatreRow {
            name: name.clone(),
            checked: selection.is_chosen(name),
        })
        .collect()
}

/// Stable chosen-first partition of the catalog rows: chosen rows keep
/// their relative order and move ahead of the rest, which also keep
/// theirs.
pub fn reorder_chosen_first(names: &[String], selection: &Selection) -> Vec<String> {
    let (chosen, others): (Vec<String>, Vec<String>) = names
        .iter()
        .cloned()
        .partition(|name| selection.is_chosen(name));
    let mut ordered = chosen;
    ordered.extend(others);
    ordered
}

/// Case-insensitive substring match used by the search box.
pub fn row_matches(name: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn summary_label_matches_the_documented_formats() {
        let mut selection = Selection::default();
        assert_eq!(selection.summary_label(), "Choose theatres");

        selection.toggle("A");
        assert_eq!(selection.summary_label(), "A");

        selection.toggle("B");
        selection.toggle("C");
        assert_eq!(selection.summary_label(), "A +2");
    }

    #[test]
    fn toggling_mode_preserves_the_chosen_set() {
        let mut selection = Selection::default();
        selection.set_mode(AlertMode::Preferred);
        selection.toggle("A");
        selection.toggle("B");

        selection.set_mode(AlertMode::Any);
        assert!(!selection.editor_visible());
        selection.set_mode(AlertMode::Preferred);
        assert_eq!(selection.chosen(), &names(&["A", "B"])[..]);
    }

    #[test]
    fn toggle_removes_an_already_chosen_row() {
        let mut selection = Selection::default();
        selection.toggle("A");
        selection.toggle("B");
        selection.toggle("A");
        assert_eq!(selection.chosen(), &names(&["B"])[..]);
    }

    #[test]
    fn validation_rejects_preferred_mode_with_nothing_chosen() {
        let mut selection = Selection::default();
        assert_eq!(
            selection.validate(""),
            Err(ValidationError::EmptyMovieName)
        );
        assert_eq!(
            selection.validate("   "),
            Err(ValidationError::EmptyMovieName)
        );

        selection.set_mode(AlertMode::Preferred);
        assert_eq!(
            selection.validate("Dune"),
            Err(ValidationError::NoTheatresChosen)
        );

        selection.toggle("A");
        assert_eq!(selection.validate("Dune"), Ok(()));

        let empty = Selection::default();
        assert_eq!(empty.validate("Dune"), Ok(()));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut selection = Selection::default();
        selection.set_mode(AlertMode::Preferred);
        selection.toggle("A");
        selection.reset();
        assert_eq!(selection.mode(), AlertMode::Any);
        assert!(selection.chosen().is_empty());
    }

    #[test]
    fn apply_record_overwrites_earlier_edits() {
        let catalog = names(&["A", "X", "B"]);
        let mut selection = Selection::default();
        selection.set_mode(AlertMode::Preferred);
        selection.toggle("B");

        let record = PreferenceRecord::new(
            "Dune",
            "user@example.com",
            AlertMode::Preferred,
            names(&[" x "]),
        );
        selection.apply_record(&record, &catalog);
        assert_eq!(selection.mode(), AlertMode::Preferred);
        assert_eq!(selection.chosen(), &names(&["X"])[..]);
    }

    #[test]
    fn apply_record_with_any_mode_clears_the_chosen_set() {
        let catalog = names(&["A", "B"]);
        let mut selection = Selection::default();
        selection.set_mode(AlertMode::Preferred);
        selection.toggle("A");

        let record =
            PreferenceRecord::new("Dune", "user@example.com", AlertMode::Any, Vec::new());
        selection.apply_record(&record, &catalog);
        assert_eq!(selection.mode(), AlertMode::Any);
        assert!(selection.chosen().is_empty());
    }

    #[test]
    fn reorder_puts_chosen_rows_first_and_keeps_relative_order() {
        let catalog = names(&["A", "X", "B"]);
        let mut selection = Selection::default();
        selection.toggle("X");
        assert_eq!(
            reorder_chosen_first(&catalog, &selection),
            names(&["X", "A", "B"])
        );

        let catalog = names(&["A", "B", "C", "D"]);
        let mut selection = Selection::default();
        selection.toggle("D");
        selection.toggle("B");
        assert_eq!(
            reorder_chosen_first(&catalog, &selection),
            names(&["B", "D", "A", "C"])
        );
    }

    #[test]
    fn render_rows_marks_chosen_entries_in_insertion_order() {
        let catalog = names(&["A", "B", "A"]);
        let mut selection = Selection::default();
        selection.toggle("A");

        let rows = render_rows(&catalog, &selection);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "A");
        assert!(rows[0].checked);
        assert!(!rows[1].checked);
        assert!(rows[2].checked);
    }

    #[test]
    fn filter_matches_case_insensitive_substrings() {
        assert!(row_matches("Sangam Cinemas, Chennai", "sangam"));
        assert!(row_matches("Sangam Cinemas, Chennai", "CHENNAI"));
        assert!(row_matches("Sangam Cinemas, Chennai", ""));
        assert!(!row_matches("Sangam Cinemas, Chennai", "mumbai"));
    }
}
