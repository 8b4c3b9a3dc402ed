//! Shared domain and wire models.

use serde::{Deserialize, Deserializer, Serialize};

/// Delimiter used by the datastore for the serialized chosen-theatre set.
pub const CHOSEN_DELIMITER: char = '|';

/// Whether the user wants alerts for any theatre or only specific ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertMode {
    /// Alert for any theatre showing the movie.
    #[default]
    Any,
    /// Alert only for the theatres in the chosen set.
    Preferred,
}

impl AlertMode {
    /// True when the chosen-set editor applies.
    pub fn is_preferred(self) -> bool {
        matches!(self, AlertMode::Preferred)
    }

    /// Map the datastore's boolean flag onto a mode.
    pub fn from_preferred(preferred: bool) -> Self {
        if preferred {
            AlertMode::Preferred
        } else {
            AlertMode::Any
        }
    }

    /// User-facing label for the mode radio.
    pub fn label(self) -> &'static str {
        match self {
            AlertMode::Any => "Any theatre",
            AlertMode::Preferred => "Preferred theatres",
        }
    }
}

/// The persisted `(movie, user) -> (mode, chosen)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    /// Movie the alert applies to.
    pub movie_name: String,
    /// Email of the user owning the preference.
    pub email: String,
    /// Alert mode.
    pub mode: AlertMode,
    /// Chosen theatre names, in selection order. Empty unless `mode` is
    /// `Preferred`.
    pub chosen: Vec<String>,
}

impl PreferenceRecord {
    /// Build a record from the current form state.
    pub fn new(
        movie_name: impl Into<String>,
        email: impl Into<String>,
        mode: AlertMode,
        chosen: Vec<String>,
    ) -> Self {
        Self {
            movie_name: movie_name.into(),
            email: email.into(),
            mode,
            chosen: if mode.is_preferred() { chosen } else { Vec::new() },
        }
    }

    /// Reconstruct a record from a lookup response payload.
    pub fn from_lookup(
        movie_name: impl Into<String>,
        email: impl Into<String>,
        data: &LookupData,
    ) -> Self {
        let mode = AlertMode::from_preferred(data.is_preferred_theatre);
        let chosen = if mode.is_preferred() {
            split_chosen(&data.preferred_theatres)
        } else {
            Vec::new()
        };
        Self {
            movie_name: movie_name.into(),
            email: email.into(),
            mode,
            chosen,
        }
    }

    /// Wire payload for the upsert call.
    pub fn to_upsert(&self) -> UpsertRequest {
        UpsertRequest {
            movie_name: self.movie_name.clone(),
            emails: self.email.clone(),
            is_preferred_theatre: self.mode.is_preferred(),
            preferred_theatres: if self.mode.is_preferred() {
                join_chosen(&self.chosen)
            } else {
                String::new()
            },
        }
    }
}

/// Join chosen theatre names with the datastore delimiter.
pub fn join_chosen(names: &[String]) -> String {
    names.join(&CHOSEN_DELIMITER.to_string())
}

/// Parse a delimiter-joined chosen set, trimming entries and dropping
/// empty segments.
pub fn split_chosen(raw: &str) -> Vec<String> {
    raw.split(CHOSEN_DELIMITER)
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

/// Upsert request body, using the datastore's field spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertRequest {
    /// Movie the preference is keyed on.
    #[serde(rename = "Movie_name")]
    pub movie_name: String,
    /// User email the preference is keyed on.
    #[serde(rename = "Emails")]
    pub emails: String,
    /// Whether the chosen set applies.
    #[serde(rename = "isPreferredTheatre")]
    pub is_preferred_theatre: bool,
    /// Delimiter-joined chosen set; empty when the mode is "any".
    #[serde(rename = "preferredTheatres")]
    pub preferred_theatres: String,
}

/// Upsert response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertResponse {
    /// Server status tag.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable message shown to the user.
    #[serde(default)]
    pub message: Option<String>,
}

/// Lookup response envelope. A `status` other than `"exists"` means no
/// record is stored for the key.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    /// Server status tag, `"exists"` when a record was found.
    #[serde(default)]
    pub status: String,
    /// Record payload, present when `status` is `"exists"`.
    #[serde(default)]
    pub data: Option<LookupData>,
}

/// Stored preference as returned by a lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupData {
    /// Mode flag; tolerated as a boolean or a `"true"`/`"false"` string.
    #[serde(
        rename = "isPreferredTheatre",
        default,
        deserialize_with = "bool_or_string"
    )]
    pub is_preferred_theatre: bool,
    /// Delimiter-joined chosen set.
    #[serde(rename = "preferredTheatres", default)]
    pub preferred_theatres: String,
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => Ok(text.trim().eq_ignore_ascii_case("true")),
    }
}

/// View-model for a single theatre checkbox row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreRow {
    /// Display name of the theatre.
    pub name: String,
    /// Whether the row's checkbox is ticked.
    pub checked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chosen_set_round_trips_through_the_wire_format() {
        let chosen = vec!["A".to_string(), "B".to_string()];
        let joined = join_chosen(&chosen);
        assert_eq!(joined, "A|B");
        assert_eq!(split_chosen(&joined), chosen);

        let reversed = vec!["B".to_string(), "A".to_string()];
        assert_eq!(split_chosen(&join_chosen(&reversed)), reversed);
    }

    #[test]
    fn split_trims_and_drops_empty_segments() {
        assert_eq!(
            split_chosen(" A | B ||C "),
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert!(split_chosen("").is_empty());
        assert!(split_chosen(" | ").is_empty());
    }

    #[test]
    fn upsert_payload_uses_datastore_field_names() {
        let record = PreferenceRecord::new(
            "Dune",
            "user@example.com",
            AlertMode::Preferred,
            vec!["A".to_string(), "B".to_string()],
        );
        let value = serde_json::to_value(record.to_upsert()).unwrap();
        assert_eq!(
            value,
            json!({
                "Movie_name": "Dune",
                "Emails": "user@example.com",
                "isPreferredTheatre": true,
                "preferredTheatres": "A|B",
            })
        );
    }

    #[test]
    fn upsert_payload_sends_empty_chosen_for_any_mode() {
        let record = PreferenceRecord::new(
            "Dune",
            "user@example.com",
            AlertMode::Any,
            vec!["ignored".to_string()],
        );
        let upsert = record.to_upsert();
        assert!(!upsert.is_preferred_theatre);
        assert_eq!(upsert.preferred_theatres, "");
    }

    #[test]
    fn lookup_data_tolerates_string_flags() {
        let data: LookupData = serde_json::from_value(json!({
            "isPreferredTheatre": "true",
            "preferredTheatres": "X",
        }))
        .unwrap();
        assert!(data.is_preferred_theatre);

        let data: LookupData = serde_json::from_value(json!({
            "isPreferredTheatre": false,
        }))
        .unwrap();
        assert!(!data.is_preferred_theatre);
        assert_eq!(data.preferred_theatres, "");
    }

    #[test]
    fn record_from_lookup_parses_the_chosen_set() {
        let data = LookupData {
            is_preferred_theatre: true,
            preferred_theatres: "A|B".to_string(),
        };
        let record = PreferenceRecord::from_lookup("Dune", "user@example.com", &data);
        assert_eq!(record.mode, AlertMode::Preferred);
        assert_eq!(record.chosen, vec!["A".to_string(), "B".to_string()]);

        let data = LookupData {
            is_preferred_theatre: false,
            preferred_theatres: "A|B".to_string(),
        };
        let record = PreferenceRecord::from_lookup("Dune", "user@example.com", &data);
        assert_eq!(record.mode, AlertMode::Any);
        assert!(record.chosen.is_empty());
    }
}
