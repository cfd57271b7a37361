use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);

/// A catalog match offered while the user is typing. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub year: String,
    pub external_id: String,
}

/// Which list a candidate should land on when the user picks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListIntent {
    Watched,
    WantToWatch,
}

impl ListIntent {
    /// Resolves to the `(watched, want_to_watch)` flag pair stored by the list service.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Watched => (true, false),
            Self::WantToWatch => (false, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Unseen,
    Watched,
    WantToWatch,
}

impl WatchStatus {
    /// Collapses the two independent flags. `watched` wins when both are set.
    pub fn from_flags(watched: bool, want_to_watch: bool) -> Self {
        match (watched, want_to_watch) {
            (true, _) => Self::Watched,
            (false, true) => Self::WantToWatch,
            (false, false) => Self::Unseen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub want_to_watch: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub review: String,
}

impl TrackedMovie {
    pub fn status(&self) -> WatchStatus {
        WatchStatus::from_flags(self.watched, self.want_to_watch)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.watched && self.want_to_watch
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_resolves_to_exclusive_flags() {
        assert_eq!(ListIntent::Watched.flags(), (true, false));
        assert_eq!(ListIntent::WantToWatch.flags(), (false, true));
    }

    #[test]
    fn watched_flag_wins_when_both_are_set() {
        assert_eq!(WatchStatus::from_flags(true, true), WatchStatus::Watched);
        assert_eq!(WatchStatus::from_flags(false, true), WatchStatus::WantToWatch);
        assert_eq!(WatchStatus::from_flags(false, false), WatchStatus::Unseen);
    }

    #[test]
    fn tracked_movie_accepts_minimal_legacy_shape() {
        let movie: TrackedMovie =
            serde_json::from_str(r#"{"id": 4, "title": "Heat", "watched": true}"#)
                .expect("legacy movie");
        assert_eq!(movie.id, MovieId(4));
        assert!(movie.year.is_empty());
        assert_eq!(movie.rating, None);
        assert_eq!(movie.status(), WatchStatus::Watched);
    }

    #[test]
    fn tracked_movie_treats_null_strings_as_empty() {
        let movie: TrackedMovie = serde_json::from_str(
            r#"{"id": 1, "title": "Alien", "year": "1979", "genres": null,
                "watched": false, "want_to_watch": true, "rating": null, "review": null}"#,
        )
        .expect("movie with nulls");
        assert!(movie.genres.is_empty());
        assert!(movie.review.is_empty());
        assert_eq!(movie.status(), WatchStatus::WantToWatch);
    }
}
