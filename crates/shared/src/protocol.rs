use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, ListIntent, TrackedMovie};

/// OMDb reports "no matches" as a failed response with this message.
pub const OMDB_NOT_FOUND: &str = "Movie not found!";

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    pub fn is_not_found(&self) -> bool {
        self.error.as_deref() == Some(OMDB_NOT_FOUND)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
}

impl From<OmdbSearchItem> for Candidate {
    fn from(value: OmdbSearchItem) -> Self {
        Self {
            title: value.title,
            year: value.year,
            external_id: value.imdb_id,
        }
    }
}

/// Body of `POST /movies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    pub watched: bool,
    #[serde(default)]
    pub want_to_watch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl NewMovie {
    /// Quick-add form: title only, not yet watched.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            genres: None,
            watched: false,
            want_to_watch: false,
            rating: None,
            review: None,
        }
    }

    pub fn from_candidate(candidate: &Candidate, intent: ListIntent) -> Self {
        let (watched, want_to_watch) = intent.flags();
        Self {
            title: candidate.title.clone(),
            year: Some(candidate.year.clone()),
            genres: None,
            watched,
            want_to_watch,
            rating: None,
            review: Some(String::new()),
        }
    }
}

/// Body of `PUT /movies/{id}`. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub want_to_watch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl MovieUpdate {
    pub fn mark_watched() -> Self {
        Self {
            watched: Some(true),
            want_to_watch: Some(false),
            ..Self::default()
        }
    }

    pub fn review(rating: Option<f64>, review: Option<String>) -> Self {
        Self {
            rating,
            review,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub movie: Option<TrackedMovie>,
}

/// `GET /movies` has answered both wrapped and bare over time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MovieListResponse {
    Wrapped { movies: Vec<TrackedMovie> },
    Bare(Vec<TrackedMovie>),
}

impl MovieListResponse {
    pub fn into_movies(self) -> Vec<TrackedMovie> {
        match self {
            Self::Wrapped { movies } | Self::Bare(movies) => movies,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
