use std::sync::Arc;

use shared::{
    domain::{MovieId, TrackedMovie, WatchStatus},
    protocol::{MovieUpdate, NewMovie},
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{
    error::StoreError,
    list_store::ListStore,
    search::Selection,
    session::{Navigation, SessionService},
};

/// Local mirror of the user's tracked movies and the parent of the search
/// controller: selections coming out of search end up here.
pub struct Dashboard {
    store: Arc<dyn ListStore>,
    session: Arc<dyn SessionService>,
    movies: Vec<TrackedMovie>,
    loading: bool,
}

impl Dashboard {
    pub fn new(store: Arc<dyn ListStore>, session: Arc<dyn SessionService>) -> Self {
        Self {
            store,
            session,
            movies: Vec::new(),
            loading: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn movies(&self) -> &[TrackedMovie] {
        &self.movies
    }

    pub fn watched(&self) -> impl Iterator<Item = &TrackedMovie> {
        self.movies.iter().filter(|movie| movie.watched)
    }

    pub fn want_to_watch(&self) -> impl Iterator<Item = &TrackedMovie> {
        self.movies.iter().filter(|movie| movie.want_to_watch)
    }

    /// Quick-added titles that are on neither list yet.
    pub fn unsorted(&self) -> impl Iterator<Item = &TrackedMovie> {
        self.movies
            .iter()
            .filter(|movie| movie.status() == WatchStatus::Unseen)
    }

    /// Initial load when the dashboard opens. An expired or missing session
    /// sends the user to sign in instead of surfacing an error.
    pub async fn enter(&mut self) -> Result<Navigation, StoreError> {
        match self.load().await {
            Ok(()) => Ok(Navigation::Dashboard),
            Err(err) if err.requires_reauth() => Ok(Navigation::Login),
            Err(err) => Err(err),
        }
    }

    /// Loading ends whether or not the fetch succeeds; a failed fetch leaves
    /// the list empty.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        let result = self.store.list().await;
        self.loading = false;
        match result {
            Ok(movies) => {
                let ambiguous = movies.iter().filter(|m| m.is_ambiguous()).count();
                if ambiguous > 0 {
                    warn!(ambiguous, "movies flagged both watched and want-to-watch");
                }
                info!(count = movies.len(), "tracked movies loaded");
                self.movies = movies;
                Ok(())
            }
            Err(err) => {
                error!(%err, "failed to fetch tracked movies");
                self.movies.clear();
                Err(err)
            }
        }
    }

    pub async fn add_selection(&mut self, selection: &Selection) -> Result<TrackedMovie, StoreError> {
        let movie = NewMovie::from_candidate(&selection.candidate, selection.intent());
        self.add(movie).await
    }

    pub async fn add_title(&mut self, title: &str) -> Result<TrackedMovie, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("movie title is required".to_string()));
        }
        self.add(NewMovie::titled(title)).await
    }

    async fn add(&mut self, movie: NewMovie) -> Result<TrackedMovie, StoreError> {
        let created = self.store.create(&movie).await?;
        self.movies.push(created.clone());
        Ok(created)
    }

    pub async fn mark_as_watched(&mut self, id: MovieId) -> Result<(), StoreError> {
        let updated = self.store.update(id, &MovieUpdate::mark_watched()).await?;
        match self.movies.iter_mut().find(|movie| movie.id == updated.id) {
            Some(local) => {
                local.watched = updated.watched;
                local.want_to_watch = updated.want_to_watch;
            }
            None => warn!(movie_id = id.0, "updated movie is not in the local list"),
        }
        Ok(())
    }

    pub async fn update_review(
        &mut self,
        id: MovieId,
        rating: Option<f64>,
        review: Option<String>,
    ) -> Result<(), StoreError> {
        if let Some(rating) = rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(StoreError::Validation(format!(
                    "rating {rating} is outside 0..=10"
                )));
            }
        }
        let updated = self
            .store
            .update(id, &MovieUpdate::review(rating, review))
            .await?;
        if let Some(local) = self.movies.iter_mut().find(|movie| movie.id == updated.id) {
            local.rating = updated.rating;
            local.review = updated.review;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: MovieId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        self.movies.retain(|movie| movie.id != id);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<Navigation, StoreError> {
        let navigation = self.session.logout().await?;
        self.movies.clear();
        Ok(navigation)
    }

    /// Adds every selection the search controller queues until the
    /// controller goes away. Failures are logged and skipped.
    pub async fn run_selection_loop(&mut self, mut selections: mpsc::UnboundedReceiver<Selection>) {
        while let Some(selection) = selections.recv().await {
            if let Err(err) = self.add_selection(&selection).await {
                error!(
                    %err,
                    title = %selection.candidate.title,
                    "failed to add selected movie"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
