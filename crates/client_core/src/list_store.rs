use async_trait::async_trait;
use shared::{
    domain::{MovieId, TrackedMovie},
    protocol::{MessageResponse, MovieEnvelope, MovieListResponse, MovieUpdate, NewMovie},
};
use tracing::{debug, info};

use crate::{
    error::StoreError,
    transport::{expect_success, ServiceClient},
};

/// CRUD surface of the remote list of tracked movies.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn list(&self) -> Result<Vec<TrackedMovie>, StoreError>;
    async fn create(&self, movie: &NewMovie) -> Result<TrackedMovie, StoreError>;
    async fn update(&self, id: MovieId, update: &MovieUpdate) -> Result<TrackedMovie, StoreError>;
    async fn delete(&self, id: MovieId) -> Result<(), StoreError>;
}

pub struct HttpListStore {
    client: ServiceClient,
}

impl HttpListStore {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    fn movie_path(id: MovieId) -> String {
        format!("movies/{}", id.0)
    }
}

fn envelope_movie(envelope: MovieEnvelope) -> Result<TrackedMovie, StoreError> {
    envelope
        .movie
        .ok_or_else(|| StoreError::InvalidResponse("response carried no movie".to_string()))
}

#[async_trait]
impl ListStore for HttpListStore {
    async fn list(&self) -> Result<Vec<TrackedMovie>, StoreError> {
        let response = self
            .client
            .http()
            .get(self.client.endpoint("movies")?)
            .send()
            .await?;
        let body: MovieListResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let movies = body.into_movies();
        debug!(count = movies.len(), "fetched tracked movies");
        Ok(movies)
    }

    async fn create(&self, movie: &NewMovie) -> Result<TrackedMovie, StoreError> {
        if movie.title.trim().is_empty() {
            return Err(StoreError::Validation("movie title is required".to_string()));
        }
        let response = self
            .client
            .http()
            .post(self.client.endpoint("movies")?)
            .json(movie)
            .send()
            .await?;
        let envelope: MovieEnvelope = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let created = envelope_movie(envelope)?;
        info!(movie_id = created.id.0, title = %created.title, "movie added");
        Ok(created)
    }

    async fn update(&self, id: MovieId, update: &MovieUpdate) -> Result<TrackedMovie, StoreError> {
        if update.is_empty() {
            return Err(StoreError::Validation("update carries no fields".to_string()));
        }
        let response = self
            .client
            .http()
            .put(self.client.endpoint(&Self::movie_path(id))?)
            .json(update)
            .send()
            .await?;
        let envelope: MovieEnvelope = expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let updated = envelope_movie(envelope)?;
        info!(movie_id = id.0, "movie updated");
        Ok(updated)
    }

    async fn delete(&self, id: MovieId) -> Result<(), StoreError> {
        let response = self
            .client
            .http()
            .delete(self.client.endpoint(&Self::movie_path(id))?)
            .send()
            .await?;
        let body: MessageResponse = expect_success(response)
            .await?
            .json()
            .await
            .unwrap_or_default();
        info!(
            movie_id = id.0,
            message = body.message.as_deref().unwrap_or(""),
            "movie deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/list_store_tests.rs"]
mod tests;
