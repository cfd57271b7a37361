use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ApiException;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::session::{HttpSession, Navigation, SessionService};

#[derive(Default)]
struct FakeList {
    next_id: i64,
    movies: Vec<Value>,
    bodies: Vec<Value>,
    bare_list: bool,
    required_cookie: Option<String>,
    logged_out: bool,
}

#[derive(Clone, Default)]
struct ServerState {
    inner: Arc<Mutex<FakeList>>,
}

type Reply = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn authorize(list: &FakeList, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let Some(required) = &list.required_cookie else {
        return Ok(());
    };
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if cookies.split("; ").any(|c| c == required) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        ))
    }
}

async fn list_movies(State(state): State<ServerState>, headers: HeaderMap) -> Reply {
    let list = state.inner.lock().await;
    authorize(&list, &headers)?;
    let movies = Value::Array(list.movies.clone());
    if list.bare_list {
        Ok((StatusCode::OK, Json(movies)))
    } else {
        Ok((StatusCode::OK, Json(json!({ "movies": movies }))))
    }
}

async fn create_movie(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut list = state.inner.lock().await;
    authorize(&list, &headers)?;
    list.bodies.push(body.clone());
    list.next_id += 1;
    let mut movie = body;
    movie["id"] = json!(list.next_id);
    list.movies.push(movie.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Movie added successfully", "movie": movie})),
    ))
}

async fn update_movie(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut list = state.inner.lock().await;
    list.bodies.push(body.clone());
    let Some(movie) = list.movies.iter_mut().find(|m| m["id"] == json!(id)) else {
        return Err((StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"}))));
    };
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            movie[key.as_str()] = value;
        }
    }
    let movie = movie.clone();
    Ok((
        StatusCode::OK,
        Json(json!({"message": "Movie updated successfully", "movie": movie})),
    ))
}

async fn delete_movie(State(state): State<ServerState>, Path(id): Path<i64>) -> Reply {
    let mut list = state.inner.lock().await;
    let before = list.movies.len();
    list.movies.retain(|m| m["id"] != json!(id));
    if list.movies.len() == before {
        return Err((StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"}))));
    }
    Ok((
        StatusCode::OK,
        Json(json!({"message": "Movie deleted successfully"})),
    ))
}

async fn broken_update() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal Server Error"})),
    )
}

async fn logout(State(state): State<ServerState>) -> StatusCode {
    state.inner.lock().await.logged_out = true;
    StatusCode::OK
}

async fn spawn_list_server(list: FakeList) -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState {
        inner: Arc::new(Mutex::new(list)),
    };
    let app = Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", put(update_movie).delete(delete_movie))
        .route("/broken/movies/:id", put(broken_update))
        .route("/logout", post(logout))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn store(base_url: &str, cookie: Option<&str>) -> HttpListStore {
    HttpListStore::new(ServiceClient::new(base_url, cookie).expect("service client"))
}

#[tokio::test]
async fn create_then_list_round_trips_through_service() {
    let (base_url, state) = spawn_list_server(FakeList::default())
        .await
        .expect("spawn server");
    let store = store(&base_url, None);

    let created = store
        .create(&NewMovie::titled("Heat"))
        .await
        .expect("create");
    assert_eq!(created.id, MovieId(1));
    assert_eq!(created.title, "Heat");
    assert!(!created.watched);

    let movies = store.list().await.expect("list");
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Heat");

    let bodies = state.inner.lock().await.bodies.clone();
    assert_eq!(
        bodies[0],
        json!({"title": "Heat", "watched": false, "want_to_watch": false})
    );
}

#[tokio::test]
async fn list_accepts_bare_array_response() {
    let list = FakeList {
        bare_list: true,
        movies: vec![json!({"id": 7, "title": "Ran", "watched": true})],
        ..FakeList::default()
    };
    let (base_url, _state) = spawn_list_server(list).await.expect("spawn server");

    let movies = store(&base_url, None).list().await.expect("list");

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, MovieId(7));
    assert!(movies[0].watched);
}

#[tokio::test]
async fn update_sends_only_provided_fields() {
    let list = FakeList {
        next_id: 3,
        movies: vec![json!({
            "id": 3, "title": "Alien", "year": "1979", "genres": null,
            "watched": false, "want_to_watch": true, "rating": null, "review": ""
        })],
        ..FakeList::default()
    };
    let (base_url, state) = spawn_list_server(list).await.expect("spawn server");

    let updated = store(&base_url, None)
        .update(MovieId(3), &MovieUpdate::mark_watched())
        .await
        .expect("update");

    assert!(updated.watched);
    assert!(!updated.want_to_watch);
    assert_eq!(updated.year, "1979");
    let bodies = state.inner.lock().await.bodies.clone();
    assert_eq!(bodies, vec![json!({"watched": true, "want_to_watch": false})]);
}

#[tokio::test]
async fn empty_update_is_rejected_locally() {
    let (base_url, state) = spawn_list_server(FakeList::default())
        .await
        .expect("spawn server");

    let err = store(&base_url, None)
        .update(MovieId(1), &MovieUpdate::default())
        .await
        .expect_err("must fail");

    assert!(matches!(err, StoreError::Validation(_)));
    assert!(state.inner.lock().await.bodies.is_empty());
}

#[tokio::test]
async fn missing_movie_maps_to_not_found() {
    let (base_url, _state) = spawn_list_server(FakeList::default())
        .await
        .expect("spawn server");
    let store = store(&base_url, None);

    let err = store.delete(MovieId(42)).await.expect_err("must fail");
    assert!(matches!(err, StoreError::NotFound));

    let err = store
        .update(MovieId(42), &MovieUpdate::mark_watched())
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn delete_removes_movie() {
    let list = FakeList {
        movies: vec![json!({"id": 1, "title": "Heat"}), json!({"id": 2, "title": "Ran"})],
        ..FakeList::default()
    };
    let (base_url, state) = spawn_list_server(list).await.expect("spawn server");

    store(&base_url, None)
        .delete(MovieId(1))
        .await
        .expect("delete");

    let remaining = state.inner.lock().await.movies.clone();
    assert_eq!(remaining, vec![json!({"id": 2, "title": "Ran"})]);
}

#[tokio::test]
async fn server_error_body_is_surfaced() {
    let (base_url, _state) = spawn_list_server(FakeList::default())
        .await
        .expect("spawn server");

    let err = store(&format!("{base_url}/broken"), None)
        .update(MovieId(1), &MovieUpdate::mark_watched())
        .await
        .expect_err("must fail");

    match err {
        StoreError::Api(ApiException {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn session_cookie_is_sent_with_requests() {
    let list = FakeList {
        required_cookie: Some("session=signed-value".to_string()),
        ..FakeList::default()
    };
    let (base_url, _state) = spawn_list_server(list).await.expect("spawn server");

    let err = store(&base_url, None).list().await.expect_err("must fail");
    assert!(err.requires_reauth());

    let movies = store(&base_url, Some("signed-value"))
        .list()
        .await
        .expect("list with session");
    assert!(movies.is_empty());
}

#[tokio::test]
async fn logout_posts_and_navigates_to_login() {
    let (base_url, state) = spawn_list_server(FakeList::default())
        .await
        .expect("spawn server");
    let session = HttpSession::new(ServiceClient::new(&base_url, None).expect("client"));

    assert_eq!(
        session.login_url().expect("login url").as_str(),
        format!("{base_url}/login")
    );
    let navigation = session.logout().await.expect("logout");

    assert_eq!(navigation, Navigation::Login);
    assert!(state.inner.lock().await.logged_out);
}
