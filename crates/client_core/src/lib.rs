//! Client side of the movie tracker: catalog search, the remote watch lists,
//! and the incremental search controller that ties them together.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod interaction;
pub mod list_store;
pub mod search;
pub mod session;
pub mod transport;

pub use catalog::{CatalogService, OmdbCatalog, OMDB_BASE_URL};
pub use dashboard::Dashboard;
pub use error::{CatalogError, StoreError};
pub use interaction::{InteractionHub, OutsideWatch, Point, Region};
pub use list_store::{HttpListStore, ListStore};
pub use search::{
    LookupOutcome, SearchController, SearchPhase, SearchSnapshot, Selection, DEFAULT_DEBOUNCE,
};
pub use session::{HttpSession, Navigation, SessionService};
pub use transport::ServiceClient;
