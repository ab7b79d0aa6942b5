use std::sync::Arc;

use crate::models::Db;
use crate::store::Store;
use crate::suggest::LibrarySuggester;
use crate::AppState;

// Handler state over an in-memory store seeded with `db`.
pub fn state_with(db: Db) -> AppState {
    AppState {
        store: Arc::new(Store::new(db, None)),
        suggester: Arc::new(LibrarySuggester),
    }
}
