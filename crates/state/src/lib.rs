//! Session state for the viewer, held in observable [`runtime::Store`]s.
//!
//! Each state struct owns its update rules as plain `&mut self` methods; the
//! [`AppStores`] bundle wraps them in stores so writes reach subscribers and
//! watches.

pub mod api;
pub mod button;
pub mod query;
pub mod selected;
pub mod ui;

pub use api::*;
pub use button::*;
pub use query::*;
pub use selected::*;
pub use ui::*;

use runtime::Store;

/// The four session stores.
#[derive(Debug)]
pub struct AppStores {
    pub api: Store<ApiState>,
    pub ui: Store<UiState>,
    pub selected: Store<SelectedState>,
    pub button: Store<ButtonState>,
}

impl AppStores {
    pub fn new(api: ApiState, selected: SelectedState) -> Self {
        Self {
            api: Store::new("api", api),
            ui: Store::new("ui", UiState::default()),
            selected: Store::new("selected", selected),
            button: Store::new("button", ButtonState::default()),
        }
    }

    /// Builds the stores for a session opened from a query string: the
    /// prefix and selections present in the URL override the defaults.
    pub fn from_query(mut api: ApiState, query: &QueryParams) -> Self {
        if let Some(prefix) = query.get(PREFIX_PARAM) {
            api.prefix = prefix.to_string();
        }
        Self::new(api, SelectedState::from_query(query))
    }
}
