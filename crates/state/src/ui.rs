/// Transient UI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_loading: bool,
}

impl UiState {
    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }
}
