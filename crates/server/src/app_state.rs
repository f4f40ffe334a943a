use crate::controller::SelectionController;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<SelectionController>,
}
