use std::sync::Arc;

use crate::utils::{config::Config, store::CalendarStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<CalendarStore>,
}
