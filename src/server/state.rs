use crate::config::Settings;
use crate::delivery::SessionRegistry;

pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionRegistry,
}
