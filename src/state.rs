use crate::config::AppConfig;
use crate::services::reservations::ReservationGateway;

pub struct AppState {
    pub config: AppConfig,
    pub gateway: Box<dyn ReservationGateway>,
}
