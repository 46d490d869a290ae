use std::sync::Arc;

use crate::domain::service::AvailabilityService;

pub struct AvailabilityAppState {
    pub availability_service: Arc<AvailabilityService>,
}
