use super::{grpc_timeout, rejected, respond};
use crate::server::controller::SubWorkshopController;
use crate::server::peer::remaining_budget;
use crate::server::telemetry::increment_requests;
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};
use workshop_core::proto::{SubPaintCarRequest, sub_workshop_server::SubWorkshop};
use workshop_core::validation;

/// Facade of the `SubWorkshop` gRPC service.
#[derive(Clone)]
pub struct SubWorkshopService {
    controller: Arc<SubWorkshopController>,
}

impl SubWorkshopService {
    pub fn new(controller: SubWorkshopController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}

#[tonic::async_trait]
impl SubWorkshop for SubWorkshopService {
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = request
                .get_ref()
                .car
                .as_ref()
                .map(|car| car.id.as_str())
                .unwrap_or_default(),
            callback = %request.get_ref().callback_service_address,
        )
    )]
    async fn paint_car(
        &self,
        request: Request<SubPaintCarRequest>,
    ) -> Result<Response<()>, Status> {
        let started = Instant::now();
        increment_requests("sub_paint_car");
        let timeout = grpc_timeout(request.metadata());
        let request = request.into_inner();
        validation::sub_paint_car(&request).map_err(|e| rejected("sub_paint_car", e))?;

        tracing::debug!("sub workshop - actually painting the car");
        let result = self
            .controller
            .paint_car(request, remaining_budget(timeout, started))
            .await;
        respond("sub_paint_car", result)
    }
}
