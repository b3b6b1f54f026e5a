use super::{grpc_timeout, rejected, respond};
use crate::server::controller::WorkshopController;
use crate::server::peer::remaining_budget;
use crate::server::telemetry::increment_requests;
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};
use workshop_core::proto::{
    Car, PaintCarRequest, PaintFinishedRequest, RetrieveCarRequest, workshop_server::Workshop,
};
use workshop_core::validation;

/// Facade of the `Workshop` gRPC service.
#[derive(Clone)]
pub struct WorkshopService {
    controller: Arc<WorkshopController>,
}

impl WorkshopService {
    pub fn new(controller: WorkshopController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}

#[tonic::async_trait]
impl Workshop for WorkshopService {
    #[tracing::instrument(skip_all, fields(car_id = %request.get_ref().id))]
    async fn accept_car(&self, request: Request<Car>) -> Result<Response<()>, Status> {
        increment_requests("accept_car");
        let car = request.into_inner();
        validation::accept_car(&car).map_err(|e| rejected("accept_car", e))?;

        tracing::debug!(
            owner = %car.owner,
            body_style = ?car.body_style(),
            color = %car.color,
            "accepting car"
        );
        respond("accept_car", self.controller.accept_car(&car))
    }

    #[tracing::instrument(skip_all, fields(car_id = %request.get_ref().car_id))]
    async fn paint_car(
        &self,
        request: Request<PaintCarRequest>,
    ) -> Result<Response<()>, Status> {
        let started = Instant::now();
        increment_requests("paint_car");
        let timeout = grpc_timeout(request.metadata());
        let request = request.into_inner();
        validation::paint_car(&request).map_err(|e| rejected("paint_car", e))?;

        tracing::debug!(color = %request.desired_color, "sending car to be painted");
        let result = self
            .controller
            .paint_car(
                &request.car_id,
                &request.desired_color,
                remaining_budget(timeout, started),
            )
            .await;
        respond("paint_car", result)
    }

    #[tracing::instrument(skip_all, fields(car_id = %request.get_ref().car_id))]
    async fn retrieve_car(
        &self,
        request: Request<RetrieveCarRequest>,
    ) -> Result<Response<Car>, Status> {
        increment_requests("retrieve_car");
        let request = request.into_inner();
        validation::retrieve_car(&request).map_err(|e| rejected("retrieve_car", e))?;

        tracing::debug!("retrieving car");
        respond("retrieve_car", self.controller.retrieve_car(&request.car_id))
    }

    #[tracing::instrument(skip_all, fields(car_id = %request.get_ref().car_id))]
    async fn car_painted(
        &self,
        request: Request<PaintFinishedRequest>,
    ) -> Result<Response<()>, Status> {
        increment_requests("car_painted");
        let request = request.into_inner();
        validation::car_painted(&request).map_err(|e| rejected("car_painted", e))?;

        tracing::debug!(color = %request.desired_color, "car painted");
        let result = self
            .controller
            .car_painted(&request.car_id, &request.desired_color);
        respond("car_painted", result)
    }
}
