//! The painter.
//!
//! Painting itself is a stub. Once it is done the sub workshop dials the
//! callback address from the paint job and reports completion. If the
//! callback fails the car stays painted on this side: nothing is rolled back
//! and the workshop never learns about the job.

use crate::server::peer::CompletionNotifier;
use core::time::Duration;
use std::sync::Arc;
use workshop_core::proto::{Car, PaintFinishedRequest, SubPaintCarRequest};
use workshop_core::{Error, Result};

#[derive(Clone)]
pub struct SubWorkshopController {
    notifier: Arc<dyn CompletionNotifier>,
}

impl SubWorkshopController {
    pub fn new(notifier: Arc<dyn CompletionNotifier>) -> Self {
        Self { notifier }
    }

    pub async fn paint_car(
        &self,
        request: SubPaintCarRequest,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let SubPaintCarRequest {
            car,
            desired_color,
            callback_service_address,
        } = request;
        let car = car.ok_or_else(|| Error::invalid_argument("car can't be empty"))?;

        self.do_actual_paint(&car, &desired_color)?;

        self.notifier
            .car_painted(
                &callback_service_address,
                PaintFinishedRequest {
                    car_id: car.id,
                    desired_color,
                },
                timeout,
            )
            .await
    }

    fn do_actual_paint(&self, car: &Car, color: &str) -> Result<()> {
        tracing::debug!(car_id = %car.id, from = %car.color, to = color, "painting car");
        Ok(())
    }
}
