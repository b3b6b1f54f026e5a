//! Car lifecycle of the workshop.
//!
//! A car moves through `accepted (unpainted)` → `sent to paint` →
//! `painted` → `retrieved`. Sending a car to paint does not change the store:
//! the car only becomes painted when the sub workshop calls
//! [`WorkshopController::car_painted`], which may happen before or after the
//! paint request itself returns.

use crate::server::peer::PaintDispatcher;
use crate::server::telemetry::{
    increment_cars_accepted, increment_cars_painted, increment_cars_retrieved,
};
use core::time::Duration;
use std::sync::Arc;
use workshop_core::Result;
use workshop_core::proto::{Car, SubPaintCarRequest};
use workshop_core::store::CarStore;
use workshop_core::types::CarEntity;

#[derive(Clone)]
pub struct WorkshopController {
    store: Arc<dyn CarStore>,
    painter: Arc<dyn PaintDispatcher>,
    callback_address: String,
}

impl WorkshopController {
    /// `callback_address` is handed to the sub workshop with every paint job
    /// and must reach this workshop's gRPC server.
    pub fn new(
        store: Arc<dyn CarStore>,
        painter: Arc<dyn PaintDispatcher>,
        callback_address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            painter,
            callback_address: callback_address.into(),
        }
    }

    pub fn accept_car(&self, car: &Car) -> Result<()> {
        let result = self.store.insert_car(CarEntity::from(car));
        match &result {
            Ok(()) => {
                increment_cars_accepted();
                tracing::debug!(car_id = %car.id, stored = self.store.len(), "car accepted");
            }
            Err(err) => tracing::debug!(car_id = %car.id, %err, "car not accepted"),
        }
        result
    }

    /// Sends the stored car to the sub workshop. Unknown cars fail before any
    /// peer is contacted.
    pub async fn paint_car(
        &self,
        car_id: &str,
        desired_color: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let car = self.store.get_car(car_id)?;
        let request = SubPaintCarRequest {
            car: Some(Car::from(car)),
            desired_color: desired_color.to_owned(),
            callback_service_address: self.callback_address.clone(),
        };

        self.painter.dispatch(request, timeout).await.inspect_err(|err| {
            tracing::debug!(car_id, %err, "calling sub workshop failed");
        })
    }

    /// Records the sub workshop's completion callback. Only the first
    /// callback for a car is applied.
    pub fn car_painted(&self, car_id: &str, desired_color: &str) -> Result<()> {
        self.store.mark_painted(car_id, desired_color)?;
        increment_cars_painted();
        tracing::debug!(car_id, color = desired_color, "car marked painted");
        Ok(())
    }

    /// Hands a painted car back and forgets it. A car can be retrieved once.
    pub fn retrieve_car(&self, car_id: &str) -> Result<Car> {
        let car = self.store.take_painted(car_id)?;
        increment_cars_retrieved();
        Ok(Car::from(car))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controller::testing::RecordingPainter;
    use tonic::Code;
    use workshop_core::Error;
    use workshop_core::proto::CarBody;
    use workshop_core::store::InMemoryCarStore;

    fn car(id: &str, color: &str) -> Car {
        Car {
            id: id.into(),
            owner: "Alice".into(),
            body_style: CarBody::Coupe as i32,
            color: color.into(),
        }
    }

    fn controller(painter: Arc<RecordingPainter>) -> WorkshopController {
        WorkshopController::new(Arc::new(InMemoryCarStore::new()), painter, ":5380")
    }

    #[test]
    fn accepting_twice_fails_with_already_exists() {
        let workshop = controller(RecordingPainter::ok());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();

        let err = workshop.accept_car(&car("ABCD1234", "black")).unwrap_err();
        assert_eq!(
            err,
            Error::AlreadyExists {
                car_id: "ABCD1234".into()
            }
        );
    }

    #[test]
    fn retrieve_before_paint_completion_is_refused() {
        let workshop = controller(RecordingPainter::ok());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();

        let err = workshop.retrieve_car("ABCD1234").unwrap_err();
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert_eq!(err.to_string(), "car ABCD1234 is not painted");
    }

    #[test]
    fn painted_car_is_retrieved_once_with_new_color() {
        let workshop = controller(RecordingPainter::ok());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();
        workshop.car_painted("ABCD1234", "red").unwrap();

        let retrieved = workshop.retrieve_car("ABCD1234").unwrap();
        assert_eq!(retrieved.id, "ABCD1234");
        assert_eq!(retrieved.color, "red");
        assert_eq!(retrieved.owner, "Alice");
        assert_eq!(retrieved.body_style(), CarBody::Coupe);

        assert_eq!(
            workshop.retrieve_car("ABCD1234"),
            Err(Error::not_found("ABCD1234"))
        );
    }

    #[test]
    fn second_callback_does_not_repaint() {
        let workshop = controller(RecordingPainter::ok());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();
        workshop.car_painted("ABCD1234", "red").unwrap();

        let err = workshop.car_painted("ABCD1234", "blue").unwrap_err();
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert_eq!(err.to_string(), "car ABCD1234 is already painted");

        assert_eq!(workshop.retrieve_car("ABCD1234").unwrap().color, "red");
    }

    #[test]
    fn callback_for_unknown_car_is_not_found() {
        let workshop = controller(RecordingPainter::ok());
        assert_eq!(
            workshop.car_painted("NOPE0000", "red"),
            Err(Error::not_found("NOPE0000"))
        );
    }

    #[tokio::test]
    async fn painting_unknown_car_never_reaches_the_sub_workshop() {
        let painter = RecordingPainter::ok();
        let workshop = controller(painter.clone());

        let err = workshop.paint_car("NOPE0000", "red", None).await.unwrap_err();
        assert_eq!(err, Error::not_found("NOPE0000"));
        assert!(painter.requests().is_empty());
    }

    #[tokio::test]
    async fn paint_job_carries_snapshot_color_and_callback() {
        let painter = RecordingPainter::ok();
        let workshop = controller(painter.clone());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();

        workshop
            .paint_car("ABCD1234", "Blue", Some(Duration::from_secs(3)))
            .await
            .unwrap();

        let requests = painter.requests();
        assert_eq!(requests.len(), 1);
        let (request, timeout) = &requests[0];
        assert_eq!(request.car.as_ref().unwrap(), &car("ABCD1234", "white"));
        assert_eq!(request.desired_color, "Blue");
        assert_eq!(request.callback_service_address, ":5380");
        assert_eq!(*timeout, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn car_stays_unpainted_until_the_callback_arrives() {
        let workshop = controller(RecordingPainter::ok());
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();
        workshop.paint_car("ABCD1234", "red", None).await.unwrap();

        assert_eq!(
            workshop.retrieve_car("ABCD1234").unwrap_err().code(),
            Code::FailedPrecondition
        );
    }

    #[tokio::test]
    async fn sub_workshop_failure_is_surfaced() {
        let painter = RecordingPainter::failing(Error::PeerUnavailable {
            peer: "sub workshop".into(),
            reason: "connection refused".into(),
        });
        let workshop = controller(painter);
        workshop.accept_car(&car("ABCD1234", "white")).unwrap();

        let err = workshop.paint_car("ABCD1234", "red", None).await.unwrap_err();
        assert_eq!(err.code(), Code::Unavailable);
    }
}
