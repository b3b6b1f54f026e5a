//! Request validation rules.
//!
//! The service facades run these checks before anything reaches a controller
//! or the store. Controllers trust their input. Every failure is an
//! [`Error::InvalidArgument`] with a message naming the offending value.

use crate::proto::{
    Car, PaintCarRequest, PaintFinishedRequest, RetrieveCarRequest, SubPaintCarRequest,
};
use crate::types::{CAR_ID_LEN, PaintColor};
use crate::{Error, Result};

/// Fails unless `car_id` is exactly [`CAR_ID_LEN`] characters long.
pub fn validate_car_id(car_id: &str) -> Result<()> {
    if car_id.chars().count() != CAR_ID_LEN {
        return Err(Error::invalid_argument(format!(
            "{car_id} should be {CAR_ID_LEN} chars long"
        )));
    }
    Ok(())
}

/// Fails unless `color` is one of the [`PaintColor`]s, ignoring case.
pub fn validate_color(color: &str) -> Result<()> {
    color.parse::<PaintColor>().map(|_| ())
}

pub fn accept_car(car: &Car) -> Result<()> {
    validate_car_id(&car.id)
}

pub fn paint_car(request: &PaintCarRequest) -> Result<()> {
    validate_car_id(&request.car_id)?;
    validate_color(&request.desired_color)
}

pub fn retrieve_car(request: &RetrieveCarRequest) -> Result<()> {
    validate_car_id(&request.car_id)
}

pub fn car_painted(request: &PaintFinishedRequest) -> Result<()> {
    validate_car_id(&request.car_id)
}

/// Checks a paint order received by the sub workshop. The callback address
/// is checked first, then the presence of the car.
pub fn sub_paint_car(request: &SubPaintCarRequest) -> Result<()> {
    if request.callback_service_address.is_empty() {
        return Err(Error::invalid_argument(
            "callback service address cannot be empty",
        ));
    }
    if request.car.is_none() {
        return Err(Error::invalid_argument("car can't be empty"));
    }
    Ok(())
}
