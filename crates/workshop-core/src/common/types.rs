//! # Car entity and paint colors
//!
//! [`CarEntity`] is the only record the workshop keeps. It is created from the
//! wire [`Car`](crate::proto::Car) when a car is accepted, updated once when
//! the paint job is confirmed and handed back on retrieval.
//!
//! The body style is stored by its protocol name (`SEDAN`, `COUPE`, ...) so
//! the store does not depend on the numeric values of the generated enum.

use crate::proto::{Car, CarBody};
use crate::{Error, Result};
use core::fmt;
use core::str::FromStr;

/// Number of characters in a car id.
pub const CAR_ID_LEN: usize = 8;

/// A car as stored by the workshop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarEntity {
    pub car_id: String,
    pub owner: String,
    pub body_style: String,
    pub original_color: String,
    pub current_color: String,
    pub painted: bool,
}

impl From<&Car> for CarEntity {
    fn from(car: &Car) -> Self {
        Self {
            car_id: car.id.clone(),
            owner: car.owner.clone(),
            body_style: car.body_style().as_str_name().to_owned(),
            original_color: car.color.clone(),
            current_color: car.color.clone(),
            painted: false,
        }
    }
}

impl From<Car> for CarEntity {
    fn from(car: Car) -> Self {
        Self::from(&car)
    }
}

impl From<&CarEntity> for Car {
    fn from(entity: &CarEntity) -> Self {
        let body_style = CarBody::from_str_name(&entity.body_style).unwrap_or_default();
        Self {
            id: entity.car_id.clone(),
            owner: entity.owner.clone(),
            body_style: body_style as i32,
            color: entity.current_color.clone(),
        }
    }
}

impl From<CarEntity> for Car {
    fn from(entity: CarEntity) -> Self {
        Self::from(&entity)
    }
}

/// The colors the sub workshop has ink for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintColor {
    Red,
    Green,
    Blue,
}

impl PaintColor {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for PaintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaintColor {
    type Err = Error;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_argument(format!("out of ink for {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_car() -> Car {
        Car {
            id: "ABCD1234".into(),
            owner: "Alice".into(),
            body_style: CarBody::Hatchback as i32,
            color: "white".into(),
        }
    }

    #[test]
    fn accepted_car_starts_unpainted_with_both_colors_set() {
        let entity = CarEntity::from(wire_car());
        assert_eq!(entity.car_id, "ABCD1234");
        assert_eq!(entity.body_style, "HATCHBACK");
        assert_eq!(entity.original_color, "white");
        assert_eq!(entity.current_color, "white");
        assert!(!entity.painted);
    }

    #[test]
    fn wire_car_carries_the_current_color() {
        let mut entity = CarEntity::from(wire_car());
        entity.current_color = "red".into();
        entity.painted = true;

        let car = Car::from(&entity);
        assert_eq!(car.color, "red");
        assert_eq!(car.body_style(), CarBody::Hatchback);
    }

    #[test]
    fn unknown_body_style_falls_back_to_default() {
        let mut entity = CarEntity::from(wire_car());
        entity.body_style = "TRUCK".into();
        assert_eq!(Car::from(entity).body_style(), CarBody::Sedan);
    }

    #[test]
    fn parses_colors_ignoring_case() {
        assert_eq!("red".parse::<PaintColor>(), Ok(PaintColor::Red));
        assert_eq!("GREEN".parse::<PaintColor>(), Ok(PaintColor::Green));
        assert_eq!("bLuE".parse::<PaintColor>(), Ok(PaintColor::Blue));
    }

    #[test]
    fn rejects_colors_without_ink() {
        let err = "purple".parse::<PaintColor>().unwrap_err();
        assert_eq!(err, Error::invalid_argument("out of ink for purple"));
        assert!("".parse::<PaintColor>().is_err());
        assert!(" red".parse::<PaintColor>().is_err());
    }
}
