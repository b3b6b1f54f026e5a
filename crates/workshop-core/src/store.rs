//! In-memory car store.
//!
//! The workshop keeps every accepted car in a [`CarStore`]. The only
//! implementation, [`InMemoryCarStore`], owns a `HashMap` behind a
//! [`parking_lot::Mutex`]; each operation is a single critical section, so the
//! lifecycle rules hold when requests for the same car race each other.
//!
//! Nothing survives a restart.

use crate::types::CarEntity;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Storage contract the workshop controller depends on.
pub trait CarStore: Send + Sync {
    /// Stores a new car. Fails with [`Error::AlreadyExists`] if the id is
    /// taken.
    fn insert_car(&self, car: CarEntity) -> Result<()>;

    /// Records a finished paint job: sets the current color and marks the car
    /// painted.
    fn paint_car(&self, car_id: &str, new_color: &str) -> Result<()>;

    /// Marks an unpainted car painted with `new_color`. A car that is
    /// already painted is left untouched and yields [`Error::AlreadyPainted`].
    fn mark_painted(&self, car_id: &str, new_color: &str) -> Result<()>;

    /// Returns a snapshot of the stored car.
    fn get_car(&self, car_id: &str) -> Result<CarEntity>;

    /// Removes the car and returns it.
    fn remove_car(&self, car_id: &str) -> Result<CarEntity>;

    /// Removes and returns the car only if it has been painted. Unpainted
    /// cars stay in the store and yield [`Error::NotPainted`].
    fn take_painted(&self, car_id: &str) -> Result<CarEntity>;

    /// Number of cars currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCarStore {
    cars: Mutex<HashMap<String, CarEntity>>,
}

impl InMemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CarStore for InMemoryCarStore {
    fn insert_car(&self, car: CarEntity) -> Result<()> {
        let mut cars = self.cars.lock();
        if cars.contains_key(&car.car_id) {
            return Err(Error::AlreadyExists { car_id: car.car_id });
        }
        tracing::trace!(car_id = %car.car_id, "storing car");
        cars.insert(car.car_id.clone(), car);
        Ok(())
    }

    fn paint_car(&self, car_id: &str, new_color: &str) -> Result<()> {
        let mut cars = self.cars.lock();
        let car = cars.get_mut(car_id).ok_or_else(|| Error::not_found(car_id))?;
        car.current_color = new_color.to_owned();
        car.painted = true;
        Ok(())
    }

    fn mark_painted(&self, car_id: &str, new_color: &str) -> Result<()> {
        let mut cars = self.cars.lock();
        let car = cars.get_mut(car_id).ok_or_else(|| Error::not_found(car_id))?;
        if car.painted {
            return Err(Error::AlreadyPainted {
                car_id: car_id.to_owned(),
            });
        }
        car.current_color = new_color.to_owned();
        car.painted = true;
        Ok(())
    }

    fn get_car(&self, car_id: &str) -> Result<CarEntity> {
        self.cars
            .lock()
            .get(car_id)
            .cloned()
            .ok_or_else(|| Error::not_found(car_id))
    }

    fn remove_car(&self, car_id: &str) -> Result<CarEntity> {
        self.cars
            .lock()
            .remove(car_id)
            .ok_or_else(|| Error::not_found(car_id))
    }

    fn take_painted(&self, car_id: &str) -> Result<CarEntity> {
        let mut cars = self.cars.lock();
        match cars.get(car_id) {
            None => Err(Error::not_found(car_id)),
            Some(car) if !car.painted => Err(Error::NotPainted {
                car_id: car_id.to_owned(),
            }),
            Some(_) => cars.remove(car_id).ok_or_else(|| Error::not_found(car_id)),
        }
    }

    fn len(&self) -> usize {
        self.cars.lock().len()
    }
}
