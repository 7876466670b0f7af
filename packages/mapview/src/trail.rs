//! Display state of the live map.

use michi_shared::RoadState;

use crate::domain::TrailPoint;

/// A coordinate on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&TrailPoint> for Position {
    fn from(point: &TrailPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Vehicle marker, travelled path and road anomaly markers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailView {
    car: Option<Position>,
    trail: Vec<Position>,
    potholes: Vec<Position>,
    bumps: Vec<Position>,
}

impl TrailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply drained points in order. Returns the number of points applied.
    pub fn apply(&mut self, points: &[TrailPoint]) -> usize {
        for point in points {
            let position = Position::from(point);
            if self.car.is_none() {
                tracing::debug!(
                    "Placing vehicle at ({}, {})",
                    position.latitude,
                    position.longitude
                );
            }
            self.car = Some(position);
            self.trail.push(position);

            match point.road_state {
                RoadState::Pothole => self.potholes.push(position),
                RoadState::Bump => self.bumps.push(position),
                RoadState::Normal => {}
            }
        }
        points.len()
    }

    /// Current vehicle position, once the first point arrived
    pub fn car(&self) -> Option<Position> {
        self.car
    }

    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    pub fn potholes(&self) -> &[Position] {
        &self.potholes
    }

    pub fn bumps(&self) -> &[Position] {
        &self.bumps
    }
}
