//! Text rendering of the trail view.

use michi_shared::RoadState;

use crate::{domain::TrailPoint, trail::TrailView};

/// Formatter for the terminal display
pub struct TrailFormatter;

impl TrailFormatter {
    /// One-line summary after applying `applied` new points
    ///
    /// ```text
    /// car (50.45010, 30.52340) | trail 12 | potholes 2 | bumps 0 | +3
    /// ```
    pub fn format_update(view: &TrailView, applied: usize) -> String {
        let car = match view.car() {
            Some(position) => format!("({:.5}, {:.5})", position.latitude, position.longitude),
            None => "-".to_string(),
        };
        format!(
            "car {} | trail {} | potholes {} | bumps {} | +{}",
            car,
            view.trail().len(),
            view.potholes().len(),
            view.bumps().len(),
            applied
        )
    }

    /// Line announcing a road anomaly, `None` for normal road
    pub fn format_anomaly(point: &TrailPoint) -> Option<String> {
        match point.road_state {
            RoadState::Normal => None,
            state => Some(format!(
                "{} at ({:.5}, {:.5})",
                state, point.latitude, point.longitude
            )),
        }
    }
}
