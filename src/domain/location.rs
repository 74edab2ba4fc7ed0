//! Geographic point used for map markers and clustering.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lng: f64,
}

impl Location {
    /// Construct a location without validating it.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(DashboardError::validation(
                "location",
                format!("latitude {} is outside [-90, 90]", self.lat),
            ));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(DashboardError::validation(
                "location",
                format!("longitude {} is outside [-180, 180]", self.lng),
            ));
        }
        Ok(())
    }

    /// Planar distance in degrees. Good enough at city scale.
    pub fn degrees_to(&self, other: &Location) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_delhi() {
        assert!(Location::new(28.6139, 77.2090).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(Location::new(91.0, 0.0).validate().is_err());
        assert!(Location::new(0.0, -180.5).validate().is_err());
        assert!(Location::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn distance_is_euclidean_in_degrees() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(3.0, 4.0);
        assert!((a.degrees_to(&b) - 5.0).abs() < 1e-12);
    }
}
