use serde::{Deserialize, Serialize};

/// A point shared with friends
///
/// Serialized as JSON before encryption; the relay never sees it in the clear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("latitude out of range: {0}")]
    Latitude(f64),
    #[error("longitude out of range: {0}")]
    Longitude(f64),
    #[error("location encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    fn validate(&self) -> Result<(), LocationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(LocationError::Latitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(LocationError::Longitude(self.longitude));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LocationError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LocationError> {
        let location: Self = serde_json::from_slice(bytes)?;
        location.validate()?;
        Ok(location)
    }
}
