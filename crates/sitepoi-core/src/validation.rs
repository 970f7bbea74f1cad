use crate::error::{CoordinateAxis, Result, SitePoiError};

/// Return the latitude if it is a finite value within [-90, 90]
pub fn validate_latitude(value: f64) -> Result<f64> {
    validate_axis(value, CoordinateAxis::Latitude, 90.0)
}

/// Return the longitude if it is a finite value within [-180, 180]
pub fn validate_longitude(value: f64) -> Result<f64> {
    validate_axis(value, CoordinateAxis::Longitude, 180.0)
}

fn validate_axis(value: f64, axis: CoordinateAxis, limit: f64) -> Result<f64> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(SitePoiError::InvalidCoordinate { axis, value, min: -limit, max: limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_latitudes() {
        assert_eq!(validate_latitude(0.0).unwrap(), 0.0);
        assert_eq!(validate_latitude(-90.0).unwrap(), -90.0);
        assert_eq!(validate_latitude(90.0).unwrap(), 90.0);
    }

    #[test]
    fn test_invalid_latitudes() {
        assert!(validate_latitude(90.0001).is_err());
        assert!(validate_latitude(-120.0).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_longitude_range() {
        assert_eq!(validate_longitude(180.0).unwrap(), 180.0);
        assert_eq!(validate_longitude(-179.5).unwrap(), -179.5);
        assert!(validate_longitude(181.0).is_err());
        assert!(validate_longitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_names_the_axis() {
        match validate_longitude(200.0) {
            Err(SitePoiError::InvalidCoordinate { axis, value, .. }) => {
                assert_eq!(axis, CoordinateAxis::Longitude);
                assert_eq!(value, 200.0);
            }
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }
}
