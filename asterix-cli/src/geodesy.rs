//! Spherical-earth implementation of the core's `CoordinateTransform`.
//!
//! Projects a radar slant-polar measurement onto the surface with the
//! great-circle destination formula from the radar site. Good to well under
//! the plot resolution at en-route ranges; anything better belongs in a
//! proper geodesy library, not here.

use asterix_core::{CoordinateTransform, RadarSite};

/// Average earth radius for the spherical approximation, meters.
const SPHERICAL_R: f64 = 6371e3;

pub struct SphericalTransform;

impl CoordinateTransform for SphericalTransform {
    fn polar_to_geodetic(
        &self,
        rho_m: f64,
        theta_rad: f64,
        site: &RadarSite,
    ) -> Option<(f64, f64)> {
        if !rho_m.is_finite() || !theta_rad.is_finite() || rho_m < 0.0 {
            return None;
        }

        // Slant range to ground range, ignoring target height above the site
        let ground_m = (rho_m * rho_m - site.height_m * site.height_m).max(0.0).sqrt();
        let d = ground_m / SPHERICAL_R;

        let lat0 = site.lat_deg.to_radians();
        let lon0 = site.lon_deg.to_radians();

        let lat = (lat0.sin() * d.cos() + lat0.cos() * d.sin() * theta_rad.cos()).asin();
        let lon = lon0
            + (theta_rad.sin() * d.sin() * lat0.cos()).atan2(d.cos() - lat0.sin() * lat.sin());

        let lat_deg = lat.to_degrees();
        let lon_deg = (lon.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;

        if lat_deg.is_finite() && lon_deg.is_finite() {
            Some((lat_deg, lon_deg))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> RadarSite {
        RadarSite {
            lat_deg: 41.3,
            lon_deg: 2.1,
            height_m: 0.0,
        }
    }

    #[test]
    fn test_zero_range_is_the_site() {
        let t = SphericalTransform;
        let (lat, lon) = t.polar_to_geodetic(0.0, 0.0, &site()).unwrap();
        assert!((lat - 41.3).abs() < 1e-9);
        assert!((lon - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_due_north_increases_latitude() {
        let t = SphericalTransform;
        // 60 NM due north is about one degree of latitude
        let (lat, lon) = t
            .polar_to_geodetic(60.0 * 1852.0, 0.0, &site())
            .unwrap();
        assert!((lat - 42.3).abs() < 0.01, "lat {lat}");
        assert!((lon - 2.1).abs() < 1e-6, "lon {lon}");
    }

    #[test]
    fn test_due_east_increases_longitude() {
        let t = SphericalTransform;
        let (lat, lon) = t
            .polar_to_geodetic(60.0 * 1852.0, std::f64::consts::FRAC_PI_2, &site())
            .unwrap();
        assert!(lon > 2.1, "lon {lon}");
        // Latitude shifts only second-order on a sphere
        assert!((lat - 41.3).abs() < 0.05, "lat {lat}");
    }

    #[test]
    fn test_negative_range_fails() {
        let t = SphericalTransform;
        assert!(t.polar_to_geodetic(-1.0, 0.0, &site()).is_none());
        assert!(t.polar_to_geodetic(f64::NAN, 0.0, &site()).is_none());
    }
}
