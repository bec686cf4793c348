//! A toy diagnostic cloud and precipitation model.
//!
//! Cloud is diagnosed from relative humidity alone, condensate is split between liquid and ice by
//! temperature, and deep cloud layers drop a fixed fraction of their mean condensate below their
//! base. It is only meant to give a radiative transfer model something plausible to chew on.
use super::config::CloudConfig;

/// Condensate on the grid, g/m^3. `None` where the profile has no data.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudProfile {
    pub cloud: Vec<Option<bool>>,
    pub lwc: Vec<Option<f64>>,
    pub iwc: Vec<Option<f64>>,
    pub rwc: Vec<Option<f64>>,
    pub swc: Vec<Option<f64>>,
}

/// Fraction of condensate that is liquid at temperature `t_c`.
fn liquid_fraction(t_c: f64, config: &CloudConfig) -> f64 {
    if t_c >= 0.0 {
        1.0
    } else if t_c <= config.ice_temp_c {
        0.0
    } else {
        (t_c - config.ice_temp_c) / -config.ice_temp_c
    }
}

/// Run the model on gridded temperature (C) and relative humidity (%).
pub fn diagnose(
    altitudes: &[f64],
    temperature: &[Option<f64>],
    relative_humidity: &[Option<f64>],
    config: &CloudConfig,
) -> CloudProfile {
    let n = altitudes.len();
    debug_assert_eq!(n, temperature.len());
    debug_assert_eq!(n, relative_humidity.len());

    let thresh = config.rh_cloud_pct;

    let mut profile = CloudProfile {
        cloud: vec![None; n],
        lwc: vec![None; n],
        iwc: vec![None; n],
        rwc: vec![None; n],
        swc: vec![None; n],
    };

    for i in 0..n {
        let (t, rh) = match (temperature[i], relative_humidity[i]) {
            (Some(t), Some(rh)) => (t, rh),
            _ => continue,
        };

        profile.rwc[i] = Some(0.0);
        profile.swc[i] = Some(0.0);

        if rh >= thresh {
            let f = ((rh - thresh) / (100.0 - thresh)).max(0.0).min(1.0);
            let strength = 0.5 + 0.5 * f;
            let liquid = liquid_fraction(t, config);

            profile.cloud[i] = Some(true);
            profile.lwc[i] = Some(config.max_lwc_gm3 * strength * liquid);
            profile.iwc[i] = Some(config.max_iwc_gm3 * strength * (1.0 - liquid));
        } else {
            profile.cloud[i] = Some(false);
            profile.lwc[i] = Some(0.0);
            profile.iwc[i] = Some(0.0);
        }
    }

    for (base, top) in cloud_layers(&profile.cloud) {
        let depth = altitudes[top] - altitudes[base] + grid_step(altitudes);
        if depth < config.precip_min_depth_m {
            continue;
        }

        let total: f64 = (base..=top)
            .map(|i| profile.lwc[i].unwrap_or(0.0) + profile.iwc[i].unwrap_or(0.0))
            .sum();
        let precip = config.precip_fraction * total / (top - base + 1) as f64;

        for i in (0..base).rev() {
            let t = match temperature[i] {
                Some(t) if profile.cloud[i].is_some() => t,
                _ => break,
            };

            let slot = if t > 0.0 {
                &mut profile.rwc[i]
            } else {
                &mut profile.swc[i]
            };
            *slot = Some(slot.unwrap_or(0.0) + precip);
        }
    }

    profile
}

/// Contiguous runs of cloudy levels as inclusive (base, top) index pairs.
fn cloud_layers(cloud: &[Option<bool>]) -> Vec<(usize, usize)> {
    let mut layers = vec![];
    let mut start: Option<usize> = None;

    for (i, &c) in cloud.iter().enumerate() {
        match (c == Some(true), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                layers.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }

    if let Some(s) = start {
        layers.push((s, cloud.len() - 1));
    }

    layers
}

fn grid_step(altitudes: &[f64]) -> f64 {
    if altitudes.len() > 1 {
        altitudes[1] - altitudes[0]
    } else {
        0.0
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    fn config() -> CloudConfig {
        CloudConfig {
            rh_cloud_pct: 90.0,
            max_lwc_gm3: 1.0,
            max_iwc_gm3: 0.2,
            ice_temp_c: -20.0,
            precip_min_depth_m: 300.0,
            precip_fraction: 0.5,
        }
    }

    #[test]
    fn test_liquid_fraction() {
        let cfg = config();
        assert_eq!(liquid_fraction(5.0, &cfg), 1.0);
        assert_eq!(liquid_fraction(-25.0, &cfg), 0.0);
        assert!((liquid_fraction(-10.0, &cfg) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cloud_layers() {
        let c = [
            Some(false),
            Some(true),
            Some(true),
            None,
            Some(true),
            Some(false),
            Some(true),
        ];
        assert_eq!(cloud_layers(&c), vec![(1, 2), (4, 4), (6, 6)]);
        assert!(cloud_layers(&[]).is_empty());
    }

    #[test]
    fn test_no_cloud_when_dry() {
        let z = [0.0, 100.0, 200.0];
        let t = [Some(10.0), Some(9.0), Some(8.0)];
        let rh = [Some(50.0), Some(60.0), None];
        let p = diagnose(&z, &t, &rh, &config());

        assert_eq!(p.cloud, vec![Some(false), Some(false), None]);
        assert_eq!(p.lwc, vec![Some(0.0), Some(0.0), None]);
        assert_eq!(p.rwc, vec![Some(0.0), Some(0.0), None]);
    }

    #[test]
    fn test_phase_and_strength() {
        let z = [0.0, 100.0];
        let t = [Some(5.0), Some(-10.0)];
        let rh = [Some(90.0), Some(100.0)];
        let p = diagnose(&z, &t, &rh, &config());

        // At threshold: half strength, all liquid.
        assert_eq!(p.lwc[0], Some(0.5));
        assert_eq!(p.iwc[0], Some(0.0));
        // Saturated and half way to all-ice.
        assert!((p.lwc[1].unwrap() - 0.5).abs() < 1e-12);
        assert!((p.iwc[1].unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_deep_layer_precipitates() {
        let z = [0.0, 100.0, 200.0, 300.0, 400.0, 500.0];
        let t = [Some(5.0), Some(-2.0), Some(1.0), Some(0.5), Some(0.2), Some(0.1)];
        let rh = [Some(50.0), Some(60.0), Some(80.0), Some(100.0), Some(100.0), Some(100.0)];
        let p = diagnose(&z, &t, &rh, &config());

        // Layer is levels 3..=5, 300 m deep with the step, all liquid at full strength.
        let expected = 0.5 * 1.0;
        assert_eq!(p.rwc[3], Some(0.0));
        assert!((p.rwc[2].unwrap() - expected).abs() < 1e-12);
        assert_eq!(p.rwc[1], Some(0.0));
        assert!((p.swc[1].unwrap() - expected).abs() < 1e-12);
        assert!((p.rwc[0].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_shallow_layer_does_not_precipitate() {
        let z = [0.0, 100.0, 200.0];
        let t = [Some(5.0), Some(4.0), Some(3.0)];
        let rh = [Some(50.0), Some(50.0), Some(100.0)];
        let p = diagnose(&z, &t, &rh, &config());

        assert_eq!(p.cloud[2], Some(true));
        assert_eq!(p.rwc, vec![Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_precip_stops_at_missing_data() {
        let z = [0.0, 100.0, 200.0, 300.0, 400.0];
        let t = [Some(5.0), None, Some(3.0), Some(2.0), Some(1.0)];
        let rh = [Some(50.0), None, Some(50.0), Some(100.0), Some(100.0)];
        let mut cfg = config();
        cfg.precip_min_depth_m = 200.0;
        let p = diagnose(&z, &t, &rh, &cfg);

        assert!(p.rwc[2].unwrap() > 0.0);
        assert_eq!(p.rwc[1], None);
        assert_eq!(p.rwc[0], Some(0.0));
    }
}
