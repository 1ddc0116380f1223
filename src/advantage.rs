use crate::tuning::AdvantageTuning;

pub fn advantage(off_strength: f64, def_strength: f64, tuning: &AdvantageTuning) -> f64 {
    let off = off_strength.max(0.0);
    let def = def_strength.max(0.0);
    let sum = off + def;
    let raw = if sum > 0.0 && sum.is_finite() {
        off / sum
    } else {
        0.5
    };
    let r = tuning.regression;
    let regressed = raw * r + 0.5 * (1.0 - r);
    tuning.bounds.clamp(regressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Band;

    #[test]
    fn equal_strengths_are_even() {
        let t = AdvantageTuning::default();
        for x in [0.0, 10.0, 42.5, 100.0] {
            assert!((advantage(x, x, &t) - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn stays_inside_bounds() {
        let t = AdvantageTuning::default();
        assert_eq!(advantage(100.0, 0.0, &t), 0.70);
        assert_eq!(advantage(0.0, 100.0, &t), 0.30);
        for off in 0..=100 {
            for def in (0..=100).step_by(5) {
                let a = advantage(off as f64, def as f64, &t);
                assert!((0.30..=0.70).contains(&a));
            }
        }
    }

    #[test]
    fn heavy_mismatch_is_regressed() {
        let t = AdvantageTuning::default();
        let a = advantage(80.0, 30.0, &t);
        let raw = 80.0 / 110.0;
        assert!(a < raw);
        assert!((a - (raw * 0.82 + 0.09)).abs() < 1e-12);
    }

    #[test]
    fn lower_regression_means_more_upsets() {
        let chalky = AdvantageTuning {
            regression: 0.95,
            bounds: Band::new(0.0, 1.0),
        };
        let loose = AdvantageTuning {
            regression: 0.60,
            bounds: Band::new(0.0, 1.0),
        };
        assert!(advantage(70.0, 40.0, &loose) < advantage(70.0, 40.0, &chalky));
    }
}
