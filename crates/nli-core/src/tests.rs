//! Unit tests for nli-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, ModuleId, VoxelId};

    #[test]
    fn index_and_try_from() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert!(!VoxelId::default().is_valid());
        assert_eq!(ModuleId::INVALID.0, u16::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod point {
    use crate::Point3;

    #[test]
    fn distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert!((a.distance(b) - 13.0).abs() < 1e-12);
        assert_eq!(a.distance_squared(b), 169.0);
    }

    #[test]
    fn normalized_zero_is_none() {
        assert!(Point3::ORIGIN.normalized().is_none());
        let n = Point3::new(0.0, 2.0, 0.0).normalized().unwrap();
        assert_eq!(n, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn arithmetic() {
        let p = Point3::new(1.0, 2.0, 3.0) + Point3::new(1.0, 1.0, 1.0) * 2.0;
        assert_eq!(p, Point3::new(3.0, 4.0, 5.0));
        assert!(!Point3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn clock_advances_tick_and_time() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        clock.advance(0.5);
        assert_eq!(clock.tick, Tick(2));
        assert!((clock.time - 1.5).abs() < 1e-12);
    }

    #[test]
    fn reached_uses_tolerance() {
        let mut clock = SimClock::new();
        for _ in 0..10 {
            clock.advance(0.1);
        }
        // 0.1 * 10 accumulates to 0.9999999999999999
        assert!(clock.reached(1.0));
        assert!(!clock.reached(1.1));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, 1, AgentId(0));
        let mut r2 = AgentRng::new(12345, 1, AgentId(0));
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn streams_differ() {
        let mut fungus = AgentRng::new(1, 1, AgentId(0));
        let mut macro_ = AgentRng::new(1, 2, AgentId(0));
        let a: u64 = fungus.random();
        let b: u64 = macro_.random();
        assert_ne!(a, b);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(0, 0, AgentId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(rng.gen_bool(7.0));
        assert!(!rng.gen_bool(f64::NAN));
    }

    #[test]
    fn unit_vector_has_unit_length() {
        let mut rng = SimRng::new(9);
        for _ in 0..200 {
            let v = rng.unit_vector();
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn weighted_choice_respects_zero_weights() {
        let mut rng = SimRng::new(3);
        for _ in 0..100 {
            assert_eq!(rng.choose_weighted(&[0.0, 5.0, 0.0]), Some(1));
        }
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
        assert_eq!(rng.choose_weighted(&[]), None);
    }
}

#[cfg(test)]
mod tissue {
    use crate::TissueType;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("blood".parse::<TissueType>().unwrap(), TissueType::Blood);
        assert_eq!(" AIR ".parse::<TissueType>().unwrap(), TissueType::Air);
        assert!("bone".parse::<TissueType>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        for t in TissueType::ALL {
            assert_eq!(t.to_string().parse::<TissueType>().unwrap(), t);
        }
    }
}
