//! Unit tests for nli-molecule.

#[cfg(test)]
mod diffusion {
    use nli_grid::Grid;

    use crate::diffusion::{diffuse, diffuse_step};

    fn line(n: usize) -> Grid {
        Grid::new([n, 1, 1], [1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn zero_diffusivity_is_identity() {
        let g = line(4);
        let prior = vec![1.0, 2.0, 3.0, 4.0];
        let mut next = vec![0.0; 4];
        diffuse_step(&g, &prior, &mut next, 0.0);
        assert_eq!(next, prior);
    }

    #[test]
    fn single_voxel_never_changes() {
        let g = line(1);
        let mut v = vec![20.0];
        let mut scratch = vec![];
        diffuse(&g, &mut v, &mut scratch, 1.0, 10);
        assert_eq!(v, vec![20.0]);
    }

    #[test]
    fn point_source_spreads_to_faces() {
        let g = line(3);
        let prior = vec![0.0, 6.0, 0.0];
        let mut next = vec![0.0; 3];
        diffuse_step(&g, &prior, &mut next, 0.6);
        // Middle keeps (1-D)·6 plus D/6 of its four reflected faces.
        assert!((next[1] - (0.4 * 6.0 + 0.6 * 24.0 / 6.0)).abs() < 1e-12);
        assert!((next[0] - 0.6).abs() < 1e-12);
        assert!((next[2] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mass_conserved_with_reflective_boundary() {
        let g = Grid::new([5, 4, 3], [1.0, 1.0, 1.0]).unwrap();
        let mut v: Vec<f64> = (0..g.voxel_count()).map(|i| (i % 7) as f64).collect();
        let before: f64 = v.iter().sum();
        let mut scratch = vec![];
        diffuse(&g, &mut v, &mut scratch, 0.8, 25);
        let after: f64 = v.iter().sum();
        assert!((before - after).abs() < 1e-9 * before);
        assert!(v.iter().all(|&c| c >= 0.0));
    }

    #[test]
    fn uniform_field_is_fixed_point() {
        let g = Grid::new([3, 3, 3], [1.0, 1.0, 1.0]).unwrap();
        let mut v = vec![2.5; 27];
        let mut scratch = vec![];
        diffuse(&g, &mut v, &mut scratch, 1.0, 3);
        assert!(v.iter().all(|&c| (c - 2.5).abs() < 1e-12));
    }
}

#[cfg(test)]
mod spec {
    use crate::{MoleculeError, MoleculeSpec};

    #[test]
    fn diffusivity_above_one_is_clamped() {
        let s = MoleculeSpec::new("iron", 1.0, 3.5).sanitize().unwrap();
        assert_eq!(s.diffusivity, 1.0);
        let s = MoleculeSpec::new("iron", 1.0, -0.2).sanitize().unwrap();
        assert_eq!(s.diffusivity, 0.0);
    }

    #[test]
    fn non_finite_diffusivity_rejected() {
        let err = MoleculeSpec::new("iron", 1.0, f64::NAN).sanitize().unwrap_err();
        assert!(matches!(err, MoleculeError::InvalidParameter { parameter: "diffusivity", .. }));
    }

    #[test]
    fn negative_init_and_bad_evaporation_rejected() {
        assert!(MoleculeSpec::new("iron", -1.0, 0.5).sanitize().is_err());
        let mut s = MoleculeSpec::new("m_cyto", 0.0, 0.5);
        s.evaporation = 1.5;
        assert!(s.sanitize().is_err());
        let mut s = MoleculeSpec::new("m_cyto", 0.0, 0.5);
        s.max = Some(-1.0);
        assert!(s.sanitize().is_err());
    }

    #[test]
    fn upper_defaults_to_infinity() {
        let mut s = MoleculeSpec::new("iron", 0.0, 0.5);
        assert_eq!(s.upper(), f64::INFINITY);
        s.max = Some(30.0);
        assert_eq!(s.upper(), 30.0);
    }
}

#[cfg(test)]
mod field {
    use nli_core::{TissueType, VoxelId};
    use nli_grid::{Grid, TissueMap};

    use crate::{MoleculeError, MoleculeField, MoleculeSpec};

    fn cube(n: usize) -> Grid {
        Grid::new([n, n, n], [1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn single_voxel_iron_stays_constant() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut f = MoleculeField::new(&g, &tissue, vec![MoleculeSpec::new("iron", 20.0, 0.6)]).unwrap();

        f.update(&g, 1).unwrap();

        assert_eq!(f.concentration("iron", VoxelId(0)), 20.0);
    }

    #[test]
    fn init_loc_restricts_initial_placement() {
        let g = Grid::new([2, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        let tissue = TissueMap::from_vec(&g, vec![TissueType::Blood, TissueType::Air]).unwrap();
        let mut s = MoleculeSpec::new("iron", 5.0, 0.0);
        s.init_loc = vec![TissueType::Blood];
        let f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();
        assert_eq!(f.require("iron").unwrap().values(), &[5.0, 0.0]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let g = cube(2);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let specs = vec![MoleculeSpec::new("iron", 0.0, 0.1), MoleculeSpec::new("iron", 1.0, 0.1)];
        let err = MoleculeField::new(&g, &tissue, specs).unwrap_err();
        assert!(matches!(err, MoleculeError::DuplicateName(ref n) if n == "iron"));
    }

    #[test]
    fn mass_non_increasing_without_sources() {
        let g = cube(4);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut s = MoleculeSpec::new("m_cyto", 0.0, 0.7);
        s.evaporation = 0.1;
        let mut f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();
        f.add("m_cyto", VoxelId(5), 100.0);

        let mut last = f.require("m_cyto").unwrap().total();
        for _ in 0..20 {
            f.update(&g, 3).unwrap();
            let now = f.require("m_cyto").unwrap().total();
            assert!(now <= last + 1e-9);
            last = now;
        }
        f.validate().unwrap();
    }

    #[test]
    fn evaporation_scales_uniform_field() {
        let g = cube(2);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut s = MoleculeSpec::new("n_cyto", 10.0, 0.5);
        s.evaporation = 0.25;
        let mut f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();
        f.update(&g, 1).unwrap();
        for &c in f.require("n_cyto").unwrap().values() {
            assert!((c - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn sources_add_increment_on_matching_tissue() {
        let g = Grid::new([3, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        let tissue = TissueMap::from_vec(
            &g,
            vec![TissueType::Blood, TissueType::Other, TissueType::Blood],
        )
        .unwrap();
        let mut s = MoleculeSpec::new("iron", 0.0, 0.0);
        s.source = vec![TissueType::Blood];
        s.incr = 2.0;
        let mut f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();
        assert_eq!(f.require("iron").unwrap().sources(), &[VoxelId(0), VoxelId(2)]);

        f.update(&g, 1).unwrap();
        f.update(&g, 1).unwrap();
        assert_eq!(f.require("iron").unwrap().values(), &[4.0, 0.0, 4.0]);
    }

    #[test]
    fn cap_is_enforced() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Blood);
        let mut s = MoleculeSpec::new("iron", 0.0, 0.0);
        s.source = vec![TissueType::Blood];
        s.incr = 4.0;
        s.max = Some(10.0);
        let mut f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();

        let mut capped = 0;
        for _ in 0..5 {
            capped += f.update(&g, 1).unwrap().clamped_max;
        }
        assert_eq!(f.concentration("iron", VoxelId(0)), 10.0);
        assert!(capped >= 1);
        assert_eq!(f.add("iron", VoxelId(0), 5.0), 0.0);
    }

    #[test]
    fn negative_values_are_clamped_and_reported() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut s = MoleculeSpec::new("iron", 1.0, 0.0);
        s.incr = -3.0;
        s.source = vec![TissueType::Other];
        let mut f = MoleculeField::new(&g, &tissue, vec![s]).unwrap();

        let report = f.update(&g, 1).unwrap();
        assert_eq!(report.clamped_negative, 1);
        assert_eq!(f.concentration("iron", VoxelId(0)), 0.0);
    }

    #[test]
    fn nan_is_fatal() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut f = MoleculeField::new(&g, &tissue, vec![MoleculeSpec::new("iron", 1.0, 0.0)]).unwrap();
        f.values_mut("iron").unwrap()[0] = f64::NAN;
        let err = f.update(&g, 1).unwrap_err();
        assert!(err.is_numeric());
        assert!(f.validate().is_err());
    }

    #[test]
    fn take_fraction_removes_share() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let mut f = MoleculeField::new(&g, &tissue, vec![MoleculeSpec::new("iron", 8.0, 0.0)]).unwrap();
        let taken = f.take_fraction("iron", VoxelId(0), 0.25);
        assert_eq!(taken, 2.0);
        assert_eq!(f.concentration("iron", VoxelId(0)), 6.0);
        assert_eq!(f.take_fraction("absent", VoxelId(0), 1.0), 0.0);
        assert_eq!(f.concentration("absent", VoxelId(0)), 0.0);
    }

    #[test]
    fn names_keep_configuration_order() {
        let g = cube(1);
        let tissue = TissueMap::uniform(&g, TissueType::Other);
        let specs = vec![
            MoleculeSpec::new("n_cyto", 0.0, 0.1),
            MoleculeSpec::new("iron", 0.0, 0.1),
            MoleculeSpec::new("m_cyto", 0.0, 0.1),
        ];
        let f = MoleculeField::new(&g, &tissue, specs).unwrap();
        assert_eq!(f.names().collect::<Vec<_>>(), vec!["n_cyto", "iron", "m_cyto"]);
    }
}
