//! Unit tests for nli-config.

#[cfg(test)]
mod document {
    use nli_core::TissueType;

    use crate::{ConfigError, GeometryLayout, ModuleSection, SimulationConfig, VtkType};

    const BASE: &str = r#"
[simulation]
nx = 4
ny = 3
nz = 2
dx = 10.0
dy = 10.0
dz = 10.0
time_step = 1.0
validate = true
modules = ["geometry", "molecules", "fungus"]

[geometry]
layout = "uniform"
fill = "AIR"

[molecules]
time_step = 1.0
cyto_evap_m = 0.2
iron_max = 30.0

[[molecules.molecules]]
name = "iron"
init_val = 20.0
init_loc = ["BLOOD", "AIR"]
diffusivity = 0.6

[[molecules.molecules]]
name = "m_cyto"
init_val = 0.0
diffusivity = 0.3

[fungus]
time_step = 1.0
init_num = 70
init_health = 100.0
"#;

    fn with(extra: &str) -> String {
        format!("{BASE}\n{extra}")
    }

    #[test]
    fn parses_base_document() {
        let c = SimulationConfig::from_toml_str(BASE).unwrap();
        assert_eq!(c.simulation.nx, 4);
        assert!(c.simulation.validate);
        assert_eq!(c.simulation.seed, 0);
        let g = c.geometry.as_ref().unwrap();
        assert_eq!(g.layout, GeometryLayout::Uniform);
        assert_eq!(g.fill, TissueType::Air);
        assert_eq!(g.time_step(), 0.0);
        let f = c.fungus.as_ref().unwrap();
        assert_eq!(f.init_num, 70);
        assert_eq!(f.p_branch, 0.25);
        assert!(c.is_enabled("fungus"));
        assert!(!c.is_enabled("macrophage"));
    }

    #[test]
    fn molecule_specs_pick_up_section_defaults() {
        let c = SimulationConfig::from_toml_str(BASE).unwrap();
        let specs = c.molecules.as_ref().unwrap().specs();
        assert_eq!(specs[0].name, "iron");
        assert_eq!(specs[0].max, Some(30.0));
        assert_eq!(specs[0].init_loc, vec![TissueType::Blood, TissueType::Air]);
        assert_eq!(specs[0].evaporation, 0.0);
        assert_eq!(specs[1].evaporation, 0.2);
        assert_eq!(specs[1].max, None);
    }

    #[test]
    fn unknown_module_rejected() {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "dragon"]"#);
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModule(ref m) if m == "dragon"));
    }

    #[test]
    fn duplicate_module_rejected() {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "fungus"]"#);
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateModule(_)));
    }

    #[test]
    fn listed_module_needs_section() {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "macrophage"]"#);
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(ref m) if m == "macrophage"));
    }

    #[test]
    fn zero_dimension_rejected() {
        let text = BASE.replace("ny = 3", "ny = 0");
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { ref field, .. } if field == "simulation.ny"));
    }

    #[test]
    fn negative_spacing_rejected() {
        let text = BASE.replace("dz = 10.0", "dz = -1.0");
        assert!(SimulationConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn probability_out_of_range_rejected() {
        let err = SimulationConfig::from_toml_str(&with("p_branch = 1.5")).unwrap_err();
        assert!(matches!(err, ConfigError::Probability { ref field, .. } if field == "fungus.p_branch"));
    }

    #[test]
    fn duplicate_molecule_rejected() {
        let text = BASE.replace(r#"name = "m_cyto""#, r#"name = "iron""#);
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateMolecule(_)));
    }

    #[test]
    fn missing_required_key_is_parse_error() {
        let text = BASE.replace("init_num = 70", "");
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = SimulationConfig::from_toml_str(&with("colour = \"green\"")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn run_last_and_visual_records() {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "visualization"]"#)
            + r#"
[visualization]
time_step = 2.0
run_last = true

[[visualization.visual_variables]]
module = "molecules"
variable = "iron"
vtk_type = "STRUCTURED_POINTS"

[[visualization.visual_variables]]
module = "fungus"
variable = "cells"
vtk_type = "POLY_DATA"
attributes = ["status", "iron"]
"#;
        let c = SimulationConfig::from_toml_str(&text).unwrap();
        let v = c.visualization.as_ref().unwrap();
        assert!(v.run_last());
        assert_eq!(v.visual_variables[1].vtk_type, VtkType::PolyData);
        assert_eq!(v.visual_variables[1].attributes, vec!["status", "iron"]);
        assert!(c.section("visualization").is_some());
    }

    fn with_visual(record: &str) -> Result<SimulationConfig, ConfigError> {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "visualization"]"#)
            + "\n[visualization]\ntime_step = 1.0\n\n[[visualization.visual_variables]]\n"
            + record;
        SimulationConfig::from_toml_str(&text)
    }

    fn invalid_field(err: ConfigError) -> String {
        match err {
            ConfigError::Invalid { field, .. } => field,
            other => panic!("expected Invalid, got {other}"),
        }
    }

    #[test]
    fn visual_variables_must_name_something_the_run_holds() {
        for (record, key) in [
            ("module = \"molecules\"\nvariable = \"oxygen\"\nvtk_type = \"STRUCTURED_POINTS\"", "variable"),
            ("module = \"geometry\"\nvariable = \"bone\"\nvtk_type = \"STRUCTURED_POINTS\"", "variable"),
            ("module = \"lymph\"\nvariable = \"cells\"\nvtk_type = \"POLY_DATA\"", "module"),
            ("module = \"molecules\"\nvariable = \"iron\"\nvtk_type = \"POLY_DATA\"", "vtk_type"),
            ("module = \"fungus\"\nvariable = \"cells\"\nvtk_type = \"RECTILINEAR_GRID\"", "vtk_type"),
            ("module = \"fungus\"\nvariable = \"cells\"\nvtk_type = \"POLY_DATA\"\nattributes = [\"helth\"]", "attributes"),
            ("module = \"macrophage\"\nvariable = \"cells\"\nvtk_type = \"POLY_DATA\"\nattributes = [\"health\"]", "attributes"),
        ] {
            let err = with_visual(record).unwrap_err();
            assert_eq!(invalid_field(err), format!("visualization.visual_variables[0].{key}"), "{record}");
        }
    }

    #[test]
    fn well_formed_visual_variables_pass() {
        for record in [
            "module = \"molecules\"\nvariable = \"m_cyto\"\nvtk_type = \"RECTILINEAR_GRID\"",
            "module = \"geometry\"\nvariable = \"tissue\"\nvtk_type = \"UNSTRUCTURED_GRID\"",
            "module = \"neutrophil\"\nvariable = \"cells\"\nvtk_type = \"UNSTRUCTURED_GRID\"\nattributes = [\"granules\", \"age\"]",
        ] {
            with_visual(record).unwrap();
        }
    }

    #[test]
    fn geometry_must_precede_modules_that_read_tissue() {
        let text = BASE.replace(r#"["geometry", "molecules", "fungus"]"#, r#"["molecules", "geometry", "fungus"]"#);
        let err = SimulationConfig::from_toml_str(&text).unwrap_err();
        assert_eq!(invalid_field(err), "simulation.modules");

        let text = BASE.replace(r#"["geometry", "molecules", "fungus"]"#, r#"["molecules", "fungus"]"#);
        SimulationConfig::from_toml_str(&text).unwrap();
    }

    #[test]
    fn output_root_rebases_destinations() {
        let text = BASE.replace(r#""fungus"]"#, r#""fungus", "state_output"]"#)
            + "\n[state_output]\ntime_step = 1.0\n";
        let mut c = SimulationConfig::from_toml_str(&text).unwrap();
        c.set_output_root(std::path::Path::new("/tmp/run1"));
        assert_eq!(
            c.state_output.as_ref().unwrap().output_dir,
            std::path::PathBuf::from("/tmp/run1/state")
        );
    }

    #[test]
    fn serializes_back_to_equivalent_document() {
        let c = SimulationConfig::from_toml_str(BASE).unwrap();
        let text = c.to_toml_string().unwrap();
        assert_eq!(SimulationConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SimulationConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn shipped_default_config_is_valid() {
        let text = include_str!("../../../apps/nli-run/config/default.toml");
        let c = SimulationConfig::from_toml_str(text).unwrap();
        c.validate().unwrap();
        assert_eq!(c.simulation.target_time, Some(48.0));
        for m in &c.simulation.modules {
            assert!(c.section(m).is_some(), "no section for {m}");
        }
        assert_eq!(c.molecules.as_ref().unwrap().specs().len(), 3);
    }
}
