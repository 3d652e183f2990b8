//! Shared test helpers for integration tests
//!
//! Fixtures describe a small two-layer road section with two background
//! datasets; they are written as JSON files into a temp directory.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a uqlca command
pub fn uqlca() -> Command {
    Command::new(cargo::cargo_bin!("uqlca"))
}

pub const LAYERS_JSON: &str = r#"{
  "layers": [
    {
      "name": "Asphalt Concrete",
      "abbreviation": "AC",
      "materials": [
        {"name": "bitumen", "composition": 0.05, "transport_distance_a2": 250, "mass_a2": 50},
        {"name": "gravel", "composition": 0.95, "transport_distance_a2": 40, "mass_a2": 950}
      ],
      "energy_used_a3": "thermal_energy",
      "energy_consumption_a3": 280,
      "transport_distance_a4": 30,
      "construction_a5": [
        {"name": "paver", "number": 1, "productivity": 150, "productivity_unit": "t/h",
         "energy_type": "diesel", "energy": 18, "energy_unit": "kg/h"},
        {"name": "roller", "number": 2, "productivity": 900, "productivity_unit": "m2/h",
         "energy_type": "diesel", "energy": 6, "energy_unit": "kg/h"}
      ],
      "quantity_a5_ton": 1,
      "quantity_a5_m2": 1
    },
    {
      "name": "Crushed Stone Base",
      "abbreviation": "CSB",
      "materials": [
        {"name": "gravel", "composition": 1.0, "transport_distance_a2": 25, "mass_a2": 1000}
      ],
      "energy_used_a3": "electricity",
      "energy_consumption_a3": 3.5,
      "transport_distance_a4": 20,
      "construction_a5": [
        {"name": "grader", "number": 1, "productivity": 120, "productivity_unit": "m3/h",
         "energy_type": "diesel", "energy": 14, "energy_unit": "kg/h"}
      ],
      "quantity_a5_ton": 1,
      "quantity_a5_m2": 1
    }
  ]
}"#;

/// Emission factors; `scale` multiplies every mean
pub fn factors_json(scale: f64, cov: f64) -> String {
    let factors = [
        ("bitumen", 0.55, 0.52, 0.02, 0.01, "kg"),
        ("gravel", 0.004, 0.0038, 0.0001, 0.0001, "kg"),
        ("diesel", 3.2, 3.1, 0.08, 0.02, "kg"),
        ("thermal_energy", 0.07, 0.069, 0.0005, 0.0005, "MJ"),
        ("electricity", 0.45, 0.40, 0.03, 0.02, "kWh"),
    ];
    let entries: Vec<String> = factors
        .iter()
        .map(|(name, total, fossil, biogenic, luluc, unit)| {
            format!(
                r#"{{"material": "{}", "mean_total": {}, "mean_fossil": {}, "mean_biogenic": {}, "mean_luluc": {}, "cov": {}, "unit": "{}"}}"#,
                name,
                total * scale,
                fossil * scale,
                biogenic * scale,
                luluc * scale,
                cov,
                unit
            )
        })
        .collect();
    format!(r#"{{"emission_factors": [{}]}}"#, entries.join(",\n"))
}

pub const DESIGNS_JSON: &str = r#"{
  "design_options": [
    {"name": "Option 1", "layer_type": [
      {"name": "Asphalt Concrete", "thickness": 0.08, "quantity": 0, "density": 2.4},
      {"name": "Crushed Stone Base", "thickness": 0.25, "quantity": 0, "density": 2.2}
    ]},
    {"name": "Option 2", "layer_type": [
      {"name": "Asphalt Concrete", "thickness": 0.12, "quantity": 0, "density": 2.4},
      {"name": "Crushed Stone Base", "thickness": 0.15, "quantity": 0, "density": 2.2}
    ]}
  ]
}"#;

/// Design options where one layer is absent from the catalog
pub const DESIGNS_WITH_GHOST_JSON: &str = r#"{
  "design_options": [
    {"name": "Option 1", "layer_type": [
      {"name": "Asphalt Concrete", "thickness": 0.08, "quantity": 0, "density": 2.4},
      {"name": "Ghost Layer", "thickness": 0.1, "quantity": 0, "density": 1.8}
    ]}
  ]
}"#;

/// Input files of a test run
pub struct Inputs {
    pub dir: TempDir,
}

impl Inputs {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn layers(&self) -> String {
        self.path("layers.json").display().to_string()
    }

    pub fn designs(&self) -> String {
        self.path("designs.json").display().to_string()
    }

    /// `NAME=PATH` argument for a dataset file
    pub fn factors(&self, name: &str) -> String {
        format!("{}={}", name, self.path(&format!("{}.json", name)).display())
    }

    pub fn write(&self, name: &str, content: &str) -> String {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }
}

/// Helper to write the standard fixtures into a temp directory
pub fn setup_inputs() -> Inputs {
    let inputs = Inputs {
        dir: TempDir::new().unwrap(),
    };
    inputs.write("layers.json", LAYERS_JSON);
    inputs.write("designs.json", DESIGNS_JSON);
    inputs.write("ghost_designs.json", DESIGNS_WITH_GHOST_JSON);
    inputs.write("ecoinvent.json", &factors_json(1.0, 0.1));
    inputs.write("gabi.json", &factors_json(1.6, 0.1));
    inputs
}
