use serde::Deserialize;

/// A row of `relative_imbalance_data.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImbalanceRecord {
    /// Scenario the allocation was computed for
    pub scenario: String,
    /// Client label, usually one of [`CLIENT_PLOT_ORDER`](crate::analysis::constants::CLIENT_PLOT_ORDER)
    pub client: String,
    /// Allocation method identifier (e.g. `shapley`, `VCG`)
    pub allocation: String,
    /// Relative imbalance of this client under this allocation
    pub value: f64,
    /// Scenario-wide average relative imbalance; constant within a scenario
    pub average_relative_imbalance: f64,
}

/// A row of `excess_data.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExcessRecord {
    /// Scenario the allocation was computed for
    pub scenario: String,
    /// Allocation method identifier
    pub allocation: String,
    /// Maximum instability (excess) of the allocation
    pub max_instability: f64,
}

/// Common view over the input tables.
pub trait ScenarioRecord {
    /// Header names that must be present in the CSV file
    const COLUMNS: &'static [&'static str];

    fn scenario(&self) -> &str;
    fn allocation(&self) -> &str;
}

impl ScenarioRecord for ImbalanceRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Scenario",
        "Client",
        "Allocation",
        "Value",
        "AverageRelativeImbalance",
    ];

    fn scenario(&self) -> &str {
        &self.scenario
    }

    fn allocation(&self) -> &str {
        &self.allocation
    }
}

impl ScenarioRecord for ExcessRecord {
    const COLUMNS: &'static [&'static str] = &["Scenario", "Allocation", "MaxInstability"];

    fn scenario(&self) -> &str {
        &self.scenario
    }

    fn allocation(&self) -> &str {
        &self.allocation
    }
}
