use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A subchart listed in the chart's requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDependency {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub repository: String,
}

/// An in-memory chart as returned by the chart loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub metadata: ChartMetadata,
    #[serde(default)]
    pub dependencies: Vec<ChartDependency>,
}

impl Chart {
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}
