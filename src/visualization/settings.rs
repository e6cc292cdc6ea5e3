//! Per-visualization display settings

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Visualization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSettings {
    #[serde(default)]
    pub collapse_rows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChartSettings {
    #[serde(default)]
    pub group_series: bool,
}

/// Settings object; its variant always matches the Essence's visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSettings {
    Table(TableSettings),
    LineChart(LineChartSettings),
    /// Visualizations without settings
    None,
}

impl VisualizationSettings {
    pub fn defaults(visualization: Visualization) -> Self {
        match visualization {
            Visualization::Table => VisualizationSettings::Table(TableSettings::default()),
            Visualization::LineChart => {
                VisualizationSettings::LineChart(LineChartSettings::default())
            }
            _ => VisualizationSettings::None,
        }
    }

    /// Check if these settings belong to `visualization`
    pub fn matches(&self, visualization: Visualization) -> bool {
        matches!(
            (self, visualization),
            (VisualizationSettings::Table(_), Visualization::Table)
                | (VisualizationSettings::LineChart(_), Visualization::LineChart)
                | (
                    VisualizationSettings::None,
                    Visualization::Totals | Visualization::BarChart | Visualization::HeatMap
                )
        )
    }

    /// Read settings for `visualization`, falling back to its defaults when
    /// absent or malformed
    pub fn from_json(visualization: Visualization, value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::defaults(visualization);
        };
        let parsed = match visualization {
            Visualization::Table => {
                TableSettings::deserialize(value).map(VisualizationSettings::Table)
            }
            Visualization::LineChart => {
                LineChartSettings::deserialize(value).map(VisualizationSettings::LineChart)
            }
            _ => Ok(VisualizationSettings::None),
        };
        parsed.unwrap_or_else(|e| {
            tracing::warn!(
                visualization = visualization.name(),
                error = %e,
                "ignoring malformed visualization settings"
            );
            Self::defaults(visualization)
        })
    }

    /// Serialized form; `None` for visualizations without settings
    pub fn to_json(&self) -> Option<Value> {
        match self {
            VisualizationSettings::Table(s) => serde_json::to_value(s).ok(),
            VisualizationSettings::LineChart(s) => serde_json::to_value(s).ok(),
            VisualizationSettings::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match() {
        for vis in Visualization::ALL {
            assert!(VisualizationSettings::defaults(vis).matches(vis));
        }
        assert!(!VisualizationSettings::defaults(Visualization::Table).matches(Visualization::LineChart));
    }

    #[test]
    fn test_from_json() {
        let table = VisualizationSettings::from_json(
            Visualization::Table,
            Some(&json!({"collapseRows": true})),
        );
        assert_eq!(
            table,
            VisualizationSettings::Table(TableSettings { collapse_rows: true })
        );
        assert_eq!(table.to_json(), Some(json!({"collapseRows": true})));

        let malformed =
            VisualizationSettings::from_json(Visualization::LineChart, Some(&json!({"groupSeries": 3})));
        assert_eq!(malformed, VisualizationSettings::defaults(Visualization::LineChart));
        assert_eq!(
            VisualizationSettings::from_json(Visualization::Totals, None).to_json(),
            None
        );
    }
}
