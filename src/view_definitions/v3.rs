//! Version 3: typed clauses and splits, single or multi measure mode

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definitions::{
    clause_from_definition, clause_to_definition, split_from_definition, split_to_definition,
    ClauseDefinition, SplitDefinition,
};
use super::error::ConversionError;
use super::{ViewDefinitionDecoder, ViewDefinitionEncoder, ViewDefinitionVersion};
use crate::data_cube::DataCube;
use crate::essence::{Essence, EssenceParams};
use crate::filter::Filter;
use crate::series::SeriesList;
use crate::splits::Splits;
use crate::time::parse_timezone;
use crate::time_shift::TimeShift;
use crate::visualization::Visualization;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition3 {
    pub visualization: Visualization,
    pub timezone: String,
    #[serde(default)]
    pub filters: Vec<ClauseDefinition>,
    #[serde(default)]
    pub splits: Vec<SplitDefinition>,
    pub measures: MeasuresDefinition,
    #[serde(default)]
    pub pinned_dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<String>,
}

/// Either one measure or a list of them, whichever `is_multi` selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuresDefinition {
    pub is_multi: bool,
    pub single: String,
    #[serde(default)]
    pub multi: Vec<String>,
}

pub struct ViewDefinitionConverter3;

impl ViewDefinitionDecoder for ViewDefinitionConverter3 {
    const VERSION: ViewDefinitionVersion = ViewDefinitionVersion::V3;

    type Definition = ViewDefinition3;

    fn from_view_definition(
        definition: ViewDefinition3,
        data_cube: Arc<DataCube>,
    ) -> Result<Essence, ConversionError> {
        let timezone = parse_timezone(&definition.timezone)?;
        let time_shift = TimeShift::parse(definition.time_shift.as_deref().unwrap_or_default())?;
        let clauses = definition
            .filters
            .into_iter()
            .map(|clause| clause_from_definition(clause, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;
        let splits = definition
            .splits
            .into_iter()
            .map(|split| split_from_definition(split, &data_cube))
            .collect::<Result<Vec<_>, _>>()?;
        let measures = definition.measures;
        let series = if measures.is_multi {
            SeriesList::from_measures(measures.multi)
        } else {
            SeriesList::from_measures([measures.single])
        };

        Ok(Essence::new(EssenceParams {
            visualization: Some(definition.visualization),
            visualization_settings: None,
            timezone: Some(timezone),
            filter: Filter::from_clauses(clauses),
            time_shift,
            splits: Splits::from_splits(splits),
            series,
            pinned_dimensions: definition.pinned_dimensions,
            pinned_sort: definition.pinned_sort,
            data_cube,
        }))
    }
}

impl ViewDefinitionEncoder for ViewDefinitionConverter3 {
    /// Quantile and expression series degrade to their measure
    fn to_view_definition(essence: &Essence) -> ViewDefinition3 {
        let mut multi: Vec<String> = Vec::new();
        for series in essence.series().iter() {
            let reference = series.reference().to_string();
            if !multi.contains(&reference) {
                multi.push(reference);
            }
        }
        let single = multi
            .first()
            .cloned()
            .or_else(|| essence.data_cube().default_sort_measure().map(str::to_string))
            .unwrap_or_default();

        ViewDefinition3 {
            visualization: essence.visualization(),
            timezone: essence.timezone().name().to_string(),
            filters: essence.filter().iter().map(clause_to_definition).collect(),
            splits: essence.splits().iter().map(split_to_definition).collect(),
            measures: MeasuresDefinition {
                is_multi: true,
                single,
                multi,
            },
            pinned_dimensions: essence.pinned_dimensions().to_vec(),
            pinned_sort: essence.pinned_sort().map(str::to_string),
            time_shift: essence.time_shift().value().map(ToString::to_string),
        }
    }
}
