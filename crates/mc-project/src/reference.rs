//! Loading reference tables named by goals and path constraints.

use std::path::Path;

use mc_model::{JointKind, Model};
use mc_table::table::IN_DEGREES_KEY;
use mc_table::{TimeSeriesTable, filter_lowpass, read_csv, read_json, read_sto};
use tracing::debug;

use crate::schema::ReferenceDef;
use crate::{ProjectError, ProjectResult};

/// Resolve a reference against `base_dir`. Tables flagged `inDegrees` have
/// their rotational coordinate columns converted to radians.
pub fn load_reference(
    def: &ReferenceDef,
    base_dir: &Path,
    model: &Model,
) -> ProjectResult<TimeSeriesTable> {
    let table = match def {
        ReferenceDef::Inline(table) => table.clone(),
        ReferenceDef::File {
            file,
            lowpass_cutoff_hz,
        } => {
            let path = base_dir.join(file);
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            let table = match ext.as_deref() {
                Some("sto" | "mot") => read_sto(&path)?,
                Some("csv") => read_csv(&path)?,
                Some("json") => read_json(&path)?,
                _ => {
                    return Err(ProjectError::Reference {
                        path: path.display().to_string(),
                        what: "expected a .sto, .mot, .csv or .json file".to_string(),
                    });
                }
            };
            debug!(path = %path.display(), rows = table.num_rows(), "loaded reference");
            match lowpass_cutoff_hz {
                Some(cutoff) => filter_lowpass(&table, *cutoff, true)?,
                None => table,
            }
        }
    };

    if table.in_degrees() {
        to_radians(&table, model)
    } else {
        Ok(table)
    }
}

fn to_radians(table: &TimeSeriesTable, model: &Model) -> ProjectResult<TimeSeriesTable> {
    let rotational: Vec<String> = model
        .coordinates()
        .iter()
        .filter(|c| {
            model.joints().get(c.joint.index() as usize).is_some_and(|j| match j.kind {
                JointKind::Pin => true,
                JointKind::Planar => j.coordinates.first() == Some(&c.id),
                _ => false,
            })
        })
        .flat_map(|c| [c.value_state_name(), c.speed_state_name()])
        .collect();

    let mut data = table.data().clone();
    for (col, label) in table.labels().iter().enumerate() {
        if rotational.contains(label) {
            data.column_mut(col).scale_mut(std::f64::consts::PI / 180.0);
        }
    }

    let mut converted = TimeSeriesTable::new(table.times().to_vec(), table.labels().to_vec(), data)?;
    for (key, value) in table.metadata_entries() {
        converted.set_metadata(key, value);
    }
    converted.set_metadata(IN_DEGREES_KEY, "no");
    Ok(converted)
}
