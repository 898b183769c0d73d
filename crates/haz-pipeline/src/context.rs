//! The mutable analysis state shared by the steps of one run.

use std::path::Path;

use haz_core::errors::{ErrorInfo, HazError};
use haz_table::{encode, write_bundle, Column, Table};
use tracing::{debug, info};

use crate::parallel::Coordinator;

/// Attribute key latitudes are persisted under.
pub const EX_LAT: &str = "exposure_latitude";
/// Attribute key longitudes are persisted under.
pub const EX_LONG: &str = "exposure_longitude";
/// Global entity index added when exposure is loaded.
pub const INTID: &str = "internal_id";

#[derive(Debug, Clone, Default, PartialEq)]
struct Coordinates {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
}

/// Per-entity attributes plus the entity coordinates.
///
/// Every attribute and both coordinate arrays hold one entry per entity.
/// Steps may break that briefly; [`Context::check_integrity`] runs between
/// steps and fails the run when they do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    attributes: Table,
    coordinates: Option<Coordinates>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// All per-entity attributes.
    pub fn attributes(&self) -> &Table {
        &self.attributes
    }

    /// Mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut Table {
        &mut self.attributes
    }

    /// Replaces every attribute at once.
    pub fn replace_attributes(&mut self, attributes: Table) {
        self.attributes = attributes;
    }

    /// Looks up one attribute.
    pub fn attribute(&self, name: &str) -> Option<&Column> {
        self.attributes.get(name)
    }

    /// True when an attribute called `name` exists.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Adds or replaces an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, column: Column) {
        self.attributes.insert(name, column);
    }

    /// Removes an attribute, returning it.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Column> {
        self.attributes.remove(name)
    }

    /// Sets both coordinate arrays, which must have equal length.
    pub fn set_coordinates(&mut self, latitude: Vec<f64>, longitude: Vec<f64>) -> Result<(), HazError> {
        if latitude.len() != longitude.len() {
            return Err(HazError::DataIntegrity(
                ErrorInfo::new("context.coordinate_mismatch", "latitude and longitude lengths differ")
                    .with_context("latitude", latitude.len().to_string())
                    .with_context("longitude", longitude.len().to_string()),
            ));
        }
        self.coordinates = Some(Coordinates { latitude, longitude });
        Ok(())
    }

    /// Entity latitudes, empty until coordinates are set.
    pub fn latitude(&self) -> &[f64] {
        self.coordinates.as_ref().map(|c| c.latitude.as_slice()).unwrap_or_default()
    }

    /// Entity longitudes, empty until coordinates are set.
    pub fn longitude(&self) -> &[f64] {
        self.coordinates.as_ref().map(|c| c.longitude.as_slice()).unwrap_or_default()
    }

    /// True once a load step has placed the entities.
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Verifies that every array holds the same number of entities and
    /// returns that number.
    ///
    /// The coordinates fix the count once set; before that the attributes
    /// must agree among themselves.
    pub fn check_integrity(&self) -> Result<usize, HazError> {
        let Some(coords) = &self.coordinates else {
            return self.attributes.row_count();
        };
        let expected = coords.latitude.len();
        if coords.longitude.len() != expected {
            return Err(length_mismatch(EX_LONG, expected, coords.longitude.len()));
        }
        for (name, column) in self.attributes.iter() {
            let found = column
                .checked_len()
                .map_err(|err| err.with_context("attribute", name))?;
            if found != expected {
                return Err(length_mismatch(name, expected, found));
            }
        }
        Ok(expected)
    }

    /// Number of entities; see [`Context::check_integrity`].
    pub fn entity_count(&self) -> Result<usize, HazError> {
        self.check_integrity()
    }

    /// The attributes with the coordinates appended under [`EX_LAT`] and
    /// [`EX_LONG`].
    pub fn to_table(&self) -> Result<Table, HazError> {
        self.check_integrity()?;
        let mut table = self.attributes.clone();
        if let Some(coords) = &self.coordinates {
            table.insert(EX_LAT, Column::Float(coords.latitude.clone()));
            table.insert(EX_LONG, Column::Float(coords.longitude.clone()));
        }
        Ok(table)
    }

    /// Collects the global table on the leader.
    ///
    /// Without `use_parallel` no collective runs and every worker gets its
    /// own local table back.
    pub fn gather(
        &self,
        coordinator: &dyn Coordinator,
        use_parallel: bool,
    ) -> Result<Option<Table>, HazError> {
        let local = self.to_table()?;
        if use_parallel {
            coordinator.gather(local)
        } else {
            Ok(Some(local))
        }
    }

    /// Gathers the entities and writes them to `path` from the leader only.
    ///
    /// `.csv` and `.txt` go through the text codec (vector attributes are
    /// averaged), `.json` through the array bundle. Returns what
    /// [`Context::gather`] returned.
    pub fn save_exposure_atts(
        &self,
        path: &Path,
        coordinator: &dyn Coordinator,
        use_parallel: bool,
    ) -> Result<Option<Table>, HazError> {
        let format = PersistFormat::from_path(path)?;
        let gathered = self.gather(coordinator, use_parallel)?;
        match &gathered {
            Some(table) if coordinator.is_leader() => {
                match format {
                    PersistFormat::Text => encode(table, path)?,
                    PersistFormat::Bundle => write_bundle(table, path)?,
                }
                info!(path = %path.display(), entities = table.row_count()?, "saved exposure");
            }
            _ => debug!(rank = coordinator.rank(), "not the leader, skipping write"),
        }
        Ok(gathered)
    }
}

fn length_mismatch(attribute: &str, expected: usize, found: usize) -> HazError {
    HazError::DataIntegrity(
        ErrorInfo::new("context.length_mismatch", "attribute length differs from entity count")
            .with_context("attribute", attribute)
            .with_context("expected", expected.to_string())
            .with_context("found", found.to_string()),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PersistFormat {
    Text,
    Bundle,
}

impl PersistFormat {
    fn from_path(path: &Path) -> Result<Self, HazError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") | Some("txt") => Ok(PersistFormat::Text),
            Some("json") => Ok(PersistFormat::Bundle),
            _ => Err(HazError::Configuration(
                ErrorInfo::new("context.unsupported_extension", "cannot tell the output format from the file name")
                    .with_path(path)
                    .with_hint("use a .csv, .txt or .json file name"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_entities() {
        assert_eq!(Context::new().check_integrity().unwrap(), 0);
    }

    #[test]
    fn coordinates_fix_the_entity_count() {
        let mut context = Context::new();
        context.set_coordinates(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        context.set_attribute("a", Column::Float(vec![1.0, 2.0, 3.0]));
        let err = context.check_integrity().unwrap_err();
        assert_eq!(err.code(), "context.length_mismatch");
        assert_eq!(err.info().context["attribute"], "a");
        assert_eq!(err.info().context["expected"], "2");
    }

    #[test]
    fn partial_vector_blocks_fail_integrity() {
        let mut context = Context::new();
        context.set_coordinates(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        context.set_attribute(
            "v",
            Column::Vector {
                width: 2,
                values: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            },
        );
        let err = context.check_integrity().unwrap_err();
        assert_eq!(err.code(), "table.partial_block");
        assert_eq!(err.info().context["attribute"], "v");
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let err = PersistFormat::from_path(Path::new("out.npz")).unwrap_err();
        assert_eq!(err.code(), "context.unsupported_extension");
    }
}
