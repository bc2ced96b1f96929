//! This library reads the description of the units to generate from a JSON document.
//!
//! The document has the following top level fields, all optional:
//!
//! * `operations`: operation definitions with `name`, `inputs` and `outputs` (operand widths, in
//!   operand order) and `dags` (decompositions, as `nodes` and `edges`);
//! * `function_units`: units with their `ports`, `operations` (operand to port `bindings`) and
//!   `address_space`;
//! * `register_files`: register files with `size`, `width`, `ports` and guard settings;
//! * `hdb`: implementation database entries, keyed by function unit name;
//! * `generate`: the `fu` and `rf` names to generate; every unit is generated when a list is
//!   absent.

use std::io;

use hwgen_fu::{FuImplementation, Machine};
use hwgen_rf::RegisterFile;

mod error;
mod field;
mod import;

pub use error::ImportError;

#[derive(Debug, Clone, Default)]
pub struct Description {
    pub machine: Machine,
    pub implementations: Vec<FuImplementation>,
    pub register_files: Vec<RegisterFile>,
    pub generate_fu: Vec<String>,
    pub generate_rf: Vec<String>,
}

impl Description {
    /// Implementation database entries of `unit`; a unit without entries gets an empty set.
    pub fn implementation(&self, unit: &str) -> FuImplementation {
        self.implementations
            .iter()
            .find(|implementation| implementation.name.eq_ignore_ascii_case(unit))
            .cloned()
            .unwrap_or_else(|| FuImplementation::new(unit))
    }

    pub fn register_file(&self, name: &str) -> Option<&RegisterFile> {
        self.register_files.iter().find(|rf| rf.name.eq_ignore_ascii_case(name))
    }
}

pub fn import(reader: &mut impl io::Read) -> Result<Description, ImportError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let value = jzon::parse(&text)?;
    let description = import::description(&field::Field::root(&value))?;
    tracing::debug!(
        units = description.machine.function_units.len(),
        register_files = description.register_files.len(),
        "description imported"
    );
    Ok(description)
}
