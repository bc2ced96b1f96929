use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hwgen_hdl::{Dialect, Module, write_atomically};

use crate::generator::FuGen;
use crate::snippet::find_file;
use crate::{Error, ExternalSignal, OperationSchedule};

/// File shipped with a generated unit, copied from the implementation database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCopy {
    pub source: PathBuf,
    /// Relative to the output directory.
    pub destination: PathBuf,
}

/// Generated source other than the unit itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryFile {
    /// Relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

/// Everything produced for one function unit.
#[derive(Debug)]
pub struct GeneratedUnit {
    pub name: String,
    pub dialect: Dialect,
    pub module: Module,
    /// Operations of the unit in opcode order.
    pub operations: Vec<String>,
    /// Operations and the sub-operations of their decompositions.
    pub schedules: BTreeMap<String, OperationSchedule>,
    pub external_signals: Vec<ExternalSignal>,
    pub copies: Vec<FileCopy>,
    pub auxiliary_files: Vec<AuxiliaryFile>,
}

impl GeneratedUnit {
    pub(crate) fn new(generator: FuGen<'_>) -> Result<Self, Error> {
        let mut copies = Vec::new();
        for base in generator.base_operations.values() {
            for resource in base.resources() {
                for file in resource.synthesis_files.iter().filter(|file| file.dialect == generator.dialect) {
                    copies.push(resource_copy(&file.path, PathBuf::from(file.dialect.directory()), &generator)?);
                }
                for file in resource.simulation_files.iter().filter(|file| file.dialect == generator.dialect) {
                    let directory = Path::new("blackbox").join(file.dialect.directory());
                    copies.push(resource_copy(&file.path, directory, &generator)?);
                }
            }
        }
        copies.dedup();

        let auxiliary_files = generator.coprocessor_files();
        Ok(GeneratedUnit {
            name: generator.module.name().to_owned(),
            dialect: generator.dialect,
            module: generator.module,
            operations: generator.operations,
            schedules: generator.schedules,
            external_signals: generator.external_signals,
            copies,
            auxiliary_files,
        })
    }

    /// Path of the unit source relative to the output directory.
    pub fn path(&self) -> PathBuf {
        Path::new(self.dialect.directory()).join(format!("{}.{}", self.name, self.dialect.extension()))
    }

    pub fn render(&mut self) -> Result<String, Error> {
        Ok(self.module.render(self.dialect)?)
    }

    /// Writes the unit and its companion files below `directory`. Companion files that already
    /// exist are left alone.
    pub fn write_to(&mut self, directory: &Path) -> Result<PathBuf, Error> {
        let text = self.render()?;
        let path = directory.join(self.path());
        write_atomically(&path, &text).map_err(|error| Error::io(&path, error))?;

        for copy in &self.copies {
            let destination = directory.join(&copy.destination);
            if destination.exists() {
                continue;
            }
            create_parent(&destination)?;
            fs::copy(&copy.source, &destination).map_err(|error| Error::io(&destination, error))?;
        }
        for file in &self.auxiliary_files {
            let destination = directory.join(&file.path);
            if destination.exists() {
                continue;
            }
            write_atomically(&destination, &file.contents).map_err(|error| Error::io(&destination, error))?;
        }
        tracing::debug!(unit = %self.name, path = %path.display(), "unit written");
        Ok(path)
    }
}

fn resource_copy(source: &Path, directory: PathBuf, generator: &FuGen<'_>) -> Result<FileCopy, Error> {
    let source = find_file(source, &generator.options.search_paths)?;
    let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();
    Ok(FileCopy { destination: directory.join(file_name), source })
}

fn create_parent(path: &Path) -> Result<(), Error> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|error| Error::io(parent, error)),
        None => Ok(()),
    }
}
