//! This library generates function units: pipelined datapath modules that execute a fixed set of
//! operations.
//!
//! A [`FunctionUnit`] of a [`Machine`] binds operation operands to ports and says in which cycle
//! each result appears. A [`FuImplementation`] supplies, for each base operation, HDL snippets in
//! the implementation database form ([`HdbEntry`]); operations without an entry are built out of
//! base operations following one of their decompositions ([`Dag`]). [`generate`] schedules every
//! operation onto the unit pipeline and assembles a [`hwgen_hdl::Module`] around the snippets.

mod error;
mod machine;
mod dag;
mod hdb;
mod options;
mod snippet;
mod template;
mod schedule;
mod names;
mod generator;
mod interface;
mod pipeline;
mod operations;
mod coprocessor;
mod output;

pub use error::Error;
pub use machine::{
    Direction, Operand, OperationDef, OperationPool, FuPort, OperandBinding, HwOperation, AddressSpace, FunctionUnit,
    Machine,
};
pub use dag::{DagNode, DagEdge, Dag, required_bits_signed};
pub use hdb::{
    SnippetSource, HdbVariable, Snippets, ResourcePort, ResourceFile, Resource, ExternalPort, HdbEntry, FuImplementation,
};
pub use options::{Registration, CoprocessorMode, CoprocessorLimits, GeneratorOptions};
pub use template::Template;
pub use schedule::{OperandConnection, OutputConnection, OperationSchedule};
pub use interface::{LsuSignal, ExternalSignal};
pub use output::{FileCopy, AuxiliaryFile, GeneratedUnit};

/// Generates the function unit named by `implementation`.
pub fn generate(
    options: &GeneratorOptions,
    machine: &Machine,
    implementation: &FuImplementation,
) -> Result<GeneratedUnit, Error> {
    let build = || {
        let unit = machine.function_unit(&implementation.name)?;
        let mut generator = generator::FuGen::new(options, machine, unit, implementation)?;
        generator.run()?;
        GeneratedUnit::new(generator)
    };
    build().map_err(|error| error.in_unit(&implementation.name))
}
