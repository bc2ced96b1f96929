//! Implementation database entries: how each base operation is realized in each dialect.

use std::path::PathBuf;

use hwgen_hdl::{Dialect, VariableKind};

use crate::Direction;

/// Where the lines of a snippet come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetSource {
    File(PathBuf),
    Inline(String),
}

/// Variable or signal declared by an operation snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdbVariable {
    pub name: String,
    pub width: u32,
    pub kind: VariableKind,
    /// Give each operation instance its own copy, named `<operation>_<name>`.
    pub rename: bool,
}

impl HdbVariable {
    pub fn new(name: impl Into<String>, width: u32, kind: VariableKind) -> Self {
        HdbVariable { name: name.into().to_ascii_lowercase(), width, kind, rename: false }
    }

    pub fn renamed(mut self) -> Self {
        self.rename = true;
        self
    }
}

/// Snippets of one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippets {
    /// Runs in the cycle the operation starts.
    pub implementation: Option<SnippetSource>,
    /// Runs every cycle regardless of the opcode.
    pub initial: Option<SnippetSource>,
    /// Runs in the cycle the operation finishes.
    pub post_op: Option<SnippetSource>,
    pub variables: Vec<HdbVariable>,
    pub global_signals: Vec<HdbVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePort {
    pub name: String,
    pub direction: Direction,
    pub width: u32,
    pub vector: bool,
}

/// File that has to be shipped alongside the generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

/// Sub-module instantiated by an operation, such as a hard multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    /// Instances one operation needs.
    pub count: u32,
    pub ports: Vec<ResourcePort>,
    pub synthesis_files: Vec<ResourceFile>,
    pub simulation_files: Vec<ResourceFile>,
}

/// Port towards the outside of the processor, such as a memory bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPort {
    pub name: String,
    pub direction: Direction,
    /// May refer to `addrw_c`.
    pub width: String,
    /// Value driven by output ports while no operation uses them.
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdbEntry {
    pub operation: String,
    /// Cycles between the start of the operation and its results.
    pub latency: u32,
    pub vhdl: Option<Snippets>,
    pub verilog: Option<Snippets>,
    pub resources: Vec<Resource>,
    pub interface: Vec<ExternalPort>,
}

impl HdbEntry {
    pub fn new(operation: impl Into<String>, latency: u32) -> Self {
        HdbEntry {
            operation: operation.into().to_ascii_lowercase(),
            latency,
            vhdl: None,
            verilog: None,
            resources: Vec::new(),
            interface: Vec::new(),
        }
    }

    pub fn snippets(&self, dialect: Dialect) -> Option<&Snippets> {
        match dialect {
            Dialect::Vhdl => self.vhdl.as_ref(),
            Dialect::Verilog => self.verilog.as_ref(),
        }
    }
}

/// Operation implementations selected for one function unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuImplementation {
    pub name: String,
    pub operations: Vec<HdbEntry>,
}

impl FuImplementation {
    pub fn new(name: impl Into<String>) -> Self {
        FuImplementation { name: name.into(), operations: Vec::new() }
    }

    pub fn entry(&self, operation: &str) -> Option<&HdbEntry> {
        self.operations.iter().find(|entry| entry.operation.eq_ignore_ascii_case(operation))
    }
}
