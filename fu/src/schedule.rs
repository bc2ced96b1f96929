use std::collections::{BTreeMap, BTreeSet};

/// Value copied into an operand wire of a scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandConnection {
    /// Operand receiving the value.
    pub id: u32,
    pub port_width: u32,
    pub operand_width: u32,
    /// Signal the value is taken from.
    pub signal: String,
    /// The connection carries a result of a sub-operation out of its parent.
    pub is_output: bool,
}

/// Result of an operation written into the pipeline of an output port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConnection {
    pub operand_width: u32,
    pub operand: u32,
    /// Cycle in which the result is produced.
    pub source_cycle: u32,
    /// Output pipeline register the result enters.
    pub pipeline_stage: u32,
    pub operation: String,
}

/// Placement of an operation, or an operation node of a decomposition, on the unit pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSchedule {
    /// Operation whose implementation is used.
    pub base_operation: String,
    pub initial_cycle: u32,
    pub final_cycle: u32,
    pub operands: Vec<OperandConnection>,
    pub results: BTreeSet<u32>,
    pub sub_operations: Vec<String>,
    /// First instance of each resource used by this schedule.
    pub resource_offsets: BTreeMap<String, u32>,
}

impl OperationSchedule {
    pub fn new(base_operation: impl Into<String>, initial_cycle: u32, final_cycle: u32) -> Self {
        OperationSchedule { base_operation: base_operation.into(), initial_cycle, final_cycle, ..Default::default() }
    }
}
