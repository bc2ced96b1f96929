use std::collections::BTreeMap;

use crate::{Dag, Error};

/// Whether an operand or port carries data into or out of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl From<Direction> for hwgen_hdl::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Input => hwgen_hdl::Direction::In,
            Direction::Output => hwgen_hdl::Direction::Out,
        }
    }
}

/// Operand of an operation definition. Operand ids start at 1, inputs first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub id: u32,
    pub width: u32,
    pub direction: Direction,
}

/// Architecture independent definition of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDef {
    pub name: String,
    pub operands: Vec<Operand>,
    /// Alternative decompositions into other operations, in order of preference.
    pub dags: Vec<Dag>,
}

impl OperationDef {
    pub fn new(name: impl Into<String>) -> Self {
        OperationDef { name: name.into().to_ascii_lowercase(), operands: Vec::new(), dags: Vec::new() }
    }

    pub fn input(mut self, width: u32) -> Self {
        let id = self.operands.len() as u32 + 1;
        self.operands.push(Operand { id, width, direction: Direction::Input });
        self
    }

    pub fn output(mut self, width: u32) -> Self {
        let id = self.operands.len() as u32 + 1;
        self.operands.push(Operand { id, width, direction: Direction::Output });
        self
    }

    pub fn dag(mut self, dag: Dag) -> Self {
        self.dags.push(dag);
        self
    }

    pub fn operand(&self, id: u32) -> Option<&Operand> {
        self.operands.iter().find(|operand| operand.id == id)
    }
}

/// Operation definitions, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationPool {
    operations: BTreeMap<String, OperationDef>,
}

impl OperationPool {
    pub fn new() -> Self {
        OperationPool::default()
    }

    pub fn add(&mut self, operation: OperationDef) -> &mut Self {
        self.operations.insert(operation.name.clone(), operation);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperationDef> {
        self.operations.get(&name.to_ascii_lowercase())
    }

    pub fn operation(&self, name: &str) -> Result<&OperationDef, Error> {
        self.get(name).ok_or_else(|| Error::UnknownOperation(name.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuPort {
    pub name: String,
    pub width: u32,
    pub direction: Direction,
    /// Writing this port starts an operation.
    pub triggering: bool,
    /// The port value is used directly instead of through a shadow register.
    pub no_register: bool,
}

impl FuPort {
    pub fn input(name: impl Into<String>, width: u32) -> Self {
        FuPort { name: name.into(), width, direction: Direction::Input, triggering: false, no_register: false }
    }

    pub fn output(name: impl Into<String>, width: u32) -> Self {
        FuPort { name: name.into(), width, direction: Direction::Output, triggering: false, no_register: false }
    }

    pub fn triggering(mut self) -> Self {
        self.triggering = true;
        self
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }
}

/// Binding of an operand to a unit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandBinding {
    pub operand: u32,
    pub port: String,
    /// Cycles after the trigger at which the result is readable; only meaningful for results.
    pub latency: u32,
}

/// Operation as implemented by a particular function unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwOperation {
    pub name: String,
    pub bindings: Vec<OperandBinding>,
}

impl HwOperation {
    pub fn new(name: impl Into<String>) -> Self {
        HwOperation { name: name.into().to_ascii_lowercase(), bindings: Vec::new() }
    }

    pub fn bind(mut self, operand: u32, port: impl Into<String>) -> Self {
        self.bindings.push(OperandBinding { operand, port: port.into(), latency: 0 });
        self
    }

    pub fn bind_result(mut self, operand: u32, port: impl Into<String>, latency: u32) -> Self {
        self.bindings.push(OperandBinding { operand, port: port.into(), latency });
        self
    }

    pub fn operand_count(&self) -> u32 {
        self.bindings.iter().map(|binding| binding.operand).max().unwrap_or(0)
    }

    pub fn binding(&self, operand: u32) -> Result<&OperandBinding, Error> {
        self.bindings
            .iter()
            .find(|binding| binding.operand == operand)
            .ok_or_else(|| Error::UnboundOperand { operation: self.name.clone(), operand })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    pub name: String,
    pub min_address: u64,
    pub max_address: u64,
}

impl AddressSpace {
    /// Bits needed to address every location of the space.
    pub fn address_width(&self) -> Result<u32, Error> {
        if self.min_address > self.max_address {
            return Err(Error::InvalidAddressSpace(self.name.clone()));
        }
        Ok((u64::BITS - self.max_address.leading_zeros()).max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionUnit {
    pub name: String,
    pub ports: Vec<FuPort>,
    pub operations: Vec<HwOperation>,
    pub address_space: Option<AddressSpace>,
}

impl FunctionUnit {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionUnit { name: name.into(), ports: Vec::new(), operations: Vec::new(), address_space: None }
    }

    pub fn port(&self, name: &str) -> Result<&FuPort, Error> {
        self.ports
            .iter()
            .find(|port| port.name == name)
            .ok_or_else(|| Error::UnknownPort { unit: self.name.clone(), port: name.to_owned() })
    }

    pub fn operation(&self, name: &str) -> Option<&HwOperation> {
        self.operations.iter().find(|operation| operation.name.eq_ignore_ascii_case(name))
    }
}

/// The architecture: function units and the operations they may implement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Machine {
    pub function_units: Vec<FunctionUnit>,
    pub operations: OperationPool,
}

impl Machine {
    pub fn function_unit(&self, name: &str) -> Result<&FunctionUnit, Error> {
        self.function_units
            .iter()
            .find(|unit| unit.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownUnit(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_width() {
        let space = |max_address| AddressSpace { name: "data".into(), min_address: 0, max_address };
        assert_eq!(space(0).address_width().unwrap(), 1);
        assert_eq!(space(255).address_width().unwrap(), 8);
        assert_eq!(space(256).address_width().unwrap(), 9);
        let bad = AddressSpace { name: "data".into(), min_address: 4, max_address: 1 };
        assert!(matches!(bad.address_width(), Err(Error::InvalidAddressSpace(_))));
    }
}
