use std::collections::BTreeMap;

use hwgen_hdl::{IntegerConstant, Module, Port, Width, Wire};

use crate::generator::FuGen;
use crate::names::resource_wire;
use crate::snippet::Replace;
use crate::Direction;

/// Role of a port on a byte masked memory bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LsuSignal {
    AValid,
    AReady,
    AAddr,
    AWren,
    AStrb,
    RValid,
    RReady,
    RData,
    AData,
}

impl LsuSignal {
    /// Checked in order; the first one contained in a port name wins.
    const MAGIC_WORDS: &[(&str, LsuSignal)] = &[
        ("avalid", LsuSignal::AValid),
        ("aready", LsuSignal::AReady),
        ("aaddr", LsuSignal::AAddr),
        ("awren", LsuSignal::AWren),
        ("astrb", LsuSignal::AStrb),
        ("rvalid", LsuSignal::RValid),
        ("rready", LsuSignal::RReady),
        ("rdata", LsuSignal::RData),
        ("adata", LsuSignal::AData),
    ];

    pub fn infer(port_name: &str) -> Option<LsuSignal> {
        Self::MAGIC_WORDS.iter().find(|(word, _)| port_name.contains(word)).map(|&(_, signal)| signal)
    }
}

/// Names of operations that only a load/store unit implements.
const MEMORY_OPERATIONS: &[&str] = &[
    "ldw", "ldh", "ldq", "ldhu", "ldqu", "ld8", "ld16", "ld32", "ld64", "ldu8", "ldu16", "ldu32", "stw", "sth", "stq",
    "st8", "st16", "st32", "st64",
];

/// Port of a generated unit that leaves the processor core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSignal {
    /// Name of the port on the core, `<module>_<port>`.
    pub name: String,
    pub port: String,
    pub direction: Direction,
    pub width: Width,
    /// Set for data memory ports of load/store units.
    pub lsu: Option<LsuSignal>,
}

impl FuGen<'_> {
    pub(crate) fn create_mandatory_ports(&mut self) {
        let reset = self.module.options().reset_port();
        self.module
            .add_port(Port::input("clk", 1))
            .add_port(Port::input(reset, 1))
            .add_port(Port::input("glock_in", 1))
            .add_port(Port::output("glockreq_out", 1));
        // Co-processor wrappers always drive the opcode.
        if self.operations.len() > 1 || self.options.coprocessor.is_active() {
            self.module.add_port(Port::input("operation_in", self.opcode_width).vector());
        }
        for port in &self.unit.ports {
            if port.is_input() {
                self.module
                    .add_port(Port::input(format!("data_{}_in", port.name), port.width).vector())
                    .add_port(Port::input(format!("load_{}_in", port.name), 1));
            } else {
                self.module.add_port(Port::output(format!("data_{}_out", port.name), port.width).vector());
            }
        }
        if self.address_width > 0 {
            self.module.add_constant(IntegerConstant::new("addrw_c", i64::from(self.address_width)));
        }
    }

    pub(crate) fn create_external_interfaces(&mut self) {
        let address = Replace::new("addrw_c", self.address_width.to_string());
        let mut declared = Vec::new();
        for base in self.base_operations.values() {
            for port in &base.entry.interface {
                if declared.contains(&port.name) {
                    continue;
                }
                declared.push(port.name.clone());

                let width = if self.address_width > 0 { address.apply(&port.width) } else { port.width.clone() };
                let width = Width::from(width);
                match port.direction {
                    Direction::Output => {
                        self.module.add_port(Port::output(&port.name, width.clone()).vector());
                        self.external_outputs.insert(port.name.clone(), port.default_value.clone());
                    }
                    Direction::Input => {
                        self.module.add_port(Port::input(&port.name, width.clone()).vector());
                        self.external_inputs.insert(port.name.clone());
                    }
                }

                let name = format!("{}_{}", self.module.name(), port.name);
                let lsu = match self.unit.address_space {
                    Some(_) => LsuSignal::infer(&name),
                    None => None,
                };
                self.is_lsu |= lsu.is_some();
                self.external_signals.push(ExternalSignal {
                    name,
                    port: port.name.clone(),
                    direction: port.direction,
                    width,
                    lsu,
                });
            }
        }

        let memory_operations = self.operations.iter().any(|operation| MEMORY_OPERATIONS.contains(&operation.as_str()));
        if self.unit.address_space.is_some() && self.is_lsu != memory_operations {
            tracing::warn!(
                unit = %self.unit.name,
                lsu_ports = self.is_lsu,
                memory_operations,
                "memory bus ports and operation names disagree on whether this is a load/store unit"
            );
        }
    }

    pub(crate) fn create_operation_resources(&mut self) {
        let mut instantiated: BTreeMap<String, u32> = BTreeMap::new();
        let resources: Vec<_> = self.base_operations.values().flat_map(|base| base.resources().iter()).collect();
        for resource in resources {
            let name = resource.name.to_ascii_lowercase();
            let count = self.resource_count.get(&name).copied().unwrap_or(0);
            let first = instantiated.get(&name).copied().unwrap_or(0);
            for index in first..count {
                let id = index + 1;
                let mut instance = Module::new(&name);
                instance.set_prefix(&name).set_id(id as usize);
                for port in &resource.ports {
                    let port_name = port.name.to_ascii_lowercase();
                    let mut declaration = Port::new(&port_name, port.direction.into(), port.width);
                    if port.vector {
                        declaration = declaration.vector();
                    }
                    instance.add_port(declaration);
                    if Module::is_shared_signal(&port_name) {
                        continue;
                    }

                    let wire_name = resource_wire(&name, id, &port_name);
                    let wire = if port.vector { Wire::new(&wire_name, port.width).vector() } else { Wire::new(&wire_name, 1) };
                    self.module.add_wire(wire);
                    match port.direction {
                        Direction::Input => self.resource_inputs.push(wire_name),
                        Direction::Output => self.resource_outputs.push(wire_name),
                    }
                }
                if cfg!(feature = "trace") {
                    eprintln!(">resource {}", instance.instance_name());
                }
                self.module.add_module(instance);
            }
            instantiated.insert(name, count.max(first));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_lsu_signal() {
        assert_eq!(LsuSignal::infer("fu_lsu_avalid_out"), Some(LsuSignal::AValid));
        assert_eq!(LsuSignal::infer("fu_lsu_rdata_in"), Some(LsuSignal::RData));
        assert_eq!(LsuSignal::infer("fu_lsu_adata_out"), Some(LsuSignal::AData));
        assert_eq!(LsuSignal::infer("fu_alu_result"), None);
    }
}
