use hwgen_hdl::{Dialect, Direction, ModuleOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfPort {
    pub name: String,
    /// Input ports write the register file, output ports read it.
    pub direction: Direction,
}

impl RfPort {
    pub fn input(name: impl Into<String>) -> Self {
        RfPort { name: name.into(), direction: Direction::In }
    }

    pub fn output(name: impl Into<String>) -> Self {
        RfPort { name: name.into(), direction: Direction::Out }
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::In
    }

    pub fn data(&self) -> String {
        match self.direction {
            Direction::In => format!("data_{}_in", self.name),
            Direction::Out => format!("data_{}_out", self.name),
        }
    }

    pub fn load(&self) -> String {
        format!("load_{}_in", self.name)
    }

    pub fn opcode(&self) -> String {
        format!("opcode_{}_in", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    pub name: String,
    /// Number of registers.
    pub size: u32,
    /// Bits per register.
    pub width: u32,
    pub ports: Vec<RfPort>,
    pub max_reads: u32,
    pub max_writes: u32,
    /// Register 0 always reads as zero.
    pub zero_register: bool,
    /// Set when the register file drives guards, with the cycles between a write and the guard
    /// seeing it.
    pub guard_latency: Option<u32>,
}

impl RegisterFile {
    /// Width of the register index carried by the opcode ports.
    pub fn opcode_width(&self) -> u32 {
        (u32::BITS - self.size.saturating_sub(1).leading_zeros()).max(1)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &RfPort> {
        self.ports.iter().filter(|port| port.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &RfPort> {
        self.ports.iter().filter(|port| !port.is_input())
    }
}

#[derive(Debug, Clone)]
pub struct RfOptions {
    pub dialect: Dialect,
    /// Only the reset polarity applies; the register array is always reset asynchronously.
    pub module: ModuleOptions,
    pub timestamp: Option<String>,
}

impl Default for RfOptions {
    fn default() -> Self {
        RfOptions { dialect: Dialect::Vhdl, module: ModuleOptions::default(), timestamp: None }
    }
}
