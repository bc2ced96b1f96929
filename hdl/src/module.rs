use std::collections::HashSet;
use std::io;

use crate::dialect::{Indent, is_vector};
use crate::scope::Scope;
use crate::{
    Behaviour, BinaryConstant, Dialect, Error, IntegerConstant, Parameter, Port, RawCodeLine, Register, Variable,
    Width, Wire, WireType,
};

const MIT_LICENSE: &[&str] = &[
    "Permission is hereby granted, free of charge, to any person obtaining a",
    "copy of this software and associated documentation files (the \"Software\"),",
    "to deal in the Software without restriction, including without limitation",
    "the rights to use, copy, modify, merge, publish, distribute, sublicense,",
    "and/or sell copies of the Software, and to permit persons to whom the",
    "Software is furnished to do so, subject to the following conditions:",
    "",
    "The above copyright notice and this permission notice shall be included in",
    "all copies or substantial portions of the Software.",
    "",
    "THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR",
    "IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,",
    "FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL",
    "THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER",
    "LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING",
    "FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER",
    "DEALINGS IN THE SOFTWARE.",
];

const VHDL_LIBRARIES: &[&str] = &[
    "library ieee;",
    "use ieee.std_logic_1164.all;",
    "use ieee.numeric_std.all;",
    "use ieee.std_logic_misc.all;",
    "use std.textio.all;",
    "use ieee.std_logic_textio.all;",
    "use ieee.math_real.all;",
];

/// Signals connected by name to every instance instead of through an instance wire.
const SHARED_SIGNALS: &[&str] = &["clk", "rstx", "rst", "glock_in"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetStyle {
    Synchronous,
    #[default]
    Asynchronous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    pub reset_style: ResetStyle,
    /// Reset is the active low `rstx` rather than the active high `rst`.
    pub active_low_reset: bool,
    /// Reset registers marked [`ResetOption::Optional`](crate::ResetOption::Optional) too.
    pub reset_everything: bool,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        ModuleOptions { reset_style: ResetStyle::Asynchronous, active_low_reset: true, reset_everything: false }
    }
}

impl ModuleOptions {
    pub fn reset_port(&self) -> &'static str {
        if self.active_low_reset { "rstx" } else { "rst" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    prefix: String,
    id: usize,
    header: Vec<String>,
    timestamp: Option<String>,
    options: ModuleOptions,
    parameters: Vec<Parameter>,
    ports: Vec<Port>,
    constants: Vec<IntegerConstant>,
    binary_constants: Vec<BinaryConstant>,
    wires: Vec<Wire>,
    registers: Vec<Register>,
    variables: Vec<Variable>,
    behaviours: Vec<Behaviour>,
    raw_lines: Vec<RawCodeLine>,
    modules: Vec<Module>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Module {
            prefix: name.clone(),
            name,
            id: 0,
            header: Vec::new(),
            timestamp: None,
            options: ModuleOptions::default(),
            parameters: Vec::new(),
            ports: Vec::new(),
            constants: Vec::new(),
            binary_constants: Vec::new(),
            wires: Vec::new(),
            registers: Vec::new(),
            variables: Vec::new(),
            behaviours: Vec::new(),
            raw_lines: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name this module gets when instantiated into another one.
    pub fn instance_name(&self) -> String {
        format!("{}_{}", self.prefix, self.id)
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    pub fn set_id(&mut self, id: usize) -> &mut Self {
        self.id = id;
        self
    }

    pub fn set_timestamp(&mut self, timestamp: Option<String>) -> &mut Self {
        self.timestamp = timestamp;
        self
    }

    pub fn set_options(&mut self, options: ModuleOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    pub fn append_to_header(&mut self, line: impl Into<String>) -> &mut Self {
        self.header.push(line.into());
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    pub fn add_port(&mut self, port: Port) -> &mut Self {
        self.ports.push(port);
        self
    }

    pub fn add_constant(&mut self, constant: IntegerConstant) -> &mut Self {
        self.constants.push(constant);
        self
    }

    pub fn add_binary_constant(&mut self, constant: BinaryConstant) -> &mut Self {
        self.binary_constants.push(constant);
        self
    }

    pub fn add_wire(&mut self, wire: Wire) -> &mut Self {
        self.wires.push(wire);
        self
    }

    /// Registers with the same name are merged when the module is implemented.
    pub fn add_register(&mut self, register: Register) -> &mut Self {
        self.registers.push(register);
        self
    }

    pub fn add_behaviour(&mut self, behaviour: impl Into<Behaviour>) -> &mut Self {
        self.behaviours.push(behaviour.into());
        self
    }

    pub fn add_raw_line(&mut self, line: RawCodeLine) -> &mut Self {
        self.raw_lines.push(line);
        self
    }

    pub fn add_module(&mut self, module: Module) -> &mut Self {
        self.modules.push(module);
        self
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn behaviours(&self) -> &[Behaviour] {
        &self.behaviours
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn binary_constants(&self) -> &[BinaryConstant] {
        &self.binary_constants
    }

    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|register| register.name == name)
    }

    pub fn is_register(&self, name: &str) -> bool {
        self.register(name).is_some()
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|variable| variable.name == name)
    }

    pub fn is_wire(&self, name: &str) -> bool {
        self.wires.iter().any(|wire| wire.name == name)
    }

    pub fn is_port(&self, name: &str) -> bool {
        self.ports.iter().any(|port| port.name == name)
    }

    /// Constants and generics, which never appear in a sensitivity list.
    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.iter().any(|constant| constant.name == name)
            || self.binary_constants.iter().any(|constant| constant.name == name)
            || self.parameters.iter().any(|parameter| parameter.name == name)
    }

    pub fn width(&self, name: &str) -> Result<Width, Error> {
        if let Some(parameter) = self.parameters.iter().find(|parameter| parameter.name == name) {
            return Ok(Width::Symbolic(parameter.name.clone()));
        }
        if self.constants.iter().any(|constant| constant.name == name) {
            return Ok(Width::Int(32));
        }
        if let Some(constant) = self.binary_constants.iter().find(|constant| constant.name == name) {
            return Ok(Width::Int(constant.width));
        }
        if let Some(register) = self.register(name) {
            return Ok(register.width.clone());
        }
        if let Some(wire) = self.wires.iter().find(|wire| wire.name == name) {
            return Ok(wire.width.clone());
        }
        if let Some(variable) = self.variables.iter().find(|variable| variable.name == name) {
            return Ok(variable.width.clone());
        }
        if let Some(port) = self.ports.iter().find(|port| port.name == name) {
            return Ok(port.width.clone());
        }
        Err(Error::UnknownSignal(name.to_owned()))
    }

    pub fn wire_type(&self, name: &str) -> Result<WireType, Error> {
        if let Some(port) = self.ports.iter().find(|port| port.name == name) {
            return Ok(port.wire_type);
        }
        if let Some(wire) = self.wires.iter().find(|wire| wire.name == name) {
            return Ok(wire.wire_type);
        }
        if let Some(variable) = self.variables.iter().find(|variable| variable.name == name) {
            return Ok(variable.wire_type());
        }
        if let Some(register) = self.register(name) {
            return Ok(register.wire_type);
        }
        Err(Error::UnknownSignal(name.to_owned()))
    }

    fn clear(&mut self) {
        self.variables.clear();
        let mut seen = HashSet::new();
        self.registers.retain(|register| seen.insert(register.name.clone()));
    }

    /// Promotes process variables to module scope and checks every assignment against the
    /// storage it targets.
    pub fn build(&mut self, dialect: Dialect) -> Result<(), Error> {
        if cfg!(feature = "trace") {
            eprintln!(">build {} ({dialect})", self.name);
        }
        self.clear();
        let mut variables: Vec<Variable> = Vec::new();
        for behaviour in &self.behaviours {
            for variable in behaviour.variables() {
                if variables.iter().any(|other| other.name == variable.name) {
                    return Err(Error::DuplicateVariable(variable.name.clone()));
                }
                variables.push(variable.clone());
            }
        }
        self.variables = variables;

        let mut behaviours = std::mem::take(&mut self.behaviours);
        let scope = Scope::concurrent(self, dialect);
        let result = behaviours.iter_mut().try_for_each(|behaviour| behaviour.build(&scope));
        self.behaviours = behaviours;
        result
    }

    fn header_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = MIT_LICENSE.iter().map(|line| line.to_string()).collect();
        lines.push(String::new());
        if let Some(timestamp) = &self.timestamp {
            lines.push(format!("Generated on {timestamp}"));
            lines.push(String::new());
        }
        lines.extend(self.header.iter().cloned());
        lines
    }

    /// Builds the module and writes its complete source in `dialect`.
    pub fn implement(&mut self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> Result<(), Error> {
        self.build(dialect)?;
        tracing::debug!(module = %self.name, %dialect, "implementing module");
        match dialect {
            Dialect::Vhdl => self.implement_vhdl(w, level),
            Dialect::Verilog => self.implement_verilog(w, level),
        }
    }

    pub fn render(&mut self, dialect: Dialect) -> Result<String, Error> {
        let mut buffer = Vec::new();
        self.implement(&mut buffer, dialect, 0)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn declare_storage(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        if !self.constants.is_empty() || !self.binary_constants.is_empty() {
            writeln!(w)?;
        }
        for constant in &self.constants {
            constant.declare(w, dialect, level)?;
        }
        for constant in &self.binary_constants {
            constant.declare(w, dialect, level)?;
        }
        if !self.wires.is_empty() {
            writeln!(w)?;
        }
        for wire in &self.wires {
            wire.declare(w, dialect, level)?;
        }
        if dialect == Dialect::Verilog && !self.variables.is_empty() {
            writeln!(w)?;
            for variable in &self.variables {
                variable.declare(w, dialect, level)?;
            }
        }
        if !self.registers.is_empty() {
            writeln!(w)?;
        }
        for register in &self.registers {
            register.declare(w, dialect, level)?;
        }
        if !self.raw_lines.is_empty() {
            writeln!(w)?;
        }
        for line in &self.raw_lines {
            line.emit(w, dialect, level)?;
        }
        Ok(())
    }

    fn emit_behaviours(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> Result<(), Error> {
        let scope = Scope::concurrent(self, dialect);
        for behaviour in &self.behaviours {
            behaviour.emit(w, &scope, level)?;
        }
        Ok(())
    }

    fn implement_vhdl(&self, w: &mut impl io::Write, level: usize) -> Result<(), Error> {
        let dialect = Dialect::Vhdl;
        for line in self.header_lines() {
            if line.is_empty() {
                writeln!(w, "{}--", Indent(level))?;
            } else {
                writeln!(w, "{}-- {line}", Indent(level))?;
            }
        }
        writeln!(w)?;
        for library in VHDL_LIBRARIES {
            writeln!(w, "{}{library}", Indent(level))?;
        }
        writeln!(w)?;
        writeln!(w, "{}entity {} is", Indent(level), self.name)?;
        self.declare_interface(w, dialect, level + 1)?;
        writeln!(w, "{}end entity {};", Indent(level), self.name)?;
        writeln!(w)?;
        writeln!(w, "{}architecture rtl of {} is", Indent(level), self.name)?;
        self.declare_storage(w, dialect, level + 1)?;

        let mut declared = HashSet::new();
        for module in &self.modules {
            if declared.insert(module.name.as_str()) {
                writeln!(w)?;
                module.declare_component(w, level + 1)?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{}begin", Indent(level))?;
        for module in &self.modules {
            writeln!(w)?;
            module.instantiate(w, dialect, level + 1)?;
        }
        self.emit_behaviours(w, dialect, level + 1)?;
        writeln!(w)?;
        writeln!(w, "{}end architecture rtl;", Indent(level))?;
        Ok(())
    }

    fn implement_verilog(&self, w: &mut impl io::Write, level: usize) -> Result<(), Error> {
        let dialect = Dialect::Verilog;
        writeln!(w, "{}/*", Indent(level))?;
        for line in self.header_lines() {
            if line.is_empty() {
                writeln!(w, "{} *", Indent(level))?;
            } else {
                writeln!(w, "{} * {line}", Indent(level))?;
            }
        }
        writeln!(w, "{} */", Indent(level))?;
        writeln!(w)?;
        write!(w, "{}module {}", Indent(level), self.name)?;
        if !self.parameters.is_empty() {
            writeln!(w, " #(")?;
            for (index, parameter) in self.parameters.iter().enumerate() {
                if index > 0 {
                    writeln!(w, ",")?;
                }
                parameter.declare(w, dialect, level + 2)?;
            }
            write!(w, ")")?;
        }
        if !self.ports.is_empty() {
            writeln!(w, " (")?;
            for (index, port) in self.ports.iter().enumerate() {
                if index > 0 {
                    writeln!(w, ",")?;
                }
                port.declare(w, dialect, level + 2)?;
            }
            write!(w, ")")?;
        }
        writeln!(w, ";")?;
        self.declare_storage(w, dialect, level + 1)?;
        for module in &self.modules {
            writeln!(w)?;
            module.instantiate(w, dialect, level + 1)?;
        }
        self.emit_behaviours(w, dialect, level + 1)?;
        writeln!(w)?;
        writeln!(w, "{}endmodule", Indent(level))?;
        Ok(())
    }

    /// Writes the VHDL generic and port clauses.
    fn declare_interface(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        if !self.parameters.is_empty() {
            writeln!(w, "{}generic (", Indent(level))?;
            for (index, parameter) in self.parameters.iter().enumerate() {
                if index > 0 {
                    writeln!(w, ";")?;
                }
                parameter.declare(w, dialect, level + 1)?;
            }
            writeln!(w, ");")?;
        }
        if !self.ports.is_empty() {
            writeln!(w, "{}port (", Indent(level))?;
            for (index, port) in self.ports.iter().enumerate() {
                if index > 0 {
                    writeln!(w, ";")?;
                }
                port.declare(w, dialect, level + 1)?;
            }
            writeln!(w, ");")?;
        }
        Ok(())
    }

    fn declare_component(&self, w: &mut impl io::Write, level: usize) -> io::Result<()> {
        writeln!(w, "{}component {} is", Indent(level), self.name)?;
        self.declare_interface(w, Dialect::Vhdl, level + 1)?;
        writeln!(w, "{}end component {};", Indent(level), self.name)
    }

    /// Whether instances connect `name` to the signal of the same name in their parent.
    pub fn is_shared_signal(name: &str) -> bool {
        SHARED_SIGNALS.contains(&name)
    }

    fn connection(&self, instance: &str, port: &Port) -> String {
        if Module::is_shared_signal(&port.name) {
            port.name.clone()
        } else {
            format!("{instance}_{}", port.name)
        }
    }

    fn instantiate(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        let instance = self.instance_name();
        match dialect {
            Dialect::Vhdl => {
                writeln!(w, "{}{instance} : {}", Indent(level), self.name)?;
                if !self.parameters.is_empty() {
                    writeln!(w, "{}generic map (", Indent(level + 1))?;
                    for (index, parameter) in self.parameters.iter().enumerate() {
                        if index > 0 {
                            writeln!(w, ",")?;
                        }
                        write!(w, "{}{} => {}", Indent(level + 2), parameter.name, parameter.value)?;
                    }
                    writeln!(w, ")")?;
                }
                writeln!(w, "{}port map (", Indent(level + 1))?;
                for (index, port) in self.ports.iter().enumerate() {
                    if index > 0 {
                        writeln!(w, ",")?;
                    }
                    write!(w, "{}{} => {}", Indent(level + 2), port.name, self.connection(&instance, port))?;
                }
                writeln!(w, ");")
            }
            Dialect::Verilog => {
                write!(w, "{}{} ", Indent(level), self.name)?;
                if !self.parameters.is_empty() {
                    let parameters: Vec<String> = self
                        .parameters
                        .iter()
                        .map(|parameter| format!(".{}({})", parameter.name, parameter.value))
                        .collect();
                    write!(w, "#({}) ", parameters.join(", "))?;
                }
                writeln!(w, "{instance} (")?;
                for (index, port) in self.ports.iter().enumerate() {
                    if index > 0 {
                        writeln!(w, ",")?;
                    }
                    write!(w, "{}.{}({})", Indent(level + 1), port.name, self.connection(&instance, port))?;
                }
                writeln!(w, ");")
            }
        }
    }

    /// Port declarations as `(name, direction, width, vector)` for comparing dialects.
    pub fn interface(&self) -> Vec<(String, crate::Direction, Width, bool)> {
        self.ports
            .iter()
            .map(|port| (port.name.clone(), port.direction, port.width.clone(), is_vector(&port.width, port.wire_type)))
            .collect()
    }
}
