use std::fmt::{self, Display};
use std::io;

use crate::dialect::{Indent, is_vector};
use crate::{BinaryLiteral, Dialect, Width, WireType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

fn vhdl_type(width: &Width, wire_type: WireType) -> String {
    if is_vector(width, wire_type) {
        format!("std_logic_vector{}", Dialect::Vhdl.range(width))
    } else {
        "std_logic".to_owned()
    }
}

fn verilog_range(width: &Width, wire_type: WireType) -> String {
    if is_vector(width, wire_type) { format!("{} ", Dialect::Verilog.range(width)) } else { String::new() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub width: Width,
    pub wire_type: WireType,
}

impl Port {
    pub fn new(name: impl Into<String>, direction: Direction, width: impl Into<Width>) -> Self {
        Port { name: name.into(), direction, width: width.into(), wire_type: WireType::Auto }
    }

    pub fn input(name: impl Into<String>, width: impl Into<Width>) -> Self {
        Port::new(name, Direction::In, width)
    }

    pub fn output(name: impl Into<String>, width: impl Into<Width>) -> Self {
        Port::new(name, Direction::Out, width)
    }

    pub fn vector(mut self) -> Self {
        self.wire_type = WireType::Vector;
        self
    }

    /// Writes the port list entry, without the separator.
    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        match dialect {
            Dialect::Vhdl => {
                write!(w, "{}{} : {} {}", Indent(level), self.name, self.direction, vhdl_type(&self.width, self.wire_type))
            }
            Dialect::Verilog => {
                let kind = match self.direction {
                    Direction::In => "input",
                    Direction::Out => "output reg",
                };
                write!(w, "{}{kind} {}{}", Indent(level), verilog_range(&self.width, self.wire_type), self.name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub name: String,
    pub width: Width,
    pub wire_type: WireType,
}

impl Wire {
    pub fn new(name: impl Into<String>, width: impl Into<Width>) -> Self {
        Wire { name: name.into(), width: width.into(), wire_type: WireType::Auto }
    }

    pub fn vector(mut self) -> Self {
        self.wire_type = WireType::Vector;
        self
    }

    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        declare_signal(w, dialect, level, &self.name, &self.width, self.wire_type)
    }
}

fn declare_signal(
    w: &mut impl io::Write,
    dialect: Dialect,
    level: usize,
    name: &str,
    width: &Width,
    wire_type: WireType,
) -> io::Result<()> {
    match dialect {
        Dialect::Vhdl => writeln!(w, "{}signal {name} : {};", Indent(level), vhdl_type(width, wire_type)),
        Dialect::Verilog => writeln!(w, "{}reg {}{name};", Indent(level), verilog_range(width, wire_type)),
    }
}

/// Whether a register is assigned in the reset branch of its process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetOption {
    #[default]
    Mandatory,
    /// Only reset when the module is generated with the "reset everything" option.
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub width: Width,
    pub wire_type: WireType,
    pub reset: ResetOption,
    pub reset_value: Option<BinaryLiteral>,
}

impl Register {
    pub fn new(name: impl Into<String>, width: impl Into<Width>) -> Self {
        Register {
            name: name.into(),
            width: width.into(),
            wire_type: WireType::Auto,
            reset: ResetOption::Mandatory,
            reset_value: None,
        }
    }

    pub fn vector(mut self) -> Self {
        self.wire_type = WireType::Vector;
        self
    }

    pub fn with_reset(mut self, reset: ResetOption) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_reset_value(mut self, value: BinaryLiteral) -> Self {
        self.reset_value = Some(value);
        self
    }

    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        declare_signal(w, dialect, level, &self.name, &self.width, self.wire_type)
    }

    /// Writes the reset assignment of this register.
    pub fn reset(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        let value = match (&self.reset_value, dialect) {
            (Some(value), _) => value.render(dialect),
            (None, Dialect::Vhdl) if is_vector(&self.width, self.wire_type) => "(others => '0')".to_owned(),
            (None, Dialect::Vhdl) => "'0'".to_owned(),
            (None, Dialect::Verilog) => "'b0".to_owned(),
        };
        writeln!(w, "{}{} <= {value};", Indent(level), self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Logic,
    Unsigned,
    Signed,
}

/// Process-local storage. Declared inside its process in VHDL and at module scope in Verilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub width: Width,
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, width: impl Into<Width>, kind: VariableKind) -> Self {
        Variable { name: name.into(), width: width.into(), kind }
    }

    pub fn logic(name: impl Into<String>, width: impl Into<Width>) -> Self {
        Variable::new(name, width, VariableKind::Logic)
    }

    pub fn wire_type(&self) -> WireType {
        match self.width {
            Width::Int(_) => WireType::Auto,
            Width::Symbolic(_) => WireType::Vector,
        }
    }

    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        let vector = is_vector(&self.width, self.wire_type());
        match dialect {
            Dialect::Vhdl => {
                let range = Dialect::Vhdl.range(&self.width);
                let ty = match self.kind {
                    VariableKind::Logic if vector => format!("std_logic_vector{range}"),
                    VariableKind::Logic => "std_logic".to_owned(),
                    VariableKind::Unsigned => format!("unsigned{range}"),
                    VariableKind::Signed => format!("signed{range}"),
                };
                writeln!(w, "{}variable {} : {ty};", Indent(level), self.name)
            }
            Dialect::Verilog => {
                let signed = if self.kind == VariableKind::Signed { " signed" } else { "" };
                let range = if vector { format!(" {}", Dialect::Verilog.range(&self.width)) } else { String::new() };
                writeln!(w, "{}reg{signed}{range} {};", Indent(level), self.name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    /// Value passed through verbatim, usually the name of a generic of the parent module.
    Expr(String),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

/// Integer generic (VHDL) or parameter (Verilog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Parameter { name: name.into(), value }
    }

    /// Writes the interface entry, without the separator.
    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        match (dialect, &self.value) {
            (Dialect::Vhdl, ParamValue::Int(value)) => write!(w, "{}{} : integer := {value}", Indent(level), self.name),
            (Dialect::Vhdl, ParamValue::Expr(_)) => write!(w, "{}{} : integer", Indent(level), self.name),
            (Dialect::Verilog, ParamValue::Int(value)) => {
                write!(w, "{}parameter integer {} = {value}", Indent(level), self.name)
            }
            (Dialect::Verilog, ParamValue::Expr(_)) => write!(w, "{}parameter integer {}", Indent(level), self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerConstant {
    pub name: String,
    pub value: i64,
}

impl IntegerConstant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        IntegerConstant { name: name.into(), value }
    }

    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        match dialect {
            Dialect::Vhdl => writeln!(w, "{}constant {} : integer := {};", Indent(level), self.name, self.value),
            Dialect::Verilog => writeln!(w, "{}localparam integer {} = {};", Indent(level), self.name, self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryConstant {
    pub name: String,
    pub width: u32,
    pub value: i64,
}

impl BinaryConstant {
    pub fn new(name: impl Into<String>, width: u32, value: i64) -> Self {
        BinaryConstant { name: name.into(), width, value }
    }

    pub fn declare(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        let bits = BinaryLiteral::from_value(self.value, self.width);
        let width = Width::Int(self.width);
        match dialect {
            Dialect::Vhdl => writeln!(
                w,
                "{}constant {} : std_logic_vector{} := \"{bits}\";",
                Indent(level),
                self.name,
                dialect.range(&width)
            ),
            Dialect::Verilog => writeln!(
                w,
                "{}localparam {} {} = {}'b{bits};",
                Indent(level),
                dialect.range(&width),
                self.name,
                self.width
            ),
        }
    }
}
