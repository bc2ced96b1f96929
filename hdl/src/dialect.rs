use std::fmt::{self, Display};
use std::str::FromStr;

use crate::Error;

/// Output language of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Vhdl,
    Verilog,
}

/// How an assignment target is stored, which decides the assignment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetKind {
    Signal,
    Variable,
    Register,
}

impl Dialect {
    /// Directory under the output root where sources of this dialect are placed.
    pub fn directory(self) -> &'static str {
        match self {
            Dialect::Vhdl => "vhdl",
            Dialect::Verilog => "verilog",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Vhdl => "vhd",
            Dialect::Verilog => "v",
        }
    }

    pub fn dont_care(self) -> char {
        match self {
            Dialect::Vhdl => '-',
            Dialect::Verilog => 'x',
        }
    }

    /// Renders a binary literal; `bits` is most significant bit first.
    pub fn literal(self, bits: &str) -> String {
        match self {
            Dialect::Vhdl if bits.len() == 1 => format!("'{bits}'"),
            Dialect::Vhdl => format!("\"{bits}\""),
            Dialect::Verilog => format!("{}'b{bits}", bits.len()),
        }
    }

    /// Renders the index range of a vector of the given width, including the brackets.
    pub fn range(self, width: &Width) -> String {
        match self {
            Dialect::Vhdl => format!("({} downto 0)", width.upper()),
            Dialect::Verilog => format!("[{}:0]", width.upper()),
        }
    }

    pub fn slice(self, upper: impl Display, lower: impl Display) -> String {
        match self {
            Dialect::Vhdl => format!("({upper} downto {lower})"),
            Dialect::Verilog => format!("[{upper}:{lower}]"),
        }
    }

    pub fn index(self, index: impl Display) -> String {
        match self {
            Dialect::Vhdl => format!("({index})"),
            Dialect::Verilog => format!("[{index}]"),
        }
    }

    pub(crate) fn assign_token(self, kind: TargetKind) -> &'static str {
        match (self, kind) {
            (Dialect::Vhdl, TargetKind::Variable) => ":=",
            (Dialect::Vhdl, _) => "<=",
            (Dialect::Verilog, TargetKind::Register) => "<=",
            (Dialect::Verilog, _) => "=",
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Vhdl => write!(f, "VHDL"),
            Dialect::Verilog => write!(f, "Verilog"),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vhdl" => Ok(Dialect::Vhdl),
            "verilog" => Ok(Dialect::Verilog),
            _ => Err(Error::UnknownDialect(s.to_owned())),
        }
    }
}

/// Bit width of a signal, either a known integer or an expression over generics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Width {
    Int(u32),
    Symbolic(String),
}

impl Width {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Width::Int(1))
    }

    fn upper(&self) -> String {
        match self {
            Width::Int(width) => format!("{}", i64::from(*width) - 1),
            Width::Symbolic(expr) => format!("{expr}-1"),
        }
    }
}

impl From<u32> for Width {
    fn from(width: u32) -> Self {
        Width::Int(width)
    }
}

impl From<&str> for Width {
    fn from(expr: &str) -> Self {
        match expr.parse() {
            Ok(width) => Width::Int(width),
            Err(_) => Width::Symbolic(expr.to_owned()),
        }
    }
}

impl From<String> for Width {
    fn from(expr: String) -> Self {
        Width::from(expr.as_str())
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Int(width) => write!(f, "{width}"),
            Width::Symbolic(expr) => write!(f, "{expr}"),
        }
    }
}

/// Whether a one bit signal is declared as a scalar or as a one element vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireType {
    #[default]
    Auto,
    Vector,
}

/// Declares a vector when the width or the wire type call for one.
pub(crate) fn is_vector(width: &Width, wire_type: WireType) -> bool {
    wire_type == WireType::Vector || !width.is_scalar()
}

pub(crate) struct Indent(pub usize);

impl Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str("    ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        for width in [1u32, 2, 8, 32] {
            let vhdl = Dialect::Vhdl.range(&Width::Int(width));
            let verilog = Dialect::Verilog.range(&Width::Int(width));
            assert_eq!(vhdl, format!("({} downto 0)", width - 1));
            assert_eq!(verilog, format!("[{}:0]", width - 1));
        }
        assert_eq!(Dialect::Vhdl.range(&Width::from("addrw_c")), "(addrw_c-1 downto 0)");
        assert_eq!(Dialect::Verilog.range(&Width::from("addrw_c")), "[addrw_c-1:0]");
    }

    #[test]
    fn test_literal() {
        assert_eq!(Dialect::Vhdl.literal("1"), "'1'");
        assert_eq!(Dialect::Vhdl.literal("0101"), "\"0101\"");
        assert_eq!(Dialect::Verilog.literal("1"), "1'b1");
        assert_eq!(Dialect::Verilog.literal("0101"), "4'b0101");
    }

    #[test]
    fn test_parse() {
        assert_eq!("VHDL".parse::<Dialect>().unwrap(), Dialect::Vhdl);
        assert_eq!("verilog".parse::<Dialect>().unwrap(), Dialect::Verilog);
        assert!("systemc".parse::<Dialect>().is_err());
    }
}
