use std::fmt::{self, Display};
use std::ops;

use indexmap::IndexSet;

use crate::Dialect;

/// A literal bit string, most significant bit first. May contain `0`, `1`, and don't-care bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryLiteral(String);

impl BinaryLiteral {
    pub fn new(bits: impl Into<String>) -> Self {
        BinaryLiteral(bits.into())
    }

    /// The two's complement representation of `value` truncated to `width` bits.
    pub fn from_value(value: i64, width: u32) -> Self {
        let bits = (0..width)
            .rev()
            .map(|bit| if (value >> bit.min(63)) & 1 == 1 { '1' } else { '0' })
            .collect();
        BinaryLiteral(bits)
    }

    pub fn bits(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn render(&self, dialect: Dialect) -> String {
        dialect.literal(&self.0)
    }
}

impl Display for BinaryLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Equals,
    NotEquals,
}

impl UnaryOp {
    fn token(self, dialect: Dialect) -> &'static str {
        match (dialect, self) {
            (Dialect::Vhdl, _) => "not ",
            (Dialect::Verilog, UnaryOp::Not) => "!",
            (Dialect::Verilog, UnaryOp::BitNot) => "~",
        }
    }
}

impl BinaryOp {
    fn token(self, dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Vhdl => match self {
                BinaryOp::And | BinaryOp::BitAnd => "and",
                BinaryOp::Or | BinaryOp::BitOr => "or",
                BinaryOp::BitXor => "xor",
                BinaryOp::Equals => "=",
                BinaryOp::NotEquals => "/=",
            },
            Dialect::Verilog => match self {
                BinaryOp::And => "&&",
                BinaryOp::Or => "||",
                BinaryOp::BitAnd => "&",
                BinaryOp::BitOr => "|",
                BinaryOp::BitXor => "^",
                BinaryOp::Equals => "==",
                BinaryOp::NotEquals => "!=",
            },
        }
    }
}

/// Right hand side value of an assignment or condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Signal(String),
    Literal(BinaryLiteral),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Bits `upper..=lower` of a signal.
    Splice { signal: String, upper: u32, lower: u32 },
    /// Zero extension (or truncation) of a signal to `width` bits.
    Ext { signal: String, width: u32, source_width: u32 },
    /// Sign extension (or truncation) of a signal to `width` bits.
    Sext { signal: String, width: u32, source_width: u32 },
}

impl Expr {
    pub fn signal(name: impl Into<String>) -> Self {
        Expr::Signal(name.into())
    }

    pub fn literal(bits: impl Into<String>) -> Self {
        Expr::Literal(BinaryLiteral::new(bits))
    }

    pub fn splice(signal: impl Into<String>, upper: u32, lower: u32) -> Self {
        Expr::Splice { signal: signal.into(), upper, lower }
    }

    pub fn ext(signal: impl Into<String>, width: u32, source_width: u32) -> Self {
        Expr::Ext { signal: signal.into(), width, source_width }
    }

    pub fn sext(signal: impl Into<String>, width: u32, source_width: u32) -> Self {
        Expr::Sext { signal: signal.into(), width, source_width }
    }

    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(self), Box::new(rhs))
    }

    pub fn equals(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Equals, rhs)
    }

    pub fn not_equals(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::NotEquals, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn logical_not(self) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }

    /// `signal == '1'`, the usual way of testing a control bit.
    pub fn is_set(name: impl Into<String>) -> Self {
        Expr::signal(name).equals(Expr::literal("1"))
    }

    /// `signal == '0'`.
    pub fn is_clear(name: impl Into<String>) -> Self {
        Expr::signal(name).equals(Expr::literal("0"))
    }

    /// Adds every signal this expression reads to `reads`, in order of first use.
    pub fn reads(&self, reads: &mut IndexSet<String>) {
        match self {
            Expr::Signal(name)
            | Expr::Splice { signal: name, .. }
            | Expr::Ext { signal: name, .. }
            | Expr::Sext { signal: name, .. } => {
                reads.insert(name.clone());
            }
            Expr::Literal(_) => (),
            Expr::Unary(_, operand) => operand.reads(reads),
            Expr::Binary(_, lhs, rhs) => {
                lhs.reads(reads);
                rhs.reads(reads);
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Expr::Unary(..) | Expr::Binary(..))
    }

    fn render_operand(&self, dialect: Dialect) -> String {
        if self.is_compound() { format!("({})", self.render(dialect)) } else { self.render(dialect) }
    }

    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            Expr::Signal(name) => name.clone(),
            Expr::Literal(literal) => literal.render(dialect),
            Expr::Unary(op, operand) => format!("{}{}", op.token(dialect), operand.render_operand(dialect)),
            Expr::Binary(op, lhs, rhs) => {
                format!("{} {} {}", lhs.render_operand(dialect), op.token(dialect), rhs.render_operand(dialect))
            }
            Expr::Splice { signal, upper, lower } => format!("{signal}{}", dialect.slice(upper, lower)),
            Expr::Ext { signal, width, source_width } => render_ext(dialect, signal, *width, *source_width),
            Expr::Sext { signal, width, source_width } => render_sext(dialect, signal, *width, *source_width),
        }
    }
}

fn render_truncate(dialect: Dialect, signal: &str, width: u32, source_width: u32) -> String {
    if width == source_width {
        signal.to_owned()
    } else if width == 1 {
        format!("{signal}{}", dialect.index(0))
    } else {
        format!("{signal}{}", dialect.slice(width - 1, 0))
    }
}

fn render_ext(dialect: Dialect, signal: &str, width: u32, source_width: u32) -> String {
    if width <= source_width {
        return render_truncate(dialect, signal, width, source_width);
    }
    match dialect {
        Dialect::Vhdl if source_width == 1 => format!("({} downto 1 => '0') & {signal}", width - 1),
        Dialect::Vhdl => format!("std_logic_vector(resize(unsigned({signal}), {width}))"),
        Dialect::Verilog => format!("{{{{{}{{1'b0}}}}, {signal}}}", width - source_width),
    }
}

fn render_sext(dialect: Dialect, signal: &str, width: u32, source_width: u32) -> String {
    if width <= source_width {
        return render_truncate(dialect, signal, width, source_width);
    }
    match dialect {
        Dialect::Vhdl if source_width == 1 => format!("({} downto 0 => {signal})", width - 1),
        Dialect::Vhdl => format!("std_logic_vector(resize(signed({signal}), {width}))"),
        Dialect::Verilog if source_width == 1 => format!("{{{width}{{{signal}}}}}"),
        Dialect::Verilog => {
            format!("{{{{{}{{{signal}[{}]}}}}, {signal}}}", width - source_width, source_width - 1)
        }
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary(UnaryOp::BitNot, Box::new(self))
    }
}

impl ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::BitAnd, rhs)
    }
}

impl ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::BitOr, rhs)
    }
}

impl ops::BitXor for Expr {
    type Output = Expr;

    fn bitxor(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::BitXor, rhs)
    }
}

impl From<BinaryLiteral> for Expr {
    fn from(literal: BinaryLiteral) -> Self {
        Expr::Literal(literal)
    }
}
