//! This library provides an object model of synthesizable hardware modules that can be emitted as
//! either VHDL or Verilog.
//!
//! A [`Module`] owns its interface ([`Port`]s and [`Parameter`]s), its storage ([`Wire`]s,
//! [`Register`]s, constants) and a list of [`Behaviour`]s: clocked and combinational processes
//! built out of [`Statement`]s. Before any text is written the module is built, which checks that
//! every assignment targets storage that may be written where it occurs and derives the
//! sensitivity lists and reset branches of the processes.

mod dialect;
mod error;
mod expr;
mod storage;
mod scope;
mod stmt;
mod process;
mod module;
mod file;

pub use dialect::{Dialect, Width, WireType};
pub use error::Error;
pub use expr::{BinaryLiteral, Expr, UnaryOp, BinaryOp};
pub use storage::{
    Direction, Port, Wire, Register, ResetOption, Variable, VariableKind, ParamValue, Parameter, IntegerConstant,
    BinaryConstant,
};
pub use stmt::{Select, Assign, DefaultAssign, If, Case, DefaultCase, Switch, CodeBlock, HdlOperation, RawCodeLine, Statement};
pub use process::{Asynchronous, Synchronous, Behaviour};
pub use module::{Module, ModuleOptions, ResetStyle};
pub use file::write_atomically;
