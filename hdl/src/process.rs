use std::io;

use indexmap::IndexSet;

use crate::dialect::Indent;
use crate::scope::{Access, BlockKind, Scope};
use crate::{Assign, CodeBlock, Dialect, Error, RawCodeLine, ResetOption, ResetStyle, Statement, Variable};

/// Combinational process. Its sensitivity list is derived from what its body reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asynchronous {
    pub name: String,
    pub body: CodeBlock,
    pub variables: Vec<Variable>,
    /// Reads that are not visible in the body, such as those of raw snippets.
    pub extra_reads: IndexSet<String>,
    sensitivity: Vec<String>,
}

impl Asynchronous {
    pub fn new(name: impl Into<String>) -> Self {
        Asynchronous {
            name: name.into(),
            body: CodeBlock::new(),
            variables: Vec::new(),
            extra_reads: IndexSet::new(),
            sensitivity: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: impl Into<Statement>) -> &mut Self {
        self.body.push(statement);
        self
    }

    pub fn add_variable(&mut self, variable: Variable) -> &mut Self {
        self.variables.push(variable);
        self
    }

    pub fn reads(&mut self, signal: impl Into<String>) -> &mut Self {
        self.extra_reads.insert(signal.into());
        self
    }

    /// Sensitivity list computed by the last build of the owning module.
    pub fn sensitivity(&self) -> &[String] {
        &self.sensitivity
    }

    pub(crate) fn build(&mut self, scope: &Scope<'_>) -> Result<(), Error> {
        let scope = scope.process(BlockKind::Asynchronous, &self.name);
        let mut access = Access { reads: self.extra_reads.clone(), ..Access::default() };
        self.body.build(&scope, &mut access)?;
        let module = scope.module;
        self.sensitivity = access
            .reads
            .into_iter()
            .filter(|name| !module.is_constant(name) && !module.is_variable(name))
            .collect();
        Ok(())
    }

    fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let scope = scope.process(BlockKind::Asynchronous, &self.name);
        writeln!(w)?;
        match scope.dialect {
            Dialect::Vhdl => {
                // Without reads the body runs once and suspends.
                if self.sensitivity.is_empty() {
                    writeln!(w, "{}{} : process", Indent(level), self.name)?;
                } else {
                    writeln!(w, "{}{} : process({})", Indent(level), self.name, self.sensitivity.join(", "))?;
                }
                for variable in &self.variables {
                    variable.declare(w, Dialect::Vhdl, level + 1)?;
                }
                writeln!(w, "{}begin", Indent(level))?;
                self.body.emit(w, &scope, level + 1)?;
                if self.sensitivity.is_empty() {
                    writeln!(w, "{}wait;", Indent(level + 1))?;
                }
                writeln!(w, "{}end process {};", Indent(level), self.name)?;
            }
            Dialect::Verilog => {
                writeln!(w, "{}// {}", Indent(level), self.name)?;
                writeln!(w, "{}always @* begin", Indent(level))?;
                self.body.emit(w, &scope, level + 1)?;
                writeln!(w, "{}end", Indent(level))?;
            }
        }
        Ok(())
    }
}

/// Clocked process with a reset branch covering the registers it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synchronous {
    pub name: String,
    pub body: CodeBlock,
    pub variables: Vec<Variable>,
    registers: IndexSet<String>,
}

impl Synchronous {
    pub fn new(name: impl Into<String>) -> Self {
        Synchronous { name: name.into(), body: CodeBlock::new(), variables: Vec::new(), registers: IndexSet::new() }
    }

    pub fn push(&mut self, statement: impl Into<Statement>) -> &mut Self {
        self.body.push(statement);
        self
    }

    pub fn add_variable(&mut self, variable: Variable) -> &mut Self {
        self.variables.push(variable);
        self
    }

    /// Registers written by the body, as found by the last build of the owning module.
    pub fn registers(&self) -> impl Iterator<Item = &str> {
        self.registers.iter().map(String::as_str)
    }

    pub(crate) fn build(&mut self, scope: &Scope<'_>) -> Result<(), Error> {
        let scope = scope.process(BlockKind::Synchronous, &self.name);
        let mut access = Access::default();
        self.body.build(&scope, &mut access)?;
        self.registers = access.registers;
        Ok(())
    }

    fn emit_resets(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let options = scope.module.options();
        for name in &self.registers {
            let Some(register) = scope.module.register(name) else {
                return Err(Error::UnknownSignal(name.clone()));
            };
            if register.reset == ResetOption::Mandatory || options.reset_everything {
                register.reset(w, scope.dialect, level)?;
            }
        }
        Ok(())
    }

    fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let scope = scope.process(BlockKind::Synchronous, &self.name);
        let options = scope.module.options();
        let reset = options.reset_port();
        let asynchronous = options.reset_style == ResetStyle::Asynchronous;
        writeln!(w)?;
        match scope.dialect {
            Dialect::Vhdl => {
                let active = if options.active_low_reset { '0' } else { '1' };
                if asynchronous {
                    writeln!(w, "{}{} : process(clk, {reset})", Indent(level), self.name)?;
                } else {
                    writeln!(w, "{}{} : process(clk)", Indent(level), self.name)?;
                }
                for variable in &self.variables {
                    variable.declare(w, Dialect::Vhdl, level + 1)?;
                }
                writeln!(w, "{}begin", Indent(level))?;
                if asynchronous {
                    writeln!(w, "{}if {reset} = '{active}' then", Indent(level + 1))?;
                    self.emit_resets(w, &scope, level + 2)?;
                    writeln!(w, "{}elsif clk = '1' and clk'event then", Indent(level + 1))?;
                    self.body.emit(w, &scope, level + 2)?;
                } else {
                    writeln!(w, "{}if clk = '1' and clk'event then", Indent(level + 1))?;
                    writeln!(w, "{}if {reset} = '{active}' then", Indent(level + 2))?;
                    self.emit_resets(w, &scope, level + 3)?;
                    writeln!(w, "{}else", Indent(level + 2))?;
                    self.body.emit(w, &scope, level + 3)?;
                    writeln!(w, "{}end if;", Indent(level + 2))?;
                }
                writeln!(w, "{}end if;", Indent(level + 1))?;
                writeln!(w, "{}end process {};", Indent(level), self.name)?;
            }
            Dialect::Verilog => {
                writeln!(w, "{}// {}", Indent(level), self.name)?;
                let edge = if options.active_low_reset { "negedge" } else { "posedge" };
                if asynchronous {
                    writeln!(w, "{}always @(posedge clk or {edge} {reset}) begin", Indent(level))?;
                } else {
                    writeln!(w, "{}always @(posedge clk) begin", Indent(level))?;
                }
                if options.active_low_reset {
                    writeln!(w, "{}if (~{reset}) begin", Indent(level + 1))?;
                } else {
                    writeln!(w, "{}if ({reset}) begin", Indent(level + 1))?;
                }
                self.emit_resets(w, &scope, level + 2)?;
                writeln!(w, "{}end else begin", Indent(level + 1))?;
                self.body.emit(w, &scope, level + 2)?;
                writeln!(w, "{}end", Indent(level + 1))?;
                writeln!(w, "{}end", Indent(level))?;
            }
        }
        Ok(())
    }
}

/// Top level item of a module's architecture body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behaviour {
    Synchronous(Synchronous),
    Asynchronous(Asynchronous),
    /// Concurrent assignment outside of any process.
    Assign(Assign),
    Raw(RawCodeLine),
    NewLine,
}

impl Behaviour {
    pub(crate) fn variables(&self) -> &[Variable] {
        match self {
            Behaviour::Synchronous(process) => &process.variables,
            Behaviour::Asynchronous(process) => &process.variables,
            _ => &[],
        }
    }

    pub(crate) fn build(&mut self, scope: &Scope<'_>) -> Result<(), Error> {
        match self {
            Behaviour::Synchronous(process) => process.build(scope),
            Behaviour::Asynchronous(process) => process.build(scope),
            Behaviour::Assign(assign) => {
                let mut access = Access::default();
                scope.write(&assign.target, &mut access)
            }
            Behaviour::Raw(_) | Behaviour::NewLine => Ok(()),
        }
    }

    pub(crate) fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        match self {
            Behaviour::Synchronous(process) => process.emit(w, scope, level),
            Behaviour::Asynchronous(process) => process.emit(w, scope, level),
            Behaviour::Assign(assign) => assign.emit(w, scope, level),
            Behaviour::Raw(raw) => Ok(raw.emit(w, scope.dialect, level)?),
            Behaviour::NewLine => Ok(writeln!(w)?),
        }
    }
}

impl From<Synchronous> for Behaviour {
    fn from(process: Synchronous) -> Self {
        Behaviour::Synchronous(process)
    }
}

impl From<Asynchronous> for Behaviour {
    fn from(process: Asynchronous) -> Self {
        Behaviour::Asynchronous(process)
    }
}

impl From<Assign> for Behaviour {
    fn from(assign: Assign) -> Self {
        Behaviour::Assign(assign)
    }
}

impl From<RawCodeLine> for Behaviour {
    fn from(raw: RawCodeLine) -> Self {
        Behaviour::Raw(raw)
    }
}
