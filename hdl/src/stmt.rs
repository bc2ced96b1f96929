use std::io;

use crate::dialect::{Indent, is_vector};
use crate::scope::{Access, BlockKind, Scope};
use crate::{BinaryLiteral, Dialect, Error, Expr};

/// Part of a signal written by an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    Bit(u32),
    Range { upper: u32, lower: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub target: String,
    pub select: Option<Select>,
    pub value: Expr,
}

impl Assign {
    pub fn new(target: impl Into<String>, value: impl Into<Expr>) -> Self {
        Assign { target: target.into(), select: None, value: value.into() }
    }

    pub fn bit(target: impl Into<String>, index: u32, value: impl Into<Expr>) -> Self {
        Assign { select: Some(Select::Bit(index)), ..Assign::new(target, value) }
    }

    pub fn range(target: impl Into<String>, upper: u32, lower: u32, value: impl Into<Expr>) -> Self {
        Assign { select: Some(Select::Range { upper, lower }), ..Assign::new(target, value) }
    }

    fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        scope.write(&self.target, access)?;
        self.value.reads(&mut access.reads);
        Ok(())
    }

    pub(crate) fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let dialect = scope.dialect;
        let mut level = level;
        if dialect == Dialect::Verilog && scope.kind == BlockKind::Concurrent {
            writeln!(w, "{}always @*", Indent(level))?;
            level += 1;
        }
        let select = match self.select {
            None => String::new(),
            Some(Select::Bit(index)) => dialect.index(index),
            Some(Select::Range { upper, lower }) => dialect.slice(upper, lower),
        };
        let token = dialect.assign_token(scope.target_kind(&self.target));
        writeln!(w, "{}{}{select} {token} {};", Indent(level), self.target, self.value.render(dialect))?;
        Ok(())
    }
}

/// Assigns a value to every bit of a signal, or marks it as don't-care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAssign {
    pub target: String,
    /// Only the first character is used as the fill bit; `None` fills with don't-care.
    pub value: Option<String>,
}

impl DefaultAssign {
    pub fn new(target: impl Into<String>, value: impl Into<String>) -> Self {
        DefaultAssign { target: target.into(), value: Some(value.into()) }
    }

    pub fn dont_care(target: impl Into<String>) -> Self {
        DefaultAssign { target: target.into(), value: None }
    }

    fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        scope.write(&self.target, access)
    }

    fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let dialect = scope.dialect;
        let fill = match self.value.as_deref().and_then(|value| value.chars().next()) {
            Some(fill) => fill,
            None => dialect.dont_care(),
        };
        let token = dialect.assign_token(scope.target_kind(&self.target));
        let value = match dialect {
            Dialect::Vhdl => {
                let width = scope.module.width(&self.target)?;
                let wire_type = scope.module.wire_type(&self.target)?;
                if !is_vector(&width, wire_type) {
                    format!("'{fill}'")
                } else if width.is_scalar() {
                    format!("\"{fill}\"")
                } else {
                    format!("(others => '{fill}')")
                }
            }
            Dialect::Verilog => format!("'b{fill}"),
        };
        writeln!(w, "{}{} {token} {value};", Indent(level), self.target)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub branches: Vec<(Expr, Statement)>,
    pub otherwise: Option<Box<Statement>>,
}

impl If {
    pub fn new(condition: Expr, body: impl Into<Statement>) -> Self {
        If { branches: vec![(condition, body.into())], otherwise: None }
    }

    pub fn else_if(&mut self, condition: Expr, body: impl Into<Statement>) -> &mut Self {
        self.branches.push((condition, body.into()));
        self
    }

    pub fn else_clause(&mut self, body: impl Into<Statement>) -> Result<&mut Self, Error> {
        if self.otherwise.is_some() {
            return Err(Error::DuplicateElse);
        }
        self.otherwise = Some(Box::new(body.into()));
        Ok(self)
    }

    fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        for (condition, body) in &self.branches {
            condition.reads(&mut access.reads);
            body.build(scope, access)?;
        }
        if let Some(body) = &self.otherwise {
            body.build(scope, access)?;
        }
        Ok(())
    }

    fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let dialect = scope.dialect;
        for (index, (condition, body)) in self.branches.iter().enumerate() {
            let condition = condition.render(dialect);
            match (dialect, index) {
                (Dialect::Vhdl, 0) => writeln!(w, "{}if {condition} then", Indent(level))?,
                (Dialect::Vhdl, _) => writeln!(w, "{}elsif {condition} then", Indent(level))?,
                (Dialect::Verilog, 0) => writeln!(w, "{}if ({condition}) begin", Indent(level))?,
                (Dialect::Verilog, _) => writeln!(w, "{}end else if ({condition}) begin", Indent(level))?,
            }
            body.emit(w, scope, level + 1)?;
        }
        if let Some(body) = &self.otherwise {
            match dialect {
                Dialect::Vhdl => writeln!(w, "{}else", Indent(level))?,
                Dialect::Verilog => writeln!(w, "{}end else begin", Indent(level))?,
            }
            body.emit(w, scope, level + 1)?;
        }
        match dialect {
            Dialect::Vhdl => writeln!(w, "{}end if;", Indent(level))?,
            Dialect::Verilog => writeln!(w, "{}end", Indent(level))?,
        }
        Ok(())
    }
}

/// One labelled branch of a [`Switch`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Case {
    /// Takes precedence over the integer and literal labels.
    pub name: Option<String>,
    pub integers: Vec<i64>,
    pub literals: Vec<BinaryLiteral>,
    pub body: CodeBlock,
}

impl Case {
    pub fn new() -> Self {
        Case::default()
    }

    /// A case labelled with the name of a constant.
    pub fn named(name: impl Into<String>) -> Self {
        Case { name: Some(name.into()), ..Case::default() }
    }

    pub fn integer(mut self, label: i64) -> Self {
        self.integers.push(label);
        self
    }

    pub fn literal(mut self, label: BinaryLiteral) -> Self {
        self.literals.push(label);
        self
    }

    pub fn push(&mut self, statement: impl Into<Statement>) -> &mut Self {
        self.body.push(statement);
        self
    }

    fn label(&self, dialect: Dialect) -> Option<String> {
        let separator = match dialect {
            Dialect::Vhdl => " | ",
            Dialect::Verilog => ", ",
        };
        if let Some(name) = &self.name {
            Some(name.clone())
        } else if !self.integers.is_empty() {
            Some(self.integers.iter().map(i64::to_string).collect::<Vec<_>>().join(separator))
        } else if !self.literals.is_empty() {
            Some(self.literals.iter().map(|literal| literal.render(dialect)).collect::<Vec<_>>().join(separator))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefaultCase {
    pub body: CodeBlock,
}

impl DefaultCase {
    pub fn new() -> Self {
        DefaultCase::default()
    }

    pub fn push(&mut self, statement: impl Into<Statement>) -> &mut Self {
        self.body.push(statement);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub control: Expr,
    pub cases: Vec<Case>,
    /// Always emitted after the labelled cases.
    pub default: Option<DefaultCase>,
}

impl Switch {
    pub fn new(control: Expr) -> Self {
        Switch { control, cases: Vec::new(), default: None }
    }

    pub fn add_case(&mut self, case: Case) -> &mut Self {
        self.cases.push(case);
        self
    }

    pub fn add_default(&mut self, default: DefaultCase) -> &mut Self {
        self.default = Some(default);
        self
    }

    fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        let control = || self.control.render(scope.dialect);
        if self.cases.is_empty() && self.default.is_none() {
            return Err(Error::EmptySwitch { control: control() });
        }
        self.control.reads(&mut access.reads);
        for case in &self.cases {
            if case.label(scope.dialect).is_none() {
                return Err(Error::EmptyCase { control: control() });
            }
            case.body.build(scope, access)?;
        }
        if let Some(default) = &self.default {
            default.body.build(scope, access)?;
        }
        Ok(())
    }

    fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        let dialect = scope.dialect;
        let control = self.control.render(dialect);
        match dialect {
            Dialect::Vhdl => writeln!(w, "{}case {control} is", Indent(level))?,
            Dialect::Verilog => writeln!(w, "{}case ({control})", Indent(level))?,
        }
        for case in &self.cases {
            let label = case.label(dialect).ok_or_else(|| Error::EmptyCase { control: control.clone() })?;
            match dialect {
                Dialect::Vhdl => writeln!(w, "{}when {label} =>", Indent(level + 1))?,
                Dialect::Verilog => writeln!(w, "{}{label}: begin", Indent(level + 1))?,
            }
            case.body.emit(w, scope, level + 2)?;
            if dialect == Dialect::Verilog {
                writeln!(w, "{}end", Indent(level + 1))?;
            }
        }
        if let Some(default) = &self.default {
            match dialect {
                Dialect::Vhdl => writeln!(w, "{}when others =>", Indent(level + 1))?,
                Dialect::Verilog => writeln!(w, "{}default: begin", Indent(level + 1))?,
            }
            default.body.emit(w, scope, level + 2)?;
            if dialect == Dialect::Verilog {
                writeln!(w, "{}end", Indent(level + 1))?;
            }
        }
        match dialect {
            Dialect::Vhdl => writeln!(w, "{}end case;", Indent(level))?,
            Dialect::Verilog => writeln!(w, "{}endcase", Indent(level))?,
        }
        Ok(())
    }
}

/// An ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub statements: Vec<Statement>,
}

impl CodeBlock {
    pub fn new() -> Self {
        CodeBlock::default()
    }

    pub fn push(&mut self, statement: impl Into<Statement>) -> &mut Self {
        self.statements.push(statement.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub(crate) fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        for statement in &self.statements {
            statement.build(scope, access)?;
        }
        Ok(())
    }

    pub(crate) fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        for statement in &self.statements {
            statement.emit(w, scope, level)?;
        }
        Ok(())
    }
}

/// Snippet of already rendered code belonging to one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlOperation {
    pub name: String,
    pub lines: Vec<String>,
    pub dialect: Dialect,
    /// Signals the snippet reads, which cannot be discovered from the text.
    pub reads: Vec<String>,
}

impl HdlOperation {
    pub fn new(name: impl Into<String>, lines: Vec<String>, dialect: Dialect) -> Self {
        HdlOperation { name: name.into(), lines, dialect, reads: Vec::new() }
    }

    pub fn reads(mut self, signal: impl Into<String>) -> Self {
        self.reads.push(signal.into());
        self
    }

    fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        if self.dialect != scope.dialect {
            return Err(Error::DialectMismatch {
                name: self.name.clone(),
                expected: self.dialect,
                found: scope.dialect,
            });
        }
        access.reads.extend(self.reads.iter().cloned());
        Ok(())
    }

    fn emit(&self, w: &mut impl io::Write, level: usize) -> io::Result<()> {
        for line in &self.lines {
            writeln!(w, "{}{line}", Indent(level))?;
        }
        Ok(())
    }
}

/// Code given verbatim for both dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCodeLine {
    pub vhdl: String,
    pub verilog: String,
}

impl RawCodeLine {
    pub fn new(vhdl: impl Into<String>, verilog: impl Into<String>) -> Self {
        RawCodeLine { vhdl: vhdl.into(), verilog: verilog.into() }
    }

    pub fn emit(&self, w: &mut impl io::Write, dialect: Dialect, level: usize) -> io::Result<()> {
        let text = match dialect {
            Dialect::Vhdl => &self.vhdl,
            Dialect::Verilog => &self.verilog,
        };
        for line in text.trim_end_matches('\n').lines() {
            if line.is_empty() {
                writeln!(w)?;
            } else {
                writeln!(w, "{}{line}", Indent(level))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign(Assign),
    DefaultAssign(DefaultAssign),
    If(If),
    Switch(Switch),
    Block(CodeBlock),
    Operation(HdlOperation),
    Raw(RawCodeLine),
    NewLine,
}

impl Statement {
    pub(crate) fn build(&self, scope: &Scope<'_>, access: &mut Access) -> Result<(), Error> {
        match self {
            Statement::Assign(assign) => assign.build(scope, access),
            Statement::DefaultAssign(assign) => assign.build(scope, access),
            Statement::If(iff) => iff.build(scope, access),
            Statement::Switch(switch) => switch.build(scope, access),
            Statement::Block(block) => block.build(scope, access),
            Statement::Operation(operation) => operation.build(scope, access),
            Statement::Raw(_) | Statement::NewLine => Ok(()),
        }
    }

    pub(crate) fn emit(&self, w: &mut impl io::Write, scope: &Scope<'_>, level: usize) -> Result<(), Error> {
        match self {
            Statement::Assign(assign) => assign.emit(w, scope, level),
            Statement::DefaultAssign(assign) => assign.emit(w, scope, level),
            Statement::If(iff) => iff.emit(w, scope, level),
            Statement::Switch(switch) => switch.emit(w, scope, level),
            Statement::Block(block) => block.emit(w, scope, level),
            Statement::Operation(operation) => Ok(operation.emit(w, level)?),
            Statement::Raw(raw) => Ok(raw.emit(w, scope.dialect, level)?),
            Statement::NewLine => Ok(writeln!(w)?),
        }
    }
}

macro_rules! statement_from {
    ($($variant:ident($ty:ty)),*) => {
        $(
            impl From<$ty> for Statement {
                fn from(value: $ty) -> Self {
                    Statement::$variant(value)
                }
            }
        )*
    };
}

statement_from!(
    Assign(Assign),
    DefaultAssign(DefaultAssign),
    If(If),
    Switch(Switch),
    Block(CodeBlock),
    Operation(HdlOperation),
    Raw(RawCodeLine)
);
