use indexmap::IndexSet;

use crate::{Dialect, Error, Module};
use crate::dialect::TargetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Concurrent,
    Synchronous,
    Asynchronous,
}

/// What a statement is nested in, passed down the tree during build and emission.
#[derive(Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub module: &'a Module,
    pub dialect: Dialect,
    pub kind: BlockKind,
    pub process: &'a str,
}

/// Signals read and registers written by a subtree.
#[derive(Debug, Default)]
pub(crate) struct Access {
    pub reads: IndexSet<String>,
    pub registers: IndexSet<String>,
}

impl<'a> Scope<'a> {
    pub fn concurrent(module: &'a Module, dialect: Dialect) -> Self {
        Scope { module, dialect, kind: BlockKind::Concurrent, process: "" }
    }

    pub fn process(self, kind: BlockKind, name: &'a str) -> Self {
        Scope { kind, process: name, ..self }
    }

    /// Checks that `name` may be assigned here, and records written registers.
    pub fn write(&self, name: &str, access: &mut Access) -> Result<(), Error> {
        let module = self.module;
        if module.is_register(name) {
            if self.kind != BlockKind::Synchronous {
                return Err(Error::RegisterOutsideSynchronous(name.to_owned()));
            }
            access.registers.insert(name.to_owned());
        } else if module.is_variable(name) {
            if self.kind == BlockKind::Concurrent {
                return Err(Error::VariableOutsideProcess(name.to_owned()));
            }
        } else if module.is_wire(name) || module.is_port(name) {
            if self.kind == BlockKind::Synchronous {
                return Err(Error::NonRegisterWrite { process: self.process.to_owned(), name: name.to_owned() });
            }
        } else {
            return Err(Error::UnknownSignal(name.to_owned()));
        }
        Ok(())
    }

    pub fn target_kind(&self, name: &str) -> TargetKind {
        if self.module.is_register(name) {
            TargetKind::Register
        } else if self.module.is_variable(name) {
            TargetKind::Variable
        } else {
            TargetKind::Signal
        }
    }
}
