use std::path::PathBuf;

use hwgen_hdl::{Dialect, ModuleOptions, ResetStyle};

/// Where the registers of an operation sit relative to its logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Operands are registered before the logic runs.
    Front,
    /// Registers on both sides of the logic.
    Middle,
    /// Logic runs in the trigger cycle and results are registered.
    Back,
}

/// External co-processor protocol the unit is wrapped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoprocessorMode {
    #[default]
    None,
    /// Core-V eXtension interface.
    Cvxif,
    /// Rocket custom co-processor interface.
    Rocc,
}

impl CoprocessorMode {
    pub fn is_active(self) -> bool {
        self != CoprocessorMode::None
    }
}

/// Port counts a co-processor protocol can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoprocessorLimits {
    pub inputs: usize,
    pub outputs: usize,
}

impl Default for CoprocessorLimits {
    fn default() -> Self {
        CoprocessorLimits { inputs: 3, outputs: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub dialect: Dialect,
    pub module: ModuleOptions,
    /// Unit names, or `all`.
    pub front_registered: Vec<String>,
    pub middle_registered: Vec<String>,
    pub back_registered: Vec<String>,
    /// Units whose inputs are gated with their load signals.
    pub ic_gate: Vec<String>,
    /// Initialize unused signals with don't-care instead of zero.
    pub dont_care_init: bool,
    pub coprocessor: CoprocessorMode,
    pub coprocessor_limits: CoprocessorLimits,
    /// Emitted in the header of every generated file when set.
    pub timestamp: Option<String>,
    /// Directories searched for relative snippet and resource paths.
    pub search_paths: Vec<PathBuf>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            dialect: Dialect::Vhdl,
            module: ModuleOptions::default(),
            front_registered: Vec::new(),
            middle_registered: Vec::new(),
            back_registered: Vec::new(),
            ic_gate: Vec::new(),
            dont_care_init: false,
            coprocessor: CoprocessorMode::None,
            coprocessor_limits: CoprocessorLimits::default(),
            timestamp: None,
            search_paths: Vec::new(),
        }
    }
}

fn find_in_list(unit: &str, list: &[String], allow_all: bool) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(unit) || (allow_all && entry.eq_ignore_ascii_case("all")))
}

impl GeneratorOptions {
    /// Registration of `unit`; a list naming the unit beats a list saying `all`.
    pub fn registration(&self, unit: &str) -> Registration {
        if find_in_list(unit, &self.front_registered, false) {
            Registration::Front
        } else if find_in_list(unit, &self.middle_registered, false) {
            Registration::Middle
        } else if find_in_list(unit, &self.back_registered, false) {
            Registration::Back
        } else if find_in_list(unit, &self.front_registered, true) {
            Registration::Front
        } else if find_in_list(unit, &self.middle_registered, true) {
            Registration::Middle
        } else {
            Registration::Back
        }
    }

    pub fn ic_gated(&self, unit: &str) -> bool {
        find_in_list(unit, &self.ic_gate, true)
    }

    /// Module options actually used; co-processor wrappers expect a fixed reset scheme.
    pub fn effective_module_options(&self) -> ModuleOptions {
        if self.coprocessor.is_active() {
            ModuleOptions { reset_style: ResetStyle::Asynchronous, active_low_reset: true, reset_everything: true }
        } else {
            self.module.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_registration() {
        let options = GeneratorOptions {
            front_registered: list(&["all"]),
            back_registered: list(&["lsu"]),
            middle_registered: list(&["mul"]),
            ..GeneratorOptions::default()
        };
        assert_eq!(options.registration("lsu"), Registration::Back);
        assert_eq!(options.registration("MUL"), Registration::Middle);
        assert_eq!(options.registration("alu"), Registration::Front);
        assert_eq!(GeneratorOptions::default().registration("alu"), Registration::Back);
    }

    #[test]
    fn test_coprocessor_reset() {
        let options = GeneratorOptions {
            module: ModuleOptions { reset_style: ResetStyle::Synchronous, active_low_reset: false, reset_everything: false },
            coprocessor: CoprocessorMode::Rocc,
            ..GeneratorOptions::default()
        };
        let module = options.effective_module_options();
        assert_eq!(module.reset_style, ResetStyle::Asynchronous);
        assert!(module.active_low_reset);
        assert!(module.reset_everything);
    }
}
