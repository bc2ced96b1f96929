use std::collections::BTreeSet;

use hwgen_hdl::{
    Asynchronous, Assign, BinaryConstant, BinaryLiteral, Case, CodeBlock, DefaultAssign, DefaultCase, Expr,
    HdlOperation, If, Switch, Variable, Wire,
};

use crate::generator::FuGen;
use crate::names::{opcode_constant, opcode_signal, operand_placeholder, operand_signal, resource_wire};
use crate::snippet::{has_token, replace_tokens, Replace};
use crate::{required_bits_signed, Error, HdbVariable};

impl FuGen<'_> {
    /// Fill value for signals no operation is driving.
    fn idle_value(&self, signal: &str) -> DefaultAssign {
        // Memory interfaces with short latency are sampled right away.
        if self.is_lsu && self.min_latency < 3 {
            DefaultAssign::new(signal, "0")
        } else if self.options.dont_care_init {
            DefaultAssign::dont_care(signal)
        } else {
            DefaultAssign::new(signal, "0")
        }
    }

    fn build_replaces(&mut self, name: &str) -> Vec<Replace> {
        let Some(schedule) = self.schedules.get(name) else { return Vec::new() };
        let mut replaces = vec![
            Replace::new("glock", "glock_in"),
            Replace::new("trigger", self.trigger(schedule.initial_cycle)),
        ];
        for operand in &schedule.operands {
            replaces.push(Replace::new(operand_placeholder(operand.id), operand_signal(name, operand.id)));
        }
        for &id in &schedule.results {
            replaces.push(Replace::new(operand_placeholder(id), operand_signal(name, id)));
        }

        let Some(base) = self.base_operations.get(&schedule.base_operation) else { return replaces };
        for resource in base.resources() {
            let resource_name = resource.name.to_ascii_lowercase();
            let offset = schedule.resource_offsets.get(&resource_name).copied().unwrap_or(0);
            for index in 0..resource.count {
                for port in &resource.ports {
                    let port_name = port.name.to_ascii_lowercase();
                    replaces.push(Replace::new(
                        format!("{port_name}_{}", index + 1),
                        resource_wire(&resource_name, index + offset + 1, &port_name),
                    ));
                }
            }
        }

        let variables = base.variables;
        let global_signals = base.global_signals;
        for variable in variables {
            if let Some(replace) = rename(name, variable, &mut self.renamed_variables) {
                replaces.push(replace);
            }
        }
        for signal in global_signals {
            if let Some(replace) = rename(name, signal, &mut self.renamed_global_signals) {
                replaces.push(replace);
            }
        }
        replaces
    }

    /// Turns snippet lines into an operation statement, skipping lines `added` already holds.
    fn prepare_snippet(&mut self, name: &str, lines: &[String], sink: &mut CodeBlock, added: &mut BTreeSet<String>) {
        let replaces = self.replaces.get(name).cloned().unwrap_or_default();
        let mut snippet = Vec::new();
        let mut seen = BTreeSet::new();
        for line in lines {
            let replaced = replace_tokens(line, &replaces);
            if added.contains(&replaced) {
                continue;
            }
            let lowered = line.to_lowercase();
            if has_token(&lowered, "glockreq") {
                self.use_glock_request = true;
            }
            if has_token(&lowered, "glock") {
                self.use_glock = true;
            }
            seen.insert(replaced.clone());
            snippet.push(replaced);
        }
        if cfg!(feature = "trace") {
            eprintln!(">snippet {name}: {} lines", snippet.len());
        }
        added.extend(seen);
        sink.push(HdlOperation::new(name, snippet, self.dialect));
    }

    /// The combinational process running the operation snippets.
    pub(crate) fn build_operations(&mut self) -> Result<(), Error> {
        let mut process = Asynchronous::new("operations_actual_cp");
        let mut default_values = CodeBlock::new();
        let mut default_snippets = CodeBlock::new();
        let mut triggered_snippets = CodeBlock::new();
        let mut out_assignments = CodeBlock::new();

        for (signal, value) in &self.external_outputs {
            process.push(DefaultAssign::new(signal, value));
        }
        for signal in &self.resource_inputs {
            process.push(self.idle_value(signal));
        }
        for constant in self.dag_constants.values() {
            let name = crate::names::constant_name(&constant.operation, constant.id);
            self.module.add_binary_constant(BinaryConstant::new(name, required_bits_signed(constant.value), constant.value));
        }
        for signal in self.resource_outputs.iter().chain(&self.external_inputs) {
            process.reads(signal);
        }

        let mut default_statements = BTreeSet::new();
        let names: Vec<String> = self.schedules.keys().cloned().collect();
        for name in &names {
            let schedule = self.schedules[name].clone();
            for &id in &schedule.results {
                default_values.push(DefaultAssign::new(operand_signal(name, id), "0"));
            }
            for operand in &schedule.operands {
                let destination = operand_signal(name, operand.id);
                let value = if operand.port_width > operand.operand_width {
                    Expr::splice(&operand.signal, operand.operand_width - 1, 0)
                } else if operand.port_width < operand.operand_width {
                    Expr::ext(&operand.signal, operand.operand_width, operand.port_width)
                } else {
                    Expr::signal(&operand.signal)
                };
                if operand.is_output {
                    out_assignments.push(Assign::new(&destination, value));
                } else {
                    default_values.push(Assign::new(&destination, value));
                    process.reads(destination);
                }
            }

            let replaces = self.build_replaces(name);
            self.replaces.insert(name.clone(), replaces);
            let initial = self.base_operations.get(&schedule.base_operation).map(|base| base.initial.clone());
            if let Some(initial) = initial.filter(|lines| !lines.is_empty()) {
                self.prepare_snippet(name, &initial, &mut default_snippets, &mut default_statements);
            }
        }

        for cycle in 0..=self.max_latency {
            let mut switch = Switch::new(Expr::signal(opcode_signal(cycle)));
            let mut empty_switch = true;
            for operation in self.operations.clone() {
                let mut on_trigger = CodeBlock::new();
                let mut empty_block = true;
                let mut schedules = self.schedules.get(&operation).map(|schedule| schedule.sub_operations.clone()).unwrap_or_default();
                schedules.push(operation.clone());

                for name in &schedules {
                    let Some(schedule) = self.schedules.get(name) else { continue };
                    let (initial_cycle, final_cycle) = (schedule.initial_cycle, schedule.final_cycle);
                    let (implementation, post_op) = match self.base_operations.get(&schedule.base_operation) {
                        Some(base) => (base.implementation.clone(), base.post_op.clone()),
                        None => (Vec::new(), Vec::new()),
                    };
                    if initial_cycle == cycle {
                        if !implementation.is_empty() {
                            self.prepare_snippet(name, &implementation, &mut on_trigger, &mut BTreeSet::new());
                        }
                        empty_block = false;
                    }
                    if final_cycle == cycle {
                        if !post_op.is_empty() {
                            self.prepare_snippet(name, &post_op, &mut on_trigger, &mut BTreeSet::new());
                        }
                        empty_block = false;
                    }
                }

                if empty_block {
                    continue;
                }
                if self.operations.len() > 1 {
                    let mut case = Case::named(opcode_constant(&operation));
                    case.push(on_trigger);
                    switch.add_case(case);
                    empty_switch = false;
                } else {
                    triggered_snippets.push(If::new(Expr::is_set(self.trigger(cycle)), on_trigger));
                }
            }

            if !empty_switch {
                switch.add_default(DefaultCase::new());
                triggered_snippets.push(If::new(Expr::is_set(self.trigger(cycle)), switch));
            }
        }

        if self.use_glock {
            process.reads("glock_in");
        }
        if self.use_glock_request {
            default_values.push(Assign::new("glockreq", BinaryLiteral::new("0")));
        }

        for variable in &self.renamed_variables {
            process.add_variable(Variable::new(&variable.name, variable.width, variable.kind));
            process.push(self.idle_value(&variable.name));
        }
        for signal in &self.renamed_global_signals {
            self.module.add_wire(Wire::new(&signal.name, signal.width));
            process.reads(&signal.name);
            process.push(self.idle_value(&signal.name));
        }

        process.push(default_values).push(default_snippets).push(triggered_snippets).push(out_assignments);
        self.module.add_behaviour(process);
        Ok(())
    }

    pub(crate) fn finalize_hdl(&mut self) {
        if self.use_glock_request {
            self.module.add_wire(Wire::new("glockreq", 1));
            self.module.add_behaviour(Assign::new("glockreq_out", Expr::signal("glockreq")));
        } else {
            self.module.add_behaviour(Assign::new("glockreq_out", BinaryLiteral::new("0")));
        }
    }
}

/// Records the copy of `variable` used by operation `name`. Shared copies are recorded once.
fn rename(name: &str, variable: &HdbVariable, renamed: &mut Vec<HdbVariable>) -> Option<Replace> {
    if variable.rename {
        let replica = format!("{name}_{}", variable.name);
        renamed.push(HdbVariable { name: replica.clone(), ..variable.clone() });
        Some(Replace::new(&variable.name, replica))
    } else {
        if !renamed.iter().any(|other| other.name == variable.name) {
            renamed.push(variable.clone());
        }
        None
    }
}
