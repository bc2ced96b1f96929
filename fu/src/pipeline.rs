use hwgen_hdl::{
    Asynchronous, Assign, BinaryLiteral, CodeBlock, Expr, If, Register, ResetOption, Synchronous, Wire, WireType,
};

use crate::generator::FuGen;
use crate::names::{opcode_constant, opcode_signal, operand_signal, pipeline_name, pipeline_valid, trigger_signal};
use crate::{Direction, Error};

impl FuGen<'_> {
    pub(crate) fn trigger(&self, stage: u32) -> String {
        trigger_signal(&self.trigger_port, stage)
    }

    fn add_register_if_missing(&mut self, name: String, width: u32, wire_type: WireType) {
        if self.registers.insert(name.clone()) {
            if cfg!(feature = "trace") {
                eprintln!(">register {name} [{width}]");
            }
            let register = Register::new(name, width).with_reset(ResetOption::Optional);
            let register = match wire_type {
                WireType::Vector => register.vector(),
                WireType::Auto => register,
            };
            self.module.add_register(register);
        }
    }

    /// Operand values seen by the operations in the trigger cycle: either straight from the port or
    /// from a shadow register holding the last value written to it.
    pub(crate) fn create_shadow_registers(&mut self) -> Result<(), Error> {
        let unit = self.unit;
        let gated = self.options.ic_gated(&unit.name);
        for port in unit.ports.iter().filter(|port| port.is_input()) {
            let output = pipeline_name(&port.name, 0);
            self.module.add_wire(Wire::new(&output, port.width).vector());

            let mut data_port = format!("data_{}_in", port.name);
            let load_port = format!("load_{}_in", port.name);
            if gated {
                let gate_name = format!("data_{}_gated", port.name);
                let gate = Expr::signal(&data_port) & Expr::sext(&load_port, port.width, 1);
                self.module.add_behaviour(Assign::new(&gate_name, gate));
                self.module.add_wire(Wire::new(&gate_name, port.width).vector());
                data_port = gate_name;
            }

            if port.name != self.trigger_port && !port.no_register {
                let shadow = format!("shadow_{}_r", port.name);
                self.module.add_register(Register::new(&shadow, port.width).vector().with_reset(ResetOption::Optional));

                let mut capture = Synchronous::new(format!("shadow_{}_sp", port.name));
                capture.push(If::new(
                    Expr::is_clear("glock_in").and(Expr::is_set(&load_port)),
                    Assign::new(&shadow, Expr::signal(&data_port)),
                ));
                self.module.add_behaviour(capture);

                let mut select = If::new(
                    Expr::is_set(self.trigger(0)).and(Expr::is_set(&load_port)),
                    Assign::new(&output, Expr::signal(format!("data_{}_in", port.name))),
                );
                select.else_clause(Assign::new(&output, Expr::signal(&shadow)))?;
                let mut process = Asynchronous::new(format!("shadow_{}_cp", port.name));
                process.push(select);
                self.module.add_behaviour(process);
            } else {
                self.module.add_behaviour(Assign::new(&output, Expr::signal(&data_port)));
            }
        }
        Ok(())
    }

    /// Opcode, trigger and operand registers that carry the state of an operation through its cycles.
    pub(crate) fn create_port_pipeline(&mut self) {
        let mut pipeline = CodeBlock::new();
        let mut first_stage = CodeBlock::new();

        for stage in 0..self.max_latency {
            if self.operations.len() > 1 {
                let next = opcode_signal(stage + 1);
                self.add_register_if_missing(next.clone(), self.opcode_width, WireType::Vector);
                let assign = Assign::new(next, Expr::signal(opcode_signal(stage)));
                if stage == 0 {
                    first_stage.push(assign);
                } else {
                    pipeline.push(assign);
                }
            }
            let next = self.trigger(stage + 1);
            self.add_register_if_missing(next.clone(), 1, WireType::Auto);
            pipeline.push(Assign::new(next, Expr::signal(self.trigger(stage))));
        }

        let unit = self.unit;
        for port in &unit.ports {
            if self.port_direction.get(&port.name) != Some(&Direction::Input) {
                continue;
            }
            let length = self.pipeline_length.get(&port.name).copied().unwrap_or(0);
            for stage in 0..length {
                let next = pipeline_name(&port.name, stage + 1);
                self.add_register_if_missing(next.clone(), port.width, WireType::Vector);
                let assign = Assign::new(next, Expr::signal(pipeline_name(&port.name, stage)));
                if stage == 0 {
                    first_stage.push(assign);
                } else {
                    pipeline.push(assign);
                }
            }
        }

        pipeline.push(If::new(Expr::is_set(self.trigger(0)), first_stage));
        let mut process = Synchronous::new("input_pipeline_sp");
        process.push(If::new(Expr::is_clear("glock_in"), pipeline));
        self.module.add_behaviour(process);
    }

    /// Condition under which the result of `operation` produced in `cycle` is valid.
    fn result_ready(&self, operation: &str, cycle: u32) -> Expr {
        let triggered = Expr::is_set(self.trigger(cycle));
        if self.operations.len() == 1 {
            triggered
        } else {
            Expr::signal(opcode_signal(cycle)).equals(Expr::signal(opcode_constant(operation))).and(triggered)
        }
    }

    /// Registers that hold each result until its stage reaches the output port.
    pub(crate) fn create_output_pipeline(&mut self) -> Result<(), Error> {
        let mut output_pipeline = CodeBlock::new();
        let mut last_stage = CodeBlock::new();

        let unit = self.unit;
        for port in &unit.ports {
            if self.port_direction.get(&port.name) != Some(&Direction::Output) {
                continue;
            }
            let length = self.pipeline_length.get(&port.name).copied().unwrap_or(0);
            let connections = self.port_inputs.get(&port.name).cloned().unwrap_or_default();

            for cycle in (0..=length).rev() {
                let next = pipeline_name(&port.name, cycle);
                let valid = pipeline_valid(&port.name, cycle);
                if cycle == 0 {
                    self.module.add_wire(Wire::new(&next, port.width).vector());
                } else {
                    output_pipeline.push(Assign::new(&valid, BinaryLiteral::new("1")));
                    self.add_register_if_missing(next.clone(), port.width, WireType::Vector);
                    self.add_register_if_missing(valid.clone(), 1, WireType::Auto);
                }

                let mut selection: Option<If> = None;
                for connection in connections.iter().filter(|connection| connection.pipeline_stage == cycle) {
                    let ready = self.result_ready(&connection.operation, connection.source_cycle);
                    let source = Expr::ext(
                        operand_signal(&connection.operation, connection.operand),
                        port.width,
                        connection.operand_width,
                    );
                    let assign = Assign::new(&next, source);
                    match selection.as_mut() {
                        Some(selection) => {
                            selection.else_if(ready, assign);
                        }
                        None => selection = Some(If::new(ready, assign)),
                    }
                }

                let mut skip_last_assign = false;
                if cycle != length {
                    let previous = pipeline_name(&port.name, cycle + 1);
                    let previous_valid = Expr::is_set(pipeline_valid(&port.name, cycle + 1));
                    let assign = Assign::new(&next, Expr::signal(previous));
                    match selection.as_mut() {
                        Some(selection) => {
                            selection.else_if(previous_valid, assign);
                        }
                        None if cycle == 0 => {
                            skip_last_assign = true;
                            last_stage.push(assign);
                        }
                        None => selection = Some(If::new(previous_valid, assign)),
                    }
                }

                if cycle == 0 {
                    let held = format!("{next}_r");
                    self.add_register_if_missing(held.clone(), port.width, WireType::Vector);
                    output_pipeline.push(Assign::new(&held, Expr::signal(&next)));
                    if !skip_last_assign {
                        let hold = Assign::new(&next, Expr::signal(&held));
                        match selection {
                            Some(mut selection) => {
                                selection.else_clause(hold)?;
                                last_stage.push(selection);
                            }
                            None => {
                                last_stage.push(hold);
                            }
                        }
                    }
                } else if let Some(mut selection) = selection {
                    selection.else_clause(Assign::new(&valid, BinaryLiteral::new("0")))?;
                    output_pipeline.push(selection);
                } else {
                    output_pipeline.push(Assign::new(&valid, BinaryLiteral::new("0")));
                }
            }
            last_stage.push(Assign::new(format!("data_{}_out", port.name), Expr::signal(pipeline_name(&port.name, 0))));
        }

        let mut process = Synchronous::new("output_pipeline_sp");
        process.push(If::new(Expr::is_clear("glock_in"), output_pipeline));
        self.module.add_behaviour(process);

        let mut process = Asynchronous::new("output_pipeline_cp");
        process.push(last_stage);
        self.module.add_behaviour(process);
        Ok(())
    }
}
