//! Names of the signals a generated function unit consists of.

pub(crate) fn opcode_signal(stage: u32) -> String {
    if stage == 0 { "operation_in".to_owned() } else { format!("operation_{stage}_r") }
}

pub(crate) fn trigger_signal(trigger_port: &str, stage: u32) -> String {
    if stage == 0 { format!("load_{trigger_port}_in") } else { format!("optrig_{stage}_r") }
}

pub(crate) fn opcode_constant(operation: &str) -> String {
    format!("op_{operation}_c")
}

pub(crate) fn operand_signal(operation: &str, id: u32) -> String {
    format!("{operation}_op{id}")
}

pub(crate) fn operand_placeholder(id: u32) -> String {
    format!("op{id}")
}

pub(crate) fn pipeline_name(port: &str, cycle: u32) -> String {
    if cycle == 0 { format!("data_{port}") } else { format!("data_{port}_{cycle}_r") }
}

pub(crate) fn pipeline_valid(port: &str, cycle: u32) -> String {
    format!("data_{port}_{cycle}_valid_r")
}

pub(crate) fn sub_operation_name(operation: &str, id: u32) -> String {
    format!("subop_{operation}_{id}")
}

pub(crate) fn constant_name(operation: &str, id: u32) -> String {
    format!("dag_{operation}_{id}_c")
}

pub(crate) fn resource_wire(resource: &str, instance: u32, port: &str) -> String {
    format!("{resource}_{instance}_{port}").to_ascii_lowercase()
}
