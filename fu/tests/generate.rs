use std::path::PathBuf;

use hwgen_fu::{
    CoprocessorMode, Dag, DagNode, Error, FuImplementation, FuPort, FunctionUnit, GeneratedUnit, GeneratorOptions,
    HdbEntry, HdbVariable, HwOperation, Machine, OperationDef, OperationPool, Resource, ResourcePort, SnippetSource,
    Snippets, generate,
};
use hwgen_fu::Direction;
use hwgen_hdl::{Dialect, VariableKind, Width};

const ADD: &str = "op3 <= std_logic_vector(unsigned(op1) + unsigned(op2));";
const MUL: &str = "op3 <= std_logic_vector(resize(unsigned(op1) * unsigned(op2), 32));";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn binary(name: &str) -> OperationDef {
    OperationDef::new(name).input(32).input(32).output(32)
}

fn alu(operations: Vec<HwOperation>) -> FunctionUnit {
    let mut unit = FunctionUnit::new("ALU");
    unit.ports = vec![FuPort::input("in1t", 32).triggering(), FuPort::input("in2", 32), FuPort::output("out1", 32)];
    unit.operations = operations;
    unit
}

fn binary_on_alu(name: &str, latency: u32) -> HwOperation {
    HwOperation::new(name).bind(1, "in1t").bind(2, "in2").bind_result(3, "out1", latency)
}

fn machine(unit: FunctionUnit, definitions: Vec<OperationDef>) -> Machine {
    let mut operations = OperationPool::new();
    for definition in definitions {
        operations.add(definition);
    }
    Machine { function_units: vec![unit], operations }
}

fn snippets(implementation: &str) -> Snippets {
    Snippets { implementation: Some(SnippetSource::Inline(implementation.to_owned())), ..Snippets::default() }
}

fn entry(operation: &str, latency: u32, implementation: &str) -> HdbEntry {
    let mut entry = HdbEntry::new(operation, latency);
    entry.vhdl = Some(snippets(implementation));
    entry
}

fn implementation(entries: Vec<HdbEntry>) -> FuImplementation {
    FuImplementation { name: "ALU".to_owned(), operations: entries }
}

fn front_registered() -> GeneratorOptions {
    GeneratorOptions { front_registered: vec!["all".to_owned()], ..GeneratorOptions::default() }
}

fn add_mul() -> (Machine, FuImplementation) {
    let machine = machine(alu(vec![binary_on_alu("add", 1), binary_on_alu("mul", 3)]), vec![binary("add"), binary("mul")]);
    (machine, implementation(vec![entry("add", 0, ADD), entry("mul", 0, MUL)]))
}

fn register_names(unit: &GeneratedUnit) -> Vec<&str> {
    unit.module.registers().iter().map(|register| register.name.as_str()).collect()
}

fn unit_error(result: Result<GeneratedUnit, Error>) -> Error {
    match result {
        Err(Error::Unit { unit, source }) => {
            assert_eq!(unit, "ALU");
            *source
        }
        Err(error) => panic!("error without unit context: {error}"),
        Ok(unit) => panic!("{} generated", unit.name),
    }
}

#[test]
fn test_add_mul_schedule() {
    init_logging();
    let (machine, implementation) = add_mul();
    let unit = generate(&front_registered(), &machine, &implementation).unwrap();
    assert_eq!(unit.name, "fu_alu");
    assert_eq!(unit.operations, ["add", "mul"]);
    assert_eq!((unit.schedules["add"].initial_cycle, unit.schedules["add"].final_cycle), (1, 1));
    assert_eq!((unit.schedules["mul"].initial_cycle, unit.schedules["mul"].final_cycle), (3, 3));

    let registers = register_names(&unit);
    for stage in 1..=3 {
        assert!(registers.contains(&format!("data_in1t_{stage}_r").as_str()), "{registers:?}");
        assert!(registers.contains(&format!("data_in2_{stage}_r").as_str()), "{registers:?}");
    }
    assert!(!registers.contains(&"data_in2_4_r"));
    assert!(registers.contains(&"operation_3_r"));
    assert!(registers.contains(&"optrig_3_r"));
    assert!(registers.contains(&"shadow_in2_r"));
    assert!(!registers.contains(&"shadow_in1t_r"));
    assert!(registers.contains(&"data_out1_r"));
}

#[test]
fn test_add_mul_vhdl() {
    let (machine, implementation) = add_mul();
    let mut unit = generate(&front_registered(), &machine, &implementation).unwrap();
    let text = unit.render().unwrap();
    assert!(text.contains("-- Function Unit: ALU\n"), "{text}");
    assert!(text.contains("--  add : 0\n"), "{text}");
    assert!(text.contains("--  mul : 1\n"), "{text}");
    assert!(text.contains("entity fu_alu is\n"), "{text}");
    assert!(text.contains("add_op3 <= std_logic_vector(unsigned(add_op1) + unsigned(add_op2));\n"), "{text}");
    assert!(text.contains("mul_op3 <= std_logic_vector(resize(unsigned(mul_op1) * unsigned(mul_op2), 32));\n"));
    assert!(text.contains("when op_add_c =>\n"), "{text}");
    assert!(text.contains("add_op1 <= data_in1t_1_r;\n"), "{text}");
    assert!(text.contains("mul_op2 <= data_in2_3_r;\n"), "{text}");
    assert!(text.contains("data_out1_out <= data_out1;\n"), "{text}");
    assert!(text.contains("glockreq_out <= '0';\n"), "{text}");
    assert_eq!(unit.path(), PathBuf::from("vhdl/fu_alu.vhd"));
}

#[test]
fn test_add_mul_verilog() {
    let (machine, mut implementation) = add_mul();
    for entry in &mut implementation.operations {
        entry.verilog = Some(snippets("op3 = op1 + op2;"));
    }
    let options = GeneratorOptions { dialect: Dialect::Verilog, ..front_registered() };
    let mut unit = generate(&options, &machine, &implementation).unwrap();
    let text = unit.render().unwrap();
    assert!(text.contains("module fu_alu ("), "{text}");
    assert!(text.contains("add_op3 = add_op1 + add_op2;\n"), "{text}");
    assert!(text.contains("endmodule\n"), "{text}");
    assert_eq!(unit.path(), PathBuf::from("verilog/fu_alu.v"));
}

#[test]
fn test_add_mul_verilog_processes() {
    let (machine, mut implementation) = add_mul();
    for entry in &mut implementation.operations {
        let mut verilog = snippets("op3 = op1 + op2;");
        verilog.global_signals.push(HdbVariable::new("carry", 1, VariableKind::Logic).renamed());
        entry.verilog = Some(verilog);
    }
    let options = GeneratorOptions { dialect: Dialect::Verilog, dont_care_init: true, ..front_registered() };
    let mut unit = generate(&options, &machine, &implementation).unwrap();
    let text = unit.render().unwrap();
    assert!(text.contains("always @(posedge clk"), "{text}");
    assert!(text.contains("always @* begin\n"), "{text}");
    assert!(text.contains("case (operation_1_r)\n"), "{text}");
    assert!(text.contains("case (operation_3_r)\n"), "{text}");
    assert!(text.contains("op_add_c: begin\n"), "{text}");
    assert!(text.contains("op_mul_c: begin\n"), "{text}");
    assert!(text.contains("default: begin\n"), "{text}");
    assert!(text.contains("endcase\n"), "{text}");
    assert!(text.contains("add_carry = 'bx;\n"), "{text}");
    assert!(text.contains("mul_carry = 'bx;\n"), "{text}");
    assert!(!text.contains("when others"), "{text}");
}

#[test]
fn test_zero_width_port() {
    let mut unit = alu(vec![binary_on_alu("add", 1)]);
    unit.ports[1].width = 0;
    let machine = machine(unit, vec![binary("add")]);
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation(vec![entry("add", 1, ADD)])));
    assert!(matches!(error, Error::ZeroWidthPort(ref port) if port == "in2"), "{error}");
}

#[test]
fn test_zero_width_operand() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![OperationDef::new("add").input(0).input(32).output(32)]);
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation(vec![entry("add", 1, ADD)])));
    assert!(matches!(error, Error::ZeroWidthOperand { ref operation, operand: 1 } if operation == "add"), "{error}");
    assert_eq!(error.to_string(), "operand 1 of operation add has width 0");
}

#[test]
fn test_zero_width_sub_operation() {
    let (mut machine, implementation) = mac();
    machine.operations.add(OperationDef::new("mul").input(32).input(32).output(0));
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation));
    assert!(matches!(error, Error::ZeroWidthOperand { ref operation, operand: 3 } if operation == "mul"), "{error}");
}

#[test]
fn test_opcode_width() {
    let operations = ["add", "and", "ior", "sub", "xor"];
    let unit = alu(operations.iter().map(|name| binary_on_alu(name, 1)).collect());
    let machine = machine(unit, operations.iter().map(|name| binary(name)).collect());
    let implementation = implementation(operations.iter().map(|name| entry(name, 1, ADD)).collect());
    let unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    let opcode = unit.module.ports().iter().find(|port| port.name == "operation_in").unwrap();
    assert_eq!(opcode.width, Width::Int(3));
    let constant = unit.module.binary_constants().iter().find(|constant| constant.name == "op_xor_c").unwrap();
    assert_eq!((constant.width, constant.value), (3, 4));
}

#[test]
fn test_single_operation_has_no_opcode() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 1, ADD)]);
    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    assert!(unit.module.ports().iter().all(|port| port.name != "operation_in"));
    let text = unit.render().unwrap();
    assert!(text.contains("--   add : 0\n"), "{text}");
    assert!(!text.contains("case operation_"), "{text}");
}

#[test]
fn test_back_registration() {
    let machine = machine(alu(vec![binary_on_alu("add", 2)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 1, ADD)]);
    let unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    let schedule = &unit.schedules["add"];
    assert_eq!((schedule.initial_cycle, schedule.final_cycle), (0, 1));
    let registers = register_names(&unit);
    assert!(registers.contains(&"data_out1_1_r"), "{registers:?}");
    assert!(registers.contains(&"data_out1_1_valid_r"), "{registers:?}");
    assert!(!registers.contains(&"data_in2_1_r"), "{registers:?}");
}

#[test]
fn test_middle_registration() {
    let machine = machine(alu(vec![binary_on_alu("add", 3)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 1, ADD)]);
    let options = GeneratorOptions { middle_registered: vec!["alu".to_owned()], ..GeneratorOptions::default() };
    let unit = generate(&options, &machine, &implementation).unwrap();
    let schedule = &unit.schedules["add"];
    assert_eq!((schedule.initial_cycle, schedule.final_cycle), (1, 2));
}

#[test]
fn test_negative_cycle() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 2, ADD)]);
    let error = unit_error(generate(&front_registered(), &machine, &implementation));
    assert!(matches!(error, Error::NegativeCycle { ref operation } if operation == "add"), "{error}");
}

// out = (in1 * in2) + in3
fn mac_dag() -> Dag {
    let mut dag = Dag::new();
    let in1 = dag.add_node(DagNode::Terminal(1));
    let in2 = dag.add_node(DagNode::Terminal(2));
    let in3 = dag.add_node(DagNode::Terminal(3));
    let mul = dag.add_node(DagNode::Operation("MUL".into()));
    let add = dag.add_node(DagNode::Operation("ADD".into()));
    let out = dag.add_node(DagNode::Terminal(4));
    dag.connect(in1, 1, mul, 1);
    dag.connect(in2, 2, mul, 2);
    dag.connect(mul, 3, add, 1);
    dag.connect(in3, 3, add, 2);
    dag.connect(add, 3, out, 4);
    dag
}

fn mac() -> (Machine, FuImplementation) {
    let mut unit = FunctionUnit::new("ALU");
    unit.ports = vec![
        FuPort::input("in1t", 32).triggering(),
        FuPort::input("in2", 32),
        FuPort::input("in3", 32),
        FuPort::output("out1", 32),
    ];
    unit.operations =
        vec![HwOperation::new("mac").bind(1, "in1t").bind(2, "in2").bind(3, "in3").bind_result(4, "out1", 3)];
    let mac = OperationDef::new("MAC").input(32).input(32).input(32).output(32).dag(mac_dag());
    let machine = machine(unit, vec![binary("add"), binary("mul"), mac]);
    (machine, implementation(vec![entry("add", 1, ADD), entry("mul", 2, MUL)]))
}

#[test]
fn test_decomposed_operation() {
    let (machine, implementation) = mac();
    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    let schedule = &unit.schedules["mac"];
    assert_eq!((schedule.initial_cycle, schedule.final_cycle), (0, 3));
    assert_eq!(schedule.sub_operations, ["subop_mul_0", "subop_add_0"]);
    let mul = &unit.schedules["subop_mul_0"];
    assert_eq!((mul.base_operation.as_str(), mul.initial_cycle, mul.final_cycle), ("mul", 0, 2));
    let add = &unit.schedules["subop_add_0"];
    assert_eq!((add.base_operation.as_str(), add.initial_cycle, add.final_cycle), ("add", 2, 3));

    let text = unit.render().unwrap();
    assert!(text.contains("subop_mul_0_op1 <= mac_op1;\n"), "{text}");
    assert!(text.contains("subop_add_0_op1 <= subop_mul_0_op3;\n"), "{text}");
    assert!(text.contains("mac_op4 <= subop_add_0_op3;\n"), "{text}");
    assert!(text.contains("subop_add_0_op3 <= std_logic_vector(unsigned(subop_add_0_op1) + unsigned(subop_add_0_op2));\n"));
}

#[test]
fn test_decomposition_needs_implementations() {
    let (machine, mut implementation) = mac();
    implementation.operations.retain(|entry| entry.operation == "add");
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation));
    assert!(matches!(error, Error::NoValidDags(ref operation) if operation == "mac"), "{error}");
}

#[test]
fn test_dag_constant() {
    // out = in1 + 1
    let mut dag = Dag::new();
    let in1 = dag.add_node(DagNode::Terminal(1));
    let one = dag.add_node(DagNode::Constant(1));
    let add = dag.add_node(DagNode::Operation("add".into()));
    let out = dag.add_node(DagNode::Terminal(2));
    dag.connect(in1, 1, add, 1);
    dag.connect(one, 1, add, 2);
    dag.connect(add, 3, out, 2);

    let mut unit = FunctionUnit::new("ALU");
    unit.ports = vec![FuPort::input("in1t", 32).triggering(), FuPort::output("out1", 32)];
    unit.operations = vec![HwOperation::new("inc").bind(1, "in1t").bind_result(2, "out1", 1)];
    let inc = OperationDef::new("inc").input(32).output(32).dag(dag);
    let machine = machine(unit, vec![binary("add"), inc]);
    let implementation = implementation(vec![entry("add", 1, ADD)]);

    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    let constant = unit.module.binary_constants().iter().find(|constant| constant.name == "dag_inc_0_c").unwrap();
    assert_eq!((constant.width, constant.value), (2, 1));
    let text = unit.render().unwrap();
    assert!(text.contains("subop_add_0_op2 <= std_logic_vector(resize(unsigned(dag_inc_0_c), 32));\n"), "{text}");
}

#[test]
fn test_lock_request() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 1, "op3 <= op1;\nGLOCKREQ <= '1';")]);
    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap();
    let text = unit.render().unwrap();
    assert!(text.contains("signal glockreq : std_logic;\n"), "{text}");
    assert!(text.contains("glockreq <= '0';\n"), "{text}");
    assert!(text.contains("glockreq <= '1';\n"), "{text}");
    assert!(text.contains("glockreq_out <= glockreq;\n"), "{text}");
}

#[test]
fn test_renamed_variable() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![binary("add")]);
    let mut entry = entry("add", 1, "acc := unsigned(op1);\nop3 <= std_logic_vector(acc);");
    if let Some(snippets) = entry.vhdl.as_mut() {
        snippets.variables.push(HdbVariable::new("acc", 32, VariableKind::Unsigned).renamed());
    }
    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation(vec![entry])).unwrap();
    let text = unit.render().unwrap();
    assert!(text.contains("add_acc := unsigned(add_op1);\n"), "{text}");
    assert!(text.contains("add_op3 <= std_logic_vector(add_acc);\n"), "{text}");
}

#[test]
fn test_resource_instance() {
    let machine = machine(alu(vec![binary_on_alu("mul", 1)]), vec![binary("mul")]);
    let port = |name: &str, direction: Direction, width: u32| ResourcePort { name: name.to_owned(), direction, width, vector: width > 1 };
    let mut entry = entry("mul", 1, "a_1 <= op1;\nb_1 <= op2;\nop3 <= p_1;");
    entry.resources.push(Resource {
        name: "DSP".to_owned(),
        count: 1,
        ports: vec![
            port("clk", Direction::Input, 1),
            port("A", Direction::Input, 32),
            port("B", Direction::Input, 32),
            port("P", Direction::Output, 32),
        ],
        synthesis_files: Vec::new(),
        simulation_files: Vec::new(),
    });
    let mut unit = generate(&GeneratorOptions::default(), &machine, &implementation(vec![entry])).unwrap();
    assert_eq!(unit.module.modules().len(), 1);
    let text = unit.render().unwrap();
    assert!(text.contains("component dsp is\n"), "{text}");
    assert!(text.contains("dsp_1 : dsp\n"), "{text}");
    assert!(text.contains("dsp_1_a <= mul_op1;\n"), "{text}");
    assert!(text.contains("mul_op3 <= dsp_1_p;\n"), "{text}");
    assert!(text.contains("dsp_1_a <= (others => '0');\n"), "{text}");
}

#[test]
fn test_missing_implementation() {
    let (machine, implementation) = add_mul();
    let options = GeneratorOptions { dialect: Dialect::Verilog, ..GeneratorOptions::default() };
    let error = unit_error(generate(&options, &machine, &implementation));
    assert!(
        matches!(error, Error::MissingImplementation { ref operation, dialect: Dialect::Verilog } if operation == "add"),
        "{error}"
    );
}

#[test]
fn test_output_latency_mismatch() {
    let mut unit = alu(Vec::new());
    unit.ports.push(FuPort::output("out2", 32));
    unit.operations.push(HwOperation::new("divmod").bind(1, "in1t").bind(2, "in2").bind_result(3, "out1", 2).bind_result(
        4,
        "out2",
        3,
    ));
    let divmod = OperationDef::new("divmod").input(32).input(32).output(32).output(32);
    let machine = machine(unit, vec![divmod]);
    let implementation = implementation(vec![entry("divmod", 1, "op3 <= op1;\nop4 <= op2;")]);
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation));
    assert!(matches!(error, Error::OutputLatencyMismatch(ref operation) if operation == "divmod"), "{error}");
}

#[test]
fn test_no_trigger_port() {
    let mut unit = alu(vec![binary_on_alu("add", 1)]);
    unit.ports[0].triggering = false;
    let machine = machine(unit, vec![binary("add")]);
    let error = unit_error(generate(&GeneratorOptions::default(), &machine, &implementation(vec![entry("add", 1, ADD)])));
    assert!(matches!(error, Error::NoTriggerPort(_)), "{error}");
}

#[test]
fn test_unknown_unit() {
    let (machine, mut implementation) = add_mul();
    implementation.name = "LSU".to_owned();
    let error = generate(&GeneratorOptions::default(), &machine, &implementation).unwrap_err();
    assert_eq!(error.to_string(), "cannot generate LSU: function unit \"LSU\" is not in the architecture");
}

#[test]
fn test_cvxif_coprocessor() {
    let (machine, implementation) = add_mul();
    let options = GeneratorOptions { coprocessor: CoprocessorMode::Cvxif, ..front_registered() };
    let unit = generate(&options, &machine, &implementation).unwrap();
    let opcode = unit.module.ports().iter().find(|port| port.name == "operation_in").unwrap();
    assert_eq!(opcode.width, Width::Int(32));
    let constant = unit.module.binary_constants().iter().find(|constant| constant.name == "op_mul_c").unwrap();
    assert_eq!((constant.width, constant.value), (32, (1 << 25) | 0b0001011));

    let paths: Vec<_> = unit.auxiliary_files.iter().map(|file| file.path.clone()).collect();
    assert_eq!(
        paths,
        [PathBuf::from("systemverilog/cvxif_sup_pkg.sv"), PathBuf::from("systemverilog/alu_coprocessor.sv")]
    );
    assert!(unit.auxiliary_files[0].contents.starts_with("package cvxif_sup_pkg;\n"));
    let wrapper = &unit.auxiliary_files[1].contents;
    assert!(wrapper.starts_with("module alu_coprocessor\n"), "{wrapper}");
    assert!(wrapper.contains("fu_alu fu_i (\n"), "{wrapper}");
    assert!(wrapper.contains(".data_in1t_in(register.rs[0]),\n"), "{wrapper}");
    assert!(wrapper.contains(".data_in2_in(register.rs[1]),\n"), "{wrapper}");
    assert!(wrapper.contains(".data_out1_out(result_data)\n"), "{wrapper}");
    assert!(wrapper.contains("logic [3:0] pending_q;\n"), "{wrapper}");
    assert!(wrapper.contains("32'h0000000b: issued[1] = 1'b1; // add\n"), "{wrapper}");
    assert!(wrapper.contains("32'h0200000b: issued[3] = 1'b1; // mul\n"), "{wrapper}");
    assert!(!wrapper.contains("tracker"), "{wrapper}");
    assert!(!wrapper.contains("<<placeholder"), "{wrapper}");
    assert_connected(&unit, wrapper);
}

/// Ports the wrapper connects on the `fu_i` instance.
fn connections(wrapper: &str) -> Vec<&str> {
    let start = wrapper.find(" fu_i (\n").unwrap_or_else(|| panic!("no unit instance in:\n{wrapper}"));
    wrapper[start..]
        .lines()
        .skip(1)
        .map(str::trim)
        .take_while(|line| *line != ");")
        .filter_map(|line| line.strip_prefix('.'))
        .filter_map(|line| line.split('(').next())
        .collect()
}

fn assert_connected(unit: &GeneratedUnit, wrapper: &str) {
    let connections = connections(wrapper);
    assert!(!connections.is_empty(), "{wrapper}");
    for connection in connections {
        assert!(
            unit.module.ports().iter().any(|port| port.name == connection),
            "{} has no port {connection}",
            unit.name
        );
    }
}

#[test]
fn test_single_operation_coprocessor() {
    let machine = machine(alu(vec![binary_on_alu("add", 1)]), vec![binary("add")]);
    let implementation = implementation(vec![entry("add", 1, ADD)]);
    for mode in [CoprocessorMode::Cvxif, CoprocessorMode::Rocc] {
        let options = GeneratorOptions { coprocessor: mode, ..GeneratorOptions::default() };
        let unit = generate(&options, &machine, &implementation).unwrap();
        let opcode = unit.module.ports().iter().find(|port| port.name == "operation_in").unwrap();
        assert_eq!(opcode.width, Width::Int(32));
        let wrapper = &unit.auxiliary_files.last().unwrap().contents;
        assert!(wrapper.contains(".operation_in("), "{wrapper}");
        assert_connected(&unit, wrapper);
    }
}

#[test]
fn test_rocc_coprocessor() {
    let (machine, implementation) = add_mul();
    let options = GeneratorOptions { coprocessor: CoprocessorMode::Rocc, ..front_registered() };
    let unit = generate(&options, &machine, &implementation).unwrap();
    assert_eq!(unit.auxiliary_files.len(), 1);
    assert_eq!(unit.auxiliary_files[0].path, PathBuf::from("systemverilog/coprocessor_alu.sv"));
    let wrapper = &unit.auxiliary_files[0].contents;
    assert!(wrapper.contains(".load_in1t_in(cmd_valid),\n"), "{wrapper}");
    assert!(!wrapper.contains("<<placeholder"), "{wrapper}");
    assert_connected(&unit, wrapper);
}

#[test]
fn test_coprocessor_port_limits() {
    let mut unit = alu(vec![binary_on_alu("add", 1)]);
    unit.ports.push(FuPort::output("out2", 32));
    let machine = machine(unit, vec![binary("add")]);
    let options = GeneratorOptions { coprocessor: CoprocessorMode::Cvxif, ..GeneratorOptions::default() };
    let error = unit_error(generate(&options, &machine, &implementation(vec![entry("add", 1, ADD)])));
    assert!(matches!(error, Error::TooManyOutputs { limit: 1 }), "{error}");
}

#[test]
fn test_write_to() {
    let (machine, implementation) = add_mul();
    let options = GeneratorOptions { coprocessor: CoprocessorMode::Cvxif, ..front_registered() };
    let mut unit = generate(&options, &machine, &implementation).unwrap();

    let directory = std::env::temp_dir().join(format!("hwgen-fu-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&directory);
    let package = directory.join("systemverilog/cvxif_sup_pkg.sv");
    std::fs::create_dir_all(package.parent().unwrap()).unwrap();
    std::fs::write(&package, "// kept\n").unwrap();

    let path = unit.write_to(&directory).unwrap();
    assert_eq!(path, directory.join("vhdl/fu_alu.vhd"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), unit.render().unwrap());
    assert!(!directory.join("vhdl/fu_alu.vhd.tmp").exists());
    assert_eq!(std::fs::read_to_string(&package).unwrap(), "// kept\n");
    assert!(directory.join("systemverilog/alu_coprocessor.sv").exists());
    std::fs::remove_dir_all(&directory).unwrap();
}
