use hwgen_hdl::{
    Assign, Asynchronous, Case, DefaultAssign, DefaultCase, Dialect, Error, Expr, HdlOperation, If, Module,
    ModuleOptions, Port, Register, ResetOption, Switch, Synchronous, Wire,
};

/// Strips the license header, which is the same for every module.
fn from<'a>(text: &'a str, marker: &str) -> &'a str {
    let start = text.find(marker).unwrap_or_else(|| panic!("{marker:?} not found in:\n{text}"));
    &text[start..]
}

fn counter() -> Module {
    let mut module = Module::new("counter");
    module
        .add_port(Port::input("clk", 1))
        .add_port(Port::input("rstx", 1))
        .add_port(Port::input("glock_in", 1))
        .add_port(Port::input("data_in", 4))
        .add_port(Port::output("count_out", 4))
        .add_register(Register::new("count_r", 4));
    let mut process = Synchronous::new("count_sp");
    process.push(If::new(Expr::is_clear("glock_in"), Assign::new("count_r", Expr::signal("data_in"))));
    module.add_behaviour(process);
    module.add_behaviour(Assign::new("count_out", Expr::signal("count_r")));
    module
}

#[test]
fn test_counter_vhdl() {
    let text = counter().render(Dialect::Vhdl).unwrap();
    assert!(text.starts_with("-- Permission is hereby granted"));
    assert!(text.contains("library ieee;\nuse ieee.std_logic_1164.all;\nuse ieee.numeric_std.all;\n"));
    assert_eq!(
        from(&text, "entity"),
        concat!(
            "entity counter is\n",
            "    port (\n",
            "        clk : in std_logic;\n",
            "        rstx : in std_logic;\n",
            "        glock_in : in std_logic;\n",
            "        data_in : in std_logic_vector(3 downto 0);\n",
            "        count_out : out std_logic_vector(3 downto 0));\n",
            "end entity counter;\n",
            "\n",
            "architecture rtl of counter is\n",
            "\n",
            "    signal count_r : std_logic_vector(3 downto 0);\n",
            "\n",
            "begin\n",
            "\n",
            "    count_sp : process(clk, rstx)\n",
            "    begin\n",
            "        if rstx = '0' then\n",
            "            count_r <= (others => '0');\n",
            "        elsif clk = '1' and clk'event then\n",
            "            if glock_in = '0' then\n",
            "                count_r <= data_in;\n",
            "            end if;\n",
            "        end if;\n",
            "    end process count_sp;\n",
            "    count_out <= count_r;\n",
            "\n",
            "end architecture rtl;\n",
        )
    );
}

#[test]
fn test_counter_verilog() {
    let text = counter().render(Dialect::Verilog).unwrap();
    assert!(text.starts_with("/*\n * Permission is hereby granted"));
    assert_eq!(
        from(&text, "module"),
        concat!(
            "module counter (\n",
            "        input clk,\n",
            "        input rstx,\n",
            "        input glock_in,\n",
            "        input [3:0] data_in,\n",
            "        output reg [3:0] count_out);\n",
            "\n",
            "    reg [3:0] count_r;\n",
            "\n",
            "    // count_sp\n",
            "    always @(posedge clk or negedge rstx) begin\n",
            "        if (~rstx) begin\n",
            "            count_r <= 'b0;\n",
            "        end else begin\n",
            "            if (glock_in == 1'b0) begin\n",
            "                count_r <= data_in;\n",
            "            end\n",
            "        end\n",
            "    end\n",
            "    always @*\n",
            "        count_out = count_r;\n",
            "\n",
            "endmodule\n",
        )
    );
}

#[test]
fn test_synchronous_reset() {
    let mut module = counter();
    module.set_options(ModuleOptions {
        reset_style: hwgen_hdl::ResetStyle::Synchronous,
        active_low_reset: false,
        reset_everything: false,
    });
    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains(concat!(
        "    count_sp : process(clk)\n",
        "    begin\n",
        "        if clk = '1' and clk'event then\n",
        "            if rst = '1' then\n",
        "                count_r <= (others => '0');\n",
        "            else\n",
    )));
    let text = module.render(Dialect::Verilog).unwrap();
    assert!(text.contains("    always @(posedge clk) begin\n        if (rst) begin\n"));
}

#[test]
fn test_header_lines() {
    let mut module = counter();
    module.set_timestamp(Some("2024-01-01".to_owned())).append_to_header("Function unit: counter");
    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains("-- Generated on 2024-01-01\n--\n-- Function unit: counter\n"));
    let text = module.render(Dialect::Verilog).unwrap();
    assert!(text.contains(" * Function unit: counter\n */\n"));
}

#[test]
fn test_sensitivity_list() {
    let mut module = Module::new("mux");
    module
        .add_port(Port::input("sel_in", 1))
        .add_port(Port::input("a_in", 8))
        .add_port(Port::input("b_in", 8))
        .add_port(Port::output("y_out", 8));
    let mut choice = If::new(Expr::is_set("sel_in"), Assign::new("y_out", Expr::signal("a_in")));
    choice.else_clause(Assign::new("y_out", Expr::signal("b_in"))).unwrap();
    let mut process = Asynchronous::new("mux_cp");
    process.push(choice);
    module.add_behaviour(process);

    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains(concat!(
        "    mux_cp : process(sel_in, a_in, b_in)\n",
        "    begin\n",
        "        if sel_in = '1' then\n",
        "            y_out <= a_in;\n",
        "        else\n",
        "            y_out <= b_in;\n",
        "        end if;\n",
        "    end process mux_cp;\n",
    )));
    let text = module.render(Dialect::Verilog).unwrap();
    assert!(text.contains(concat!(
        "    // mux_cp\n",
        "    always @* begin\n",
        "        if (sel_in == 1'b1) begin\n",
        "            y_out = a_in;\n",
        "        end else begin\n",
        "            y_out = b_in;\n",
        "        end\n",
        "    end\n",
    )));
    let Some(hwgen_hdl::Behaviour::Asynchronous(process)) = module.behaviours().first() else {
        panic!("expected a process");
    };
    assert_eq!(process.sensitivity(), ["sel_in", "a_in", "b_in"]);
}

#[test]
fn test_process_without_reads() {
    let mut module = Module::new("tie");
    module.add_port(Port::output("ready_out", 1));
    let mut process = Asynchronous::new("tie_cp");
    process.push(Assign::new("ready_out", Expr::literal("1")));
    module.add_behaviour(process);

    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(
        text.contains(concat!(
            "    tie_cp : process\n",
            "    begin\n",
            "        ready_out <= '1';\n",
            "        wait;\n",
            "    end process tie_cp;\n",
        )),
        "{text}"
    );
    assert!(!text.contains("process(all)"), "{text}");
}

#[test]
fn test_register_outside_synchronous() {
    let mut module = Module::new("bad");
    module.add_register(Register::new("state_r", 1));
    let mut process = Asynchronous::new("state_cp");
    process.push(Assign::new("state_r", Expr::literal("1")));
    module.add_behaviour(process);
    assert!(matches!(module.render(Dialect::Vhdl), Err(Error::RegisterOutsideSynchronous(name)) if name == "state_r"));

    let mut module = Module::new("bad");
    module.add_register(Register::new("state_r", 1));
    module.add_behaviour(Assign::new("state_r", Expr::literal("1")));
    assert!(matches!(module.render(Dialect::Verilog), Err(Error::RegisterOutsideSynchronous(_))));
}

#[test]
fn test_wire_in_synchronous() {
    let mut module = Module::new("bad");
    module.add_wire(Wire::new("data", 8));
    let mut process = Synchronous::new("data_sp");
    process.push(Assign::new("data", Expr::literal("00000000")));
    module.add_behaviour(process);
    assert!(matches!(
        module.render(Dialect::Vhdl),
        Err(Error::NonRegisterWrite { process, name }) if process == "data_sp" && name == "data"
    ));
}

#[test]
fn test_unknown_signal() {
    let mut module = Module::new("bad");
    module.add_behaviour(Assign::new("nowhere", Expr::literal("1")));
    assert!(matches!(module.render(Dialect::Vhdl), Err(Error::UnknownSignal(name)) if name == "nowhere"));
}

#[test]
fn test_duplicate_else() {
    let mut choice = If::new(Expr::is_set("a"), Assign::new("b", Expr::literal("1")));
    choice.else_clause(Assign::new("b", Expr::literal("0"))).unwrap();
    assert!(matches!(choice.else_clause(Assign::new("b", Expr::literal("0"))), Err(Error::DuplicateElse)));
}

#[test]
fn test_optional_reset() {
    let mut module = Module::new("pipe");
    module
        .add_port(Port::input("clk", 1))
        .add_port(Port::input("rstx", 1))
        .add_port(Port::input("d_in", 8))
        .add_register(Register::new("valid_r", 1))
        .add_register(Register::new("data_r", 8).with_reset(ResetOption::Optional));
    let mut process = Synchronous::new("pipe_sp");
    process
        .push(Assign::new("valid_r", Expr::literal("1")))
        .push(Assign::new("data_r", Expr::signal("d_in")));
    module.add_behaviour(process);

    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains("        if rstx = '0' then\n            valid_r <= '0';\n        elsif"));

    module.set_options(ModuleOptions { reset_everything: true, ..ModuleOptions::default() });
    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains(concat!(
        "        if rstx = '0' then\n",
        "            valid_r <= '0';\n",
        "            data_r <= (others => '0');\n",
        "        elsif",
    )));
}

#[test]
fn test_duplicate_register() {
    let mut module = Module::new("pipe");
    module.add_register(Register::new("data_1_r", 8)).add_register(Register::new("data_1_r", 8));
    let text = module.render(Dialect::Vhdl).unwrap();
    assert_eq!(text.matches("signal data_1_r").count(), 1);
    assert_eq!(module.registers().len(), 1);
}

#[test]
fn test_dont_care_default() {
    let mut module = Module::new("alu");
    module
        .add_port(Port::input("opcode_in", 2))
        .add_wire(Wire::new("result", 8))
        .add_binary_constant(hwgen_hdl::BinaryConstant::new("op_add_c", 2, 1));
    let mut case = Case::named("op_add_c");
    case.push(Assign::new("result", Expr::literal("00000001")));
    let mut default = DefaultCase::new();
    default.push(DefaultAssign::dont_care("result"));
    let mut switch = Switch::new(Expr::signal("opcode_in"));
    switch.add_case(case).add_default(default);
    let mut process = Asynchronous::new("alu_cp");
    process.push(switch);
    module.add_behaviour(process);

    let text = module.render(Dialect::Vhdl).unwrap();
    assert!(text.contains("    constant op_add_c : std_logic_vector(1 downto 0) := \"01\";\n"));
    assert!(text.contains(concat!(
        "    alu_cp : process(opcode_in)\n",
        "    begin\n",
        "        case opcode_in is\n",
        "            when op_add_c =>\n",
        "                result <= \"00000001\";\n",
        "            when others =>\n",
        "                result <= (others => '-');\n",
        "        end case;\n",
    )));
    let text = module.render(Dialect::Verilog).unwrap();
    assert!(text.contains("    localparam [1:0] op_add_c = 2'b01;\n"));
    assert!(text.contains(concat!(
        "        case (opcode_in)\n",
        "            op_add_c: begin\n",
        "                result = 8'b00000001;\n",
        "            end\n",
        "            default: begin\n",
        "                result = 'bx;\n",
        "            end\n",
        "        endcase\n",
    )));
}

#[test]
fn test_empty_switch() {
    let mut module = Module::new("alu");
    module.add_port(Port::input("opcode_in", 2));
    let mut process = Asynchronous::new("alu_cp");
    process.push(Switch::new(Expr::signal("opcode_in")));
    module.add_behaviour(process);
    assert!(matches!(module.render(Dialect::Vhdl), Err(Error::EmptySwitch { .. })));
}

#[test]
fn test_dialect_mismatch() {
    let mut module = Module::new("snippet");
    module.add_wire(Wire::new("x", 1));
    let mut process = Asynchronous::new("snippet_cp");
    process.push(HdlOperation::new("add", vec!["x <= '1';".to_owned()], Dialect::Vhdl));
    module.add_behaviour(process);
    assert!(module.render(Dialect::Vhdl).unwrap().contains("        x <= '1';\n"));
    assert!(matches!(
        module.render(Dialect::Verilog),
        Err(Error::DialectMismatch { expected: Dialect::Vhdl, found: Dialect::Verilog, .. })
    ));
}

fn adder() -> Module {
    let mut adder = Module::new("adder");
    adder
        .add_port(Port::input("clk", 1))
        .add_port(Port::input("a", 8))
        .add_port(Port::output("y", 8));
    adder
}

#[test]
fn test_instances() {
    let mut module = Module::new("top");
    module.add_port(Port::input("clk", 1));
    for id in 0..2 {
        let mut instance = adder();
        instance.set_prefix("add").set_id(id);
        module.add_module(instance);
    }

    let text = module.render(Dialect::Vhdl).unwrap();
    assert_eq!(text.matches("component adder is").count(), 1);
    assert!(text.contains(concat!(
        "    component adder is\n",
        "        port (\n",
        "            clk : in std_logic;\n",
        "            a : in std_logic_vector(7 downto 0);\n",
        "            y : out std_logic_vector(7 downto 0));\n",
        "    end component adder;\n",
    )));
    assert!(text.contains(concat!(
        "    add_0 : adder\n",
        "        port map (\n",
        "            clk => clk,\n",
        "            a => add_0_a,\n",
        "            y => add_0_y);\n",
    )));
    assert!(text.contains("    add_1 : adder\n"));

    let text = module.render(Dialect::Verilog).unwrap();
    assert!(text.contains(concat!(
        "    adder add_0 (\n",
        "        .clk(clk),\n",
        "        .a(add_0_a),\n",
        "        .y(add_0_y));\n",
    )));
    assert!(text.contains("    adder add_1 (\n"));
}

#[test]
fn test_dialects_agree_on_interface() {
    let mut module = counter();
    let vhdl = module.render(Dialect::Vhdl).unwrap();
    let verilog = module.render(Dialect::Verilog).unwrap();
    for port in module.ports() {
        assert!(vhdl.contains(&format!("        {} : ", port.name)));
        assert!(verilog.contains(&format!(" {}", port.name)));
    }
    assert_eq!(module.interface().len(), 5);
}
