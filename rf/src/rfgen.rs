use std::path::{Path, PathBuf};

use hwgen_hdl::{Dialect, Module, Port, RawCodeLine, write_atomically};

use crate::{Error, RegisterFile, RfOptions};

/// Register array of the generated module.
const REGISTERS: &str = "registers";
const GUARD_PORT: &str = "guard_out";

/// Polarity dependent spellings of the reset.
struct Reset {
    port: &'static str,
    vhdl_active: &'static str,
    verilog_edge: &'static str,
    verilog_active: String,
}

impl Reset {
    fn new(options: &RfOptions) -> Self {
        let port = options.module.reset_port();
        if options.module.active_low_reset {
            Reset { port, vhdl_active: "'0'", verilog_edge: "negedge", verilog_active: format!("~{port}") }
        } else {
            Reset { port, vhdl_active: "'1'", verilog_edge: "posedge", verilog_active: port.to_owned() }
        }
    }
}

pub struct RfGen<'a> {
    options: &'a RfOptions,
    rf: &'a RegisterFile,
    reset: Reset,
    module: Module,
}

impl<'a> RfGen<'a> {
    pub fn new(options: &'a RfOptions, rf: &'a RegisterFile) -> Result<Self, Error> {
        if rf.size == 0 {
            return Err(Error::NoRegisters(rf.name.clone()));
        }
        if rf.width == 0 {
            return Err(Error::ZeroWidth(rf.name.clone()));
        }
        if let Some(latency) = rf.guard_latency.filter(|&latency| latency > 1) {
            return Err(Error::UnsupportedGuardLatency { rf: rf.name.clone(), latency });
        }
        let mut module = Module::new(&rf.name);
        module.set_options(options.module.clone()).set_timestamp(options.timestamp.clone());
        Ok(RfGen { options, rf, reset: Reset::new(options), module })
    }

    pub fn run(mut self) -> Result<GeneratedRf, Error> {
        tracing::debug!(rf = %self.rf.name, size = self.rf.size, width = self.rf.width, "generating register file");
        self.create_header();
        self.create_ports();
        self.create_storage();
        self.create_write_process();
        self.create_read_process();
        self.create_guard_process();
        Ok(GeneratedRf { name: self.rf.name.clone(), dialect: self.options.dialect, module: self.module })
    }

    fn create_header(&mut self) {
        let rf = self.rf;
        self.module
            .append_to_header(format!("Register file: {}", rf.name))
            .append_to_header("")
            .append_to_header(format!("Max. number of parallel reads:  {}", rf.max_reads))
            .append_to_header(format!("Max. number of parallel writes: {}", rf.max_writes));
    }

    fn create_ports(&mut self) {
        let rf = self.rf;
        self.module
            .add_port(Port::input("clk", 1))
            .add_port(Port::input(self.reset.port, 1))
            .add_port(Port::input("glock_in", 1));
        for port in &rf.ports {
            if port.is_input() {
                self.module.add_port(Port::input(port.data(), rf.width).vector());
            } else {
                self.module.add_port(Port::output(port.data(), rf.width).vector());
            }
            self.module
                .add_port(Port::input(port.load(), 1))
                .add_port(Port::input(port.opcode(), rf.opcode_width()).vector());
        }
        if rf.guard_latency.is_some() {
            self.module.add_port(Port::output(GUARD_PORT, rf.size).vector());
        }
    }

    fn create_storage(&mut self) {
        let (width, size) = (self.rf.width, self.rf.size);
        self.module.add_raw_line(RawCodeLine::new(
            format!(
                "type {REGISTERS}_type is array (natural range <>) of std_logic_vector({width}-1 downto 0);\n\
                 signal {REGISTERS} : {REGISTERS}_type({size}-1 downto 0);"
            ),
            format!("reg [{width}-1:0] {REGISTERS} [0:{size}-1];\ninteger i;\ninteger g;"),
        ));
    }

    fn create_write_process(&mut self) {
        let Reset { port, vhdl_active, verilog_edge, verilog_active } = &self.reset;
        let mut vhdl = vec![
            format!("input_cp : process (clk, {port})"),
            "    variable opc : integer;".to_owned(),
            "begin".to_owned(),
            format!("    if {port} = {vhdl_active} then"),
            format!("        for idx in {REGISTERS}'length-1 downto 0 loop"),
            format!("            {REGISTERS}(idx) <= (others => '0');"),
            "        end loop;".to_owned(),
            "    elsif clk'event and clk = '1' then".to_owned(),
            "        if glock_in = '0' then".to_owned(),
        ];
        let mut verilog = vec![
            format!("always @(posedge clk or {verilog_edge} {port}) begin"),
            format!("    if ({verilog_active}) begin"),
            format!("        for (i = 0; i < {}; i = i + 1) begin", self.rf.size),
            format!("            {REGISTERS}[i] <= 0;"),
            "        end".to_owned(),
            "    end else if (~glock_in) begin".to_owned(),
        ];
        for input in self.rf.inputs() {
            let (load, opcode, data) = (input.load(), input.opcode(), input.data());
            vhdl.push(format!("            if {load} = '1' then"));
            vhdl.push(format!("                opc := to_integer(unsigned({opcode}));"));
            vhdl.push(format!("                {REGISTERS}(opc) <= {data};"));
            vhdl.push("            end if;".to_owned());
            verilog.push(format!("        if ({load}) begin"));
            verilog.push(format!("            {REGISTERS}[{opcode}] <= {data};"));
            verilog.push("        end".to_owned());
        }
        if self.rf.zero_register {
            vhdl.push(format!("            {REGISTERS}(0) <= (others => '0');"));
            verilog.push(format!("        {REGISTERS}[0] <= 0;"));
        }
        vhdl.extend(["        end if;", "    end if;", "end process input_cp;"].map(str::to_owned));
        verilog.extend(["    end", "end"].map(str::to_owned));
        self.push_code(vhdl, verilog);
    }

    fn create_read_process(&mut self) {
        let mut vhdl = Vec::new();
        let mut verilog = vec!["always @* begin".to_owned()];
        for output in self.rf.outputs() {
            let (opcode, data) = (output.opcode(), output.data());
            vhdl.push(format!("{data} <= {REGISTERS}(to_integer(unsigned({opcode})));"));
            verilog.push(format!("    {data} = {REGISTERS}[{opcode}];"));
        }
        if vhdl.is_empty() {
            return;
        }
        verilog.push("end".to_owned());
        self.push_code(vhdl, verilog);
    }

    fn create_guard_process(&mut self) {
        let Some(latency) = self.rf.guard_latency else { return };
        let inputs: Vec<_> = if latency == 0 { self.rf.inputs().collect() } else { Vec::new() };

        let mut sensitivity = vec![REGISTERS.to_owned()];
        for input in &inputs {
            sensitivity.extend([input.load(), input.opcode(), input.data()]);
        }
        let mut vhdl = vec![
            format!("{GUARD_PORT}_cp : process ({})", sensitivity.join(", ")),
            "begin".to_owned(),
            format!("    for i in {}-1 downto 0 loop", self.rf.size),
        ];
        let mut verilog = vec![
            "always @* begin".to_owned(),
            format!("    for (g = 0; g < {}; g = g + 1) begin", self.rf.size),
        ];
        // Writes landing this cycle are forwarded to the guard.
        for (index, input) in inputs.iter().enumerate() {
            let (load, opcode, data) = (input.load(), input.opcode(), input.data());
            let (vhdl_keyword, verilog_keyword) = if index == 0 { ("if", "if") } else { ("elsif", "end else if") };
            vhdl.push(format!("        {vhdl_keyword} {load} = '1' and i = to_integer(unsigned({opcode})) then"));
            vhdl.push(format!("            {GUARD_PORT}(i) <= {data}(0);"));
            verilog.push(format!("        {verilog_keyword} ({load} && g == {opcode}) begin"));
            verilog.push(format!("            {GUARD_PORT}[g] = {data}[0];"));
        }
        if inputs.is_empty() {
            vhdl.push(format!("        {GUARD_PORT}(i) <= {REGISTERS}(i)(0);"));
            verilog.push(format!("        {GUARD_PORT}[g] = {REGISTERS}[g][0];"));
        } else {
            vhdl.push("        else".to_owned());
            vhdl.push(format!("            {GUARD_PORT}(i) <= {REGISTERS}(i)(0);"));
            vhdl.push("        end if;".to_owned());
            verilog.push("        end else begin".to_owned());
            verilog.push(format!("            {GUARD_PORT}[g] = {REGISTERS}[g][0];"));
            verilog.push("        end".to_owned());
        }
        vhdl.extend(["    end loop;".to_owned(), format!("end process {GUARD_PORT}_cp;")]);
        verilog.extend(["    end", "end"].map(str::to_owned));
        self.push_code(vhdl, verilog);
    }

    fn push_code(&mut self, vhdl: Vec<String>, verilog: Vec<String>) {
        if cfg!(feature = "trace") {
            eprintln!(">{}: {}", self.rf.name, vhdl.first().map(String::as_str).unwrap_or_default());
        }
        self.module.add_behaviour(RawCodeLine::new(vhdl.join("\n"), verilog.join("\n")));
    }
}

/// A register file module ready to be rendered.
#[derive(Debug)]
pub struct GeneratedRf {
    pub name: String,
    pub dialect: Dialect,
    pub module: Module,
}

impl GeneratedRf {
    /// Path of the source relative to the output directory.
    pub fn path(&self) -> PathBuf {
        Path::new(self.dialect.directory()).join(format!("{}.{}", self.name, self.dialect.extension()))
    }

    pub fn render(&mut self) -> Result<String, Error> {
        Ok(self.module.render(self.dialect)?)
    }

    pub fn write_to(&mut self, directory: &Path) -> Result<PathBuf, Error> {
        let text = self.render()?;
        let path = directory.join(self.path());
        write_atomically(&path, &text).map_err(|error| Error::Io { path: path.clone(), error })?;
        tracing::debug!(rf = %self.name, path = %path.display(), "register file written");
        Ok(path)
    }
}
