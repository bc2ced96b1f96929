//! Wrappers that attach a generated unit to a RISC-V core as a co-processor.

use std::path::PathBuf;

use crate::generator::FuGen;
use crate::options::CoprocessorMode;
use crate::output::AuxiliaryFile;
use crate::{Error, Template};

const CVXIF_SUPPORT_PACKAGE: &str = "\
package cvxif_sup_pkg;
  parameter int unsigned X_RFW_WIDTH = cva6_config_pkg::CVA6ConfigXlen;
  parameter int unsigned X_HARTID_WIDTH = cva6_config_pkg::CVA6ConfigXlen;
  parameter int unsigned X_DUALWRITE = 0;
  parameter int unsigned X_ID_WIDTH = $clog2(cva6_config_pkg::cva6_cfg.NrScoreboardEntries);
  parameter int unsigned IdBits = 2**X_ID_WIDTH;
  parameter int unsigned NConfigbits_C = 1 + X_ID_WIDTH + X_HARTID_WIDTH + 5 + (X_DUALWRITE + 1);
  parameter logic [31:0] OpcodeMask = 32'b11111_11_00000_00000_111_00000_1111111;
endpackage
";

const CVXIF_WRAPPER: &str = "\
module <<placeholder,FUNAME>>_coprocessor
  import cvxif_sup_pkg::*;
#(
  parameter type x_issue_req_t = logic,
  parameter type x_register_t = logic,
  parameter type x_result_t = logic
) (
  input  logic         clk_i,
  input  logic         rst_ni,
  input  logic         issue_valid_i,
  input  x_issue_req_t issue_req_i,
  input  x_register_t  register,
  input  logic         commit_valid_i,
  input  logic         commit_kill_i,
  output logic         result_valid_o,
  output x_result_t    result_o
);

  logic [31:0] result_data;
  // Bit n is set when a result is due n cycles from now.
  logic [<<placeholder,MAXLATENCY>>:0] issued;
  logic [<<placeholder,MAXLATENCY>>:0] pending_q;

  fu_<<placeholder,FUNAME>> fu_i (
    .clk(clk_i),
    .rstx(rst_ni),
    .glock_in(1'b0),
    .glockreq_out(),
    .operation_in(issue_req_i.instr & OpcodeMask),
<<placeholder,INPUT1>>    .data_<<placeholder,OUTPUTF>>_out(result_data)
  );

  always_comb begin
    issued = '0;
    if (issue_valid_i) begin
      case (issue_req_i.instr & OpcodeMask)
<<placeholder,LATENCY_CASE>>        default: ;
      endcase
    end
  end

  always_ff @(posedge clk_i or negedge rst_ni) begin
    if (!rst_ni) begin
      pending_q <= '0;
    end else if (commit_valid_i && commit_kill_i) begin
      pending_q <= '0;
    end else begin
      pending_q <= (pending_q | issued) >> 1;
    end
  end

  assign result_valid_o = pending_q[0] | issued[0];
  assign result_o.data = result_data;

endmodule
";

const ROCC_WRAPPER: &str = "\
module coprocessor_<<placeholder,FUNAME>> (
  input  logic        clock,
  input  logic        reset,
  input  logic        cmd_valid,
  output logic        cmd_ready,
  input  logic [31:0] cmd_inst,
  input  logic [63:0] cmd_rs1,
  input  logic [63:0] cmd_rs2,
  output logic        resp_valid,
  input  logic        resp_ready,
  output logic [4:0]  resp_rd,
  output logic [63:0] resp_data
);

  logic [4:0] rd_r;
  logic [31:0] result_data;

  fu_<<placeholder,FUNAME>> fu_i (
    .clk(clock),
    .rstx(~reset),
    .glock_in(~resp_ready),
    .glockreq_out(),
    .operation_in(cmd_inst),
    .load_<<placeholder,TRIGGER>>_in(cmd_valid),
    .data_<<placeholder,OUTPUTF>>_out(result_data)
  );

  always_ff @(posedge clock) begin
    if (reset) begin
      rd_r <= '0;
      resp_valid <= 1'b0;
    end else if (cmd_valid) begin
      rd_r <= cmd_inst[11:7];
      resp_valid <= 1'b1;
    end else if (resp_ready) begin
      resp_valid <= 1'b0;
    end
  end

  assign cmd_ready = resp_ready;
  assign resp_rd = rd_r;
  assign resp_data = {{32{result_data[31]}}, result_data};

endmodule
";

impl FuGen<'_> {
    /// Protocol port caps; checked before anything is generated.
    pub(crate) fn check_coprocessor_limits(&self) -> Result<(), Error> {
        if !self.options.coprocessor.is_active() {
            return Ok(());
        }
        let limits = self.options.coprocessor_limits;
        let inputs = self.unit.ports.iter().filter(|port| port.is_input()).count();
        if inputs > limits.inputs {
            return Err(Error::TooManyInputs { limit: limits.inputs });
        }
        if self.unit.ports.len() - inputs > limits.outputs {
            return Err(Error::TooManyOutputs { limit: limits.outputs });
        }
        Ok(())
    }

    fn cvxif_template(&self, unit_name: &str) -> Template {
        let mut template = Template::new();
        template.set("FUNAME", unit_name).set("MAXLATENCY", &self.max_latency.to_string());
        let inputs = self.unit.ports.iter().filter(|port| port.is_input());
        for (index, port) in inputs.enumerate() {
            template.append("INPUT1", &format!("    .data_{}_in(register.rs[{index}]),\n", port.name));
            template.append("INPUT1", &format!("    .load_{}_in(issue_valid_i),\n", port.name));
        }
        if let Some(port) = self.unit.ports.iter().find(|port| !port.is_input()) {
            template.set("OUTPUTF", &port.name);
        }
        for (index, operation) in self.operations.iter().enumerate() {
            let latency = self.operation_cycles.get(operation).copied().unwrap_or(0);
            template.append(
                "LATENCY_CASE",
                &format!("        32'h{:08x}: issued[{latency}] = 1'b1; // {operation}\n", self.opcode_value(index)),
            );
        }
        template
    }

    /// Extra SystemVerilog sources needed by the selected co-processor protocol.
    pub(crate) fn coprocessor_files(&self) -> Vec<AuxiliaryFile> {
        let unit_name = self.unit.name.to_ascii_lowercase();
        match self.options.coprocessor {
            CoprocessorMode::None => Vec::new(),
            CoprocessorMode::Cvxif => vec![
                AuxiliaryFile {
                    path: PathBuf::from("systemverilog/cvxif_sup_pkg.sv"),
                    contents: CVXIF_SUPPORT_PACKAGE.to_owned(),
                },
                AuxiliaryFile {
                    path: PathBuf::from(format!("systemverilog/{unit_name}_coprocessor.sv")),
                    contents: self.cvxif_template(&unit_name).substitute(CVXIF_WRAPPER),
                },
            ],
            CoprocessorMode::Rocc => {
                let mut template = Template::new();
                template.set("FUNAME", &unit_name).set("TRIGGER", &self.trigger_port);
                if let Some(port) = self.unit.ports.iter().find(|port| !port.is_input()) {
                    template.set("OUTPUTF", &port.name);
                }
                vec![AuxiliaryFile {
                    path: PathBuf::from(format!("systemverilog/coprocessor_{unit_name}.sv")),
                    contents: template.substitute(ROCC_WRAPPER),
                }]
            }
        }
    }
}
