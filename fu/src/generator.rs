use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;

use hwgen_hdl::{BinaryConstant, Dialect, Module, Wire};

use crate::names::{constant_name, operand_signal, sub_operation_name};
use crate::snippet::{read_snippet, Replace};
use crate::{
    required_bits_signed, Dag, DagEdge, DagNode, Direction, Error, FuImplementation, FunctionUnit, GeneratorOptions,
    HdbEntry, HdbVariable, Machine, OperandConnection, OperationSchedule, OutputConnection, Registration, Resource,
};

/// Base operation with its snippets read for the selected dialect.
#[derive(Debug, Clone)]
pub(crate) struct BaseOperation<'a> {
    pub entry: &'a HdbEntry,
    pub implementation: Vec<String>,
    pub initial: Vec<String>,
    pub post_op: Vec<String>,
    pub variables: &'a [HdbVariable],
    pub global_signals: &'a [HdbVariable],
}

impl BaseOperation<'_> {
    pub fn resources(&self) -> &[Resource] {
        &self.entry.resources
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DagConstant {
    pub operation: String,
    pub value: i64,
    pub id: u32,
}

/// Generator state for one function unit. Phases run in the order of [`FuGen::run`].
pub(crate) struct FuGen<'a> {
    pub options: &'a GeneratorOptions,
    pub machine: &'a Machine,
    pub unit: &'a FunctionUnit,
    pub implementation: &'a FuImplementation,
    pub dialect: Dialect,
    pub registration: Registration,
    pub module: Module,
    /// Operations of the unit, sorted; the index is the opcode.
    pub operations: Vec<String>,
    pub opcode_width: u32,
    pub address_width: u32,
    pub trigger_port: String,

    pub base_operations: BTreeMap<String, BaseOperation<'a>>,
    pub implementation_latency: BTreeMap<String, u32>,
    pub operation_cycles: BTreeMap<String, u32>,
    pub min_latency: u32,
    pub max_latency: u32,
    pub dags: BTreeMap<String, &'a Dag>,

    pub schedules: BTreeMap<String, OperationSchedule>,
    pub port_inputs: BTreeMap<String, Vec<OutputConnection>>,
    pub pipeline_length: BTreeMap<String, u32>,
    pub port_direction: BTreeMap<String, Direction>,
    pub resource_count: BTreeMap<String, u32>,
    sub_operation_ids: BTreeMap<(String, usize), u32>,
    sub_operation_count: BTreeMap<String, u32>,
    pub dag_constants: BTreeMap<(String, usize), DagConstant>,
    dag_constant_count: BTreeMap<String, u32>,

    pub registers: IndexSet<String>,
    pub resource_inputs: Vec<String>,
    pub resource_outputs: Vec<String>,
    pub external_inputs: BTreeSet<String>,
    pub external_outputs: BTreeMap<String, String>,
    pub external_signals: Vec<crate::ExternalSignal>,
    pub is_lsu: bool,

    pub use_glock: bool,
    pub use_glock_request: bool,
    pub replaces: BTreeMap<String, Vec<Replace>>,
    pub renamed_variables: Vec<HdbVariable>,
    pub renamed_global_signals: Vec<HdbVariable>,
}

impl<'a> FuGen<'a> {
    pub fn new(
        options: &'a GeneratorOptions,
        machine: &'a Machine,
        unit: &'a FunctionUnit,
        implementation: &'a FuImplementation,
    ) -> Result<Self, Error> {
        let mut operations: Vec<String> = unit.operations.iter().map(|op| op.name.to_ascii_lowercase()).collect();
        operations.sort();
        operations.dedup();

        let opcode_width = if options.coprocessor.is_active() {
            32
        } else {
            (usize::BITS - operations.len().saturating_sub(1).leading_zeros()).max(1)
        };
        let address_width = match &unit.address_space {
            Some(space) => space.address_width()?,
            None => 0,
        };
        let trigger_port = unit
            .ports
            .iter()
            .find(|port| port.is_input() && port.triggering)
            .map(|port| port.name.clone())
            .ok_or_else(|| Error::NoTriggerPort(unit.name.clone()))?;

        let mut module = Module::new(format!("fu_{}", unit.name.to_ascii_lowercase()));
        module.set_options(options.effective_module_options()).set_timestamp(options.timestamp.clone());

        Ok(FuGen {
            options,
            machine,
            unit,
            implementation,
            dialect: options.dialect,
            registration: options.registration(&unit.name),
            module,
            operations,
            opcode_width,
            address_width,
            trigger_port,
            base_operations: BTreeMap::new(),
            implementation_latency: BTreeMap::new(),
            operation_cycles: BTreeMap::new(),
            min_latency: 0,
            max_latency: 0,
            dags: BTreeMap::new(),
            schedules: BTreeMap::new(),
            port_inputs: BTreeMap::new(),
            pipeline_length: BTreeMap::new(),
            port_direction: BTreeMap::new(),
            resource_count: BTreeMap::new(),
            sub_operation_ids: BTreeMap::new(),
            sub_operation_count: BTreeMap::new(),
            dag_constants: BTreeMap::new(),
            dag_constant_count: BTreeMap::new(),
            registers: IndexSet::new(),
            resource_inputs: Vec::new(),
            resource_outputs: Vec::new(),
            external_inputs: BTreeSet::new(),
            external_outputs: BTreeMap::new(),
            external_signals: Vec::new(),
            is_lsu: false,
            use_glock: false,
            use_glock_request: false,
            replaces: BTreeMap::new(),
            renamed_variables: Vec::new(),
            renamed_global_signals: Vec::new(),
        })
    }

    pub fn run(&mut self) -> Result<(), Error> {
        tracing::debug!(unit = %self.unit.name, registration = ?self.registration, "generating function unit");
        self.check_coprocessor_limits()?;
        self.create_header_comment();
        self.check_validity()?;
        self.parse_operations()?;
        self.schedule_operations()?;
        self.create_mandatory_ports();
        self.create_external_interfaces();
        self.create_operation_resources();
        self.create_shadow_registers()?;
        self.create_port_pipeline();
        self.build_operations()?;
        self.create_output_pipeline()?;
        self.finalize_hdl();
        Ok(())
    }

    pub fn opcode_value(&self, index: usize) -> i64 {
        if self.options.coprocessor.is_active() {
            // R-type custom-0: funct7 holds the operation index.
            ((index as i64) << 25) | 0b0001011
        } else {
            index as i64
        }
    }

    fn create_header_comment(&mut self) {
        self.module.append_to_header(format!("Function Unit: {}", self.unit.name));
        self.module.append_to_header("");
        self.module.append_to_header("Operations:");
        if self.operations.len() > 1 {
            let name_width = self.operations.iter().map(String::len).max().unwrap_or(0);
            let digits = (self.operations.len() as f64).log10().ceil() as usize;
            for (index, operation) in self.operations.iter().enumerate() {
                let opcode = self.opcode_value(index);
                self.module.add_binary_constant(BinaryConstant::new(
                    crate::names::opcode_constant(operation),
                    self.opcode_width,
                    opcode,
                ));
                self.module.append_to_header(format!(" {operation:<name_width$} : {opcode:>digits$}"));
            }
        } else if let Some(operation) = self.operations.first() {
            self.module.append_to_header(format!("  {operation} : 0"));
        }
        self.module.append_to_header("");
        tracing::debug!(opcode_width = self.opcode_width, operations = self.operations.len(), "opcodes assigned");
    }

    fn check_validity(&self) -> Result<(), Error> {
        if let Some(port) = self.unit.ports.iter().find(|port| port.width == 0) {
            return Err(Error::ZeroWidthPort(port.name.clone()));
        }
        let mut pending: Vec<&str> = self.operations.iter().map(String::as_str).collect();
        let mut checked = BTreeSet::new();
        while let Some(operation) = pending.pop() {
            if !checked.insert(operation.to_ascii_lowercase()) {
                continue;
            }
            // Undefined operations are reported when they are scheduled.
            let Some(definition) = self.machine.operations.get(operation) else { continue };
            if let Some(operand) = definition.operands.iter().find(|operand| operand.width == 0) {
                return Err(Error::ZeroWidthOperand { operation: definition.name.clone(), operand: operand.id });
            }
            for dag in &definition.dags {
                pending.extend(dag.nodes.iter().filter_map(|node| match node {
                    DagNode::Operation(name) => Some(name.as_str()),
                    _ => None,
                }));
            }
        }

        for operation in &self.operations {
            let Some(hw_operation) = self.unit.operation(operation) else { continue };
            let mut latency = None;
            for binding in &hw_operation.bindings {
                if self.unit.port(&binding.port)?.is_input() {
                    continue;
                }
                match latency {
                    None => latency = Some(binding.latency),
                    Some(previous) if previous != binding.latency => {
                        return Err(Error::OutputLatencyMismatch(operation.clone()));
                    }
                    Some(_) => (),
                }
            }
        }
        Ok(())
    }

    fn parse_operations(&mut self) -> Result<(), Error> {
        let search_paths = &self.options.search_paths;
        let implementation = self.implementation;
        for entry in &implementation.operations {
            let name = entry.operation.to_ascii_lowercase();
            let Some(snippets) = entry.snippets(self.dialect) else {
                return Err(Error::MissingImplementation { operation: name, dialect: self.dialect });
            };
            if self.dialect == Dialect::Verilog && snippets.implementation.is_none() {
                return Err(Error::MissingImplementation { operation: name, dialect: self.dialect });
            }
            let base = BaseOperation {
                entry,
                implementation: read_snippet(snippets.implementation.as_ref(), search_paths)?,
                initial: read_snippet(snippets.initial.as_ref(), search_paths)?,
                post_op: read_snippet(snippets.post_op.as_ref(), search_paths)?,
                variables: &snippets.variables,
                global_signals: &snippets.global_signals,
            };
            self.implementation_latency.insert(name.clone(), entry.latency);
            self.base_operations.insert(name, base);
        }

        let mut min_latency = None;
        let mut dag_operations = Vec::new();
        for operation in &self.operations {
            let hw_operation = self.unit.operation(operation).ok_or_else(|| Error::UnknownOperation(operation.clone()))?;
            for binding in &hw_operation.bindings {
                if self.unit.port(&binding.port)?.is_input() {
                    continue;
                }
                let cycles = self.operation_cycles.entry(operation.clone()).or_insert(0);
                *cycles = (*cycles).max(binding.latency);
                self.max_latency = self.max_latency.max(binding.latency);
                min_latency = Some(min_latency.map_or(binding.latency, |min: u32| min.min(binding.latency)));
            }
            if !self.base_operations.contains_key(operation) {
                dag_operations.push(operation.clone());
            }
        }
        self.min_latency = min_latency.unwrap_or(0);

        let machine = self.machine;
        for operation in dag_operations {
            let definition = machine.operations.operation(&operation)?;
            if definition.dags.is_empty() {
                return Err(Error::NoDags(operation));
            }
            let dag = definition
                .dags
                .iter()
                .find(|dag| dag.is_implementable(|name| self.base_operations.contains_key(&name.to_ascii_lowercase())))
                .ok_or_else(|| Error::NoValidDags(operation.clone()))?;
            let latency = dag.latency(&self.implementation_latency);
            tracing::debug!(%operation, latency, "implementing operation through its decomposition");
            self.implementation_latency.insert(operation.clone(), latency);
            self.dags.insert(operation, dag);
        }
        tracing::debug!(min_latency = self.min_latency, max_latency = self.max_latency, "operations parsed");
        Ok(())
    }

    fn sub_operation(&mut self, operation: &str, node: usize, referenced: &str) -> String {
        let key = (operation.to_owned(), node);
        let id = match self.sub_operation_ids.get(&key) {
            Some(&id) => id,
            None => {
                let count = self.sub_operation_count.entry(referenced.to_owned()).or_insert(0);
                let id = *count;
                *count += 1;
                self.sub_operation_ids.insert(key, id);
                id
            }
        };
        sub_operation_name(referenced, id)
    }

    fn dag_constant(&mut self, operation: &str, node: usize, value: i64) -> String {
        let key = (operation.to_owned(), node);
        if let Some(constant) = self.dag_constants.get(&key) {
            return constant_name(&constant.operation, constant.id);
        }
        let count = self.dag_constant_count.entry(operation.to_owned()).or_insert(0);
        let id = *count;
        *count += 1;
        self.dag_constants.insert(key, DagConstant { operation: operation.to_owned(), value, id });
        constant_name(operation, id)
    }

    /// Width of operand `id` of a node in the decomposition of `operation`.
    fn node_operand_width(&self, operation: &str, node: &DagNode, id: u32) -> Result<u32, Error> {
        let (definition, id) = match node {
            DagNode::Operation(name) => (self.machine.operations.operation(name)?, id),
            DagNode::Terminal(index) => (self.machine.operations.operation(operation)?, *index),
            DagNode::Constant(value) => return Ok(required_bits_signed(*value)),
        };
        definition
            .operand(id)
            .map(|operand| operand.width)
            .ok_or_else(|| Error::UnboundOperand { operation: definition.name.clone(), operand: id })
    }

    fn sub_operation_connection(
        &mut self,
        operation: &str,
        dag: &Dag,
        edge: &DagEdge,
        is_output: bool,
    ) -> Result<OperandConnection, Error> {
        let source = &dag.nodes[edge.source];
        let destination = &dag.nodes[edge.destination];
        let source_width = self.node_operand_width(operation, source, edge.source_operand)?;
        let destination_width = self.node_operand_width(operation, destination, edge.destination_operand)?;
        let id = match destination {
            DagNode::Terminal(index) => *index,
            _ => edge.destination_operand,
        };
        let signal = match source {
            DagNode::Operation(name) => {
                let name = self.sub_operation(operation, edge.source, &name.to_ascii_lowercase());
                operand_signal(&name, edge.source_operand)
            }
            DagNode::Terminal(index) => operand_signal(operation, *index),
            DagNode::Constant(value) => self.dag_constant(operation, edge.source, *value),
        };
        Ok(OperandConnection { id, port_width: source_width, operand_width: destination_width, signal, is_output })
    }

    fn declare_operand_wire(&mut self, declared: &mut BTreeSet<String>, name: String, width: u32) {
        if declared.insert(name.clone()) {
            self.module.add_wire(Wire::new(name, width));
        }
    }

    fn schedule_operations(&mut self) -> Result<(), Error> {
        let machine = self.machine;
        let unit = self.unit;
        let mut declared = BTreeSet::new();
        for operation in self.operations.clone() {
            let cycles = i64::from(self.operation_cycles.get(&operation).copied().unwrap_or(0));
            let latency = i64::from(self.implementation_latency.get(&operation).copied().unwrap_or(0));
            let (initial, last) = match self.registration {
                Registration::Front => (cycles - latency, cycles),
                Registration::Middle => (cycles - latency - 1, cycles - 1),
                Registration::Back => (0, latency),
            };
            let negative = || Error::NegativeCycle { operation: operation.clone() };
            let initial = u32::try_from(initial).map_err(|_| negative())?;
            let last = u32::try_from(last).map_err(|_| negative())?;
            let mut schedule = OperationSchedule::new(operation.clone(), initial, last);

            let definition = machine.operations.operation(&operation)?;
            let hw_operation = unit.operation(&operation).ok_or_else(|| Error::UnknownOperation(operation.clone()))?;
            for id in 1..=hw_operation.operand_count() {
                let operand = definition
                    .operand(id)
                    .ok_or_else(|| Error::UnboundOperand { operation: operation.clone(), operand: id })?;
                let port = unit.port(&hw_operation.binding(id)?.port)?;
                let (access, direction) = match operand.direction {
                    Direction::Input => {
                        schedule.operands.push(OperandConnection {
                            id,
                            port_width: port.width,
                            operand_width: operand.width,
                            signal: crate::names::pipeline_name(&port.name, initial),
                            is_output: false,
                        });
                        (initial, Direction::Input)
                    }
                    Direction::Output => {
                        let access = u32::try_from(cycles - i64::from(last)).map_err(|_| negative())?;
                        schedule.results.insert(id);
                        self.port_inputs.entry(port.name.clone()).or_default().push(OutputConnection {
                            operand_width: operand.width,
                            operand: id,
                            source_cycle: last,
                            pipeline_stage: access,
                            operation: operation.clone(),
                        });
                        (access, Direction::Output)
                    }
                };
                self.declare_operand_wire(&mut declared, operand_signal(&operation, id), operand.width);

                let length = self.pipeline_length.entry(port.name.clone()).or_insert(0);
                *length = (*length).max(access);
                match self.port_direction.get(&port.name) {
                    None => {
                        self.port_direction.insert(port.name.clone(), direction);
                    }
                    Some(&existing) if existing != direction => {
                        return Err(Error::BidirectionalPort(port.name.clone()));
                    }
                    Some(_) => (),
                }
            }

            if let Some(base) = self.base_operations.get(&operation) {
                for resource in base.resources() {
                    let name = resource.name.to_ascii_lowercase();
                    schedule.resource_offsets.insert(name.clone(), 0);
                    let count = self.resource_count.entry(name).or_insert(0);
                    *count = (*count).max(resource.count);
                }
            } else if let Some(&dag) = self.dags.get(&operation) {
                self.schedule_dag(&operation, dag, &mut schedule, &mut declared)?;
            }

            tracing::debug!(
                %operation,
                initial_cycle = schedule.initial_cycle,
                final_cycle = schedule.final_cycle,
                "operation scheduled"
            );
            self.schedules.insert(operation, schedule);
        }
        Ok(())
    }

    fn schedule_dag(
        &mut self,
        operation: &str,
        dag: &Dag,
        schedule: &mut OperationSchedule,
        declared: &mut BTreeSet<String>,
    ) -> Result<(), Error> {
        let mut dag_resources: BTreeMap<String, u32> = BTreeMap::new();
        for (node, referenced) in dag.operation_nodes() {
            let referenced = referenced.to_ascii_lowercase();
            let name = self.sub_operation(operation, node, &referenced);
            schedule.sub_operations.push(name.clone());

            let initial = schedule.initial_cycle + dag.max_latency_to_node(node, &self.implementation_latency);
            let last = initial + self.implementation_latency.get(&referenced).copied().unwrap_or(0);
            let mut sub_schedule = OperationSchedule::new(referenced.clone(), initial, last);

            for edge in dag.in_edges(node) {
                let width = self.node_operand_width(operation, &dag.nodes[node], edge.destination_operand)?;
                self.declare_operand_wire(declared, operand_signal(&name, edge.destination_operand), width);
                sub_schedule.operands.push(self.sub_operation_connection(operation, dag, edge, false)?);
            }

            for edge in dag.out_edges(node) {
                let width = self.node_operand_width(operation, &dag.nodes[node], edge.source_operand)?;
                self.declare_operand_wire(declared, operand_signal(&name, edge.source_operand), width);
                sub_schedule.results.insert(edge.source_operand);
                if let DagNode::Terminal(_) = dag.nodes[edge.destination] {
                    schedule.operands.push(self.sub_operation_connection(operation, dag, edge, true)?);
                }
            }

            if let Some(base) = self.base_operations.get(&referenced) {
                for resource in base.resources() {
                    let resource_name = resource.name.to_ascii_lowercase();
                    let offset = dag_resources.entry(resource_name.clone()).or_insert(0);
                    sub_schedule.resource_offsets.insert(resource_name, *offset);
                    *offset += resource.count;
                }
            }

            if cfg!(feature = "trace") {
                eprintln!(">schedule {name} ({referenced}) cycles {initial}..={last}");
            }
            self.schedules.insert(name, sub_schedule);
        }

        for (resource, count) in dag_resources {
            let total = self.resource_count.entry(resource).or_insert(0);
            *total = (*total).max(count);
        }
        Ok(())
    }
}
