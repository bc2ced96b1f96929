use std::path::PathBuf;

use hwgen_fu::{
    AddressSpace, Dag, DagNode, Direction, ExternalPort, FuImplementation, FuPort, FunctionUnit, HdbEntry, HdbVariable,
    HwOperation, Machine, OperationDef, OperationPool, Resource, ResourceFile, ResourcePort, SnippetSource, Snippets,
};
use hwgen_hdl::{Dialect, VariableKind};
use hwgen_rf::{RegisterFile, RfPort};

use crate::field::Field;
use crate::{Description, ImportError};

fn direction(field: &Field) -> Result<Direction, ImportError> {
    match field.str()? {
        "input" | "in" => Ok(Direction::Input),
        "output" | "out" => Ok(Direction::Output),
        other => Err(field.invalid(format!("unknown direction {other:?}"))),
    }
}

fn dialect(field: &Field) -> Result<Dialect, ImportError> {
    field.str()?.parse().map_err(|error: hwgen_hdl::Error| field.invalid(error.to_string()))
}

fn dag_node(field: &Field) -> Result<DagNode, ImportError> {
    if let Some(operation) = field.optional("operation")? {
        Ok(DagNode::Operation(operation.str()?.to_ascii_lowercase()))
    } else if let Some(terminal) = field.optional("terminal")? {
        Ok(DagNode::Terminal(terminal.u32()?))
    } else if let Some(constant) = field.optional("constant")? {
        Ok(DagNode::Constant(constant.i64()?))
    } else {
        Err(field.invalid("node is neither an operation, a terminal nor a constant"))
    }
}

fn dag(field: &Field) -> Result<Dag, ImportError> {
    let mut dag = Dag::new();
    for node in field.get("nodes")?.items()? {
        dag.add_node(dag_node(&node)?);
    }
    for edge in field.items_of("edges")? {
        let node_index = |key: &str| -> Result<usize, ImportError> {
            let index = edge.get(key)?;
            let value = index.u32()? as usize;
            if value >= dag.nodes.len() {
                return Err(index.invalid(format!("node {value} does not exist")));
            }
            Ok(value)
        };
        let (source, destination) = (node_index("source")?, node_index("destination")?);
        dag.connect(source, edge.u32_at("source_operand")?, destination, edge.u32_at("destination_operand")?);
    }
    Ok(dag)
}

fn operation(field: &Field) -> Result<OperationDef, ImportError> {
    let mut operation = OperationDef::new(field.string_at("name")?);
    for width in field.items_of("inputs")? {
        operation = operation.input(width.width()?);
    }
    for width in field.items_of("outputs")? {
        operation = operation.output(width.width()?);
    }
    for dag_field in field.items_of("dags")? {
        operation = operation.dag(dag(&dag_field)?);
    }
    Ok(operation)
}

fn function_unit(field: &Field) -> Result<FunctionUnit, ImportError> {
    let mut unit = FunctionUnit::new(field.string_at("name")?);
    for port_field in field.get("ports")?.items()? {
        let name = port_field.string_at("name")?;
        let width = port_field.width_at("width")?;
        let mut port = match direction(&port_field.get("direction")?)? {
            Direction::Input => FuPort::input(name, width),
            Direction::Output => FuPort::output(name, width),
        };
        port.triggering = port_field.bool_or("triggering", false)?;
        port.no_register = port_field.bool_or("no_register", false)?;
        unit.ports.push(port);
    }
    for operation_field in field.items_of("operations")? {
        let mut operation = HwOperation::new(operation_field.string_at("name")?);
        for binding in operation_field.get("bindings")?.items()? {
            let (operand, port) = (binding.u32_at("operand")?, binding.string_at("port")?);
            operation = match binding.optional("latency")? {
                Some(latency) => operation.bind_result(operand, port, latency.u32()?),
                None => operation.bind(operand, port),
            };
        }
        unit.operations.push(operation);
    }
    if let Some(space) = field.optional("address_space")? {
        unit.address_space = Some(AddressSpace {
            name: space.string_at("name")?,
            min_address: space.get("min_address")?.u64()?,
            max_address: space.get("max_address")?.u64()?,
        });
    }
    Ok(unit)
}

fn register_file(field: &Field) -> Result<RegisterFile, ImportError> {
    let mut ports = Vec::new();
    for port_field in field.get("ports")?.items()? {
        let name = port_field.string_at("name")?;
        ports.push(match direction(&port_field.get("direction")?)? {
            Direction::Input => RfPort::input(name),
            Direction::Output => RfPort::output(name),
        });
    }
    let writes = ports.iter().filter(|port| port.is_input()).count() as u32;
    let reads = ports.len() as u32 - writes;
    Ok(RegisterFile {
        name: field.string_at("name")?,
        size: field.u32_at("size")?,
        width: field.width_at("width")?,
        max_reads: field.u32_or("max_reads", reads)?,
        max_writes: field.u32_or("max_writes", writes)?,
        zero_register: field.bool_or("zero_register", false)?,
        guard_latency: field.optional("guard_latency")?.map(|latency| latency.u32()).transpose()?,
        ports,
    })
}

/// A snippet is either inline text or `{"file": path}`.
fn snippet_source(field: &Field) -> Result<SnippetSource, ImportError> {
    if field.is_str() {
        Ok(SnippetSource::Inline(field.str()?.to_owned()))
    } else {
        Ok(SnippetSource::File(PathBuf::from(field.string_at("file")?)))
    }
}

fn hdb_variable(field: &Field) -> Result<HdbVariable, ImportError> {
    let kind = match field.optional("kind")? {
        None => VariableKind::Logic,
        Some(kind) => match kind.str()? {
            "logic" => VariableKind::Logic,
            "unsigned" => VariableKind::Unsigned,
            "signed" => VariableKind::Signed,
            other => return Err(kind.invalid(format!("unknown variable kind {other:?}"))),
        },
    };
    let variable = HdbVariable::new(field.string_at("name")?, field.width_at("width")?, kind);
    Ok(if field.bool_or("rename", false)? { variable.renamed() } else { variable })
}

fn snippets(field: &Field) -> Result<Snippets, ImportError> {
    let source = |key: &str| field.optional(key)?.map(|source| snippet_source(&source)).transpose();
    Ok(Snippets {
        implementation: source("implementation")?,
        initial: source("initial")?,
        post_op: source("post_op")?,
        variables: field.items_of("variables")?.iter().map(hdb_variable).collect::<Result<_, _>>()?,
        global_signals: field.items_of("global_signals")?.iter().map(hdb_variable).collect::<Result<_, _>>()?,
    })
}

fn resource_files(field: &Field, key: &str) -> Result<Vec<ResourceFile>, ImportError> {
    let mut files = Vec::new();
    for file in field.items_of(key)? {
        let path = PathBuf::from(file.string_at("path")?);
        files.push(ResourceFile { path, dialect: dialect(&file.get("language")?)? });
    }
    Ok(files)
}

fn resource(field: &Field) -> Result<Resource, ImportError> {
    let mut ports = Vec::new();
    for port in field.items_of("ports")? {
        ports.push(ResourcePort {
            name: port.string_at("name")?,
            direction: direction(&port.get("direction")?)?,
            width: port.width_at("width")?,
            vector: port.bool_or("vector", false)?,
        });
    }
    Ok(Resource {
        name: field.string_at("name")?,
        count: field.u32_or("count", 1)?,
        ports,
        synthesis_files: resource_files(field, "synthesis_files")?,
        simulation_files: resource_files(field, "simulation_files")?,
    })
}

fn external_port(field: &Field) -> Result<ExternalPort, ImportError> {
    let width = field.get("width")?;
    let width = if width.is_str() { width.str()?.to_owned() } else { width.width()?.to_string() };
    Ok(ExternalPort {
        name: field.string_at("name")?,
        direction: direction(&field.get("direction")?)?,
        width,
        default_value: match field.optional("default_value")? {
            Some(value) => value.str()?.to_owned(),
            None => "0".to_owned(),
        },
    })
}

fn hdb_entry(field: &Field) -> Result<HdbEntry, ImportError> {
    let mut entry = HdbEntry::new(field.string_at("operation")?, field.u32_at("latency")?);
    entry.vhdl = field.optional("vhdl")?.map(|vhdl| snippets(&vhdl)).transpose()?;
    entry.verilog = field.optional("verilog")?.map(|verilog| snippets(&verilog)).transpose()?;
    entry.resources = field.items_of("resources")?.iter().map(resource).collect::<Result<_, _>>()?;
    entry.interface = field.items_of("interface")?.iter().map(external_port).collect::<Result<_, _>>()?;
    Ok(entry)
}

/// Names listed under `generate.<key>`, or every name in `known` when the list is absent.
fn generate_list(root: &Field, key: &str, known: &[&str], kind: &str) -> Result<Vec<String>, ImportError> {
    let Some(list) = root.optional("generate")?.map(|generate| generate.optional(key)).transpose()?.flatten() else {
        return Ok(known.iter().map(|name| name.to_string()).collect());
    };
    let mut names = Vec::new();
    for item in list.items()? {
        let name = item.str()?;
        if !known.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            return Err(item.invalid(format!("unknown {kind} {name:?}")));
        }
        names.push(name.to_owned());
    }
    Ok(names)
}

pub(crate) fn description(root: &Field) -> Result<Description, ImportError> {
    let mut operations = OperationPool::new();
    for field in root.items_of("operations")? {
        operations.add(operation(&field)?);
    }
    let function_units = root.items_of("function_units")?.iter().map(function_unit).collect::<Result<Vec<_>, _>>()?;
    let register_files = root.items_of("register_files")?.iter().map(register_file).collect::<Result<Vec<_>, _>>()?;

    let mut implementations = Vec::new();
    if let Some(hdb) = root.optional("hdb")? {
        for (unit, entries) in hdb.entries()? {
            if !function_units.iter().any(|known| known.name.eq_ignore_ascii_case(unit)) {
                return Err(entries.invalid(format!("unknown function unit {unit:?}")));
            }
            let mut implementation = FuImplementation::new(unit);
            implementation.operations = entries.items()?.iter().map(hdb_entry).collect::<Result<_, _>>()?;
            implementations.push(implementation);
        }
    }

    let unit_names: Vec<&str> = function_units.iter().map(|unit| unit.name.as_str()).collect();
    let rf_names: Vec<&str> = register_files.iter().map(|rf| rf.name.as_str()).collect();
    let generate_fu = generate_list(root, "fu", &unit_names, "function unit")?;
    let generate_rf = generate_list(root, "rf", &rf_names, "register file")?;

    Ok(Description {
        machine: Machine { function_units, operations },
        implementations,
        register_files,
        generate_fu,
        generate_rf,
    })
}
