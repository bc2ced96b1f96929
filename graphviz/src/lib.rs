use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::io;

use hwgen_fu::{GeneratedUnit, OperationSchedule};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Edge {
    from: String,
    to_arg: Option<usize>,
}

struct Node<'a> {
    name: &'a str,
    label: String,
    args: Vec<String>,
    inputs: BTreeSet<Edge>,
}

impl<'a> Node<'a> {
    fn new(name: &'a str, schedule: &OperationSchedule) -> Self {
        let label = if schedule.base_operation == name {
            format!("{name} @{}..{}", schedule.initial_cycle, schedule.final_cycle)
        } else {
            format!("{name} = {} @{}..{}", schedule.base_operation, schedule.initial_cycle, schedule.final_cycle)
        };
        Node { name, label, args: Vec::new(), inputs: BTreeSet::new() }
    }

    fn arg(mut self, input: impl ToString) -> Self {
        self.args.push(input.to_string());
        self
    }

    /// An operand; linked to the operation producing it when there is one.
    fn operand(mut self, id: u32, signal: &str, producers: &BTreeMap<String, &'a str>) -> Self {
        let to_arg = Some(self.args.len());
        if let Some(producer) = producer_of(signal, producers) {
            self.inputs.insert(Edge { from: producer.to_owned(), to_arg });
        }
        self.arg(format!("op{id} = {signal}"))
    }
}

/// Operation whose operand wire `signal` is, `<operation>_op<id>`.
fn producer_of<'a>(signal: &str, producers: &BTreeMap<String, &'a str>) -> Option<&'a str> {
    let (operation, id) = signal.rsplit_once("_op")?;
    id.parse::<u32>().ok()?;
    producers.get(operation).copied()
}

struct Context<'a> {
    nodes: Vec<Node<'a>>,
    /// Composite operation of each sub-operation.
    parents: BTreeMap<&'a str, &'a str>,
}

impl Context<'_> {
    fn print(&self, writer: &mut impl io::Write, name: &str) -> io::Result<()> {
        writeln!(writer, "digraph {name} {{")?;
        writeln!(writer, "  rankdir=LR;")?;
        writeln!(writer, "  node [fontname=\"monospace\"];")?;
        for node in &self.nodes {
            self.print_node(writer, node)?;
        }
        writeln!(writer, "}}")
    }

    fn print_node(&self, writer: &mut impl io::Write, node: &Node<'_>) -> io::Result<()> {
        let mut label = format!("<out> {}", node.label);
        for (index, arg) in node.args.iter().enumerate() {
            write!(&mut label, " | <arg{index}> {arg}").unwrap();
        }
        let label = label.escape_default().to_string();
        writeln!(writer, "  {} [shape=record label=\"{label}\"];", node.name)?;

        for input in &node.inputs {
            let port = match input.to_arg {
                Some(index) => format!("arg{index}"),
                None => "out".to_owned(),
            };
            writeln!(writer, "  {}:out -> {}:{port};", input.from, node.name)?;
        }
        if let Some(parent) = self.parents.get(node.name) {
            writeln!(writer, "  {parent} -> {} [style=dashed];", node.name)?;
        }
        Ok(())
    }
}

/// Writes the operation schedule of `unit` as a Graphviz digraph.
pub fn describe(writer: &mut impl io::Write, unit: &GeneratedUnit) -> io::Result<()> {
    let producers: BTreeMap<String, &str> = unit.schedules.keys().map(|name| (name.clone(), name.as_str())).collect();
    let mut parents = BTreeMap::new();
    for (name, schedule) in &unit.schedules {
        for sub_operation in &schedule.sub_operations {
            parents.insert(sub_operation.as_str(), name.as_str());
        }
    }

    let mut ctx = Context { nodes: Vec::new(), parents };
    for (name, schedule) in &unit.schedules {
        let mut node = Node::new(name, schedule);
        for operand in schedule.operands.iter().filter(|operand| !operand.is_output) {
            node = node.operand(operand.id, &operand.signal, &producers);
        }
        for id in &schedule.results {
            node = node.arg(format!("result op{id}"));
        }
        ctx.nodes.push(node);
    }
    ctx.print(writer, &unit.name)
}
