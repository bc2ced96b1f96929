use std::collections::BTreeMap;

/// Node of an operation decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagNode {
    /// Use of another operation.
    Operation(String),
    /// Operand of the operation being decomposed.
    Terminal(u32),
    Constant(i64),
}

/// Data edge from an operand of `source` to an operand of `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DagEdge {
    pub source: usize,
    pub source_operand: u32,
    pub destination: usize,
    pub destination_operand: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dag {
    pub nodes: Vec<DagNode>,
    pub edges: Vec<DagEdge>,
}

impl Dag {
    pub fn new() -> Self {
        Dag::default()
    }

    pub fn add_node(&mut self, node: DagNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn connect(&mut self, source: usize, source_operand: u32, destination: usize, destination_operand: u32) {
        self.edges.push(DagEdge { source, source_operand, destination, destination_operand });
    }

    pub fn in_edges(&self, node: usize) -> impl Iterator<Item = &DagEdge> {
        self.edges.iter().filter(move |edge| edge.destination == node)
    }

    pub fn out_edges(&self, node: usize) -> impl Iterator<Item = &DagEdge> {
        self.edges.iter().filter(move |edge| edge.source == node)
    }

    pub fn operation_nodes(&self) -> impl Iterator<Item = (usize, &str)> {
        self.nodes.iter().enumerate().filter_map(|(index, node)| match node {
            DagNode::Operation(name) => Some((index, name.as_str())),
            _ => None,
        })
    }

    /// Checks that every edge refers to existing nodes and that there are no cycles.
    pub fn is_well_formed(&self) -> bool {
        let in_range = self.edges.iter().all(|edge| edge.source < self.nodes.len() && edge.destination < self.nodes.len());
        in_range && self.topological_order().is_some()
    }

    /// A DAG can be implemented if every operation it uses has a direct implementation.
    pub fn is_implementable(&self, mut has_implementation: impl FnMut(&str) -> bool) -> bool {
        self.is_well_formed() && self.operation_nodes().all(|(_, name)| has_implementation(name))
    }

    fn topological_order(&self) -> Option<Vec<usize>> {
        let mut pending: Vec<usize> = vec![0; self.nodes.len()];
        for edge in &self.edges {
            *pending.get_mut(edge.destination)? += 1;
        }
        let mut ready: Vec<usize> = (0..self.nodes.len()).filter(|&index| pending[index] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(index) = ready.pop() {
            order.push(index);
            for edge in self.out_edges(index) {
                pending[edge.destination] -= 1;
                if pending[edge.destination] == 0 {
                    ready.push(edge.destination);
                }
            }
        }
        (order.len() == self.nodes.len()).then_some(order)
    }

    /// Cycle at which each node may start, counted from the start of the decomposed operation.
    fn arrival_cycles(&self, latencies: &BTreeMap<String, u32>) -> Vec<u32> {
        let mut arrival = vec![0; self.nodes.len()];
        let Some(order) = self.topological_order() else {
            return arrival;
        };
        for index in order {
            let ready = arrival[index] + self.node_latency(index, latencies);
            for edge in self.out_edges(index) {
                arrival[edge.destination] = arrival[edge.destination].max(ready);
            }
        }
        arrival
    }

    fn node_latency(&self, index: usize, latencies: &BTreeMap<String, u32>) -> u32 {
        match &self.nodes[index] {
            DagNode::Operation(name) => latencies.get(&name.to_ascii_lowercase()).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Longest latency path from the operands of the DAG to `node`.
    pub fn max_latency_to_node(&self, node: usize, latencies: &BTreeMap<String, u32>) -> u32 {
        self.arrival_cycles(latencies).get(node).copied().unwrap_or(0)
    }

    /// Latency of the whole DAG: the longest path to any result terminal.
    pub fn latency(&self, latencies: &BTreeMap<String, u32>) -> u32 {
        let arrival = self.arrival_cycles(latencies);
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| matches!(node, DagNode::Terminal(_)) && self.in_edges(*index).next().is_some())
            .map(|(index, _)| arrival[index])
            .max()
            .unwrap_or(0)
    }
}

/// Smallest two's complement width that can hold `value`.
pub fn required_bits_signed(value: i64) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    i64::BITS - magnitude.leading_zeros() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latencies(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|&(name, latency)| (name.to_owned(), latency)).collect()
    }

    // out = (in1 * in2) + in3
    fn mac() -> Dag {
        let mut dag = Dag::new();
        let in1 = dag.add_node(DagNode::Terminal(1));
        let in2 = dag.add_node(DagNode::Terminal(2));
        let in3 = dag.add_node(DagNode::Terminal(3));
        let mul = dag.add_node(DagNode::Operation("mul".into()));
        let add = dag.add_node(DagNode::Operation("add".into()));
        let out = dag.add_node(DagNode::Terminal(4));
        dag.connect(in1, 1, mul, 1);
        dag.connect(in2, 2, mul, 2);
        dag.connect(mul, 3, add, 1);
        dag.connect(in3, 3, add, 2);
        dag.connect(add, 3, out, 4);
        dag
    }

    #[test]
    fn test_latency() {
        let dag = mac();
        let latencies = latencies(&[("mul", 3), ("add", 1)]);
        assert_eq!(dag.max_latency_to_node(3, &latencies), 0);
        assert_eq!(dag.max_latency_to_node(4, &latencies), 3);
        assert_eq!(dag.latency(&latencies), 4);
    }

    #[test]
    fn test_implementable() {
        let dag = mac();
        assert!(dag.is_implementable(|name| name == "mul" || name == "add"));
        assert!(!dag.is_implementable(|name| name == "add"));
    }

    #[test]
    fn test_cycle() {
        let mut dag = Dag::new();
        let a = dag.add_node(DagNode::Operation("add".into()));
        let b = dag.add_node(DagNode::Operation("add".into()));
        dag.connect(a, 3, b, 1);
        dag.connect(b, 3, a, 1);
        assert!(!dag.is_well_formed());
        assert!(!dag.is_implementable(|_| true));
    }

    #[test]
    fn test_required_bits_signed() {
        assert_eq!(required_bits_signed(0), 1);
        assert_eq!(required_bits_signed(1), 2);
        assert_eq!(required_bits_signed(-1), 1);
        assert_eq!(required_bits_signed(-2), 2);
        assert_eq!(required_bits_signed(5), 4);
        assert_eq!(required_bits_signed(-128), 8);
    }
}
