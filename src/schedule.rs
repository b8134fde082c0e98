// SPDX-License-Identifier: Apache-2.0

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::design::BlockInfo;
use crate::{BlockKind, ConnectionEdge, ElabError, SignalInfo, Step};

/// Node of the dependency graph. The derived order is the tie-break among
/// ready nodes: signals, then connections, then blocks, each in
/// declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Node {
    Signal(usize),
    Edge(usize),
    Block(usize),
}

/// Orders connections and combinational blocks so that every step runs
/// after the steps producing the values it reads. A block reading a signal
/// it also writes does not depend on itself, but still runs after every
/// other producer of that signal.
pub(crate) fn schedule(
    signals: &[SignalInfo],
    edges: &[ConnectionEdge],
    blocks: &[BlockInfo],
) -> Result<Vec<Step>, ElabError> {
    let mut graph = DiGraph::<Node, ()>::new();
    let signal_nodes: Vec<NodeIndex> = (0..signals.len())
        .map(|index| graph.add_node(Node::Signal(index)))
        .collect();

    // Producers of each signal: the connections loading it and the
    // combinational blocks writing any of its bits.
    let mut producers: Vec<Vec<NodeIndex>> = vec![Vec::new(); signals.len()];
    for (index, edge) in edges.iter().enumerate() {
        let node = graph.add_node(Node::Edge(index));
        graph.add_edge(signal_nodes[edge.driver.signal.0], node, ());
        graph.add_edge(node, signal_nodes[edge.load.signal.0], ());
        producers[edge.load.signal.0].push(node);
    }

    let mut block_nodes = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if block.kind != BlockKind::Combinational {
            continue;
        }
        let node = graph.add_node(Node::Block(index));
        let mut written = FixedBitSet::with_capacity(signals.len());
        for endpoint in &block.writes {
            written.insert(endpoint.signal.0);
        }
        for signal in written.ones() {
            graph.add_edge(node, signal_nodes[signal], ());
            producers[signal].push(node);
        }
        block_nodes.push((index, node, written));
    }

    for (index, node, written) in &block_nodes {
        for read in &blocks[*index].reads {
            if !written.contains(read.0) {
                graph.add_edge(signal_nodes[read.0], *node, ());
                continue;
            }
            // A block feeding back a signal only it drives reads its own
            // earlier writes. Other producers of the signal run first.
            for producer in producers[read.0].iter().filter(|p| *p != node) {
                graph.add_edge(*producer, *node, ());
            }
        }
    }

    // Kahn's algorithm; the heap yields the smallest ready node first.
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors_directed(node, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<(Node, NodeIndex)>> = graph
        .node_indices()
        .filter(|node| indegree[node.index()] == 0)
        .map(|node| Reverse((graph[node], node)))
        .collect();

    let mut steps = Vec::new();
    let mut visited = 0;
    while let Some(Reverse((node, index))) = ready.pop() {
        visited += 1;
        match node {
            Node::Edge(edge) => steps.push(Step::Edge(edge)),
            Node::Block(block) => steps.push(Step::Block(block)),
            Node::Signal(_) => {}
        }
        for next in graph.neighbors_directed(index, Direction::Outgoing) {
            indegree[next.index()] -= 1;
            if indegree[next.index()] == 0 {
                ready.push(Reverse((graph[next], next)));
            }
        }
    }

    if visited == graph.node_count() {
        log::trace!("Combinational schedule has {} steps", steps.len());
        return Ok(steps);
    }

    let mut cycle: Vec<Node> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .flatten()
        .map(|node| graph[node])
        .collect();
    cycle.sort();

    let mut cycle_blocks = Vec::new();
    let mut cycle_signals = Vec::new();
    for node in cycle {
        match node {
            Node::Block(block) => cycle_blocks.push(blocks[block].path.clone()),
            Node::Signal(signal) => cycle_signals.push(signals[signal].path.clone()),
            Node::Edge(_) => {}
        }
    }
    Err(ElabError::CombinationalCycle {
        blocks: cycle_blocks,
        signals: cycle_signals,
    })
}
