//! Adjacency index over the append-only edge sequence

use super::edge::Edge;
use super::node::NodeId;
use std::collections::HashMap;

/// Direction for edge lookup relative to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Edges whose src is the node
    #[default]
    Outgoing,
    /// Edges whose dst is the node
    Incoming,
    /// Either endpoint
    Both,
}

impl std::str::FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown direction: {}", s)),
        }
    }
}

/// Edge positions per node, each list ascending (insertion order)
#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    outgoing: HashMap<NodeId, Vec<usize>>,
    incoming: HashMap<NodeId, Vec<usize>>,
}

impl Adjacency {
    /// Record the edge committed at `position`
    pub(crate) fn record(&mut self, position: usize, edge: &Edge) {
        self.outgoing.entry(edge.src().clone()).or_default().push(position);
        self.incoming.entry(edge.dst().clone()).or_default().push(position);
    }

    fn outgoing(&self, node_id: &NodeId) -> &[usize] {
        self.outgoing.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn incoming(&self, node_id: &NodeId) -> &[usize] {
        self.incoming.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn neighbors<'a>(
        &'a self,
        edges: &'a [Edge],
        node_id: &NodeId,
        direction: Direction,
        kind: Option<&'a str>,
    ) -> Neighbors<'a> {
        const NONE: &[usize] = &[];
        let (outgoing, incoming) = match direction {
            Direction::Outgoing => (self.outgoing(node_id), NONE),
            Direction::Incoming => (NONE, self.incoming(node_id)),
            Direction::Both => (self.outgoing(node_id), self.incoming(node_id)),
        };
        Neighbors {
            edges,
            outgoing,
            incoming,
            kind,
        }
    }
}

/// Lazy sequence of edges touching a node, in edge-insertion order.
///
/// Cloning yields an independent cursor, so a sequence can be restarted by
/// keeping a clone of it before iterating.
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    edges: &'a [Edge],
    outgoing: &'a [usize],
    incoming: &'a [usize],
    kind: Option<&'a str>,
}

impl<'a> Neighbors<'a> {
    /// Next position from the merge of both lists. A self-loop sits in both
    /// lists at the same position and is produced once.
    fn next_position(&mut self) -> Option<usize> {
        let position = match (self.outgoing.first(), self.incoming.first()) {
            (None, None) => return None,
            (Some(&o), None) => {
                self.outgoing = &self.outgoing[1..];
                o
            }
            (None, Some(&i)) => {
                self.incoming = &self.incoming[1..];
                i
            }
            (Some(&o), Some(&i)) => {
                if o <= i {
                    self.outgoing = &self.outgoing[1..];
                }
                if i <= o {
                    self.incoming = &self.incoming[1..];
                }
                o.min(i)
            }
        };
        Some(position)
    }
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(position) = self.next_position() {
            let edge = &self.edges[position];
            match self.kind {
                Some(kind) if edge.kind() != kind => continue,
                _ => return Some(edge),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.outgoing.len() + self.incoming.len()))
    }
}
