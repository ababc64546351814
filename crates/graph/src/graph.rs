use crate::types::ZoneGraph;
use netsketch_model::{LinkId, ZoneId};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

impl ZoneGraph {
    /// Zones directly connected to `zone`, sorted, without repeats
    pub fn neighbors(&self, zone: ZoneId) -> Vec<ZoneId> {
        let Some(idx) = self.find_node(zone) else {
            return Vec::new();
        };
        let mut out: Vec<ZoneId> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Every edge as `(lower zone, higher zone, link)`, sorted
    pub fn edges(&self) -> Vec<(ZoneId, ZoneId, LinkId)> {
        let mut out: Vec<(ZoneId, ZoneId, LinkId)> = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let a = *self.graph.node_weight(edge.source())?;
                let b = *self.graph.node_weight(edge.target())?;
                Some((a.min(b), a.max(b), *edge.weight()))
            })
            .collect();
        out.sort();
        out
    }

    /// Connected components; each island sorted, islands ordered by their
    /// lowest zone id. Isolated zones form their own island.
    pub fn islands(&self) -> Vec<Vec<ZoneId>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<ZoneId>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            if let Some(&zone) = self.graph.node_weight(idx) {
                groups.entry(sets.find(idx.index())).or_default().push(zone);
            }
        }

        let mut islands: Vec<Vec<ZoneId>> = groups
            .into_values()
            .map(|mut zones| {
                zones.sort();
                zones
            })
            .collect();
        islands.sort();
        islands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ZoneGraph {
        let mut graph = ZoneGraph::new();
        for id in 1..=5 {
            graph.add_zone(ZoneId(id));
        }
        graph.add_link(ZoneId(1), ZoneId(2), LinkId(10));
        graph.add_link(ZoneId(3), ZoneId(2), LinkId(11));
        graph.add_link(ZoneId(1), ZoneId(2), LinkId(12));
        graph.add_link(ZoneId(4), ZoneId(5), LinkId(13));
        graph
    }

    #[test]
    fn neighbors_are_deduplicated() {
        let graph = sample();
        assert_eq!(graph.neighbors(ZoneId(2)), vec![ZoneId(1), ZoneId(3)]);
        assert_eq!(graph.neighbors(ZoneId(1)), vec![ZoneId(2)]);
        assert!(graph.neighbors(ZoneId(99)).is_empty());
    }

    #[test]
    fn parallel_links_are_kept() {
        let graph = sample();
        assert_eq!(
            graph.edges(),
            vec![
                (ZoneId(1), ZoneId(2), LinkId(10)),
                (ZoneId(1), ZoneId(2), LinkId(12)),
                (ZoneId(2), ZoneId(3), LinkId(11)),
                (ZoneId(4), ZoneId(5), LinkId(13)),
            ]
        );
    }

    #[test]
    fn islands_group_connected_zones() {
        let mut graph = sample();
        graph.add_zone(ZoneId(6));
        assert_eq!(
            graph.islands(),
            vec![
                vec![ZoneId(1), ZoneId(2), ZoneId(3)],
                vec![ZoneId(4), ZoneId(5)],
                vec![ZoneId(6)],
            ]
        );
    }

    #[test]
    fn empty_graph_has_no_islands() {
        assert!(ZoneGraph::new().islands().is_empty());
    }
}
