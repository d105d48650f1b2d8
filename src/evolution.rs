use std::sync::Arc;

use tracing::{debug, warn};

use crate::loader::RecordSource;
use crate::record::{CanonicalRecord, EvolutionGraph};

/// Flattens an evolution graph into the records along its first-listed
/// branch. Alternate branches are dropped.
pub struct EvolutionResolver<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    max_depth: usize,
}

impl<'a, S: RecordSource + ?Sized> EvolutionResolver<'a, S> {
    pub fn new(source: &'a S, max_depth: usize) -> Self {
        Self { source, max_depth }
    }

    /// Root first, at most `max_depth` nodes visited. A graph whose root has
    /// no children yields an empty chain. Species that fail to load are
    /// skipped and the walk carries on through the graph.
    pub fn resolve(&self, graph: &EvolutionGraph) -> Vec<Arc<CanonicalRecord>> {
        if !graph.has_evolutions() {
            return Vec::new();
        }

        let mut chain = Vec::new();
        let mut node = Some(&graph.chain);
        let mut steps = 0usize;
        while let Some(current) = node {
            if steps == self.max_depth {
                warn!(
                    root = %graph.chain.species.name,
                    max_depth = self.max_depth,
                    "evolution chain truncated"
                );
                break;
            }
            steps += 1;

            let name = &current.species.name;
            match self.source.load(name) {
                Some(record) => chain.push(record),
                None => debug!(species = %name, "skipping unresolved species"),
            }
            node = current.evolves_to.first();
        }
        chain
    }
}
