//! Evolution trees built from flat per-species evolution lists.
//!
//! All nodes live in one arena ([`EvolutionForest`]). Every species in a line
//! stores the same [`TreeId`], so a line has exactly one tree no matter which
//! member is asked for it.

use std::collections::{HashSet, VecDeque};

use dex_data::{EvolutionTerm, EvolutionTreeDef, Pokemon, RecordKind, RecordMap, TreeId};
use log::info;

use crate::CompileError;

/// Index of a node in the forest arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct EvolutionNode {
    /// The species this node stands for, with the method that reaches it.
    pub term: EvolutionTerm,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena holding every evolution tree of a compilation run.
#[derive(Debug, Clone, Default)]
pub struct EvolutionForest {
    nodes: Vec<EvolutionNode>,
    roots: Vec<NodeId>,
}

impl EvolutionForest {
    pub fn node(&self, id: NodeId) -> &EvolutionNode {
        &self.nodes[id.0]
    }

    pub fn root(&self, tree: TreeId) -> NodeId {
        self.roots[tree.0]
    }

    pub fn tree_count(&self) -> usize {
        self.roots.len()
    }

    pub fn trees(&self) -> impl Iterator<Item = TreeId> + '_ {
        (0..self.roots.len()).map(TreeId)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }

    /// Nodes of `tree` in breadth-first order, root first.
    pub fn breadth_first(&self, tree: TreeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([self.root(tree)]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.node(id).children.iter().copied());
        }
        order
    }

    /// The node whose term is the species itself.
    pub fn find(&self, tree: TreeId, species: &str) -> Option<NodeId> {
        self.breadth_first(tree)
            .into_iter()
            .find(|id| self.node(*id).term.pokemon == species)
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |current| self.node(*current).parent)
    }

    /// Serializable nested form of a tree.
    pub fn flatten(&self, tree: TreeId) -> EvolutionTreeDef {
        self.flatten_node(self.root(tree))
    }

    fn flatten_node(&self, id: NodeId) -> EvolutionTreeDef {
        let node = self.node(id);
        EvolutionTreeDef(
            node.term.clone(),
            node.children.iter().map(|child| self.flatten_node(*child)).collect(),
        )
    }

    fn push(&mut self, term: EvolutionTerm, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(EvolutionNode {
            term,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }
}

/// Build one shared tree per evolutionary line and assign its handle to every member.
///
/// Lines are rooted at species no other species evolves into; anything left
/// over (an evolution cycle) is rooted at its first member in file order. A
/// species reached a second time keeps its first placement.
///
/// # Errors
/// - `MissingReference` when an evolution names an unknown species
pub fn build_trees(pokemon: &mut RecordMap<Pokemon>) -> Result<EvolutionForest, CompileError> {
    let mut forest = EvolutionForest::default();
    for mon in pokemon.values_mut() {
        mon.tree = None;
    }

    let targets: HashSet<String> = pokemon
        .values()
        .flat_map(|mon| {
            mon.evolutions
                .iter()
                .filter(move |evo| evo.pokemon != mon.key)
                .map(|evo| evo.pokemon.clone())
        })
        .collect();
    let keys: Vec<String> = pokemon.keys().cloned().collect();

    for key in keys.iter().filter(|k| !targets.contains(*k)) {
        plant(&mut forest, pokemon, key)?;
    }
    for key in &keys {
        if pokemon[key].tree.is_none() {
            plant(&mut forest, pokemon, key)?;
        }
    }

    info!("built {} evolution trees for {} species", forest.tree_count(), pokemon.len());
    Ok(forest)
}

fn plant(forest: &mut EvolutionForest, pokemon: &mut RecordMap<Pokemon>, root_key: &str) -> Result<(), CompileError> {
    let tree = TreeId(forest.roots.len());
    let root = forest.push(EvolutionTerm::root(root_key), None);
    forest.roots.push(root);
    pokemon[root_key].tree = Some(tree);

    let mut stack = vec![(root, root_key.to_string())];
    while let Some((node, species)) = stack.pop() {
        let evolutions = pokemon[&species].evolutions.clone();
        for term in evolutions {
            let Some(target) = pokemon.get_mut(&term.pokemon) else {
                return Err(CompileError::MissingReference {
                    kind: RecordKind::Pokemon,
                    key: term.pokemon,
                    context: format!("evolution of '{species}'"),
                });
            };
            if target.tree.is_some() {
                continue;
            }
            target.tree = Some(tree);
            let target_key = term.pokemon.clone();
            let child = forest.push(term, Some(node));
            stack.push((child, target_key));
        }
    }
    Ok(())
}
