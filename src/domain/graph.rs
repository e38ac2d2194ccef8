//! Recipe graph
//!
//! The reachable part of the recipe catalog, explored once per resolution
//! call. Uses petgraph for cycle detection and memoizes catalog lookups so
//! the flattening pass never hits the catalog twice for the same item.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::catalog::{CatalogError, RecipeCatalog};
use super::ingredient::{Ingredient, ItemId};

/// A memoized crafting level: output quantity plus direct ingredients.
#[derive(Clone, Debug)]
pub struct Recipe {
    pub output_count: i64,
    pub ingredients: Vec<Ingredient>,
}

/// The recipe graph reachable from one root item.
///
/// Edges point from an output item to each of its ingredients.
#[derive(Debug, Default)]
pub struct RecipeGraph {
    graph: DiGraph<ItemId, ()>,
    node_map: HashMap<ItemId, NodeIndex>,
    recipes: HashMap<ItemId, Recipe>,
}

impl RecipeGraph {
    /// Walks the catalog breadth-first from `root`, recording every recipe
    /// edge it can reach. Each item is queried exactly once.
    pub fn explore<C>(catalog: &C, root: ItemId) -> Result<Self, CatalogError>
    where
        C: RecipeCatalog + ?Sized,
    {
        let mut result = Self::default();
        result.add_node(root);

        let mut visited: HashSet<ItemId> = HashSet::from([root]);
        let mut queue: VecDeque<ItemId> = VecDeque::from([root]);

        while let Some(item_id) = queue.pop_front() {
            let Some(ingredients) = catalog.ingredients(item_id)? else {
                continue;
            };
            let output_count = catalog.output_count(item_id)?;

            for ingredient in &ingredients {
                let from = result.add_node(item_id);
                let to = result.add_node(ingredient.item_id);
                result.graph.add_edge(from, to, ());

                if visited.insert(ingredient.item_id) {
                    queue.push_back(ingredient.item_id);
                }
            }

            result.recipes.insert(
                item_id,
                Recipe {
                    output_count,
                    ingredients,
                },
            );
        }

        Ok(result)
    }

    fn add_node(&mut self, item_id: ItemId) -> NodeIndex {
        match self.node_map.get(&item_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(item_id);
                self.node_map.insert(item_id, idx);
                idx
            }
        }
    }

    /// Returns an item participating in a cycle, if the graph has one.
    pub fn find_cycle(&self) -> Option<ItemId> {
        toposort(&self.graph, None)
            .err()
            .map(|cycle| self.graph[cycle.node_id()])
    }

    /// Returns the memoized recipe for an item, or `None` if it is base.
    pub fn recipe(&self, item_id: ItemId) -> Option<&Recipe> {
        self.recipes.get(&item_id)
    }

    /// Number of distinct items reachable from the root.
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::MemoryCatalog;
    use crate::domain::ingredient::RecipeEntry;

    fn recipe(output: ItemId, output_count: i64, ingredients: &[(ItemId, i64)]) -> RecipeEntry {
        RecipeEntry {
            output_item_id: output,
            output_count,
            ingredients: ingredients.to_vec(),
        }
    }

    #[test]
    fn base_root_yields_single_node() {
        let catalog = MemoryCatalog::new();
        let graph = RecipeGraph::explore(&catalog, 5).unwrap();

        assert_eq!(graph.len(), 1);
        assert!(graph.recipe(5).is_none());
        assert_eq!(graph.find_cycle(), None);
    }

    #[test]
    fn explores_nested_recipes_once_per_item() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 2), (3, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(4, 3)]));

        let graph = RecipeGraph::explore(&catalog, 1).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.recipe(1).unwrap().ingredients.len(), 2);
        assert_eq!(graph.recipe(2).unwrap().ingredients.len(), 1);
        assert!(graph.recipe(3).is_none());
        assert!(graph.recipe(4).is_none());
    }

    #[test]
    fn diamond_reuse_is_not_a_cycle() {
        // 1 needs 2 and 3; both need 4.
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 1), (3, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(4, 1)]));
        catalog.add_recipe(recipe(3, 1, &[(4, 1)]));

        let graph = RecipeGraph::explore(&catalog, 1).unwrap();
        assert_eq!(graph.find_cycle(), None);
    }

    #[test]
    fn mutual_recursion_is_reported_as_cycle() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(1, 1)]));

        let graph = RecipeGraph::explore(&catalog, 1).unwrap();
        assert!(graph.find_cycle().is_some());
    }

    #[test]
    fn self_recipe_is_reported_as_cycle() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(1, 2)]));

        let graph = RecipeGraph::explore(&catalog, 1).unwrap();
        assert_eq!(graph.find_cycle(), Some(1));
    }
}
