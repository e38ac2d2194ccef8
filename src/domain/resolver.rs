//! Ingredient resolution
//!
//! Flattens a multi-level recipe into its base ingredients with correctly
//! scaled quantities. The frontier loop below expands one crafting level per
//! round until no craftable item remains, then merges duplicates.

use thiserror::Error;

use super::catalog::{CatalogError, RecipeCatalog};
use super::graph::RecipeGraph;
use super::ingredient::{merge_duplicates, Ingredient, ItemId, ItemIdent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("recipe cycle detected at item {0}")]
    CycleDetected(ItemId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Resolves an item down to its base ingredients.
///
/// A name identifier is translated through the catalog first; an unknown
/// name is a [`ResolveError::NotFound`]. An item without a recipe resolves
/// to itself with count 1. Quantity scaling uses integer floor division
/// (`parent_count * sub_count / output_count`), a deliberate lossy
/// approximation inherited from the cost model.
pub fn resolve<C>(catalog: &C, ident: &ItemIdent) -> Result<Vec<Ingredient>, ResolveError>
where
    C: RecipeCatalog + ?Sized,
{
    let item_id = match ident {
        ItemIdent::Name(name) => catalog
            .name_to_id(name)?
            .ok_or_else(|| ResolveError::NotFound(name.clone()))?,
        ItemIdent::Id(id) => *id,
    };

    let graph = RecipeGraph::explore(catalog, item_id)?;
    if let Some(at) = graph.find_cycle() {
        return Err(ResolveError::CycleDetected(at));
    }

    let Some(root) = graph.recipe(item_id) else {
        // The item itself is base; keep its display name if the catalog
        // knows one.
        return Ok(vec![match catalog.item_name(item_id)? {
            Some(name) => Ingredient::named(item_id, name, 1),
            None => Ingredient::new(item_id, 1),
        }]);
    };

    let mut frontier: Vec<Ingredient> = root.ingredients.clone();
    let mut base: Vec<Ingredient> = Vec::new();

    // Fixed point: each round replaces every craftable frontier entry with
    // its scaled sub-ingredients. Terminates because the graph is acyclic.
    while !frontier.is_empty() {
        let mut next = Vec::new();

        for entry in frontier {
            match graph.recipe(entry.item_id) {
                None => base.push(entry),
                Some(recipe) => {
                    let output_count = recipe.output_count.max(1);
                    for sub in &recipe.ingredients {
                        let mut scaled = sub.clone();
                        scaled.count = entry.count * sub.count / output_count;
                        next.push(scaled);
                    }
                }
            }
        }

        frontier = next;
    }

    Ok(merge_duplicates(base))
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

    fn counts(mut resolved: Vec<Ingredient>) -> Vec<(ItemId, i64)> {
        resolved.sort_by_key(|i| i.item_id);
        resolved.into_iter().map(|i| (i.item_id, i.count)).collect()
    }

    #[test]
    fn item_without_recipe_is_its_own_base_ingredient() {
        let catalog = MemoryCatalog::new();

        let resolved = resolve(&catalog, &ItemIdent::Id(42)).unwrap();

        assert_eq!(resolved, vec![Ingredient::new(42, 1)]);
    }

    #[test]
    fn base_root_keeps_its_catalog_name() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_item(19924, "Lump of Primordium");

        let resolved = resolve(&catalog, &ItemIdent::Id(19924)).unwrap();

        assert_eq!(
            resolved,
            vec![Ingredient::named(19924, "Lump of Primordium", 1)]
        );
    }

    #[test]
    fn unknown_name_is_not_found() {
        let catalog = MemoryCatalog::new();

        let err = resolve(&catalog, &"Oiled Forged Scrap".into()).unwrap_err();

        assert_eq!(err, ResolveError::NotFound("Oiled Forged Scrap".into()));
    }

    #[test]
    fn flattens_two_levels_and_merges() {
        // root -> 2xA + 1xB, A -> 3xC; base prices are irrelevant here.
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(10, 2), (11, 1)]));
        catalog.add_recipe(recipe(10, 1, &[(12, 3)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();

        assert_eq!(counts(resolved), vec![(11, 1), (12, 6)]);
    }

    #[test]
    fn resolves_by_name_through_the_catalog() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_item(1, "Rough Sharpening Stone");
        catalog.add_recipe(recipe(1, 1, &[(2, 3)]));

        let resolved = resolve(&catalog, &"rough sharpening stone".into()).unwrap();

        assert_eq!(counts(resolved), vec![(2, 3)]);
    }

    #[test]
    fn scaling_uses_floor_division_by_output_count() {
        // Parent count 10, sub count 2, recipe yields 4 per craft:
        // floor(10 * 2 / 4) = 5.
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 10)]));
        catalog.add_recipe(recipe(2, 4, &[(3, 2)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();

        assert_eq!(counts(resolved), vec![(3, 5)]);
    }

    #[test]
    fn scaling_can_floor_to_zero() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 1)]));
        catalog.add_recipe(recipe(2, 5, &[(3, 1)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();

        assert_eq!(counts(resolved), vec![(3, 0)]);
    }

    #[test]
    fn result_contains_only_base_ingredients() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 2), (3, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(4, 1), (5, 2)]));
        catalog.add_recipe(recipe(4, 1, &[(6, 2)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();

        for ingredient in &resolved {
            assert!(catalog.ingredients(ingredient.item_id).unwrap().is_none());
        }
    }

    #[test]
    fn diamond_shaped_recipes_resolve_without_cycle_error() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 1), (3, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(4, 2)]));
        catalog.add_recipe(recipe(3, 1, &[(4, 3)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();

        assert_eq!(counts(resolved), vec![(4, 5)]);
    }

    #[test]
    fn cyclic_recipes_fail_instead_of_hanging() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_recipe(recipe(1, 1, &[(2, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(3, 1)]));
        catalog.add_recipe(recipe(3, 1, &[(1, 1)]));

        let err = resolve(&catalog, &ItemIdent::Id(1)).unwrap_err();

        assert!(matches!(err, ResolveError::CycleDetected(_)));
    }

    #[test]
    fn first_seen_ingredient_name_survives_merging() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_item(4, "Copper Ore");
        catalog.add_recipe(recipe(1, 1, &[(4, 1), (2, 1)]));
        catalog.add_recipe(recipe(2, 1, &[(4, 2)]));

        let resolved = resolve(&catalog, &ItemIdent::Id(1)).unwrap();
        let copper = resolved.iter().find(|i| i.item_id == 4).unwrap();

        assert_eq!(copper.item_name.as_deref(), Some("Copper Ore"));
        assert_eq!(copper.count, 3);
    }
}
