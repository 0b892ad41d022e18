//! Static game-data catalog: resources and production recipes
//!
//! Supplied read-only by the catalog collaborator. The core never
//! mutates catalog data; it is consumed by price banding, CPI weighting
//! and production cost calculation.

use crate::errors::EconomyError;
use crate::ids::{IndustryId, ResourceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tradable resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Reference price used for valuation, price banding and CPI.
    pub base_price: Decimal,
    /// CPI weight; defaults to 1.0 when the catalog does not configure one.
    #[serde(default = "default_weight")]
    pub weight: Decimal,
    pub industry: IndustryId,
}

fn default_weight() -> Decimal {
    Decimal::ONE
}

/// One input requirement of a recipe, per unit of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub resource_id: ResourceId,
    pub quantity: i64,
}

/// Production recipe for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub output_resource_id: ResourceId,
    /// Units produced per hour of run time.
    pub per_hour: Decimal,
    /// Cash cost per hour of run time.
    pub maintenance_cost: Decimal,
    pub inputs: Vec<RecipeInput>,
}

/// Read-only catalog of resources and recipes, keyed by resource id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCatalog {
    resources: BTreeMap<ResourceId, Resource>,
    recipes: BTreeMap<ResourceId, Recipe>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut catalog = Self::new();
        for resource in resources {
            catalog.insert_resource(resource);
        }
        catalog
    }

    pub fn insert_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.id, resource);
    }

    /// Register a recipe, keyed by its output resource.
    pub fn insert_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.output_resource_id, recipe);
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Resource lookup that fails with a typed NotFound.
    pub fn require_resource(&self, id: ResourceId) -> Result<&Resource, EconomyError> {
        self.resources
            .get(&id)
            .ok_or_else(|| EconomyError::not_found("resource", id))
    }

    pub fn recipe_for(&self, output: ResourceId) -> Option<&Recipe> {
        self.recipes.get(&output)
    }

    pub fn require_recipe(&self, output: ResourceId) -> Result<&Recipe, EconomyError> {
        self.recipes
            .get(&output)
            .ok_or_else(|| EconomyError::not_found("recipe", output))
    }

    /// All resources in id order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheat() -> Resource {
        Resource {
            id: ResourceId::new(1),
            name: "wheat".to_string(),
            base_price: Decimal::from(10),
            weight: Decimal::ONE,
            industry: IndustryId::new("agriculture"),
        }
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = ResourceCatalog::with_resources([wheat()]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resource(ResourceId::new(1)).unwrap().name, "wheat");
        assert!(catalog.resource(ResourceId::new(99)).is_none());
    }

    #[test]
    fn test_require_resource_not_found() {
        let catalog = ResourceCatalog::new();
        let err = catalog.require_resource(ResourceId::new(7)).unwrap_err();
        assert!(err.to_string().contains("resource"));
    }

    #[test]
    fn test_weight_defaults_to_one() {
        let json = r#"{
            "id": 3,
            "name": "iron",
            "base_price": "25.0",
            "industry": "mining"
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.weight, Decimal::ONE);
    }

    #[test]
    fn test_recipe_registration() {
        let mut catalog = ResourceCatalog::with_resources([wheat()]);
        catalog.insert_recipe(Recipe {
            output_resource_id: ResourceId::new(1),
            per_hour: Decimal::from(20),
            maintenance_cost: Decimal::from(5),
            inputs: vec![],
        });
        assert!(catalog.recipe_for(ResourceId::new(1)).is_some());
        assert!(catalog.require_recipe(ResourceId::new(2)).is_err());
    }
}
