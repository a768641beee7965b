//! End-to-end analyzer tests against a fixture catalog
//!
//! The fixture records every request it receives so the order, count and
//! arguments of catalog queries can be checked alongside the report.

use std::sync::Mutex;

use async_trait::async_trait;

use recipe_inventory::analyzer::BatchStatus;
use recipe_inventory::config::{AnalyzerConfig, EACH_UNIT_ID, Messages};
use recipe_inventory::error::{AnalysisError, CatalogError, EntityKind};
use recipe_inventory::models::{
    IngredientRef, IngredientVendorItems, Location, OnHand, Recipe, TreeComponent, Unit,
    VendorItemStock, VendorItemSummary,
};
use recipe_inventory::{InventoryAnalyzer, RecipeCatalog, ScaledTreeRequest};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Locations(String),
    Recipes(String),
    Tree {
        recipe_id: String,
        location_id: String,
        scaled_yield: f64,
        unit_id: String,
        levels: Vec<i32>,
    },
    VendorItems(Vec<String>),
    Inventory(Vec<String>),
}

#[derive(Default)]
struct FixtureCatalog {
    locations: Vec<Location>,
    recipes: Vec<Recipe>,
    tree: Vec<TreeComponent>,
    ingredients: Vec<IngredientVendorItems>,
    stock: Vec<VendorItemStock>,
    tree_error: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FixtureCatalog {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn with_ingredient(mut self, id: &str, name: &str, items: &[(&str, Option<f64>)]) -> Self {
        self.ingredients.push(IngredientVendorItems {
            ingredient: IngredientRef {
                id: id.to_string(),
                name: name.to_string(),
            },
            vendor_items: items
                .iter()
                .map(|(item_id, _)| VendorItemSummary {
                    id: item_id.to_string(),
                    name: format!("{} ({})", name, item_id),
                    sku: Some(item_id.to_uppercase()),
                })
                .collect(),
        });
        for (item_id, quantity) in items {
            self.stock.push(VendorItemStock {
                id: item_id.to_string(),
                name: format!("{} ({})", name, item_id),
                sku: Some(item_id.to_uppercase()),
                on_hand: quantity
                    .map(|q| OnHand {
                        quantity: q,
                        unit: Some(each()),
                    })
                    .into_iter()
                    .collect(),
            });
        }
        self
    }

    fn with_component(mut self, id: &str, name: &str, quantity: f64) -> Self {
        self.tree.push(TreeComponent {
            component_id: format!("cmp-{}", self.tree.len()),
            ingredient: IngredientRef {
                id: id.to_string(),
                name: name.to_string(),
            },
            quantity,
            unit: each(),
        });
        self
    }
}

fn each() -> Unit {
    Unit {
        id: EACH_UNIT_ID.to_string(),
        name: "each".to_string(),
    }
}

fn recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        yield_unit: Some(each()),
        total_yield: 1.0,
    }
}

fn base_catalog() -> FixtureCatalog {
    FixtureCatalog {
        locations: vec![Location {
            id: "loc-sd".to_string(),
            name: "San Diego".to_string(),
            city: Some("San Diego".to_string()),
            state: Some("CA".to_string()),
        }],
        recipes: vec![recipe("rcp-x", "X")],
        ..Default::default()
    }
}

#[async_trait]
impl RecipeCatalog for FixtureCatalog {
    async fn find_locations(&self, name: &str, limit: usize) -> Result<Vec<Location>, CatalogError> {
        self.record(Call::Locations(name.to_string()));
        let wanted = name.to_lowercase();
        Ok(self
            .locations
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&wanted))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_recipes(&self, name: &str, limit: usize) -> Result<Vec<Recipe>, CatalogError> {
        self.record(Call::Recipes(name.to_string()));
        let wanted = name.to_lowercase();
        Ok(self
            .recipes
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&wanted))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn scaled_recipe_tree(
        &self,
        request: ScaledTreeRequest<'_>,
    ) -> Result<Vec<TreeComponent>, CatalogError> {
        self.record(Call::Tree {
            recipe_id: request.recipe_id.to_string(),
            location_id: request.location_id.to_string(),
            scaled_yield: request.scaled_yield,
            unit_id: request.scaled_unit_id.to_string(),
            levels: request.levels.to_vec(),
        });
        match &self.tree_error {
            Some(message) => Err(CatalogError::Malformed(message.clone())),
            None => Ok(self.tree.clone()),
        }
    }

    async fn ingredient_vendor_items(
        &self,
        ingredient_ids: &[String],
        _location_id: &str,
        _limit: usize,
    ) -> Result<Vec<IngredientVendorItems>, CatalogError> {
        self.record(Call::VendorItems(ingredient_ids.to_vec()));
        Ok(self
            .ingredients
            .iter()
            .filter(|i| ingredient_ids.contains(&i.ingredient.id))
            .cloned()
            .collect())
    }

    async fn vendor_item_inventory(
        &self,
        vendor_item_ids: &[String],
        _location_id: &str,
        _limit: usize,
    ) -> Result<Vec<VendorItemStock>, CatalogError> {
        self.record(Call::Inventory(vendor_item_ids.to_vec()));
        Ok(self
            .stock
            .iter()
            .filter(|s| vendor_item_ids.contains(&s.id))
            .cloned()
            .collect())
    }
}

fn analyzer(catalog: FixtureCatalog) -> InventoryAnalyzer<FixtureCatalog> {
    InventoryAnalyzer::new(catalog, AnalyzerConfig::default())
}

#[tokio::test]
async fn stocked_and_unstocked_ingredients() {
    let catalog = base_catalog()
        .with_component("a", "A", 10.0)
        .with_component("b", "B", 5.0)
        .with_ingredient("a", "A", &[("vi-a", Some(20.0))]);
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 10.0, None).await.unwrap();

    let sufficient: Vec<_> = report
        .inventory
        .sufficient
        .iter()
        .map(|i| i.requirement.ingredient_id.as_str())
        .collect();
    let missing: Vec<_> = report
        .inventory
        .missing
        .iter()
        .map(|i| i.requirement.ingredient_id.as_str())
        .collect();
    assert_eq!(sufficient, vec!["a"]);
    assert_eq!(missing, vec!["b"]);
    assert!(report.inventory.insufficient.is_empty());
    assert!(!report.summary.can_produce);
    assert_eq!(report.critical_issues, vec!["B: No vendor items available"]);
    assert_eq!(report.requirements.len(), 2);
    assert_eq!(report.requirements[0].required_quantity, 10.0);
}

#[tokio::test]
async fn negative_and_zero_stock_flags_tracking_issue() {
    let catalog = base_catalog()
        .with_component("c", "C", 4.0)
        .with_ingredient("c", "C", &[("vi-c1", Some(-3.0)), ("vi-c2", Some(0.0))]);
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    assert_eq!(report.inventory.insufficient.len(), 1);
    assert_eq!(report.inventory.insufficient[0].available_items.len(), 2);
    assert_eq!(report.critical_issues, vec!["C: No positive inventory available"]);
    assert!(
        report
            .recommendations
            .contains(&Messages::default().negative_inventory)
    );
}

#[tokio::test]
async fn missing_on_hand_record_counts_as_zero() {
    let catalog = base_catalog()
        .with_component("d", "D", 1.0)
        .with_ingredient("d", "D", &[("vi-d", None)]);
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    let item = &report.inventory.insufficient[0].available_items[0];
    assert_eq!(item.inventory.on_hand_quantity, 0.0);
    assert!(item.inventory.on_hand_unit.is_none());
    assert!(
        !report
            .recommendations
            .contains(&Messages::default().negative_inventory)
    );
}

#[tokio::test]
async fn duplicate_ingredients_are_looked_up_once() {
    let catalog = base_catalog()
        .with_component("a", "A", 2.0)
        .with_component("b", "B", 1.0)
        .with_component("a", "A", 3.0)
        .with_ingredient("a", "A", &[("vi-a", Some(1.0))])
        .with_ingredient("b", "B", &[("vi-b", Some(1.0))]);
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    let vendor_lookups: Vec<_> = analyzer
        .catalog()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::VendorItems(ids) => Some(ids),
            _ => None,
        })
        .collect();
    assert_eq!(vendor_lookups, vec![vec!["a".to_string(), "b".to_string()]]);

    // each occurrence is still classified
    assert_eq!(report.summary.total_ingredients, 3);
    assert_eq!(report.summary.sufficient_ingredients, 3);
    assert!(report.summary.can_produce);
}

#[tokio::test]
async fn stages_run_in_order_with_defaults() {
    let catalog = base_catalog()
        .with_component("a", "A", 1.0)
        .with_ingredient("a", "A", &[("vi-a", Some(5.0))]);
    let analyzer = analyzer(catalog);

    analyzer.analyze("X", "San Diego", 25.0, None).await.unwrap();

    assert_eq!(
        analyzer.catalog().calls(),
        vec![
            Call::Locations("San Diego".to_string()),
            Call::Recipes("X".to_string()),
            Call::Tree {
                recipe_id: "rcp-x".to_string(),
                location_id: "loc-sd".to_string(),
                scaled_yield: 25.0,
                unit_id: EACH_UNIT_ID.to_string(),
                levels: vec![-1],
            },
            Call::VendorItems(vec!["a".to_string()]),
            Call::Inventory(vec!["vi-a".to_string()]),
        ]
    );
}

#[tokio::test]
async fn unit_names_are_resolved_before_scaling() {
    let analyzer = analyzer(base_catalog());

    analyzer
        .analyze("X", "San Diego", 2.0, Some("kg"))
        .await
        .unwrap();

    let unit = analyzer.catalog().calls().into_iter().find_map(|c| match c {
        Call::Tree { unit_id, .. } => Some(unit_id),
        _ => None,
    });
    assert_eq!(unit.as_deref(), Some("dW5pdDoy"));
}

#[tokio::test]
async fn no_vendor_items_skips_inventory_query() {
    let catalog = base_catalog().with_component("a", "A", 1.0);
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    assert_eq!(report.summary.missing_ingredients, 1);
    assert!(
        !analyzer
            .catalog()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Inventory(_)))
    );
}

#[tokio::test]
async fn empty_recipe_tree_is_vacuously_producible() {
    let analyzer = analyzer(base_catalog());

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    assert!(report.requirements.is_empty());
    assert!(report.inventory.sufficient.is_empty());
    assert!(report.inventory.missing.is_empty());
    assert!(report.summary.can_produce);
    assert!(report.critical_issues.is_empty());
}

#[tokio::test]
async fn unknown_location_aborts_before_other_queries() {
    let analyzer = analyzer(base_catalog());

    let err = analyzer
        .analyze("X", "Nowhere", 1.0, None)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        AnalysisError::NotFound { kind: EntityKind::Location, name } if name == "Nowhere"
    ));
    assert_eq!(err.to_string(), "Location \"Nowhere\" not found");
    assert_eq!(
        analyzer.catalog().calls(),
        vec![Call::Locations("Nowhere".to_string())]
    );
}

#[tokio::test]
async fn unknown_recipe_is_not_found() {
    let analyzer = analyzer(base_catalog());

    let err = analyzer
        .analyze("Meatloaf", "San Diego", 1.0, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Recipe \"Meatloaf\" not found");
    assert_eq!(analyzer.catalog().calls().len(), 2);
}

#[tokio::test]
async fn exact_recipe_match_preferred_over_first() {
    let mut catalog = base_catalog();
    catalog.recipes = vec![
        recipe("rcp-deluxe", "Galley Burger Deluxe"),
        recipe("rcp-mini", "Mini Galley Burger"),
        recipe("rcp-plain", "galley burger"),
    ];
    let analyzer = analyzer(catalog);

    analyzer
        .analyze("Galley Burger", "San Diego", 1.0, None)
        .await
        .unwrap();

    let recipe_id = analyzer.catalog().calls().into_iter().find_map(|c| match c {
        Call::Tree { recipe_id, .. } => Some(recipe_id),
        _ => None,
    });
    assert_eq!(recipe_id.as_deref(), Some("rcp-plain"));
}

#[tokio::test]
async fn first_matching_location_is_used() {
    let mut catalog = base_catalog();
    catalog.locations = vec![
        Location {
            id: "loc-sd-east".to_string(),
            name: "San Diego East".to_string(),
            city: Some("San Diego".to_string()),
            state: Some("CA".to_string()),
        },
        Location {
            id: "loc-sd".to_string(),
            name: "San Diego".to_string(),
            city: Some("San Diego".to_string()),
            state: Some("CA".to_string()),
        },
    ];
    let analyzer = analyzer(catalog);

    analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    // locations take the first match even when a later one is exact
    let location_id = analyzer.catalog().calls().into_iter().find_map(|c| match c {
        Call::Tree { location_id, .. } => Some(location_id),
        _ => None,
    });
    assert_eq!(location_id.as_deref(), Some("loc-sd-east"));
}

#[tokio::test]
async fn upstream_failure_is_propagated_unmodified() {
    let mut catalog = base_catalog();
    catalog.tree_error = Some("recipe tree unavailable".to_string());
    let analyzer = analyzer(catalog);

    let err = analyzer
        .analyze("X", "San Diego", 1.0, None)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        AnalysisError::Upstream(CatalogError::Malformed(m)) if m == "recipe tree unavailable"
    ));
    assert_eq!(
        err.to_string(),
        CatalogError::Malformed("recipe tree unavailable".to_string()).to_string()
    );
}

#[tokio::test]
async fn unrequested_inventory_row_is_malformed() {
    let mut catalog = base_catalog()
        .with_component("a", "A", 1.0)
        .with_ingredient("a", "A", &[("vi-a", Some(1.0))]);
    catalog.stock[0].id = "vi-ghost".to_string();

    struct Passthrough(FixtureCatalog);

    #[async_trait]
    impl RecipeCatalog for Passthrough {
        async fn find_locations(&self, n: &str, l: usize) -> Result<Vec<Location>, CatalogError> {
            self.0.find_locations(n, l).await
        }
        async fn find_recipes(&self, n: &str, l: usize) -> Result<Vec<Recipe>, CatalogError> {
            self.0.find_recipes(n, l).await
        }
        async fn scaled_recipe_tree(
            &self,
            r: ScaledTreeRequest<'_>,
        ) -> Result<Vec<TreeComponent>, CatalogError> {
            self.0.scaled_recipe_tree(r).await
        }
        async fn ingredient_vendor_items(
            &self,
            ids: &[String],
            loc: &str,
            l: usize,
        ) -> Result<Vec<IngredientVendorItems>, CatalogError> {
            self.0.ingredient_vendor_items(ids, loc, l).await
        }
        async fn vendor_item_inventory(
            &self,
            _ids: &[String],
            _loc: &str,
            _l: usize,
        ) -> Result<Vec<VendorItemStock>, CatalogError> {
            // ignores the requested ids
            Ok(self.0.stock.clone())
        }
    }

    let analyzer = InventoryAnalyzer::new(Passthrough(catalog), AnalyzerConfig::default());
    let err = analyzer
        .analyze("X", "San Diego", 1.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Upstream(CatalogError::Malformed(_))));
}

#[tokio::test]
async fn invalid_quantity_rejected_without_queries() {
    let analyzer = analyzer(base_catalog());

    for quantity in [0.0, -5.0, 20_000.0, f64::NAN] {
        let err = analyzer
            .analyze("X", "San Diego", quantity, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)), "{}", quantity);
    }

    let long_name = "a".repeat(101);
    for (recipe, location) in [
        ("  ", "San Diego"),
        ("X", ""),
        (long_name.as_str(), "San Diego"),
        ("X", long_name.as_str()),
    ] {
        let err = analyzer.analyze(recipe, location, 1.0, None).await.unwrap_err();
        assert!(
            matches!(err, AnalysisError::InvalidInput(_)),
            "{:?} / {:?}",
            recipe,
            location
        );
    }

    assert!(analyzer.catalog().calls().is_empty());
}

#[tokio::test]
async fn boundary_inputs_are_accepted() {
    let name = "b".repeat(100);
    let mut catalog = base_catalog();
    catalog.recipes.push(recipe("rcp-long", &name));
    let analyzer = analyzer(catalog);

    for quantity in [0.01, 10_000.0] {
        let report = analyzer.analyze("X", "San Diego", quantity, None).await.unwrap();
        assert_eq!(report.summary.target_quantity, quantity);
    }

    let report = analyzer.analyze(&name, "San Diego", 1.0, None).await.unwrap();
    assert_eq!(report.summary.recipe, name);

    let tree_ids: Vec<_> = analyzer
        .catalog()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Tree { recipe_id, .. } => Some(recipe_id),
            _ => None,
        })
        .collect();
    assert_eq!(tree_ids, vec!["rcp-x", "rcp-x", "rcp-long"]);
}

#[tokio::test]
async fn available_items_keep_catalog_order() {
    let catalog = base_catalog()
        .with_component("a", "A", 1.0)
        .with_ingredient(
            "a",
            "A",
            &[("vi-z", Some(5.0)), ("vi-m", Some(0.0)), ("vi-b", Some(3.0))],
        );
    let analyzer = analyzer(catalog);

    let report = analyzer.analyze("X", "San Diego", 1.0, None).await.unwrap();

    let item_ids: Vec<_> = report.inventory.sufficient[0]
        .available_items
        .iter()
        .map(|e| e.vendor_item.id.as_str())
        .collect();
    assert_eq!(item_ids, vec!["vi-z", "vi-b"]);
}

#[tokio::test]
async fn repeated_analysis_is_identical() {
    let catalog = base_catalog()
        .with_component("a", "A", 10.0)
        .with_component("b", "B", 5.0)
        .with_component("c", "C", 1.0)
        .with_ingredient("a", "A", &[("vi-a2", Some(3.0)), ("vi-a1", Some(20.0))])
        .with_ingredient("c", "C", &[("vi-c", Some(-1.0))]);
    let analyzer = analyzer(catalog);

    let first = analyzer.analyze("X", "San Diego", 10.0, None).await.unwrap();
    let second = analyzer.analyze("X", "San Diego", 10.0, None).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first, second);
}

#[tokio::test]
async fn batch_runs_every_combination_in_order() {
    let mut catalog = base_catalog()
        .with_component("a", "A", 1.0)
        .with_ingredient("a", "A", &[("vi-a", Some(5.0))]);
    catalog.recipes = vec![recipe("rcp-burger", "Galley Burger")];
    let analyzer = analyzer(catalog);

    let recipes = vec!["Galley Burger".to_string(), "Nope".to_string()];
    let outcomes = analyzer
        .analyze_batch(&recipes, "San Diego", &[10.0, 50.0], None)
        .await;

    assert_eq!(outcomes.len(), 4);
    let order: Vec<_> = outcomes
        .iter()
        .map(|o| (o.recipe.as_str(), o.quantity))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Galley Burger", 10.0),
            ("Galley Burger", 50.0),
            ("Nope", 10.0),
            ("Nope", 50.0),
        ]
    );
    assert_eq!(
        outcomes[0].status,
        BatchStatus::Completed {
            can_produce: true,
            issues: 0
        }
    );
    assert_eq!(
        outcomes[3].status,
        BatchStatus::Failed {
            error: "Recipe \"Nope\" not found".to_string()
        }
    );

    let json = serde_json::to_value(&outcomes[0]).unwrap();
    assert_eq!(json["canProduce"], true);
    assert_eq!(json["recipe"], "Galley Burger");
}
