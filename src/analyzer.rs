//! Inventory sufficiency analysis
//!
//! Runs the four stages in order (resolve names, scale the recipe, map
//! ingredients to stocked vendor items, classify each ingredient) and turns
//! the outcome into a report.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::{RecipeCatalog, ScaledTreeRequest};
use crate::config::{AnalyzerConfig, Messages};
use crate::error::{AnalysisError, Result};
use crate::models::{InventoryEntry, ScaledIngredientRequirement, StockLevel};
use crate::supply::InventoryMap;
use crate::{resolver, scaler, supply};

const NO_VENDOR_ITEMS: &str = "No vendor items found";
const NO_POSITIVE_INVENTORY: &str = "No positive inventory";

/// Whether an inventory entry counts toward covering its ingredient.
///
/// Only the presence of positive stock is checked; the on-hand quantity is
/// not compared against the required quantity.
pub fn has_usable_stock(entry: &InventoryEntry) -> bool {
    entry.on_hand_quantity() > 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedIngredient {
    #[serde(flatten)]
    pub requirement: ScaledIngredientRequirement,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_items: Vec<InventoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SufficiencyAnalysis {
    pub requirements: Vec<ScaledIngredientRequirement>,
    pub sufficient: Vec<ClassifiedIngredient>,
    pub insufficient: Vec<ClassifiedIngredient>,
    pub missing: Vec<ClassifiedIngredient>,
    pub can_produce: bool,
    pub critical_issues: Vec<String>,
}

impl SufficiencyAnalysis {
    /// Any insufficient ingredient has a vendor item with negative stock
    pub fn has_negative_inventory(&self) -> bool {
        self.insufficient.iter().any(|ingredient| {
            ingredient
                .available_items
                .iter()
                .any(|item| item.stock_level == StockLevel::Negative)
        })
    }
}

/// Classify every requirement, in input order, against the inventory map
pub fn analyze_sufficiency(
    requirements: &[ScaledIngredientRequirement],
    inventory: &InventoryMap,
) -> SufficiencyAnalysis {
    let mut analysis = SufficiencyAnalysis {
        can_produce: true,
        ..Default::default()
    };

    for requirement in requirements {
        analysis.requirements.push(requirement.clone());

        let candidates: Vec<&InventoryEntry> = inventory
            .values()
            .filter(|entry| entry.ingredient_id() == requirement.ingredient_id)
            .collect();

        if candidates.is_empty() {
            analysis.can_produce = false;
            analysis.critical_issues.push(format!(
                "{}: No vendor items available",
                requirement.ingredient_name
            ));
            analysis.missing.push(ClassifiedIngredient {
                requirement: requirement.clone(),
                available_items: Vec::new(),
                issue: Some(NO_VENDOR_ITEMS.to_string()),
            });
            continue;
        }

        if !candidates.iter().any(|entry| has_usable_stock(entry)) {
            analysis.can_produce = false;
            analysis.critical_issues.push(format!(
                "{}: No positive inventory available",
                requirement.ingredient_name
            ));
            analysis.insufficient.push(ClassifiedIngredient {
                requirement: requirement.clone(),
                available_items: candidates.into_iter().cloned().collect(),
                issue: Some(NO_POSITIVE_INVENTORY.to_string()),
            });
        } else {
            analysis.sufficient.push(ClassifiedIngredient {
                requirement: requirement.clone(),
                available_items: candidates
                    .into_iter()
                    .filter(|entry| has_usable_stock(entry))
                    .cloned()
                    .collect(),
                issue: None,
            });
        }
    }

    analysis
}

pub fn recommendations(analysis: &SufficiencyAnalysis, messages: &Messages) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !analysis.can_produce {
        recommendations.push(messages.cannot_produce.clone());

        if !analysis.missing.is_empty() {
            recommendations.push(messages.setup_vendor_items.clone());
        }

        if !analysis.insufficient.is_empty() {
            recommendations.push(messages.restock.clone());

            if analysis.has_negative_inventory() {
                recommendations.push(messages.negative_inventory.clone());
            }
        }
    } else {
        recommendations.push(messages.production_possible.clone());
        recommendations.push(messages.monitor_stock.clone());
    }

    recommendations
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub recipe: String,
    pub location: String,
    pub target_quantity: f64,
    pub can_produce: bool,
    pub total_ingredients: usize,
    pub sufficient_ingredients: usize,
    pub insufficient_ingredients: usize,
    pub missing_ingredients: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryBreakdown {
    pub sufficient: Vec<ClassifiedIngredient>,
    pub insufficient: Vec<ClassifiedIngredient>,
    pub missing: Vec<ClassifiedIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: ReportSummary,
    pub requirements: Vec<ScaledIngredientRequirement>,
    pub inventory: InventoryBreakdown,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn generate_report(
    recipe: &str,
    location: &str,
    target_quantity: f64,
    analysis: SufficiencyAnalysis,
    messages: &Messages,
) -> InventoryReport {
    let recommendations = recommendations(&analysis, messages);

    InventoryReport {
        summary: ReportSummary {
            recipe: recipe.to_string(),
            location: location.to_string(),
            target_quantity,
            can_produce: analysis.can_produce,
            total_ingredients: analysis.requirements.len(),
            sufficient_ingredients: analysis.sufficient.len(),
            insufficient_ingredients: analysis.insufficient.len(),
            missing_ingredients: analysis.missing.len(),
        },
        requirements: analysis.requirements,
        inventory: InventoryBreakdown {
            sufficient: analysis.sufficient,
            insufficient: analysis.insufficient,
            missing: analysis.missing,
        },
        critical_issues: analysis.critical_issues,
        recommendations,
    }
}

impl fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divider = "=".repeat(60);
        writeln!(f, "{}", divider)?;
        writeln!(f, "INVENTORY ANALYSIS REPORT")?;
        writeln!(f, "{}", divider)?;
        writeln!(f, "Recipe: {}", self.summary.recipe)?;
        writeln!(f, "Location: {}", self.summary.location)?;
        writeln!(f, "Target Quantity: {}", self.summary.target_quantity)?;
        writeln!(
            f,
            "Can Produce: {}",
            if self.summary.can_produce { "YES" } else { "NO" }
        )?;
        writeln!(f)?;

        writeln!(f, "Ingredient summary:")?;
        writeln!(f, "  Total ingredients: {}", self.summary.total_ingredients)?;
        writeln!(f, "  Sufficient:   {}", self.summary.sufficient_ingredients)?;
        writeln!(f, "  Insufficient: {}", self.summary.insufficient_ingredients)?;
        writeln!(f, "  Missing:      {}", self.summary.missing_ingredients)?;

        if !self.critical_issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Critical issues:")?;
            for issue in &self.critical_issues {
                writeln!(f, "  - {}", issue)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Recommendations:")?;
        for recommendation in &self.recommendations {
            writeln!(f, "  - {}", recommendation)?;
        }
        writeln!(f, "{}", divider)?;

        Ok(())
    }
}

/// Outcome of one recipe/quantity combination in a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub recipe: String,
    pub quantity: f64,
    #[serde(flatten)]
    pub status: BatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchStatus {
    Completed {
        #[serde(rename = "canProduce")]
        can_produce: bool,
        issues: usize,
    },
    Failed { error: String },
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            BatchStatus::Completed { can_produce, issues } => write!(
                f,
                "{:<30} {:>10} {:>8} {:>7}",
                self.recipe,
                self.quantity,
                if *can_produce { "yes" } else { "no" },
                issues
            ),
            BatchStatus::Failed { error } => {
                write!(f, "{:<30} {:>10}   error: {}", self.recipe, self.quantity, error)
            }
        }
    }
}

/// Analyzes whether a location can produce a quantity of a recipe
pub struct InventoryAnalyzer<C> {
    catalog: C,
    config: AnalyzerConfig,
}

impl<C: RecipeCatalog> InventoryAnalyzer<C> {
    pub fn new(catalog: C, config: AnalyzerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Run the full analysis.
    ///
    /// `target_unit` is a unit name from the configuration or a raw unit id;
    /// `None` means "each". Any failure aborts the analysis and is returned
    /// as-is after being logged.
    pub async fn analyze(
        &self,
        recipe_name: &str,
        location_name: &str,
        target_quantity: f64,
        target_unit: Option<&str>,
    ) -> Result<InventoryReport> {
        info!(
            "Analyzing inventory for {} {} at {}",
            target_quantity, recipe_name, location_name
        );

        let result = self
            .run_stages(recipe_name, location_name, target_quantity, target_unit)
            .await;
        if let Err(e) = &result {
            error!("Analysis failed: {}", e);
        }
        result
    }

    async fn run_stages(
        &self,
        recipe_name: &str,
        location_name: &str,
        target_quantity: f64,
        target_unit: Option<&str>,
    ) -> Result<InventoryReport> {
        self.validate(recipe_name, location_name, target_quantity)?;

        let catalog: &dyn RecipeCatalog = &self.catalog;
        let pages = &self.config.page_size;

        let location = resolver::resolve_location(catalog, location_name, pages.locations).await?;
        let recipe = resolver::resolve_recipe(catalog, recipe_name, pages.recipes).await?;

        let requirements = scaler::scaled_requirements(
            catalog,
            ScaledTreeRequest {
                recipe_id: &recipe.id,
                location_id: &location.id,
                scaled_yield: target_quantity,
                scaled_unit_id: self.config.resolve_unit(target_unit),
                levels: &self.config.leaf_levels,
            },
        )
        .await?;

        let vendor_items =
            supply::vendor_items_for(catalog, &requirements, &location.id, pages.ingredients)
                .await?;
        let inventory =
            supply::inventory_for(catalog, &vendor_items, &location.id, pages.vendor_items)
                .await?;

        let analysis = analyze_sufficiency(&requirements, &inventory);
        if analysis.requirements.is_empty() {
            warn!(recipe = %recipe.name, "No ingredients to check; reporting production as possible");
        }
        debug!(
            sufficient = analysis.sufficient.len(),
            insufficient = analysis.insufficient.len(),
            missing = analysis.missing.len(),
            "Sufficiency analysis complete"
        );

        Ok(generate_report(
            recipe_name,
            location_name,
            target_quantity,
            analysis,
            &self.config.messages,
        ))
    }

    fn validate(&self, recipe_name: &str, location_name: &str, quantity: f64) -> Result<()> {
        let rules = &self.config.validation;

        for (label, name) in [("Recipe", recipe_name), ("Location", location_name)] {
            if name.trim().is_empty() {
                return Err(AnalysisError::InvalidInput(format!(
                    "{} name must not be empty",
                    label
                )));
            }
            if name.chars().count() > rules.max_name_length {
                return Err(AnalysisError::InvalidInput(format!(
                    "{} name longer than {} characters",
                    label, rules.max_name_length
                )));
            }
        }

        if !quantity.is_finite() || quantity < rules.min_quantity || quantity > rules.max_quantity {
            return Err(AnalysisError::InvalidInput(format!(
                "Target quantity must be between {} and {}, got {}",
                rules.min_quantity, rules.max_quantity, quantity
            )));
        }

        Ok(())
    }

    /// Analyze every recipe/quantity combination one after another
    pub async fn analyze_batch(
        &self,
        recipes: &[String],
        location_name: &str,
        quantities: &[f64],
        target_unit: Option<&str>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(recipes.len() * quantities.len());

        for recipe in recipes {
            for &quantity in quantities {
                let status = match self
                    .analyze(recipe, location_name, quantity, target_unit)
                    .await
                {
                    Ok(report) => BatchStatus::Completed {
                        can_produce: report.summary.can_produce,
                        issues: report.critical_issues.len(),
                    },
                    Err(e) => BatchStatus::Failed {
                        error: e.to_string(),
                    },
                };
                outcomes.push(BatchOutcome {
                    recipe: recipe.clone(),
                    quantity,
                    status,
                });
            }
        }

        outcomes
    }
}
