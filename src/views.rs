use crate::data::columns::{BODY_STYLE, BRAND, COUNT, DEALER_REGION, PRICE, PRICE_CATEGORY};
use crate::data::error::MissingColumnError;
use crate::data::recipe::{self, Recipe};
use crate::data::table::Table;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Univariate,
    Bivariate,
    Explorer,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Overview,
        Page::Univariate,
        Page::Bivariate,
        Page::Explorer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "📌 Data Overview",
            Page::Univariate => "📊 Univariate Analysis (Histograms)",
            Page::Bivariate => "📈 Bivariate Analysis",
            Page::Explorer => "🧾 Data Explorer (Filters)",
        }
    }
}

// ---------------------------------------------------------------------------
// View specs
// ---------------------------------------------------------------------------

/// How a recipe result is drawn. Column names refer to the result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per row; `color` optionally names the series column.
    Bar {
        x: String,
        y: String,
        color: Option<String>,
    },
    /// Cell grid coloured by `z`.
    Heatmap { x: String, y: String, z: String },
    /// Share of the whole per `names` value.
    Pie { names: String, values: String },
}

/// A chart on the bivariate page: what to compute and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub caption: Option<&'static str>,
    pub chart: ChartKind,
    pub recipe: Recipe,
}

/// Result of evaluating one view against the current table.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Ready(Table),
    /// Required columns are absent; shown as a warning instead of a chart.
    Missing(MissingColumnError),
}

/// The registry of chart views, in display order.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: Vec<ViewSpec>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        let bar = |x: &str, y: &str, color: Option<&str>| ChartKind::Bar {
            x: x.to_string(),
            y: y.to_string(),
            color: color.map(String::from),
        };
        let pie = |names: &str| ChartKind::Pie {
            names: names.to_string(),
            values: COUNT.to_string(),
        };

        ViewRegistry {
            views: vec![
                ViewSpec {
                    key: "top_brands",
                    title: "Top 10 Most Expensive Brands",
                    caption: None,
                    chart: bar(BRAND, PRICE, None),
                    recipe: recipe::top_brands_by_mean_price(),
                },
                ViewSpec {
                    key: "bottom_brands",
                    title: "Bottom 10 Most Expensive Brands",
                    caption: None,
                    chart: bar(BRAND, PRICE, None),
                    recipe: recipe::bottom_brands_by_mean_price(),
                },
                ViewSpec {
                    key: "brand_region_heatmap",
                    title: "Brand vs Dealer Region (Count Heatmap)",
                    caption: None,
                    chart: ChartKind::Heatmap {
                        x: BRAND.to_string(),
                        y: DEALER_REGION.to_string(),
                        z: COUNT.to_string(),
                    },
                    recipe: recipe::region_brand_counts(),
                },
                ViewSpec {
                    key: "price_category",
                    title: "Price Category",
                    caption: None,
                    chart: pie(PRICE_CATEGORY),
                    recipe: recipe::price_category_distribution(),
                },
                ViewSpec {
                    key: "top_brand_per_region",
                    title: "Top Selling Brand in Each Region",
                    caption: None,
                    chart: bar(DEALER_REGION, COUNT, Some(BRAND)),
                    recipe: recipe::top_brand_per_region(),
                },
                ViewSpec {
                    key: "body_style",
                    title: "Body Style Distribution",
                    caption: Some(
                        "This chart shows the market share of each body style based on sales volume.",
                    ),
                    chart: pie(BODY_STYLE),
                    recipe: recipe::body_style_distribution(),
                },
                ViewSpec {
                    key: "top_body_style_per_brand",
                    title: "Top Selling Body Style in Top 10 Brands",
                    caption: Some("Showing only the top 10 brands by total sales to reduce visual clutter."),
                    chart: bar(BRAND, COUNT, Some(BODY_STYLE)),
                    recipe: recipe::top_body_style_per_top_brand(),
                },
            ],
        }
    }
}

impl ViewRegistry {
    pub fn views(&self) -> &[ViewSpec] {
        &self.views
    }

    pub fn get(&self, key: &str) -> Option<&ViewSpec> {
        self.views.iter().find(|v| v.key == key)
    }

    /// Run every view against `table`. A view whose columns are missing
    /// degrades to [`ViewOutcome::Missing`]; the others are unaffected.
    pub fn evaluate<'a>(&'a self, table: &Table) -> Vec<(&'a ViewSpec, ViewOutcome)> {
        self.views
            .iter()
            .map(|view| {
                let outcome = match view.recipe.run(table) {
                    Ok(result) => ViewOutcome::Ready(result),
                    Err(missing) => {
                        log::warn!("view '{}' skipped: {missing}", view.key);
                        ViewOutcome::Missing(missing)
                    }
                };
                (view, outcome)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::CAR_ID;
    use crate::data::model::CellValue;

    #[test]
    fn keys_are_unique_and_resolvable() {
        let registry = ViewRegistry::default();
        for view in registry.views() {
            assert_eq!(registry.get(view.key), Some(view));
        }
        assert_eq!(registry.views().len(), 7);
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn chart_columns_exist_in_recipe_output() {
        for view in ViewRegistry::default().views() {
            let out = view.recipe.output_columns();
            let wanted: Vec<&String> = match &view.chart {
                ChartKind::Bar { x, y, color } => {
                    let mut v = vec![x, y];
                    v.extend(color.as_ref());
                    v
                }
                ChartKind::Heatmap { x, y, z } => vec![x, y, z],
                ChartKind::Pie { names, values } => vec![names, values],
            };
            for col in wanted {
                assert!(out.contains(col), "{}: {col} not in {out:?}", view.key);
            }
        }
    }

    #[test]
    fn missing_columns_degrade_only_affected_views() {
        // Brand and Price only: the two mean-price charts still render.
        let t = Table::new(
            vec![BRAND.into(), PRICE.into()],
            vec![
                vec!["Ford".into(), CellValue::Integer(20000)],
                vec!["Kia".into(), CellValue::Integer(15000)],
            ],
        );
        let registry = ViewRegistry::default();
        let outcomes = registry.evaluate(&t);
        let ready: Vec<&str> = outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ViewOutcome::Ready(_)))
            .map(|(v, _)| v.key)
            .collect();
        assert_eq!(ready, vec!["top_brands", "bottom_brands"]);

        let (_, heatmap) = &outcomes[2];
        match heatmap {
            ViewOutcome::Missing(err) => {
                assert_eq!(err.columns, vec![DEALER_REGION.to_string(), CAR_ID.to_string()])
            }
            other => panic!("expected a warning, got {other:?}"),
        }
    }
}
