//! Target registry: the fixed, ordered set of pages a run probes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a target is a narrative page or an interactive example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCategory {
    Doc,
    Story,
}

impl TargetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCategory::Doc => "doc",
            TargetCategory::Story => "story",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "doc" | "docs" => Ok(TargetCategory::Doc),
            "story" | "stories" => Ok(TargetCategory::Story),
            other => Err(format!("unknown category '{}' (expected doc or story)", other)),
        }
    }
}

/// A single page to probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// 1-based position in the registry
    pub id: u32,

    /// Path and query appended to the base URL
    pub address: String,

    /// Human-readable name for reporting
    pub label: String,

    pub category: TargetCategory,

    /// Whether the page should carry the optional-feature markup.
    /// Only meaningful for stories.
    pub expects_optional_feature: bool,
}

/// Ordered, immutable list of targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetRegistry {
    targets: Vec<TargetDescriptor>,
}

impl TargetRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetDescriptor> {
        self.targets.iter()
    }

    /// Number of registered targets (the run's planned total)
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// New registry holding only one category, with ids re-assigned in order
    pub fn only(&self, category: TargetCategory) -> TargetRegistry {
        let mut builder = TargetRegistry::builder();
        for target in self.targets.iter().filter(|t| t.category == category) {
            builder = builder.push(
                target.address.clone(),
                target.label.clone(),
                target.category,
                target.expects_optional_feature,
            );
        }
        builder.build()
    }
}

impl<'a> IntoIterator for &'a TargetRegistry {
    type Item = &'a TargetDescriptor;
    type IntoIter = std::slice::Iter<'a, TargetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Builds a [`TargetRegistry`], assigning sequential ids as entries are added
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    targets: Vec<TargetDescriptor>,
}

impl RegistryBuilder {
    pub fn push(
        mut self,
        address: impl Into<String>,
        label: impl Into<String>,
        category: TargetCategory,
        expects_optional_feature: bool,
    ) -> Self {
        let id = self.targets.len() as u32 + 1;
        self.targets.push(TargetDescriptor {
            id,
            address: address.into(),
            label: label.into(),
            category,
            expects_optional_feature,
        });
        self
    }

    /// Register a documentation page
    pub fn doc(self, address: impl Into<String>, label: impl Into<String>) -> Self {
        self.push(address, label, TargetCategory::Doc, false)
    }

    /// Register an interactive example expected to carry the optional feature
    pub fn story(self, address: impl Into<String>, label: impl Into<String>) -> Self {
        self.push(address, label, TargetCategory::Story, true)
    }

    pub fn build(self) -> TargetRegistry {
        TargetRegistry {
            targets: self.targets,
        }
    }
}

fn docs_page(id: &str) -> String {
    format!("/?path=/docs/{}--docs", id)
}

fn story_page(id: &str) -> String {
    format!("/?path=/story/{}", id)
}

/// The catalog of known documentation pages and stories
pub fn default_registry() -> TargetRegistry {
    let mut b = TargetRegistry::builder()
        // Introduction and getting started
        .doc(docs_page("introduction"), "Introduction")
        .doc(docs_page("getting-started"), "Getting Started")
        .story(story_page("stories-guides-getting-started--overview"), "Getting Started Overview")
        // Component selection
        .story(
            story_page("cin7-dsl-introduction-component-selection--navigation-selection"),
            "Navigation Selection",
        )
        .story(story_page("stories-guides-component-selection--overview"), "Component Selection Overview");

    let charts: [(&str, &str, &[(&str, &str)]); 3] = [
        (
            "linechart",
            "LineChart",
            &[
                ("default", "Default"),
                ("multi-series", "Multi Series"),
                ("with-zoom", "With Zoom"),
                ("real-time", "Real Time"),
                ("styled", "Styled"),
            ],
        ),
        (
            "barchart",
            "BarChart",
            &[
                ("default", "Default"),
                ("stacked", "Stacked"),
                ("grouped", "Grouped"),
                ("horizontal", "Horizontal"),
                ("with-labels", "With Labels"),
                ("custom-colors", "Custom Colors"),
            ],
        ),
        (
            "piechart",
            "PieChart",
            &[
                ("default", "Default"),
                ("with-legend", "With Legend"),
                ("donut", "Donut"),
                ("3d", "3D"),
                ("exploded", "Exploded"),
                ("custom-labels", "Custom Labels"),
                ("gradient-fill", "Gradient Fill"),
                ("interactive", "Interactive"),
            ],
        ),
    ];
    for (slug, name, variants) in charts {
        for (variant, variant_name) in variants {
            b = b.story(
                story_page(&format!("cin7-dsl-charts-{}--{}", slug, variant)),
                format!("{} - {}", name, variant_name),
            );
        }
    }

    for (variant, variant_name) in [
        ("default", "Default"),
        ("interactive", "Interactive"),
        ("with-navigation", "With Navigation"),
        ("admin-panel", "Admin Panel"),
        ("page-with-tabs", "Page With Tabs"),
    ] {
        b = b.story(
            story_page(&format!("cin7-dsl-navigation-breadcrumbs--{}", variant)),
            format!("Breadcrumbs - {}", variant_name),
        );
    }

    b = b
        .story(story_page("cin7-dsl-theming-theme-playground--playground"), "Theme Playground")
        .doc(docs_page("theming"), "Theming Documentation");

    for (variant, variant_name) in [
        ("overview", "Overview"),
        ("form-patterns", "Form Patterns"),
        ("dashboard-patterns", "Dashboard Patterns"),
        ("table-patterns", "Table Patterns"),
        ("modal-patterns", "Modal Patterns"),
        ("loading-patterns", "Loading Patterns"),
    ] {
        b = b.story(
            story_page(&format!("cin7-dsl-ui-patterns-usage-patterns--{}", variant)),
            format!("Usage Patterns - {}", variant_name),
        );
    }
    b = b.doc(docs_page("usage-patterns"), "Usage Patterns Documentation");

    for (variant, variant_name) in [
        ("overview", "Overview"),
        ("react-integration", "React"),
        ("extjs-integration", "ExtJS"),
        ("vanilla-js-integration", "Vanilla JS"),
    ] {
        b = b.story(
            story_page(&format!("stories-guides-integration-examples--{}", variant)),
            format!("Integration Examples - {}", variant_name),
        );
    }
    b = b.doc(docs_page("integration"), "Integration Documentation");

    for (variant, variant_name) in [
        ("overview", "Overview"),
        ("unit-tests", "Unit Tests"),
        ("integration-tests", "Integration Tests"),
        ("e2e-tests", "E2E Tests"),
    ] {
        b = b.story(
            story_page(&format!("stories-guides-testing-examples--{}", variant)),
            format!("Testing Examples - {}", variant_name),
        );
    }
    b = b.doc(docs_page("testing"), "Testing Documentation");

    // Basic components
    for (id, label) in [
        ("components-button--primary", "Button - Primary"),
        ("components-button--secondary", "Button - Secondary"),
        ("components-card--default", "Card - Default"),
        ("components-text-field--default", "Text Field - Default"),
        ("components-badge--default", "Badge - Default"),
        ("components-data-table--default", "Data Table - Default"),
        ("components-grid--responsive", "Grid - Responsive"),
        ("components-tabs--default", "Tabs - Default"),
        ("components-modal--default", "Modal - Default"),
    ] {
        b = b.story(story_page(id), label);
    }

    b.build()
}
