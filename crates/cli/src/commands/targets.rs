//! Targets Command

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use docprobe_harness::{default_registry, TargetCategory, TargetDescriptor};

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Only list one category (doc or story)
    #[arg(long)]
    pub only: Option<TargetCategory>,
}

/// Registry entry as listed on the console
#[derive(Serialize)]
pub struct TargetDisplay {
    pub id: u32,
    pub category: TargetCategory,
    pub label: String,
    pub address: String,
    pub expects_optional_feature: bool,
}

impl From<&TargetDescriptor> for TargetDisplay {
    fn from(target: &TargetDescriptor) -> Self {
        Self {
            id: target.id,
            category: target.category,
            label: target.label.clone(),
            address: target.address.clone(),
            expects_optional_feature: target.expects_optional_feature,
        }
    }
}

impl TableDisplay for TargetDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Category", "Label", "Address", "Feature"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.category.to_string(),
            self.label.clone(),
            self.address.clone(),
            if self.expects_optional_feature { "yes" } else { "-" }.to_string(),
        ]
    }
}

pub fn list(only: Option<TargetCategory>) -> Vec<TargetDisplay> {
    let registry = default_registry();
    let registry = match only {
        Some(category) => registry.only(category),
        None => registry,
    };
    registry.iter().map(TargetDisplay::from).collect()
}

pub fn execute(args: TargetsArgs, format: OutputFormat) -> Result<()> {
    print_list(&list(args.only), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filters_and_renumbers() {
        let docs = list(Some(TargetCategory::Doc));
        assert!(!docs.is_empty());
        assert!(docs.iter().all(|t| t.category == TargetCategory::Doc));
        assert_eq!(docs[0].id, 1);
        assert_eq!(list(None).len(), default_registry().len());
    }
}
