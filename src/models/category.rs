use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
}

/// Category metadata. Fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_from_root: Vec<CategorySummary>,
    #[serde(default)]
    pub children_categories: Vec<CategorySummary>,
    #[serde(default)]
    pub total_items_in_this_category: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
