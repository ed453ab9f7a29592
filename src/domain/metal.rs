//! Metal lookup entity
//!
//! Read-only here: only used to label a design's preferred metal.

use serde::{Deserialize, Serialize};

use super::wire::null_as_empty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metal {
    pub metal_id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metal_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metal_purity: String,
}

/// Display label for a preferred metal id
pub fn metal_label(metals: &[Metal], metal_id: Option<u64>) -> String {
    let Some(metal_id) = metal_id else {
        return "Not specified".to_string();
    };
    metals
        .iter()
        .find(|metal| metal.metal_id == metal_id)
        .map(|metal| format!("{} - {}", metal.metal_type, metal.metal_purity))
        .unwrap_or_else(|| "Unknown metal".to_string())
}
