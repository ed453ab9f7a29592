//! Wire helpers shared by the backend records

use serde::{Deserialize, Deserializer};

/// A string field the backend may send as `null`; null reads as empty
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
