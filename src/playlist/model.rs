use serde::{Deserialize, Serialize};

/// One playable audio item as the server reports it.
///
/// Identity is `id`; tracks are never edited in place, only reordered or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: f64,
}
