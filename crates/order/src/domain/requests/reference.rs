use serde::{Deserialize, Serialize};

/// A related entity given either as a bare id or as an embedded object.
///
/// Callers may send `3` or `{ "id": 3, "table_number": "T3" }`; only the id
/// survives past the request boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EntityRef {
    Id(i32),
    Object { id: i32 },
}

impl EntityRef {
    pub fn id(&self) -> i32 {
        match self {
            EntityRef::Id(id) | EntityRef::Object { id } => *id,
        }
    }
}

impl From<i32> for EntityRef {
    fn from(id: i32) -> Self {
        EntityRef::Id(id)
    }
}

/// Collapses references into distinct ids, keeping first-seen order.
pub fn normalize_refs(refs: &[EntityRef]) -> Vec<i32> {
    let mut ids: Vec<i32> = Vec::with_capacity(refs.len());
    for id in refs.iter().map(EntityRef::id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
