use serde::{Deserialize, Serialize};

/// Handle counts of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerCounts {
    pub total: usize,
    pub live: usize,
    pub dead: usize,
}
