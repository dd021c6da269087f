// File: teamboard-common/src/models/snapshot.rs

use serde::{Deserialize, Serialize};

use crate::models::account::AccountRecord;

/// Complete published state at one point in time.
///
/// `last_update` is epoch milliseconds; `0` means nothing has been published yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub team: Vec<AccountRecord>,
    pub bots: Vec<AccountRecord>,
    pub last_update: i64,
}

impl Snapshot {
    pub fn is_published(&self) -> bool {
        self.last_update != 0
    }
}
