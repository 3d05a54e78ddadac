//! Loyalty cards: per-cafe stamp progress, earned rewards, and the
//! "you got a reward" notice.
//!
//! DESIGN
//! ======
//! A `userPoints` document tracks one user's progress on one cafe's product.
//! [`RewardCard::compute`] joins it with the cafe and product documents and
//! derives the numbers the main screen shows.
//!
//! Reward notices must appear once per reward, across reloads. The tracker
//! raises a notice only when the received count grew since the last snapshot
//! it saw, and [`RewardsLedger`] remembers acknowledged rewards in durable
//! storage under `shown_rewards_<uid>`.

#[cfg(test)]
#[path = "rewards_test.rs"]
mod rewards_test;

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shell::platform::KeyValueStorage;

use crate::i18n;
use crate::services::{DocPath, DocumentStore, Query, Record, ServiceError, Snapshot};

pub const POINTS_COLLECTION: &str = "userPoints";
pub const CAFES_COLLECTION: &str = "cafes";
pub const PRODUCTS_COLLECTION: &str = "products";
pub const DEFAULT_SCALE_SIZE: u32 = 10;

/// A `userPoints` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsEntry {
    #[serde(default)]
    pub user_id: String,
    pub cafe_id: String,
    pub product_id: String,
    #[serde(default)]
    pub current_progress: Option<u32>,
    #[serde(default)]
    pub total_points: Option<u32>,
    #[serde(default)]
    pub rewards_received: Option<u32>,
    #[serde(default)]
    pub last_updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cafe {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Stamps per reward.
    #[serde(default)]
    pub scale_size: Option<u32>,
}

/// Everything the main screen shows for one points entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCard {
    pub record_id: String,
    pub cafe_id: String,
    pub cafe_name: String,
    pub product_name: String,
    pub scale_size: u32,
    pub current_progress: u32,
    pub total_points: u32,
    pub rewards_received: u32,
    pub total_possible_rewards: u32,
    pub last_updated: Option<i64>,
}

impl RewardCard {
    #[must_use]
    pub fn compute(record_id: &str, entry: &PointsEntry, cafe: &Cafe, product: &Product) -> Self {
        let scale_size = product.scale_size.filter(|&s| s > 0).unwrap_or(DEFAULT_SCALE_SIZE);
        let current_progress = entry.current_progress.unwrap_or(0);
        let total_points = entry.total_points.unwrap_or(0);
        Self {
            record_id: record_id.to_owned(),
            cafe_id: entry.cafe_id.clone(),
            cafe_name: cafe.name.clone(),
            product_name: product.name.clone(),
            scale_size,
            current_progress,
            total_points,
            rewards_received: entry.rewards_received.unwrap_or(current_progress / scale_size),
            total_possible_rewards: total_points / scale_size,
            last_updated: entry.last_updated,
        }
    }

    /// One flag per stamp slot; the first `current_progress` are filled.
    #[must_use]
    pub fn progress_dots(&self) -> Vec<bool> {
        (0..self.scale_size).map(|i| i < self.current_progress).collect()
    }

    #[must_use]
    pub fn shows_rewards_line(&self) -> bool {
        self.rewards_received > 0 || self.total_possible_rewards > 0
    }

    /// "Rewards received: N of M" in `lang`.
    #[must_use]
    pub fn rewards_line(&self, lang: &str) -> String {
        format!(
            "{}: {} {} {}",
            i18n::translate(lang, "main.rewards"),
            self.rewards_received,
            i18n::translate(lang, "main.of"),
            self.total_possible_rewards
        )
    }
}

/// Live query for one user's points entries.
#[must_use]
pub fn points_query(uid: &str) -> Query {
    Query::where_eq(POINTS_COLLECTION, "userId", uid)
}

/// Resolve every entry of a points snapshot into a card, in snapshot order.
///
/// Entries whose cafe or product document is missing are skipped, as are
/// entries that fail to decode or whose lookups fail; failures are logged.
pub async fn load_cards(docs: &dyn DocumentStore, snapshot: &Snapshot) -> Vec<RewardCard> {
    let mut cards = Vec::with_capacity(snapshot.records.len());
    for record in &snapshot.records {
        match load_card(docs, record).await {
            Ok(Some(card)) => cards.push(card),
            Ok(None) => log::debug!("points entry {} has no cafe or product", record.id),
            Err(err) => log::warn!("points entry {} skipped: {err}", record.id),
        }
    }
    cards
}

async fn load_card(docs: &dyn DocumentStore, record: &Record) -> Result<Option<RewardCard>, ServiceError> {
    let entry: PointsEntry = record.decode()?;
    let cafe = docs.get(&DocPath::new(CAFES_COLLECTION, entry.cafe_id.as_str())).await?;
    let product = docs.get(&DocPath::new(PRODUCTS_COLLECTION, entry.product_id.as_str())).await?;
    let (Some(cafe), Some(product)) = (cafe, product) else {
        return Ok(None);
    };
    let cafe: Cafe = decode(cafe)?;
    let product: Product = decode(product)?;
    Ok(Some(RewardCard::compute(&record.id, &entry, &cafe, &product)))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ServiceError> {
    Ok(serde_json::from_value(value)?)
}

/// Durable record of reward notices the user already dismissed, as a JSON
/// map of cafe id to reward timestamps.
#[derive(Clone)]
pub struct RewardsLedger {
    storage: Rc<dyn KeyValueStorage>,
    key: String,
}

impl RewardsLedger {
    pub fn new(storage: Rc<dyn KeyValueStorage>, uid: &str) -> Self {
        Self { storage, key: format!("shown_rewards_{uid}") }
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Everything recorded so far. Unreadable data counts as empty.
    #[must_use]
    pub fn all(&self) -> BTreeMap<String, Vec<i64>> {
        let Some(raw) = self.storage.get_item(&self.key) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!("ignoring unreadable {}: {err}", self.key);
            BTreeMap::new()
        })
    }

    #[must_use]
    pub fn is_shown(&self, cafe_id: &str, timestamp: i64) -> bool {
        self.all().get(cafe_id).is_some_and(|shown| shown.contains(&timestamp))
    }

    /// Record a reward as shown. Already-recorded rewards cause no write.
    pub fn mark_as_shown(&self, cafe_id: &str, timestamp: i64) {
        let mut shown = self.all();
        let entry = shown.entry(cafe_id.to_owned()).or_default();
        if entry.contains(&timestamp) {
            return;
        }
        entry.push(timestamp);
        match serde_json::to_string(&shown) {
            Ok(json) => self.storage.set_item(&self.key, &json),
            Err(err) => log::error!("failed to encode {}: {err}", self.key),
        }
    }

    pub fn clear(&self) {
        self.storage.remove_item(&self.key);
    }
}

/// A newly earned reward the user has not seen yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardNotice {
    pub cafe_id: String,
    pub cafe_name: String,
    pub timestamp: i64,
}

impl RewardNotice {
    #[must_use]
    pub fn message(&self, lang: &str) -> String {
        i18n::translate_with(lang, "main.rewardReceived", &[("cafe", &self.cafe_name)])
    }
}

/// Watches successive snapshots for reward counts that went up.
pub struct RewardTracker {
    previous: HashMap<String, u32>,
    ledger: RewardsLedger,
}

impl RewardTracker {
    #[must_use]
    pub fn new(ledger: RewardsLedger) -> Self {
        Self { previous: HashMap::new(), ledger }
    }

    /// Feed one card from the latest snapshot. Returns a notice when its
    /// received count grew, it carries a timestamp, and the ledger has not
    /// recorded that reward.
    pub fn observe(&mut self, card: &RewardCard) -> Option<RewardNotice> {
        let previous = self.previous.insert(card.record_id.clone(), card.rewards_received).unwrap_or(0);
        if card.rewards_received <= previous {
            return None;
        }
        let timestamp = card.last_updated.filter(|&ts| ts != 0)?;
        if self.ledger.is_shown(&card.cafe_id, timestamp) {
            return None;
        }
        Some(RewardNotice { cafe_id: card.cafe_id.clone(), cafe_name: card.cafe_name.clone(), timestamp })
    }

    /// The user dismissed the notice; never raise it again.
    pub fn acknowledge(&self, notice: &RewardNotice) {
        self.ledger.mark_as_shown(&notice.cafe_id, notice.timestamp);
    }
}
