use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Raw capacity value the remote API uses for "no limit".
pub const UNLIMITED_CAPACITY: u32 = 999;

const AFTERNOON_CUTOFF_HOUR: u32 = 13;

/// A slot's arrival time. Always rendered zero-padded as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotLabel(NaiveTime);

impl SlotLabel {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn period(&self) -> Period {
        if self.0.hour() < AFTERNOON_CUTOFF_HOUR {
            Period::Morning
        } else {
            Period::Afternoon
        }
    }
}

impl FromStr for SlotLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
        if !well_formed {
            return Err(AppError::InvalidSlotLabel(s.to_string()));
        }

        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| AppError::InvalidSlotLabel(s.to_string()))
    }
}

impl TryFrom<String> for SlotLabel {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotLabel> for String {
    fn from(label: SlotLabel) -> Self {
        label.to_string()
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Morning,
    Afternoon,
}

impl Period {
    /// Key used by the remote read model.
    pub fn wire_key(&self) -> &'static str {
        match self {
            Period::Morning => "matin",
            Period::Afternoon => "apres-midi",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Capacity {
    Limited(u32),
    Unlimited,
}

impl Capacity {
    pub fn raw(&self) -> u32 {
        match self {
            Capacity::Limited(n) => *n,
            Capacity::Unlimited => UNLIMITED_CAPACITY,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Capacity::Unlimited)
    }
}

impl From<u32> for Capacity {
    fn from(raw: u32) -> Self {
        if raw == UNLIMITED_CAPACITY {
            Capacity::Unlimited
        } else {
            Capacity::Limited(raw)
        }
    }
}

impl From<Capacity> for u32 {
    fn from(capacity: Capacity) -> Self {
        capacity.raw()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Seats(u32),
    Unlimited,
}

impl Remaining {
    pub(crate) fn of(capacity: Capacity, persons: u32) -> Self {
        match capacity {
            Capacity::Limited(cap) => Remaining::Seats(cap.saturating_sub(persons)),
            Capacity::Unlimited => Remaining::Unlimited,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Seats(n) => write!(f, "{}", n),
            Remaining::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBlock {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub label: SlotLabel,
    pub capacity: Capacity,
    pub registered_agents: u32,
    pub registered_persons: u32,
    pub block: Option<SlotBlock>,
    pub restricted: bool,
}

impl SlotSnapshot {
    pub fn new(label: SlotLabel, capacity: Capacity) -> Self {
        Self {
            label,
            capacity,
            registered_agents: 0,
            registered_persons: 0,
            block: None,
            restricted: false,
        }
    }

    /// Sets both counters, keeping persons >= agents.
    pub fn with_occupancy(mut self, agents: u32, persons: u32) -> Self {
        self.registered_agents = agents;
        self.registered_persons = persons.max(agents);
        self
    }

    pub fn blocked(mut self, reason: Option<&str>) -> Self {
        self.block = Some(SlotBlock { reason: reason.map(str::to_string) });
        self
    }

    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    pub fn period(&self) -> Period {
        self.label.period()
    }

    pub fn remaining(&self) -> Remaining {
        Remaining::of(self.capacity, self.registered_persons)
    }

    pub fn is_full(&self) -> bool {
        match self.capacity {
            Capacity::Limited(cap) => self.registered_persons >= cap,
            Capacity::Unlimited => false,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.block.is_some()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.block.as_ref().and_then(|b| b.reason.as_deref())
    }
}

/// Server-reported figures for one slot right after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPatch {
    pub label: SlotLabel,
    pub registered_persons: u32,
    pub capacity: Capacity,
}

/// The read model: every known slot keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotBoard {
    slots: BTreeMap<SlotLabel, SlotSnapshot>,
}

impl SlotBoard {
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = SlotSnapshot>) -> Self {
        Self {
            slots: snapshots.into_iter().map(|s| (s.label, s)).collect(),
        }
    }

    pub fn get(&self, label: SlotLabel) -> Option<&SlotSnapshot> {
        self.slots.get(&label)
    }

    pub fn contains(&self, label: SlotLabel) -> bool {
        self.slots.contains_key(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.slots.values()
    }

    pub fn in_period(&self, period: Period) -> impl Iterator<Item = &SlotSnapshot> {
        self.slots.values().filter(move |s| s.period() == period)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total_persons(&self) -> u32 {
        self.slots.values().map(|s| s.registered_persons).sum()
    }

    /// Optimistically applies the figures returned by a mutation.
    /// Returns false if the slot is unknown locally.
    pub fn apply_patch(&mut self, patch: &SlotPatch, added_agents: u32) -> bool {
        let Some(slot) = self.slots.get_mut(&patch.label) else {
            return false;
        };
        slot.capacity = patch.capacity;
        slot.registered_agents = slot.registered_agents.saturating_add(added_agents);
        slot.registered_persons = patch.registered_persons.max(slot.registered_agents);
        true
    }

    /// Optimistically removes one registration of `persons` people from a slot.
    pub fn release(&mut self, label: SlotLabel, persons: u32) {
        if let Some(slot) = self.slots.get_mut(&label) {
            slot.registered_agents = slot.registered_agents.saturating_sub(1);
            slot.registered_persons = slot
                .registered_persons
                .saturating_sub(persons)
                .max(slot.registered_agents);
        }
    }
}
