use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clubreg_core::{DomainError, DomainResult, ValueObject, date::calendar_date, end_of_day};

/// Which tier of a division's schedule a price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceTier {
    EarlyBird,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularTier {
    /// Price per participant.
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyBirdTier {
    /// Price per participant.
    pub price: Decimal,
    /// Last calendar day (inclusive) the early-bird price applies.
    #[serde(with = "calendar_date")]
    pub deadline: NaiveDate,
}

/// Price schedule for one competition division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionPricing {
    pub name: String,
    pub regular: RegularTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_bird: Option<EarlyBirdTier>,
}

impl ValueObject for DivisionPricing {}

/// A single active unit price and the tier it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub tier: PriceTier,
}

impl ValueObject for ResolvedPrice {}

impl DivisionPricing {
    pub fn new(name: impl Into<String>, regular_price: Decimal) -> Self {
        Self {
            name: name.into(),
            regular: RegularTier {
                price: regular_price,
            },
            early_bird: None,
        }
    }

    pub fn with_early_bird(mut self, price: Decimal, deadline: NaiveDate) -> Self {
        self.early_bird = Some(EarlyBirdTier { price, deadline });
        self
    }

    /// Resolve the active price at a local wall-clock instant.
    pub fn resolve(&self, reference: NaiveDateTime) -> ResolvedPrice {
        resolve_price(self, reference)
    }

    /// Resolve the active price on a calendar day.
    pub fn resolve_on(&self, date: NaiveDate) -> ResolvedPrice {
        resolve_price(self, date.and_time(NaiveTime::MIN))
    }

    /// Resolve the active price at an instant, read in the local time zone.
    pub fn resolve_local(&self, at: DateTime<Local>) -> ResolvedPrice {
        resolve_price(self, at.naive_local())
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("division name must not be blank"));
        }
        if self.regular.price.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "division {}: regular price must not be negative",
                self.name
            )));
        }
        if let Some(early) = &self.early_bird {
            if early.price.is_sign_negative() {
                return Err(DomainError::validation(format!(
                    "division {}: early-bird price must not be negative",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// The early-bird price applies through the end of its deadline day
/// (23:59:59.999 local); afterwards, or without an early-bird tier, the
/// regular price applies.
pub fn resolve_price(pricing: &DivisionPricing, reference: NaiveDateTime) -> ResolvedPrice {
    match &pricing.early_bird {
        Some(early) if reference <= end_of_day(early.deadline) => ResolvedPrice {
            price: early.price,
            tier: PriceTier::EarlyBird,
        },
        _ => ResolvedPrice {
            price: pricing.regular.price,
            tier: PriceTier::Regular,
        },
    }
}

/// An event's pricing, keyed by division name.
///
/// Serialised as a list of [`DivisionPricing`]; deserialisation goes through
/// [`PricingSchedule::new`] and fails on the same inputs it rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DivisionPricing>", into = "Vec<DivisionPricing>")]
pub struct PricingSchedule {
    divisions: BTreeMap<String, DivisionPricing>,
}

impl PricingSchedule {
    /// Build a schedule, rejecting negative prices and repeated division names.
    pub fn new(divisions: impl IntoIterator<Item = DivisionPricing>) -> DomainResult<Self> {
        let mut map = BTreeMap::new();
        for division in divisions {
            division.validate()?;
            if map.contains_key(&division.name) {
                return Err(DomainError::conflict(format!(
                    "division {} is priced more than once",
                    division.name
                )));
            }
            map.insert(division.name.clone(), division);
        }
        Ok(Self { divisions: map })
    }

    pub fn get(&self, division: &str) -> Option<&DivisionPricing> {
        self.divisions.get(division)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DivisionPricing> {
        self.divisions.values()
    }

    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }
}

impl TryFrom<Vec<DivisionPricing>> for PricingSchedule {
    type Error = DomainError;

    fn try_from(divisions: Vec<DivisionPricing>) -> DomainResult<Self> {
        Self::new(divisions)
    }
}

impl From<PricingSchedule> for Vec<DivisionPricing> {
    fn from(schedule: PricingSchedule) -> Self {
        schedule.divisions.into_values().collect()
    }
}
