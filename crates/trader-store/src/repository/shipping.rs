//! # Shipping Profile Repository
//!
//! A profile has a default tariff and optional per-country tariffs. Tariffs
//! are plain amounts; whether they include VAT is a store-wide setting.

use std::collections::HashMap;
use std::sync::RwLock;

use trader_core::error::CoreResult;
use trader_core::ids::{CountryId, ShippingProfileId};
use trader_core::ports::ShippingRateLookup;
use trader_core::{Address, Money, Price, VatPercentage};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingProfile {
    pub profile_id: ShippingProfileId,
    pub default_tariff: Money,
    pub country_tariffs: HashMap<CountryId, Money>,
}

impl ShippingProfile {
    pub fn new(profile_id: impl Into<ShippingProfileId>, default_tariff: Money) -> Self {
        ShippingProfile {
            profile_id: profile_id.into(),
            default_tariff,
            country_tariffs: HashMap::new(),
        }
    }

    pub fn with_country_tariff(mut self, country_id: impl Into<CountryId>, tariff: Money) -> Self {
        self.country_tariffs.insert(country_id.into(), tariff);
        self
    }

    fn tariff_for(&self, address: Option<&Address>) -> Money {
        address
            .and_then(|a| self.country_tariffs.get(&a.country_id))
            .copied()
            .unwrap_or(self.default_tariff)
    }
}

#[derive(Debug)]
pub struct InMemoryShippingProfiles {
    tariff_vat: VatPercentage,
    tariffs_include_vat: bool,
    profiles: RwLock<HashMap<ShippingProfileId, ShippingProfile>>,
}

impl InMemoryShippingProfiles {
    /// Tariffs are quoted at `tariff_vat`; the VAT rates adjuster re-rates
    /// them for the order afterwards.
    pub fn new(tariff_vat: VatPercentage, tariffs_include_vat: bool) -> Self {
        InMemoryShippingProfiles {
            tariff_vat,
            tariffs_include_vat,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub fn upsert(&self, profile: ShippingProfile) -> StoreResult<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| StoreError::poisoned("shipping_profiles"))?;
        profiles.insert(profile.profile_id.clone(), profile);
        Ok(())
    }

    pub fn remove(&self, profile_id: &ShippingProfileId) -> StoreResult<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| StoreError::poisoned("shipping_profiles"))?;
        profiles
            .remove(profile_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("shipping_profile", profile_id.as_str()))
    }

    pub fn reset(&self) {
        if let Ok(mut profiles) = self.profiles.write() {
            profiles.clear();
        }
    }
}

impl ShippingRateLookup for InMemoryShippingProfiles {
    fn rate(
        &self,
        profile_id: &ShippingProfileId,
        address: Option<&Address>,
    ) -> CoreResult<Option<Price>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| StoreError::poisoned("shipping_profiles"))?;
        Ok(profiles.get(profile_id).map(|profile| {
            Price::new(
                profile.tariff_for(address),
                self.tariff_vat,
                self.tariffs_include_vat,
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_tariff_overrides_default() {
        let profiles = InMemoryShippingProfiles::new(VatPercentage::from_whole(21), true);
        profiles
            .upsert(
                ShippingProfile::new("standard", Money::from_cents(500))
                    .with_country_tariff("NL", Money::from_cents(750)),
            )
            .unwrap();
        let id = ShippingProfileId::new("standard");

        let be = profiles.rate(&id, Some(&Address::in_country("BE"))).unwrap().unwrap();
        let nl = profiles.rate(&id, Some(&Address::in_country("NL"))).unwrap().unwrap();
        assert_eq!(be.money.cents(), 500);
        assert_eq!(nl.money.cents(), 750);
        assert!(nl.includes_vat);
    }

    #[test]
    fn test_unknown_profile_is_none() {
        let profiles = InMemoryShippingProfiles::new(VatPercentage::from_whole(21), false);
        assert!(profiles
            .rate(&ShippingProfileId::new("gone"), None)
            .unwrap()
            .is_none());
    }
}
