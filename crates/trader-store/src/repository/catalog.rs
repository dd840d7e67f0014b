//! # Catalog Repository
//!
//! Current unit prices and availability per purchasable. Removing an entry
//! or marking it unavailable makes the next refresh drop the line.

use std::collections::HashMap;
use std::sync::RwLock;

use trader_core::error::CoreResult;
use trader_core::ids::PurchasableRef;
use trader_core::ports::{PriceLookup, PurchasableForCart};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    purchasables: RwLock<HashMap<PurchasableRef, PurchasableForCart>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, purchasable: PurchasableForCart) -> StoreResult<()> {
        let mut purchasables = self
            .purchasables
            .write()
            .map_err(|_| StoreError::poisoned("catalog"))?;
        purchasables.insert(purchasable.purchasable_ref.clone(), purchasable);
        Ok(())
    }

    pub fn set_available(
        &self,
        purchasable_ref: &PurchasableRef,
        available: bool,
    ) -> StoreResult<()> {
        let mut purchasables = self
            .purchasables
            .write()
            .map_err(|_| StoreError::poisoned("catalog"))?;
        let purchasable = purchasables
            .get_mut(purchasable_ref)
            .ok_or_else(|| StoreError::not_found("purchasable", purchasable_ref.as_str()))?;
        purchasable.available = available;
        Ok(())
    }

    pub fn remove(&self, purchasable_ref: &PurchasableRef) -> StoreResult<()> {
        let mut purchasables = self
            .purchasables
            .write()
            .map_err(|_| StoreError::poisoned("catalog"))?;
        purchasables
            .remove(purchasable_ref)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("purchasable", purchasable_ref.as_str()))
    }

    pub fn reset(&self) {
        if let Ok(mut purchasables) = self.purchasables.write() {
            purchasables.clear();
        }
    }
}

impl PriceLookup for InMemoryCatalog {
    fn find(&self, purchasable_ref: &PurchasableRef) -> CoreResult<Option<PurchasableForCart>> {
        let purchasables = self
            .purchasables
            .read()
            .map_err(|_| StoreError::poisoned("catalog"))?;
        Ok(purchasables.get(purchasable_ref).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_core::ids::ProductId;
    use trader_core::{Money, Price, VatPercentage};

    fn shirt() -> PurchasableForCart {
        PurchasableForCart {
            purchasable_ref: PurchasableRef::new("shirt-m"),
            product_id: ProductId::new("shirt"),
            title: "Shirt (M)".to_string(),
            unit_price: Price::incl(Money::from_cents(2500), VatPercentage::from_whole(21)),
            sale_price: None,
            available: true,
        }
    }

    #[test]
    fn test_find_and_toggle_availability() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(shirt()).unwrap();
        let reference = PurchasableRef::new("shirt-m");

        assert!(catalog.find(&reference).unwrap().unwrap().available);
        catalog.set_available(&reference, false).unwrap();
        assert!(!catalog.find(&reference).unwrap().unwrap().available);
    }

    #[test]
    fn test_removed_purchasable_is_none() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(shirt()).unwrap();
        catalog.remove(&PurchasableRef::new("shirt-m")).unwrap();
        assert!(catalog.find(&PurchasableRef::new("shirt-m")).unwrap().is_none());
    }
}
