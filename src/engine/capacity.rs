// ABOUTME: Equipment unit accounting: requested units per item versus remaining stock
// ABOUTME: Each occurrence of an equipment id in a request reserves one unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// An equipment item that cannot cover the requested units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    /// Item lacking stock
    pub equipment_id: Uuid,
    /// Units this request asks for
    pub requested: u32,
    /// Units already held by overlapping confirmed bookings
    pub reserved: u32,
    /// Capacity ceiling
    pub total_stock: u32,
}

impl Shortfall {
    /// Units still free for the window
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total_stock.saturating_sub(self.reserved)
    }
}

/// Collapse a list of equipment ids into units per item, ordered by id
#[must_use]
pub fn count_units(equipment_ids: &[Uuid]) -> BTreeMap<Uuid, u32> {
    let mut units = BTreeMap::new();
    for id in equipment_ids {
        *units.entry(*id).or_insert(0) += 1;
    }
    units
}

/// First item (by id) whose reserved plus requested units would exceed its stock
#[must_use]
pub fn find_shortfall(
    requested: &BTreeMap<Uuid, u32>,
    total_stock: &HashMap<Uuid, u32>,
    reserved: &HashMap<Uuid, u32>,
) -> Option<Shortfall> {
    requested.iter().find_map(|(id, units)| {
        let stock = total_stock.get(id).copied().unwrap_or(0);
        let held = reserved.get(id).copied().unwrap_or(0);
        (held.saturating_add(*units) > stock).then_some(Shortfall {
            equipment_id: *id,
            requested: *units,
            reserved: held,
            total_stock: stock,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_count_as_units() {
        let racket = Uuid::new_v4();
        let shoes = Uuid::new_v4();
        let units = count_units(&[racket, shoes, racket]);
        assert_eq!(units.get(&racket), Some(&2));
        assert_eq!(units.get(&shoes), Some(&1));
    }

    #[test]
    fn test_shortfall_when_stock_is_held() {
        let racket = Uuid::new_v4();
        let requested = count_units(&[racket, racket]);
        let stock = HashMap::from([(racket, 3)]);

        assert!(find_shortfall(&requested, &stock, &HashMap::from([(racket, 1)])).is_none());

        let shortfall =
            find_shortfall(&requested, &stock, &HashMap::from([(racket, 2)])).unwrap();
        assert_eq!(shortfall.remaining(), 1);
        assert_eq!(shortfall.requested, 2);
    }

    #[test]
    fn test_zero_stock_item_is_always_short() {
        let item = Uuid::new_v4();
        let shortfall =
            find_shortfall(&count_units(&[item]), &HashMap::from([(item, 0)]), &HashMap::new());
        assert!(shortfall.is_some());
    }
}
