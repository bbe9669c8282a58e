// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic placeholder records used when every upstream source failed.

use dramtag_core::types::{CanonicalRecord, Provenance, detail_url};

/// Note attached to every fallback record.
pub const FALLBACK_NOTE: &str = "Data from fallback source (catalogue unavailable)";

/// One canned bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub strength: &'static str,
    pub age: &'static str,
}

const BUILTIN: [CatalogEntry; 8] = [
    CatalogEntry {
        name: "Macallan 18 Year Old",
        category: "The Macallan",
        strength: "43%",
        age: "18 years",
    },
    CatalogEntry {
        name: "Glenfiddich 12 Year Old",
        category: "Glenfiddich",
        strength: "40%",
        age: "12 years",
    },
    CatalogEntry {
        name: "Laphroaig 10 Year Old",
        category: "Laphroaig",
        strength: "43%",
        age: "10 years",
    },
    CatalogEntry {
        name: "Ardbeg Uigeadail",
        category: "Ardbeg",
        strength: "54.2%",
        age: "No Age Statement",
    },
    CatalogEntry {
        name: "Glenlivet 15 Year Old",
        category: "The Glenlivet",
        strength: "40%",
        age: "15 years",
    },
    CatalogEntry {
        name: "Lagavulin 16 Year Old",
        category: "Lagavulin",
        strength: "43%",
        age: "16 years",
    },
    CatalogEntry {
        name: "Balvenie 12 Year Old",
        category: "The Balvenie",
        strength: "40%",
        age: "12 years",
    },
    CatalogEntry {
        name: "Highland Park 18 Year Old",
        category: "Highland Park",
        strength: "43%",
        age: "18 years",
    },
];

/// Fixed, non-empty table of canned bottles indexed by `id mod len`.
#[derive(Debug, Clone, Copy)]
pub struct FallbackCatalog {
    entries: &'static [CatalogEntry],
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FallbackCatalog {
    pub const fn builtin() -> Self {
        Self { entries: &BUILTIN }
    }

    /// Custom table. `None` when `entries` is empty.
    pub fn new(entries: &'static [CatalogEntry]) -> Option<Self> {
        (!entries.is_empty()).then_some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table index for `id`. Total over all of `i64`, negative ids included.
    pub fn index_for(&self, id: i64) -> usize {
        // The table length always fits in i64.
        id.rem_euclid(self.entries.len() as i64) as usize
    }

    pub fn select(&self, id: i64) -> &CatalogEntry {
        &self.entries[self.index_for(id)]
    }

    /// Full placeholder record for `id`.
    pub fn record(&self, id: i64, base_url: &str) -> CanonicalRecord {
        let entry = self.select(id);
        CanonicalRecord {
            id,
            name: entry.name.to_owned(),
            category: entry.category.to_owned(),
            strength: Some(entry.strength.to_owned()),
            age: Some(entry.age.to_owned()),
            region: None,
            note: Some(FALLBACK_NOTE.to_owned()),
            image_url: None,
            source_url: detail_url(base_url, id),
            provenance: Provenance::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.whiskybase.com";

    #[test]
    fn known_id_maps_to_glenfiddich() {
        let record = FallbackCatalog::builtin().record(12345, BASE);
        assert_eq!(record.name, "Glenfiddich 12 Year Old");
        assert_eq!(record.category, "Glenfiddich");
        assert_eq!(record.strength.as_deref(), Some("40%"));
        assert_eq!(record.age.as_deref(), Some("12 years"));
        assert_eq!(record.provenance, Provenance::Fallback);
        assert_eq!(record.source_url, "https://www.whiskybase.com/whisky/12345");
    }

    #[test]
    fn periodic_with_table_length() {
        let catalog = FallbackCatalog::builtin();
        for id in [-17_i64, -1, 0, 3, 999, 1 << 40] {
            assert_eq!(catalog.select(id), catalog.select(id + 8));
        }
    }

    #[test]
    fn extreme_ids_are_total() {
        let catalog = FallbackCatalog::builtin();
        assert_eq!(catalog.index_for(-1), 7);
        assert!(catalog.index_for(i64::MIN) < 8);
        assert!(catalog.index_for(i64::MAX) < 8);
        assert_eq!(catalog.record(0, BASE).name, "Macallan 18 Year Old");
    }

    #[test]
    fn empty_custom_table_is_refused() {
        assert!(FallbackCatalog::new(&[]).is_none());
        assert_eq!(FallbackCatalog::new(&BUILTIN[..2]).map(|c| c.len()), Some(2));
    }
}
