//! Product metadata index for resolution locality
//!
//! Resolution strategies need to know which products a clause belongs
//! to, which dossier those products sit in and which other products
//! share a substance. This context is built once per run from the
//! snapshot metadata and the deduplicated clause store.

use crate::canonical::{ClauseStore, fold_text};
use crate::models::{Fingerprint, ProductId, Snapshot};
use rustc_hash::FxHashMap;

/// Last-seen metadata of one product
#[derive(Debug, Default, Clone)]
pub struct ProductInfo {
    /// Dossier identifier, when the registry publishes one
    pub dossier: Option<String>,
    /// Brand name
    pub brand: Option<String>,
    /// Active substance
    pub substance: Option<String>,
}

/// Metadata index backing the locality tie-breaks
#[derive(Debug, Default)]
pub struct ResolutionContext {
    products: FxHashMap<ProductId, ProductInfo>,
    families: FxHashMap<String, Vec<ProductId>>,
    clause_products: FxHashMap<Fingerprint, Vec<ProductId>>,
}

impl ResolutionContext {
    /// Build the index from the run's snapshots and clause store
    #[must_use]
    pub fn build(snapshots: &[Snapshot], clauses: &ClauseStore) -> Self {
        let mut products: FxHashMap<ProductId, ProductInfo> = FxHashMap::default();
        for snapshot in snapshots {
            for entry in &snapshot.entries {
                let info = products.entry(entry.product_id.clone()).or_default();
                // later snapshots win, missing fields never erase known ones
                if entry.dossier.is_some() {
                    info.dossier.clone_from(&entry.dossier);
                }
                if entry.brand.is_some() {
                    info.brand.clone_from(&entry.brand);
                }
                if entry.substance.is_some() {
                    info.substance.clone_from(&entry.substance);
                }
            }
        }

        let mut families: FxHashMap<String, Vec<ProductId>> = FxHashMap::default();
        for (product, info) in &products {
            if let Some(substance) = &info.substance {
                families
                    .entry(fold_text(substance))
                    .or_default()
                    .push(product.clone());
            }
        }
        for members in families.values_mut() {
            members.sort();
        }

        let mut clause_products: FxHashMap<Fingerprint, Vec<ProductId>> = FxHashMap::default();
        for clause in clauses.iter() {
            let mut owners: Vec<ProductId> = clause.products().into_iter().cloned().collect();
            owners.sort();
            clause_products.insert(clause.fingerprint.clone(), owners);
        }

        Self {
            products,
            families,
            clause_products,
        }
    }

    /// Metadata of one product
    #[must_use]
    pub fn info(&self, product: &ProductId) -> Option<&ProductInfo> {
        self.products.get(product)
    }

    /// Dossier of one product, when known
    #[must_use]
    pub fn dossier_of(&self, product: &ProductId) -> Option<&str> {
        self.products.get(product)?.dossier.as_deref()
    }

    /// Products whose snapshots carried a clause
    #[must_use]
    pub fn products_of_clause(&self, clause: &Fingerprint) -> &[ProductId] {
        self.clause_products
            .get(clause)
            .map_or(&[], Vec::as_slice)
    }

    /// The single product of a clause, when it has exactly one owner
    #[must_use]
    pub fn sole_product(&self, clause: &Fingerprint) -> Option<&ProductId> {
        match self.products_of_clause(clause) {
            [product] => Some(product),
            _ => None,
        }
    }

    /// The dossier shared by all of a clause's products, when unique
    #[must_use]
    pub fn clause_dossier(&self, clause: &Fingerprint) -> Option<&str> {
        let mut dossiers = self
            .products_of_clause(clause)
            .iter()
            .filter_map(|p| self.dossier_of(p));
        let first = dossiers.next()?;
        if dossiers.all(|d| d == first) {
            Some(first)
        } else {
            None
        }
    }

    /// Products sharing a substance with the given product, itself excluded
    #[must_use]
    pub fn family_peers(&self, product: &ProductId) -> Vec<&ProductId> {
        let Some(substance) = self
            .products
            .get(product)
            .and_then(|i| i.substance.as_deref())
        else {
            return Vec::new();
        };
        self.families
            .get(&fold_text(substance))
            .map(|members| members.iter().filter(|m| *m != product).collect())
            .unwrap_or_default()
    }

    /// Whether two products share a substance family
    #[must_use]
    pub fn same_family(&self, a: &ProductId, b: &ProductId) -> bool {
        let fold = |p: &ProductId| {
            self.products
                .get(p)
                .and_then(|i| i.substance.as_deref())
                .map(fold_text)
        };
        matches!((fold(a), fold(b)), (Some(x), Some(y)) if x == y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnapshotDate, SnapshotEntry};

    fn entry(product: &str, dossier: Option<&str>, substance: Option<&str>) -> SnapshotEntry {
        SnapshotEntry {
            product_id: ProductId::from(product),
            text: "text".into(),
            dossier: dossier.map(str::to_string),
            brand: None,
            substance: substance.map(str::to_string),
        }
    }

    fn context(snapshots: &[Snapshot]) -> ResolutionContext {
        ResolutionContext::build(snapshots, &ClauseStore::new())
    }

    #[test]
    fn later_metadata_wins_but_gaps_do_not_erase() {
        let snaps = vec![
            Snapshot {
                date: SnapshotDate::from_ym(2020, 1).unwrap(),
                entries: vec![entry("P1", Some("1111"), Some("Infliximab"))],
            },
            Snapshot {
                date: SnapshotDate::from_ym(2020, 2).unwrap(),
                entries: vec![entry("P1", None, None)],
            },
        ];
        let ctx = context(&snaps);
        assert_eq!(ctx.dossier_of(&ProductId::from("P1")), Some("1111"));
    }

    #[test]
    fn family_peers_share_folded_substance() {
        let snaps = vec![Snapshot {
            date: SnapshotDate::from_ym(2020, 1).unwrap(),
            entries: vec![
                entry("P1", Some("1111"), Some("Infliximab")),
                entry("P2", Some("2222"), Some("INFLIXIMAB")),
                entry("P3", Some("3333"), Some("Rituximab")),
            ],
        }];
        let ctx = context(&snaps);
        let peers = ctx.family_peers(&ProductId::from("P1"));
        assert_eq!(peers, vec![&ProductId::from("P2")]);
        assert!(ctx.same_family(&ProductId::from("P1"), &ProductId::from("P2")));
        assert!(!ctx.same_family(&ProductId::from("P1"), &ProductId::from("P3")));
    }
}
