use crate::{model::TypeId, scan::FieldCandidate};
use std::collections::{BTreeMap, BTreeSet};

///
/// TypeGroup
///
/// One owning type and its candidates, sorted by field name.
///

#[derive(Clone, Debug)]
pub struct TypeGroup {
    pub owner: TypeId,
    pub fields: Vec<FieldCandidate>,
}

/// Partition candidates by owning type identity.
///
/// Groups come out in `TypeId` order and fields in name order, independent of
/// the order the scanner met them.
#[must_use]
pub fn group(candidates: Vec<FieldCandidate>) -> Vec<TypeGroup> {
    let mut by_owner: BTreeMap<TypeId, Vec<FieldCandidate>> = BTreeMap::new();
    for candidate in candidates {
        by_owner
            .entry(candidate.owner.clone())
            .or_default()
            .push(candidate);
    }

    by_owner
        .into_iter()
        .map(|(owner, mut fields)| {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            TypeGroup { owner, fields }
        })
        .collect()
}

/// Host key for each group, in group order.
///
/// Keys derive from the simple type name. When that key is already taken the
/// owner is qualified by its module path, and a qualified key that is still
/// taken gets a numeric suffix, so `a::b::T` and `a_b::T` never share a file.
#[must_use]
pub fn unit_keys(groups: &[TypeGroup]) -> Vec<String> {
    let mut issued = BTreeSet::new();

    groups
        .iter()
        .map(|group| {
            let name = group.owner.name();
            let mut base = name.to_string();
            if issued.contains(&unit_key(&base)) {
                let mut parts = group.owner.module().segments().to_vec();
                parts.push(name.to_string());
                base = parts.join("_");
            }

            let mut key = unit_key(&base);
            let mut n = 2;
            while issued.contains(&key) {
                key = unit_key(&format!("{base}_{n}"));
                n += 1;
            }
            issued.insert(key.clone());

            key
        })
        .collect()
}

fn unit_key(base: &str) -> String {
    format!("{base}_Classes_g")
}

///
/// TESTS
///
