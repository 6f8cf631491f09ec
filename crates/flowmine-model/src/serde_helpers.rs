// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[must_use]
pub fn map_is_empty<K, V>(value: &BTreeMap<K, V>) -> bool {
    value.is_empty()
}
