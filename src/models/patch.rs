//! Helpers for partial-update payloads.
//!
//! A nullable field in a patch has three states: absent (leave the stored
//! value alone), `null` (clear it), and a value (overwrite it). Fields are
//! declared as `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "double_option")]`: absent keys fall
//! back to `None`, a present key always yields `Some(..)`.

use serde::{Deserialize, Deserializer};

pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
