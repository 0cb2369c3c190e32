//! Serde helpers for the shapes the remote service returns.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// (De)serializes `Option<Id>` as a nested `{ "id": ... }` object or null.
pub(crate) mod nested_id {
    use super::*;

    #[derive(Serialize)]
    struct LinkRef<'a, T> {
        id: &'a T,
    }

    #[derive(Deserialize)]
    struct Link<T> {
        id: T,
    }

    pub(crate) fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.as_ref().map(|id| LinkRef { id }).serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Link<T>>::deserialize(deserializer)?.map(|link| link.id))
    }
}

/// Reads `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a missing or `null` hidden flag as private.
pub(crate) fn null_as_hidden<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

pub(crate) const fn hidden_by_default() -> bool {
    true
}
