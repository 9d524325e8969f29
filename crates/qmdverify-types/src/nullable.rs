use serde::{Deserialize, Deserializer};

/// Field deserializer that reads `null` as the type's default.
///
/// The server writes empty slices and unset strings as `null`; pair this with
/// `#[serde(default)]` so a missing field decodes the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
