use serde::{Deserialize, Deserializer};

/// serde_json writes NaN as `null`; read it back as NaN.
pub(crate) fn null_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
