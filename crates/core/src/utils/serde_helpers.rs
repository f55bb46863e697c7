//! Serde helpers for enums that engines and users spell inconsistently

/// Implements case-insensitive deserialization for a fieldless enum.
///
/// Every accepted spelling is listed explicitly so aliases (for example
/// `"warn"` and `"warning"`) can map to the same variant:
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     Severity,
///     Warning => "warning" | "warn",
///     Error => "error",
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $($str_val:literal)|+),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $($str_val)|+ => Ok(Self::$variant),
                    )+
                    _ => Err(serde::de::Error::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($($str_val),+),+].join(", ")
                    ))),
                }
            }
        }
    };
}
