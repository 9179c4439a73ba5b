//! Macro for implementing Display and FromStr for remote picklist enums
//!
//! The remote platform spells picklist values in PascalCase (`Developer`,
//! `NoTestRun`, `Preview`). This macro keeps the wire spelling for `Display`
//! and accepts any casing in `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use scratchforce_domain::impl_remote_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Preview,
//!     Previous,
//! }
//!
//! impl_remote_enum_conversions!(Channel {
//!     Preview => "Preview",
//!     Previous => "Previous",
//! });
//! ```

/// Implements Display and FromStr traits for remote picklist enums
///
/// This macro generates:
/// - Display trait: writes the exact wire spelling
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_remote_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
