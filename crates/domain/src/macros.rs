//! Display/FromStr generation for configuration enums
//!
//! Settings arrive as strings from environment variables and config files.
//! [`impl_setting_conversions!`] maps each variant to one canonical name plus
//! optional aliases, parsed case-insensitively.
//!
//! ```rust
//! use glyphbridge_domain::impl_setting_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verbosity {
//!     Quiet,
//!     Chatty,
//! }
//!
//! impl_setting_conversions!(Verbosity {
//!     Quiet => "quiet" | "silent",
//!     Chatty => "chatty",
//! });
//!
//! assert_eq!("SILENT".parse::<Verbosity>(), Ok(Verbosity::Quiet));
//! assert_eq!(Verbosity::Chatty.to_string(), "chatty");
//! ```

/// Implements `Display` (canonical name) and `FromStr` (canonical name or any
/// alias, case-insensitive) for a fieldless enum.
#[macro_export]
macro_rules! impl_setting_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($str $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
