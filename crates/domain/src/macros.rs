//! Macro for implementing Display and FromStr for wire-name enums
//!
//! The platform spells enum values in several cases ("Approve", "String",
//! "SKIP_REVIEW"). The macro keeps the exact wire spelling for `Display` and
//! accepts any casing when parsing.
//!
//! # Example
//!
//! ```rust
//! use datastack_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verb {
//!     Get,
//!     Post,
//! }
//!
//! impl_wire_name_conversions!(Verb {
//!     Get => "GET",
//!     Post => "POST",
//! });
//!
//! assert_eq!(Verb::Get.to_string(), "GET");
//! assert_eq!("post".parse::<Verb>().unwrap(), Verb::Post);
//! ```
//!
//! Enums read from server documents name a fallback variant holding the
//! original spelling, so values the SDK does not list survive a round trip.
//! Such enums also convert to and from `String` for `#[serde(from, into)]`.
//!
//! ```rust
//! use datastack_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, PartialEq, Eq)]
//! pub enum Kind {
//!     Text,
//!     Other(String),
//! }
//!
//! impl_wire_name_conversions!(Kind(Other) {
//!     Text => "Text",
//! });
//!
//! assert_eq!("text".parse::<Kind>().unwrap(), Kind::Text);
//! assert_eq!(Kind::from("File".to_string()).to_string(), "File");
//! ```

/// Implements Display and FromStr for enums with a fixed wire spelling
///
/// This macro generates:
/// - Display trait: writes the exact wire string
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// With a fallback variant (`Enum(Fallback) { .. }`) parsing never fails and
/// `From<String>` / `From<Enum> for String` are generated as well.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident ($other:ident) { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $str,)+
                    Self::$other(name) => name.as_str(),
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::From<::std::string::String> for $enum_name {
            fn from(s: ::std::string::String) -> Self {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Self::$variant;
                    }
                )+
                Self::$other(s)
            }
        }

        impl ::std::convert::From<$enum_name> for ::std::string::String {
            fn from(value: $enum_name) -> Self {
                match value {
                    $enum_name::$other(name) => name,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                ::std::result::Result::Ok(Self::from(s.to_owned()))
            }
        }
    };

    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return ::std::result::Result::Ok(Self::$variant);
                    }
                )+
                ::std::result::Result::Err(::std::format!(
                    "Invalid {}: {}",
                    stringify!($enum_name),
                    s
                ))
            }
        }
    };
}
