//! Validated path segments accepted from API callers.
//!
//! Both values end up in upstream URLs (`/c/{category}/` on Lamoda,
//! `users?login=` on Twitch) and in database filters, so they are checked
//! once at the edge and carried as newtypes afterwards.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Category`] or [`TwitchLogin`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("value cannot be empty")]
    Empty,
    /// The input string is too short.
    #[error("value must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("value must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A Lamoda catalog category slug, e.g. `4153` or `women-clothes`.
///
/// ## Constraints
///
/// - Length: 1-128 characters
/// - ASCII lowercase letters, digits, `-` and `_` only
///
/// ## Examples
///
/// ```
/// use tlparser_core::Category;
///
/// assert!(Category::parse("women-clothes").is_ok());
/// assert!(Category::parse("4153").is_ok());
///
/// assert!(Category::parse("").is_err());
/// assert!(Category::parse("../admin").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Maximum length of a category slug.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Category` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters,
    /// or contains anything besides lowercase ASCII, digits, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the category as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Category {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A Twitch login name.
///
/// Twitch logins are 4-25 characters of ASCII letters, digits and `_`.
/// Input is lowercased since logins are case-insensitive on Twitch.
///
/// ```
/// use tlparser_core::TwitchLogin;
///
/// let login = TwitchLogin::parse("Shroud").unwrap();
/// assert_eq!(login.as_str(), "shroud");
/// assert!(TwitchLogin::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TwitchLogin(String);

impl TwitchLogin {
    /// Minimum login length.
    pub const MIN_LENGTH: usize = 4;
    /// Maximum login length.
    pub const MAX_LENGTH: usize = 25;

    /// Parse a `TwitchLogin` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, outside 4-25 characters, or
    /// contains anything besides ASCII letters, digits and `_`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() < Self::MIN_LENGTH {
            return Err(SlugError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(SlugError::InvalidCharacter(c));
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TwitchLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TwitchLogin {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TwitchLogin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_categories() {
        assert!(Category::parse("women-clothes").is_ok());
        assert!(Category::parse("4153").is_ok());
        assert!(Category::parse("men_shoes").is_ok());
    }

    #[test]
    fn test_category_empty() {
        assert_eq!(Category::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_category_too_long() {
        let long = "a".repeat(129);
        assert!(matches!(
            Category::parse(&long),
            Err(SlugError::TooLong { max: 128 })
        ));
    }

    #[test]
    fn test_category_rejects_path_traversal() {
        assert_eq!(
            Category::parse("../admin"),
            Err(SlugError::InvalidCharacter('.'))
        );
        assert_eq!(
            Category::parse("Women"),
            Err(SlugError::InvalidCharacter('W'))
        );
    }

    #[test]
    fn test_login_lowercased() {
        let login = TwitchLogin::parse("Ninja_TV").unwrap();
        assert_eq!(login.as_str(), "ninja_tv");
    }

    #[test]
    fn test_login_length_bounds() {
        assert!(matches!(
            TwitchLogin::parse("abc"),
            Err(SlugError::TooShort { min: 4 })
        ));
        assert!(matches!(
            TwitchLogin::parse(&"a".repeat(26)),
            Err(SlugError::TooLong { max: 25 })
        ));
        assert!(TwitchLogin::parse(&"a".repeat(25)).is_ok());
    }

    #[test]
    fn test_login_invalid_character() {
        assert_eq!(
            TwitchLogin::parse("bad-login"),
            Err(SlugError::InvalidCharacter('-'))
        );
    }

    #[test]
    fn test_from_str() {
        let category: Category = "4153".parse().unwrap();
        assert_eq!(category.to_string(), "4153");
    }
}
