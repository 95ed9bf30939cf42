use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{borrow::Cow, fmt, fmt::Display, hash::Hash, str::FromStr, string::ToString};

/// Identifier that consists of ASCII alphanumeric and '-', '_' characters.
///
/// Node names and port names are identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    /// Create an identifier from a string.
    ///
    /// It returns `None` if the string is empty or contains a character
    /// outside the allowed set.
    pub fn new<'a, S>(name: S) -> Option<Self>
    where
        S: Into<Cow<'a, str>>,
    {
        let name = name.into().into_owned();
        let ok = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_".contains(c));
        ok.then_some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Ident {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ident::new(name).ok_or_else(|| format!("invalid name '{}'", name))
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Ident {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'a> Deserialize<'a> for Ident {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        let name = String::deserialize(deserializer)?;
        Ident::new(&name).ok_or_else(|| D::Error::custom(format!("invalid name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_dash_underscore() {
        for name in ["Source", "sink-2", "_tmp", "9lives"] {
            assert_eq!(Ident::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_other_characters() {
        for name in ["", "a b", "node:port", "dir/name", "ünï"] {
            assert!(Ident::new(name).is_none(), "{name:?} should be rejected");
        }
        assert!("x.y".parse::<Ident>().is_err());
    }
}
