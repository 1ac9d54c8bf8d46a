use serde::{Deserialize, Deserializer};

/// A single field of a partial update: either left alone or replaced.
///
/// Combine with `#[serde(default)]` so a missing JSON key becomes `Unset`.
/// For nullable columns use `Patch<Option<T>>`, where an explicit `null`
/// becomes `Set(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            Patch::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Patch::Set(v),
            None => Patch::Unset,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        T::deserialize(d).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        nick: Patch<Option<String>>,
    }

    #[test]
    fn missing_key_is_unset() {
        let b: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(b.name, Patch::Unset);
        assert_eq!(b.nick, Patch::Unset);
    }

    #[test]
    fn explicit_null_clears_nullable_field() {
        let b: Body = serde_json::from_str(r#"{"nick": null}"#).unwrap();
        assert_eq!(b.nick, Patch::Set(None));
    }

    #[test]
    fn value_is_set() {
        let b: Body = serde_json::from_str(r#"{"name": "bob", "nick": "b"}"#).unwrap();
        assert_eq!(b.name.as_set().map(String::as_str), Some("bob"));
        assert_eq!(b.nick, Patch::Set(Some("b".into())));
    }

    #[test]
    fn null_on_non_nullable_field_is_rejected() {
        assert!(serde_json::from_str::<Body>(r#"{"name": null}"#).is_err());
    }
}
