//! Top-level generics passed through to the synthesis stage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value assigned to a generic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenericValue {
    Integer(i64),
    /// Always rendered with a fractional part so HDL reads it as a real.
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for GenericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for GenericValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for GenericValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for GenericValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for GenericValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Generic name to value mapping, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generics(BTreeMap<String, GenericValue>);

impl Generics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<GenericValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GenericValue> {
        self.0.get(name)
    }

    /// Render as `{NAME=VALUE NAME=VALUE}`, sorted by name.
    #[must_use]
    pub fn render(&self) -> String {
        let body: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{{{}}}", body.join(" "))
    }
}

impl<K: Into<String>, V: Into<GenericValue>> FromIterator<(K, V)> for Generics {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut generics = Self::new();
        for (name, value) in iter {
            generics.insert(name, value);
        }
        generics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn renders_single_generic() {
        let generics: Generics = [("WIDTH", 8_i64)].into_iter().collect();
        assert_eq!(generics.render(), "{WIDTH=8}");
    }

    #[test]
    fn renders_empty_braces() {
        assert_eq!(Generics::new().render(), "{}");
    }

    #[test]
    fn renders_mixed_values_sorted() {
        let mut generics = Generics::new();
        generics.insert("WIDTH", 16_i64);
        generics.insert("DEBUG", false);
        generics.insert("NAME", "core");
        assert_eq!(generics.render(), "{DEBUG=false NAME=core WIDTH=16}");
    }

    #[test]
    fn reals_keep_their_fractional_part() {
        let mut generics = Generics::new();
        generics.insert("PERIOD", 1.5);
        generics.insert("SCALE", 2.0);
        assert_eq!(generics.render(), "{PERIOD=1.5 SCALE=2.0}");
    }

    proptest! {
        #[test]
        fn render_is_independent_of_insertion_order(
            entries in proptest::collection::btree_map("[A-Z][A-Z0-9_]{0,8}", any::<i64>(), 0..8)
        ) {
            let forward: Generics = entries.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let backward: Generics = entries.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
            prop_assert_eq!(forward.render(), backward.render());
            let rendered = forward.render();
            prop_assert!(rendered.starts_with('{'), "rendered must start with an opening brace");
            prop_assert!(rendered.ends_with('}'), "rendered must end with a closing brace");
            for (name, value) in &entries {
                let needle = format!("{name}={value}");
                prop_assert!(rendered.contains(&needle));
            }
        }
    }
}
