use std::collections::BTreeMap;

use anyhow::{Context as _, Result};

/// Attributes inherited down the game → inning → at-bat → pitch hierarchy.
///
/// Merging never mutates in place: every level gets its own copy, so one
/// at-bat's attributes can't leak into its siblings.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn from_attrs<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::default().merged(attrs)
    }

    /// A copy of this context overlaid with `attrs`. On collision the new value wins.
    #[must_use]
    pub fn merged<'a, I>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = self.values.clone();
        values.extend(attrs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str, element: &str) -> Result<&str> {
        self.get(key)
            .with_context(|| format!("<{element}> is missing required attribute `{key}`"))
    }
}
