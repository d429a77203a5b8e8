//! Query-string builder for the Fortigate REST API.
//!
//! CMDB endpoints take their selectors as query parameters: `vdom`,
//! `filter=<field>==<value>`, `format=<field>|<field>` and the move action
//! parameters. The access token is appended by the client, not here.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    #[must_use]
    pub fn push<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Append a key/value pair when the value is present.
    #[must_use]
    pub fn push_opt<T>(self, key: &'static str, value: Option<T>) -> Self
    where
        T: Display,
    {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Restrict the virtual domain.
    #[must_use]
    pub fn vdom(self, vdom: &str) -> Self {
        self.push("vdom", vdom)
    }

    /// Equality filter, rendered as `field==value`.
    #[must_use]
    pub fn filter(self, field: &str, value: impl Display) -> Self {
        self.push("filter", format!("{field}=={value}"))
    }

    /// Limit the returned fields, rendered as `a|b|c`.
    #[must_use]
    pub fn format(self, fields: &[&str]) -> Self {
        self.push("format", fields.join("|"))
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
