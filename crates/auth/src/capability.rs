use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Capability identifier.
///
/// Capabilities are modeled as opaque strings (e.g. "edit_products") and are
/// never hierarchical among themselves; only roles carry a rank. The special
/// wildcard capability `"*"` is used by the policy layer to indicate "allow
/// all" without hardcoding every domain capability into the admin role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    pub const WILDCARD: Capability = Capability(Cow::Borrowed("*"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Capability {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Capability {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
