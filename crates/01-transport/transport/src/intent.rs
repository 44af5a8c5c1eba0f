use std::collections::BTreeMap;

use crate::extra::ExtraValue;

/// Flat set of named fields attached to an intent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras {
    fields: BTreeMap<String, ExtraValue>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: ExtraValue) -> Option<ExtraValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ExtraValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// One broadcast message: an action used for routing plus named extras.
#[derive(Clone, Debug, PartialEq)]
pub struct Intent {
    action: String,
    extras: Extras,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: Extras::new(),
        }
    }

    pub fn from_parts(action: impl Into<String>, extras: Extras) -> Self {
        Self {
            action: action.into(),
            extras,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    pub fn extra(&self, name: &str) -> Option<&ExtraValue> {
        self.extras.get(name)
    }

    pub fn has_extra(&self, name: &str) -> bool {
        self.extras.contains(name)
    }

    pub fn put_extra(&mut self, name: impl Into<String>, value: ExtraValue) -> &mut Self {
        self.extras.insert(name, value);
        self
    }

    /// Builder-style variant of [`Intent::put_extra`].
    pub fn with_extra(mut self, name: impl Into<String>, value: ExtraValue) -> Self {
        self.extras.insert(name, value);
        self
    }
}

/// Receiver-side filter. Matching is exact string equality on the action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentFilter {
    action: String,
}

impl IntentFilter {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn matches(&self, intent: &Intent) -> bool {
        self.action == intent.action
    }
}
