use dashmap::DashMap;
use std::collections::BTreeMap;

/// Operator-controlled up/down flags. Unknown providers count as up.
#[derive(Default)]
pub struct ProviderHealthRegistry {
    providers: DashMap<String, bool>,
}

impl ProviderHealthRegistry {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let registry = Self::default();
        for name in names {
            registry.set(name, true);
        }
        registry
    }

    pub fn set(&self, name: &str, up: bool) {
        self.providers.insert(name.to_lowercase(), up);
    }

    pub fn is_up(&self, name: &str) -> bool {
        self.providers
            .get(&name.to_lowercase())
            .map(|v| *v)
            .unwrap_or(true)
    }

    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.providers
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}
