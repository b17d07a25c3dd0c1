use crate::config::models::SiteConfig;
use crate::domain::ports::Site;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps site names to their implementations.
///
/// Sites without a dedicated implementation fall back to the generic one,
/// but only when their table carries a `signin_url`.
#[derive(Default, Clone)]
pub struct SiteRegistry {
    sites: HashMap<String, Arc<dyn Site>>,
    fallback: Option<Arc<dyn Site>>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, site: Arc<dyn Site>) {
        let name = name.into();
        if self.sites.insert(name.clone(), site).is_some() {
            tracing::warn!("[registry] Replacing implementation for site '{}'", name);
        }
    }

    pub fn with_site(mut self, name: impl Into<String>, site: Arc<dyn Site>) -> Self {
        self.register(name, site);
        self
    }

    pub fn with_fallback(mut self, site: Arc<dyn Site>) -> Self {
        self.fallback = Some(site);
        self
    }

    pub fn resolve(&self, name: &str, config: &SiteConfig) -> Option<Arc<dyn Site>> {
        if let Some(site) = self.sites.get(name) {
            return Some(site.clone());
        }
        config
            .signin_url
            .as_ref()
            .and_then(|_| self.fallback.clone())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SiteContext;
    use crate::domain::ports::Task;

    struct Named(&'static str);

    impl Site for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn build_task_sequence(&self, _ctx: &SiteContext) -> Vec<Box<dyn Task>> {
            Vec::new()
        }
    }

    #[test]
    fn test_resolve_prefers_registered_site() {
        let registry = SiteRegistry::new()
            .with_site("forum", Arc::new(Named("forum")))
            .with_fallback(Arc::new(Named("generic")));

        let plain = SiteConfig::default();
        let with_url = SiteConfig {
            signin_url: Some("https://example.com".to_string()),
            ..Default::default()
        };

        assert_eq!(registry.resolve("forum", &plain).unwrap().name(), "forum");
        assert_eq!(registry.resolve("other", &with_url).unwrap().name(), "generic");
        assert!(registry.resolve("other", &plain).is_none());
        assert_eq!(registry.names(), vec!["forum"]);
    }

    #[test]
    fn test_no_fallback_means_unresolved() {
        let registry = SiteRegistry::new();
        let with_url = SiteConfig {
            signin_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(registry.resolve("x", &with_url).is_none());
    }
}
