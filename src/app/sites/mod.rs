pub mod signin;

use crate::core::registry::SiteRegistry;
use std::sync::Arc;

pub use signin::SignInSite;

/// Registry with the built-in sites. Any configured site that has a
/// `signin_url` and no dedicated implementation uses [`SignInSite`].
pub fn default_registry() -> SiteRegistry {
    SiteRegistry::new().with_fallback(Arc::new(SignInSite))
}
