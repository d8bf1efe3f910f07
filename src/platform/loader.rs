//! Process-wide platform readiness.
//!
//! Every host awaits the same [`PlatformLoader`]. It resolves once and never
//! changes afterwards, so any number of hosts may wait on it concurrently.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::{platform::MapsPlatform, runtime::Deferred, Result};

static GLOBAL: Lazy<PlatformLoader> = Lazy::new(PlatformLoader::new);

/// Asynchronously loads the platform client library.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn MapsPlatform>>;
}

#[derive(Clone, Debug, Default)]
pub struct PlatformLoader {
    ready: Deferred<Arc<dyn MapsPlatform>>,
}

impl PlatformLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loader shared by hosts that were not given their own.
    pub fn global() -> &'static PlatformLoader {
        &GLOBAL
    }

    /// Publishes an already loaded platform. Later calls are ignored.
    pub fn provide(&self, platform: Arc<dyn MapsPlatform>) -> bool {
        let name = platform.name().to_string();
        let accepted = self.ready.resolve(platform);
        if accepted {
            log::info!("mapping platform `{}` ready", name);
        } else {
            log::debug!("ignoring platform `{}`: already resolved", name);
        }
        accepted
    }

    /// Loads the platform from `source` and publishes it.
    ///
    /// On failure the loader stays unresolved and waiting hosts stay suspended.
    pub async fn load_from(&self, source: &dyn PlatformSource) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        match source.load().await {
            Ok(platform) => {
                self.provide(platform);
                Ok(())
            }
            Err(err) => {
                log::error!("mapping platform failed to load: {}", err);
                Err(err)
            }
        }
    }

    pub async fn ready(&self) -> Arc<dyn MapsPlatform> {
        self.ready.wait().await
    }

    pub fn get(&self) -> Option<Arc<dyn MapsPlatform>> {
        self.ready.peek()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;
    use crate::MapError;

    struct FailingSource;

    #[async_trait]
    impl PlatformSource for FailingSource {
        async fn load(&self) -> Result<Arc<dyn MapsPlatform>> {
            Err(MapError::Platform("script blocked".into()))
        }
    }

    struct HeadlessSource;

    #[async_trait]
    impl PlatformSource for HeadlessSource {
        async fn load(&self) -> Result<Arc<dyn MapsPlatform>> {
            Ok(Arc::new(HeadlessPlatform::new()))
        }
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let loader = PlatformLoader::new();
        loader.load_from(&HeadlessSource).await.unwrap();
        assert!(loader.is_ready());
        assert_eq!(loader.ready().await.name(), "headless");
    }

    #[tokio::test]
    async fn test_failed_load_stays_pending() {
        let loader = PlatformLoader::new();
        assert!(loader.load_from(&FailingSource).await.is_err());
        assert!(!loader.is_ready());
        assert!(loader.get().is_none());
    }

    #[test]
    fn test_provide_once() {
        let loader = PlatformLoader::new();
        assert!(loader.provide(Arc::new(HeadlessPlatform::new())));
        assert!(!loader.provide(Arc::new(HeadlessPlatform::new())));
    }

    #[test]
    fn test_get_after_provide() {
        let loader = PlatformLoader::new();
        loader.provide(Arc::new(HeadlessPlatform::new()));
        assert!(loader.is_ready());
        assert_eq!(loader.get().map(|p| p.name().to_string()), Some("headless".into()));
    }
}
