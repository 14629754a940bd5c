//! Registered host adapters, looked up by URL prefix or id.

use exmb_core::{HostId, MediaRef};
use exmb_interface::{MirrorHost, SourceHost};
use std::fmt;
use std::sync::Arc;

/// Table of source and mirror adapters.
///
/// Source hosts are matched in registration order; the first host claiming a URL wins.
#[derive(Clone, Default)]
pub struct HostRegistry {
    sources: Vec<Arc<dyn SourceHost>>,
    mirrors: Vec<Arc<dyn MirrorHost>>,
}

impl HostRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source host.
    pub fn with_source(mut self, host: Arc<dyn SourceHost>) -> Self {
        self.sources.push(host);
        self
    }

    /// Add a mirror host.
    pub fn with_mirror(mut self, host: Arc<dyn MirrorHost>) -> Self {
        self.mirrors.push(host);
        self
    }

    /// Source host claiming `url`.
    pub fn source_for(&self, url: &str) -> Option<&Arc<dyn SourceHost>> {
        self.sources.iter().find(|host| host.matches(url))
    }

    /// Source host and parsed media reference for `url`.
    pub fn media_for(&self, url: &str) -> Option<(&Arc<dyn SourceHost>, MediaRef)> {
        let host = self.source_for(url)?;
        let media = host.media_ref(url)?;
        Some((host, media))
    }

    /// Whether some source host can resolve `url`.
    pub fn supports(&self, url: &str) -> bool {
        self.media_for(url).is_some()
    }

    /// Mirror host registered under `id`.
    pub fn mirror(&self, id: &HostId) -> Option<&Arc<dyn MirrorHost>> {
        self.mirrors.iter().find(|host| &host.id() == id)
    }

    /// Ids of registered source hosts.
    pub fn source_ids(&self) -> Vec<HostId> {
        self.sources.iter().map(|h| h.id()).collect()
    }

    /// Ids of registered mirror hosts.
    pub fn mirror_ids(&self) -> Vec<HostId> {
        self.mirrors.iter().map(|h| h.id()).collect()
    }
}

impl fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRegistry")
            .field("sources", &self.source_ids())
            .field("mirrors", &self.mirror_ids())
            .finish()
    }
}
