use super::{
    ancestry::AncestryChain,
    builder::DefinitionBuilder,
    cache::{CacheKey, CacheStats, DefinitionCache},
    Definition, DefinitionKind, ResolverConfig,
};
use crate::{
    language::{
        ast::Declaration,
        env::DeclarationStore,
        errors::{DeclarationError, ResolveResult},
        types::Type,
    },
    project::{
        loader::load_declarations,
        manifest::{ManifestError, ResolverManifest},
    },
};
use std::{path::Path, sync::Arc};
use tracing::info;

#[derive(Default)]
pub struct Resolver {
    store: DeclarationStore,
    config: ResolverConfig,
    cache: DefinitionCache,
}

impl Resolver {
    pub fn new(store: DeclarationStore) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    pub fn with_config(store: DeclarationStore, config: ResolverConfig) -> Self {
        Self {
            store,
            config,
            cache: DefinitionCache::new(),
        }
    }

    pub fn from_manifest(path: &Path) -> Result<Self, ManifestError> {
        let manifest = ResolverManifest::load(path)?;
        let mut store = DeclarationStore::new();
        for file in manifest.signature_paths() {
            let decls = load_declarations(&file)?;
            store
                .extend(decls)
                .map_err(|error| ManifestError::Declaration {
                    path: file.clone(),
                    error,
                })?;
        }
        info!(
            manifest = %path.display(),
            types = store.len(),
            "loaded declarations"
        );
        Ok(Self::with_config(store, manifest.config()))
    }

    pub fn store(&self) -> &DeclarationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DeclarationStore {
        self.cache.clear();
        &mut self.store
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn declare(&mut self, decl: Declaration) -> Result<(), DeclarationError> {
        self.store_mut().insert(decl)
    }

    pub fn resolve(
        &self,
        name: &str,
        args: &[Type],
        kind: DefinitionKind,
    ) -> ResolveResult<Arc<Definition>> {
        let builder = DefinitionBuilder::new(&self.store, &self.config);
        if self.config.disable_cache {
            return builder.build(name, args, kind).map(Arc::new);
        }
        let key = CacheKey::new(name, args, kind);
        self.cache
            .get_or_build(key, self.store.generation(), || builder.build(name, args, kind))
    }

    pub fn instance_definition(&self, name: &str, args: &[Type]) -> ResolveResult<Arc<Definition>> {
        self.resolve(name, args, DefinitionKind::Instance)
    }

    pub fn singleton_definition(&self, name: &str) -> ResolveResult<Arc<Definition>> {
        self.resolve(name, &[], DefinitionKind::Singleton)
    }

    pub fn ancestors(&self, name: &str, kind: DefinitionKind) -> ResolveResult<AncestryChain> {
        DefinitionBuilder::new(&self.store, &self.config).ancestors(name, kind)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
