use std::sync::Arc;

use crate::application::ports::annotation_repository::AnnotationRepository;
use crate::application::ports::document_store::DocumentStore;
use crate::application::ports::save_repository::SaveRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::autolink::AutoLinkConfig;
use crate::application::services::search::SearchService;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    annotation_repo: Arc<dyn AnnotationRepository>,
    save_repo: Arc<dyn SaveRepository>,
    user_repo: Arc<dyn UserRepository>,
    document_store: Arc<dyn DocumentStore>,
    search: Arc<SearchService>,
    autolink: AutoLinkConfig,
}

impl AppServices {
    pub fn new(
        annotation_repo: Arc<dyn AnnotationRepository>,
        save_repo: Arc<dyn SaveRepository>,
        user_repo: Arc<dyn UserRepository>,
        document_store: Arc<dyn DocumentStore>,
        search: Arc<SearchService>,
        autolink: AutoLinkConfig,
    ) -> Self {
        Self {
            annotation_repo,
            save_repo,
            user_repo,
            document_store,
            search,
            autolink,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn annotation_repo(&self) -> Arc<dyn AnnotationRepository> {
        self.services.annotation_repo.clone()
    }

    pub fn save_repo(&self) -> Arc<dyn SaveRepository> {
        self.services.save_repo.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.services.document_store.clone()
    }

    pub fn search(&self) -> Arc<SearchService> {
        self.services.search.clone()
    }

    pub fn autolink(&self) -> &AutoLinkConfig {
        &self.services.autolink
    }
}
