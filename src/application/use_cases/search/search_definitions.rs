use crate::application::services::search::{DefinitionHit, SearchService};

pub struct SearchDefinitions<'a> {
    pub search: &'a SearchService,
}

impl<'a> SearchDefinitions<'a> {
    pub async fn execute(
        &self,
        query: &str,
        top_k: usize,
        width: usize,
        extra_patterns: &[String],
    ) -> anyhow::Result<Vec<DefinitionHit>> {
        self.search
            .search(query, top_k, width, extra_patterns)
            .await
    }
}
