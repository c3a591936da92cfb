//! Business operations for examples.

use std::sync::Arc;

use tracing::Span;
use uuid::Uuid;

use crate::example::entity::{ExampleEntity, ExamplePage, ExampleRequest};
use crate::example::repository::{ExampleRepository, RepoError};
use crate::query::QueryData;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid example: {0}")]
    Invalid(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug)]
pub struct ExampleService {
    repo: Arc<ExampleRepository>,
    span: Span,
}

impl ExampleService {
    pub fn new(repo: Arc<ExampleRepository>, span: Span) -> Self {
        Self { repo, span }
    }

    pub async fn list(&self, query: &QueryData) -> Result<ExamplePage, ServiceError> {
        self.logged(self.repo.list(query).await)
    }

    pub async fn detail(&self, id: Uuid) -> Result<ExampleEntity, ServiceError> {
        self.logged(self.repo.detail(id).await)
    }

    pub async fn create(&self, data: &ExampleRequest) -> Result<ExampleEntity, ServiceError> {
        data.validate().map_err(ServiceError::Invalid)?;
        self.logged(self.repo.create(data).await)
    }

    pub async fn update(&self, id: Uuid, data: &ExampleRequest) -> Result<ExampleEntity, ServiceError> {
        data.validate().map_err(ServiceError::Invalid)?;
        self.logged(self.repo.update(id, data).await)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.logged(self.repo.delete(id).await)
    }

    fn logged<T>(&self, result: Result<T, RepoError>) -> Result<T, ServiceError> {
        if let Err(e) = &result {
            self.span.in_scope(|| match e {
                RepoError::Database(_) => tracing::error!(error = %e, "example operation failed"),
                _ => tracing::debug!(error = %e, "example operation rejected"),
            });
        }
        result.map_err(ServiceError::from)
    }
}
