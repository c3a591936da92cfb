//! List query parsing: paging and sorting with configured defaults.

use serde::Deserialize;
use thiserror::Error;

use crate::config::{RouterConfig, SortOrder};

/// Raw list parameters as they appear in the query string
/// (`page[limit]=10&page[offset]=20&sort[attr]=title&sort[order]=asc`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "page[limit]")]
    pub limit: Option<u32>,
    #[serde(rename = "page[offset]")]
    pub offset: Option<u32>,
    #[serde(rename = "sort[attr]")]
    pub attr: Option<String>,
    #[serde(rename = "sort[order]")]
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorting {
    pub attr: String,
    pub order: SortOrder,
}

/// Fully resolved list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryData {
    pub paging: Paging,
    pub sorting: Sorting,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query defaults: page limit must be greater than 0")]
    ZeroLimit,
    #[error("query defaults: sort attribute must not be empty")]
    EmptyAttr,
}

/// Applies configured defaults to incoming list parameters.
#[derive(Debug, Clone)]
pub struct QueryHandler {
    defaults: QueryData,
}

impl QueryHandler {
    pub fn new(router: &RouterConfig) -> Result<Self, QueryError> {
        if router.paging.default_limit == 0 {
            return Err(QueryError::ZeroLimit);
        }
        if router.sorting.default_attr.trim().is_empty() {
            return Err(QueryError::EmptyAttr);
        }

        Ok(Self {
            defaults: QueryData {
                paging: Paging {
                    limit: router.paging.default_limit,
                    offset: 0,
                },
                sorting: Sorting {
                    attr: router.sorting.default_attr.clone(),
                    order: router.sorting.default_order,
                },
            },
        })
    }

    /// Merge request parameters over the defaults. A zero limit falls back
    /// to the default.
    pub fn resolve(&self, params: ListParams) -> QueryData {
        QueryData {
            paging: Paging {
                limit: params
                    .limit
                    .filter(|l| *l > 0)
                    .unwrap_or(self.defaults.paging.limit),
                offset: params.offset.unwrap_or(self.defaults.paging.offset),
            },
            sorting: Sorting {
                attr: params
                    .attr
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| self.defaults.sorting.attr.clone()),
                order: params.order.unwrap_or(self.defaults.sorting.order),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_take_defaults() {
        let handler = QueryHandler::new(&RouterConfig::default()).unwrap();
        let query = handler.resolve(ListParams::default());
        assert_eq!(query.paging, Paging { limit: 20, offset: 0 });
        assert_eq!(query.sorting.attr, "created_on");
        assert_eq!(query.sorting.order, SortOrder::Desc);
    }

    #[test]
    fn params_override_defaults() {
        let handler = QueryHandler::new(&RouterConfig::default()).unwrap();
        let params: ListParams = serde_json::from_value(serde_json::json!({
            "page[limit]": 5,
            "page[offset]": 10,
            "sort[attr]": "title",
            "sort[order]": "asc",
        }))
        .unwrap();

        let query = handler.resolve(params);
        assert_eq!(query.paging, Paging { limit: 5, offset: 10 });
        assert_eq!(query.sorting, Sorting { attr: "title".into(), order: SortOrder::Asc });
    }

    #[test]
    fn zero_limit_falls_back() {
        let handler = QueryHandler::new(&RouterConfig::default()).unwrap();
        let query = handler.resolve(ListParams {
            limit: Some(0),
            ..ListParams::default()
        });
        assert_eq!(query.paging.limit, 20);
    }

    #[test]
    fn invalid_defaults_are_rejected() {
        let mut router = RouterConfig::default();
        router.paging.default_limit = 0;
        assert!(matches!(QueryHandler::new(&router), Err(QueryError::ZeroLimit)));

        let mut router = RouterConfig::default();
        router.sorting.default_attr = " ".into();
        assert!(matches!(QueryHandler::new(&router), Err(QueryError::EmptyAttr)));
    }
}
