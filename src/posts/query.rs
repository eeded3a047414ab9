use serde::Deserialize;
use utoipa::IntoParams;

/// Fixed page size of the post listing
pub const POSTS_PER_PAGE: u32 = 10;

/// SQL query builder for the post listing
/// Builds parameterized count and select queries sharing one WHERE clause
pub struct PostQueryBuilder {
    where_clauses: Vec<String>,
    params: Vec<String>,
    limit: u32,
    offset: u32,
}

impl PostQueryBuilder {
    pub fn new() -> Self {
        Self {
            where_clauses: Vec::new(),
            params: Vec::new(),
            limit: POSTS_PER_PAGE,
            offset: 0,
        }
    }

    /// Builder preloaded with the filter's conditions
    pub fn for_filter(filter: &PostFilter) -> Self {
        let mut builder = Self::new();
        if let Some(ref username) = filter.username {
            builder.add_username_filter(username);
        }
        if let Some(ref tag) = filter.tag {
            builder.add_tag_filter(tag);
        }
        builder
    }

    /// Exact match on the author snapshot's username
    pub fn add_username_filter(&mut self, username: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("username = ${}", param_index));
        self.params.push(username.to_string());
    }

    /// Membership in the post's tag array
    pub fn add_tag_filter(&mut self, tag: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("${} = ANY(tags)", param_index));
        self.params.push(tag.to_string());
    }

    /// Page is 1-indexed
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = page.saturating_sub(1).saturating_mul(limit);
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Newest-first page of matching posts
    pub fn build_select(&self) -> (String, Vec<String>) {
        let query = format!(
            "SELECT id, title, body, tags, published_date, user_id, username FROM posts{} \
             ORDER BY seq DESC LIMIT {} OFFSET {}",
            self.where_sql(),
            self.limit,
            self.offset
        );
        (query, self.params.clone())
    }

    /// Number of matching posts
    pub fn build_count(&self) -> (String, Vec<String>) {
        let query = format!("SELECT COUNT(*) FROM posts{}", self.where_sql());
        (query, self.params.clone())
    }
}

impl Default for PostQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query string of `GET /api/posts`
/// Kept as raw strings so malformed values get our own 400 response
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<String>,
    /// Only posts carrying this tag
    pub tag: Option<String>,
    /// Only posts written by this user
    pub username: Option<String>,
}

/// Listing filter; `None` means no restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub username: Option<String>,
}

/// Validated and normalized listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPostQuery {
    pub page: u32,
    pub filter: PostFilter,
}

/// Validation error type
#[derive(Debug, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryError {}

/// Listing query validator
pub struct PostQueryValidator;

impl PostQueryValidator {
    pub fn validate(params: PostQuery) -> Result<ValidatedPostQuery, QueryError> {
        let page = match Self::normalize_string(params.page) {
            Some(raw) => Self::parse_page(&raw)?,
            None => 1,
        };

        Ok(ValidatedPostQuery {
            page,
            filter: PostFilter {
                tag: Self::normalize_string(params.tag),
                username: Self::normalize_string(params.username),
            },
        })
    }

    /// Trims whitespace; empty strings count as absent
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn parse_page(raw: &str) -> Result<u32, QueryError> {
        match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(QueryError {
                message: format!("page must be a positive integer, got '{}'", raw),
            }),
            Ok(page) => Ok(page),
        }
    }
}

/// Number of pages needed for `total` posts
pub fn last_page(total: u64) -> u64 {
    total.div_ceil(POSTS_PER_PAGE as u64)
}
