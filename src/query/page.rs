//! Page Query Engine
//!
//! Count, then find, then decode: one bounded, ordered page plus the
//! exact number of matching documents.
//!
//! Count and find are two independent store operations. Under concurrent
//! writes `total` can disagree with what the find returned (a last page
//! that comes back shorter or longer than `total` implies). That is
//! accepted eventual consistency, not a defect; callers needing a fixed
//! view must pin one outside this layer.

use std::time::Duration;

use bson::{Bson, Document};
use futures_util::TryStreamExt;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::db::{DocumentCollection, FindSpec};
use crate::types::{PlayerbookError, Result};

use super::{DecodeTarget, Filter};

/// Page address: `page_num` counts from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParam {
    pub page_num: u64,
    pub page_size: u64,
}

impl PageParam {
    pub fn new(page_num: u64, page_size: u64) -> Self {
        Self { page_num, page_size }
    }

    /// Validate and convert to `(skip, limit)`
    pub fn window(&self) -> Result<(u64, i64)> {
        if self.page_num < 1 {
            return Err(PlayerbookError::InvalidArgument(format!(
                "page_num must be >= 1, got {}",
                self.page_num
            )));
        }
        if self.page_size < 1 {
            return Err(PlayerbookError::InvalidArgument(format!(
                "page_size must be >= 1, got {}",
                self.page_size
            )));
        }

        let skip = (self.page_num - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| {
                PlayerbookError::InvalidArgument(format!(
                    "page {} of size {} is out of range",
                    self.page_num, self.page_size
                ))
            })?;
        let limit = i64::try_from(self.page_size).map_err(|_| {
            PlayerbookError::InvalidArgument(format!("page_size {} is too large", self.page_size))
        })?;

        Ok((skip, limit))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Ordered sort keys; earlier keys take precedence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortDirection::Asc));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortDirection::Desc));
        self
    }

    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        for (field, direction) in &self.keys {
            sort.insert(field.clone(), Bson::Int32(direction.as_i32()));
        }
        sort
    }
}

/// Top-level fields to return.
///
/// `_id` is left out unless asked for. An empty field list means every
/// field except the ones excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    fields: Vec<String>,
    include_id: bool,
}

impl Projection {
    pub fn fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            include_id: false,
        }
    }

    pub fn with_id(mut self) -> Self {
        self.include_id = true;
        self
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn include_id(&self) -> bool {
        self.include_id
    }

    /// Whether a top-level field survives this projection
    pub fn keeps(&self, field: &str) -> bool {
        if field == "_id" {
            return self.include_id;
        }
        self.fields.is_empty() || self.fields.iter().any(|f| f == field)
    }

    pub fn to_document(&self) -> Document {
        let mut projection = Document::new();
        if !self.include_id {
            projection.insert("_id", 0);
        }
        for field in &self.fields {
            if field != "_id" {
                projection.insert(field.clone(), 1);
            }
        }
        projection
    }
}

/// Optional knobs of a page query, all named
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    pub sort: Option<SortSpec>,
    pub projection: Option<Projection>,
    /// One deadline spanning both the count and the find
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub filter: Filter,
    pub page: PageParam,
    pub options: PageOptions,
}

impl PageRequest {
    pub fn new(filter: Filter, page: PageParam) -> Self {
        Self {
            filter,
            page,
            options: PageOptions::default(),
        }
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.options.sort = Some(sort);
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.options.projection = Some(projection);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }
}

/// One page of decoded items plus the filter's total match count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub list: Vec<T>,
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Run one page query.
///
/// `make_item` produces a fresh decode target for every returned
/// document. Any store failure, deadline expiry or single-document decode
/// failure aborts the whole call; no partial page is ever returned.
/// Dropping the returned future cancels the in-flight round trip.
pub async fn find_with_page<C, T, F>(
    collection: &C,
    request: &PageRequest,
    make_item: F,
) -> Result<PageResult<T>>
where
    C: DocumentCollection + ?Sized,
    T: DecodeTarget,
    F: FnMut() -> T,
{
    let (skip, limit) = request.page.window()?;
    let deadline = request.options.timeout.map(|timeout| Instant::now() + timeout);

    let work = run_page(collection, request, skip, limit, make_item);
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, work).await?,
        None => work.await,
    }
}

async fn run_page<C, T, F>(
    collection: &C,
    request: &PageRequest,
    skip: u64,
    limit: i64,
    mut make_item: F,
) -> Result<PageResult<T>>
where
    C: DocumentCollection + ?Sized,
    T: DecodeTarget,
    F: FnMut() -> T,
{
    let total = collection.count(&request.filter).await?;

    let spec = FindSpec {
        skip: Some(skip),
        limit: Some(limit),
        sort: request.options.sort.clone(),
        projection: request.options.projection.clone(),
    };
    let mut cursor = collection.find(&request.filter, &spec).await?;

    let capacity = usize::try_from(request.page.page_size).unwrap_or(usize::MAX).min(256);
    let mut list = Vec::with_capacity(capacity);

    while let Some(raw) = cursor.try_next().await? {
        if list.len() as u64 >= request.page.page_size {
            break;
        }

        let mut item = make_item();
        item.decode_from(&raw).map_err(|e| match e {
            PlayerbookError::Decode(msg) => PlayerbookError::Decode(format!(
                "{} document #{}: {}",
                collection.name(),
                skip + list.len() as u64,
                msg
            )),
            other => other,
        })?;
        list.push(item);
    }

    debug!(
        collection = collection.name(),
        skip,
        limit,
        returned = list.len(),
        total,
        "page query complete"
    );

    Ok(PageResult { list, total })
}

/// Fetch the first document matching `filter`, without counting.
pub async fn find_one<C, T, F>(
    collection: &C,
    filter: &Filter,
    projection: Option<Projection>,
    make_item: F,
) -> Result<Option<T>>
where
    C: DocumentCollection + ?Sized,
    T: DecodeTarget,
    F: FnOnce() -> T,
{
    let spec = FindSpec {
        limit: Some(1),
        projection,
        ..Default::default()
    };
    let mut cursor = collection.find(filter, &spec).await?;

    match cursor.try_next().await? {
        Some(raw) => {
            let mut item = make_item();
            item.decode_from(&raw)?;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}
