// APE
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Pagination and sorting of entity listings.

use crate::model::{ModelError, ModelResult};
use std::fmt;

/// Direction in which to sort a property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Smallest values first.
    Asc,

    /// Largest values first.
    Desc,
}

impl Direction {
    /// Returns the SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// A request to sort a listing by one entity property.
///
/// The property is not validated here: it is up to the persistence layer to map it to a column
/// and to reject properties it does not know about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortOrder {
    /// Name of the entity property to sort by.
    property: String,

    /// Direction of the sort.
    direction: Direction,
}

impl SortOrder {
    /// Creates a new sort order for `property` in `direction`.
    pub fn new<S: Into<String>>(property: S, direction: Direction) -> Self {
        Self { property: property.into(), direction }
    }

    /// Parses a `prop[,prop...][,asc|desc]` specification as found in query strings.
    ///
    /// Every property in the list gets the same direction, which defaults to ascending.
    pub fn parse_list(spec: &str) -> ModelResult<Vec<SortOrder>> {
        let mut fields: Vec<&str> = spec.split(',').map(str::trim).collect();

        let direction = match fields.last().map(|s| s.to_ascii_lowercase()) {
            Some(last) if last == "asc" => {
                fields.pop();
                Direction::Asc
            }
            Some(last) if last == "desc" => {
                fields.pop();
                Direction::Desc
            }
            _ => Direction::Asc,
        };

        let mut orders = Vec::with_capacity(fields.len());
        for field in fields {
            if field.is_empty() {
                return Err(ModelError(format!("Invalid sort specification '{}'", spec)));
            }
            orders.push(SortOrder::new(field, direction));
        }
        if orders.is_empty() {
            return Err(ModelError(format!("Sort specification '{}' has no properties", spec)));
        }
        Ok(orders)
    }

    /// Returns the property to sort by.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns the direction of the sort.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction)
    }
}

/// A request for one page of a listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    /// Zero-based index of the requested page.
    page: u32,

    /// Maximum number of items per page.  Never zero.
    size: u32,

    /// Sort orders to apply, in priority order.
    sort: Vec<SortOrder>,
}

impl PageRequest {
    /// Creates a request for page `page` with `size` items per page.
    pub fn new(page: u32, size: u32) -> ModelResult<Self> {
        if size == 0 {
            return Err(ModelError("Page size must be at least 1".to_owned()));
        }
        Ok(Self { page, size, sort: vec![] })
    }

    /// Appends a sort order to the request.
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Returns the zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the sort orders to apply.
    pub fn sort(&self) -> &[SortOrder] {
        &self.sort
    }

    /// Returns the number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Verifies that every sort order refers to one of the `allowed` properties.
    pub fn check_sort(&self, allowed: &[&str]) -> ModelResult<()> {
        for order in &self.sort {
            if !allowed.contains(&order.property()) {
                return Err(ModelError(format!(
                    "Cannot sort by unknown property '{}'",
                    order.property()
                )));
            }
        }
        Ok(())
    }
}

/// One page of a listing plus the metadata needed to navigate the others.
#[derive(Debug, PartialEq)]
pub struct Page<T> {
    /// Items in this page.
    content: Vec<T>,

    /// The request that produced this page.
    request: PageRequest,

    /// Total number of items across all pages.
    total: u64,
}

impl<T> Page<T> {
    /// Creates a new page with the `content` returned for `request` out of `total` items.
    pub fn new(content: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self { content, request, total }
    }

    /// Returns the items in this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consumes the page and returns its items.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Returns the request that produced this page.
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Returns the total number of items across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the total number of pages.  An empty listing still has one (empty) page.
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.request.size);
        if self.total == 0 { 1 } else { self.total.div_ceil(size) }
    }

    /// Returns true if there is a page after this one.
    pub fn has_next(&self) -> bool {
        u64::from(self.request.page) + 1 < self.total_pages()
    }

    /// Returns true if there is a page before this one.
    pub fn has_previous(&self) -> bool {
        self.request.page > 0
    }
}
