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


//! Query parsing and response headers for paginated listings.

use crate::model::{Page, PageRequest, SortOrder};
use crate::rest::{RestError, RestResult};
use axum::http::{HeaderMap, HeaderValue};

/// Name of the query parameter that selects the zero-based page index.
const PAGE_PARAM: &str = "page";

/// Name of the query parameter that selects the page size.
const SIZE_PARAM: &str = "size";

/// Name of the query parameter that specifies sort orders.  May be repeated.
const SORT_PARAM: &str = "sort";

/// Raw query parameters of a listing request, preserving their order and repetitions.
///
/// Handlers get these via `Query<Vec<(String, String)>>` and wrap them in this type to extract the
/// pagination settings plus any other parameters they support.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery(Vec<(String, String)>);

impl From<Vec<(String, String)>> for ListQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl ListQuery {
    /// Returns the last value given to the parameter `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Returns the value of the boolean parameter `name`, or `default` if it is not present.
    pub fn get_bool(&self, name: &str, default: bool) -> RestResult<bool> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.parse::<bool>().map_err(|_| {
                RestError::InvalidRequest(format!("Invalid boolean '{}' for {}", value, name))
            }),
        }
    }

    /// Extracts the page request described by the `page`, `size` and `sort` parameters.
    ///
    /// Missing page indexes start at the first page, missing or zero sizes take `default_size`,
    /// and sizes larger than `max_size` are capped.
    pub fn page_request(&self, default_size: u32, max_size: u32) -> RestResult<PageRequest> {
        let page = match self.get(PAGE_PARAM) {
            None => 0,
            Some(value) => value.parse::<u32>().map_err(|e| {
                RestError::InvalidRequest(format!("Invalid page '{}': {}", value, e))
            })?,
        };

        let size = match self.get(SIZE_PARAM) {
            None => default_size,
            Some(value) => match value.parse::<u32>() {
                Ok(0) => default_size,
                Ok(size) => size.min(max_size),
                Err(e) => {
                    return Err(RestError::InvalidRequest(format!(
                        "Invalid size '{}': {}",
                        value, e
                    )));
                }
            },
        };

        let mut request = PageRequest::new(page, size)?;
        for (_, spec) in self.0.iter().filter(|(k, _)| k == SORT_PARAM) {
            for order in SortOrder::parse_list(spec)? {
                request = request.with_sort(order);
            }
        }
        Ok(request)
    }

    /// Returns the parameters that are not related to pagination.
    fn non_paging(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(k, _)| k != PAGE_PARAM && k != SIZE_PARAM)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Formats a link to `path` for the given `page` and `size`, keeping all other parameters.
    fn link(&self, path: &str, page: u64, size: u32, rel: &str) -> RestResult<String> {
        let page = page.to_string();
        let size = size.to_string();
        let mut pairs: Vec<(&str, &str)> = self.non_paging().collect();
        pairs.push((PAGE_PARAM, &page));
        pairs.push((SIZE_PARAM, &size));
        Ok(format!("<{}?{}>; rel=\"{}\"", path, serde_urlencoded::to_string(&pairs)?, rel))
    }
}

/// Computes the `X-Total-Count` and `Link` headers for a `page` of a listing served at `path`.
///
/// The `Link` header follows RFC 5988 and contains the `next`, `prev`, `last` and `first`
/// relations, omitting `next` and `prev` when they do not exist.
pub fn pagination_headers<T>(
    path: &str,
    query: &ListQuery,
    page: &Page<T>,
) -> RestResult<HeaderMap> {
    let request = page.request();
    let number = u64::from(request.page());
    let size = request.size();

    let mut links = vec![];
    if page.has_next() {
        links.push(query.link(path, number + 1, size, "next")?);
    }
    if page.has_previous() {
        links.push(query.link(path, number - 1, size, "prev")?);
    }
    links.push(query.link(path, page.total_pages() - 1, size, "last")?);
    links.push(query.link(path, 0, size, "first")?);

    let mut headers = HeaderMap::new();
    headers.insert("X-Total-Count", HeaderValue::from(page.total()));
    headers.insert(
        "Link",
        HeaderValue::try_from(links.join(","))
            .map_err(|e| RestError::InternalError(format!("Invalid Link header: {}", e)))?,
    );
    Ok(headers)
}
