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


//! Response headers that notify clients about changes to entities.

use crate::rest::{RestError, RestResult};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;

/// Kind of change applied to an entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertAction {
    /// A new entity was stored.
    Created,

    /// An existing entity was modified.
    Updated,

    /// An existing entity was removed.
    Deleted,
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertAction::Created => write!(f, "created"),
            AlertAction::Updated => write!(f, "updated"),
            AlertAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// Computes the headers that describe an `action` applied to the `entity` identified by `param`.
///
/// The headers are `X-<app>-alert`, which holds a message key of the form
/// `<app>.<entity>.<action>`, and `X-<app>-params`, which holds `param`.
pub fn entity_alert_headers<P: fmt::Display>(
    app: &str,
    entity: &str,
    action: AlertAction,
    param: P,
) -> RestResult<HeaderMap> {
    let header = |suffix: &str| {
        HeaderName::try_from(format!("x-{}-{}", app, suffix)).map_err(|e| {
            RestError::InternalError(format!("Invalid application name {}: {}", app, e))
        })
    };
    let value = |text: String| {
        HeaderValue::try_from(text)
            .map_err(|e| RestError::InternalError(format!("Invalid header value: {}", e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(header("alert")?, value(format!("{}.{}.{}", app, entity, action))?);
    headers.insert(header("params")?, value(param.to_string())?);
    Ok(headers)
}
