// Paddock
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

//! Generic errors and types for the business layer of a service.
//!
//! Services should put their business logic in a `service` module that wraps the database layer.
//! Operations in that layer return `ServiceResult`s so that the REST layer can map failures to
//! HTTP responses without knowing about the database.

use crate::db::DbError;
use crate::model::ModelError;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that the caller supplied a value that violates a business rule.
    #[error("{0}")]
    InvalidArgument(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that the backing store cannot be reached.
    #[error("{0}")]
    Unavailable(String),
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::BackendError(_) => ServiceError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => ServiceError::BackendError(e.to_string()),
            DbError::NotFound => ServiceError::NotFound(e.to_string()),
            DbError::Unavailable(_) => ServiceError::Unavailable(e.to_string()),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        ServiceError::InvalidArgument(e.0)
    }
}

/// Result type for this module.
pub type ServiceResult<T> = Result<T, ServiceError>;
