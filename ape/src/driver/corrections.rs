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


//! Operations on corrections.

use crate::db::{self, Fetch};
use crate::driver::{Driver, found, ignore_not_found};
use crate::model::{Correction, CorrectionId, CorrectionPatch, Entity};
use ape_core::driver::DriverResult;
use ape_core::model::{Page, PageRequest};
use log::debug;

impl Driver {
    /// Stores `correction`, creating it if it has no identity or replacing it otherwise, and
    /// returns the stored version.
    ///
    /// Fails with a conflict if the exercise of the correction does not exist or if it already
    /// has a different correction.
    pub(crate) async fn save_correction(self, correction: Correction) -> DriverResult<Correction> {
        debug!("Request to save correction: {:?}", correction);
        let mut tx = self.db.begin().await?;
        let id = db::save_correction(tx.ex(), &correction).await?;
        let correction = db::get_correction(tx.ex(), id, Fetch::Lazy).await?;
        tx.commit().await?;
        Ok(correction)
    }

    /// Replaces all fields of the existing `correction`, including its exercise.
    pub(crate) async fn update_correction(
        self,
        correction: Correction,
    ) -> DriverResult<Correction> {
        debug!("Request to update correction: {:?}", correction);
        self.save_correction(correction).await
    }

    /// Overwrites the content of the correction identified by `id` if present in `patch`.  The
    /// exercise of the correction is left untouched.
    ///
    /// Returns `None` if the correction does not exist.
    pub(crate) async fn partial_update_correction(
        self,
        id: CorrectionId,
        patch: CorrectionPatch,
    ) -> DriverResult<Option<Correction>> {
        debug!("Request to partially update correction {}: {:?}", id, patch);
        let mut tx = self.db.begin().await?;
        let mut correction = match found(db::get_correction(tx.ex(), id, Fetch::Lazy).await)? {
            Some(correction) => correction,
            None => return Ok(None),
        };
        correction.merge(patch);
        db::save_correction(tx.ex(), &correction).await?;
        tx.commit().await?;
        Ok(Some(correction))
    }

    /// Gets the page of corrections described by `request`, loading their exercises as requested
    /// by `fetch`.
    pub(crate) async fn find_all_corrections(
        self,
        request: PageRequest,
        fetch: Fetch,
    ) -> DriverResult<Page<Correction>> {
        debug!("Request to get all corrections: {:?} ({:?})", request, fetch);
        request.check_sort(Correction::SORT_PROPERTIES)?;
        let mut tx = self.db.begin_ro().await?;
        let page = db::list_corrections(tx.ex(), request, fetch).await?;
        tx.commit().await?;
        Ok(page)
    }

    /// Gets the correction identified by `id` together with its exercise, if it exists.
    pub(crate) async fn find_one_correction(
        self,
        id: CorrectionId,
    ) -> DriverResult<Option<Correction>> {
        debug!("Request to get correction {}", id);
        let mut tx = self.db.begin_ro().await?;
        let correction = found(db::get_correction(tx.ex(), id, Fetch::Eager).await)?;
        tx.commit().await?;
        Ok(correction)
    }

    /// Checks whether the correction identified by `id` exists.
    pub(crate) async fn correction_exists(self, id: CorrectionId) -> DriverResult<bool> {
        let mut tx = self.db.begin_ro().await?;
        let exists = db::correction_exists(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(exists)
    }

    /// Deletes the correction identified by `id`.  Deleting a correction that does not exist
    /// succeeds.
    pub(crate) async fn delete_correction(self, id: CorrectionId) -> DriverResult<()> {
        debug!("Request to delete correction {}", id);
        let mut tx = self.db.begin().await?;
        ignore_not_found(db::delete_correction(tx.ex(), id).await)?;
        tx.commit().await?;
        Ok(())
    }
}
