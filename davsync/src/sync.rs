// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Synchronization of collection lists and collection members.

use reqwest::StatusCode;
use url::Url;

use crate::client::DavClient;
use crate::error::DavError;
use crate::http::Depth;
use crate::request::SyncCollectionRequest;
use crate::types::{Account, Collection, ETag};
use crate::urls::{resolve, urls_match};

/// Changes between a local collection list and the server's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionChanges {
    /// Remote collections with no local counterpart.
    pub created: Vec<Collection>,
    /// Remote values of collections whose sync token or `CTag` moved.
    pub updated: Vec<Collection>,
    /// Local collections no longer on the server.
    pub deleted: Vec<Collection>,
    unchanged: Vec<Collection>,
}

impl CollectionChanges {
    /// Local collections that still match the server.
    #[must_use]
    pub fn unchanged(&self) -> &[Collection] {
        &self.unchanged
    }

    /// Whether nothing was created, updated or deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// The new local list: created, then updated, then unchanged collections.
    #[must_use]
    pub fn into_merged(self) -> Vec<Collection> {
        let mut merged = self.created;
        merged.extend(self.updated);
        merged.extend(self.unchanged);
        merged
    }
}

/// Diffs a local collection list against the server's.
///
/// Each local collection claims at most one remote collection with an equal
/// URL (see [`urls_match`]). A claimed pair counts as updated when the remote
/// side reports a sync token or `CTag` different from the local one; a remote
/// side without either marker is unchanged.
#[must_use]
pub fn reconcile_collections(local: &[Collection], remote: Vec<Collection>) -> CollectionChanges {
    let mut remaining: Vec<Option<Collection>> = remote.into_iter().map(Some).collect();
    let mut changes = CollectionChanges::default();

    for collection in local {
        let counterpart = remaining
            .iter_mut()
            .find(|slot| {
                slot.as_ref()
                    .is_some_and(|r| urls_match(&collection.url, &r.url))
            })
            .and_then(Option::take);

        match counterpart {
            Some(remote) if has_changed(collection, &remote) => changes.updated.push(remote),
            Some(_) => changes.unchanged.push(collection.clone()),
            None => changes.deleted.push(collection.clone()),
        }
    }

    changes.created = remaining.into_iter().flatten().collect();
    changes
}

fn has_changed(local: &Collection, remote: &Collection) -> bool {
    let moved = |remote: Option<&String>, local: Option<&String>| {
        remote.is_some_and(|marker| local != Some(marker))
    };
    moved(remote.sync_token.as_ref(), local.sync_token.as_ref())
        || moved(remote.ctag.as_ref(), local.ctag.as_ref())
}

/// A member reported by a `sync-collection` REPORT as new or modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedObject {
    /// Absolute URL of the member.
    pub url: Url,
    /// Its current entity tag.
    pub etag: Option<ETag>,
}

/// Member changes of one collection since a sync token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDelta {
    /// Token to send on the next sync.
    pub sync_token: Option<String>,
    /// New or modified members.
    pub changed: Vec<ChangedObject>,
    /// Members removed from the collection.
    pub removed: Vec<Url>,
}

impl DavClient {
    /// Refreshes a local collection list from the server.
    ///
    /// Returns created, updated and unchanged collections; deleted ones are
    /// dropped. Use [`DavClient::sync_collections_detailed`] to see them.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the remote collections fails.
    pub async fn sync_collections(
        &self,
        account: &Account,
        local: &[Collection],
    ) -> Result<Vec<Collection>, DavError> {
        self.sync_collections_detailed(account, local)
            .await
            .map(CollectionChanges::into_merged)
    }

    /// Diffs a local collection list against the server.
    ///
    /// # Errors
    ///
    /// Returns an error if listing the remote collections fails.
    pub async fn sync_collections_detailed(
        &self,
        account: &Account,
        local: &[Collection],
    ) -> Result<CollectionChanges, DavError> {
        let remote = self.fetch_collections(account).await?;
        let changes = reconcile_collections(local, remote);
        tracing::debug!(
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "collections reconciled"
        );
        Ok(changes)
    }

    /// Lists member changes since the collection's sync token (RFC 6578).
    ///
    /// A collection without a token gets a full listing.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Precondition`] if the account has no root URL, or
    /// an error if the request fails (servers answer 403 or 409 for an
    /// expired token).
    pub async fn sync_collection(
        &self,
        collection: &Collection,
        account: &Account,
    ) -> Result<CollectionDelta, DavError> {
        let root = account.require_root()?;

        let body = SyncCollectionRequest::new(collection.sync_token.clone()).build()?;
        let multistatus = self
            .http
            .multistatus("REPORT", &collection.url, Some(Depth::Zero), body)
            .await?;

        let mut delta = CollectionDelta {
            sync_token: multistatus.sync_token,
            ..CollectionDelta::default()
        };
        for record in multistatus.responses {
            let url = resolve(root, &record.href)?;
            if urls_match(&url, &collection.url) {
                continue;
            }
            if record.status_code() == Some(StatusCode::NOT_FOUND) {
                delta.removed.push(url);
            } else if record.is_ok() {
                let etag = record.props().get_etag;
                delta.changed.push(ChangedObject { url, etag });
            } else {
                tracing::warn!(href = %record.href, status = ?record.status_code(), "skipping failed sync record");
            }
        }

        tracing::debug!(
            url = %collection.url,
            changed = delta.changed.len(),
            removed = delta.removed.len(),
            "collection synced"
        );
        Ok(delta)
    }
}
