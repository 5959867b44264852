//! Prospect books: the one name-keyed collection.
//!
//! Every other collection uses an opaque generated id; books use the
//! normalized (lower-cased) prospect name as the natural key, because the
//! domain invariant is one book per prospect. Two writes under the same
//! normalized name collapse into one record, last writer wins. This is a
//! deliberate one-off, not a pattern to generalize.
//!
//! The collaboration operations (`comment_on_book`, `share_book`) are the
//! composition point where a book mutation fans out into notifications.
//! Mention resolution itself is roster-symmetric; skipping the author is
//! policy applied here.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bus::{Signal, SignalBus};
use crate::error::CoreError;
use crate::extract::resolve_mentions;
use crate::types::{Comment, NotificationKind, ProspectBook, ShareEntry, TeamMember};

use super::collections::{new_id, now_rfc3339, Stores};
use super::StorageBackend;

const BOOKS_KEY: &str = "pd.prospect_books";

/// Lower-cased, whitespace-trimmed form of a prospect name. The map key and
/// the single source of identity for a book.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct ProspectBookStore {
    storage: Arc<dyn StorageBackend>,
    bus: Arc<SignalBus>,
}

impl ProspectBookStore {
    pub(super) fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        ProspectBookStore { storage, bus }
    }

    fn load(&self) -> BTreeMap<String, ProspectBook> {
        match self.storage.get(BOOKS_KEY) {
            None => BTreeMap::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Discarding corrupt collection '{}': {}", BOOKS_KEY, e);
                    self.storage.remove(BOOKS_KEY);
                    BTreeMap::new()
                }
            },
        }
    }

    fn persist(&self, books: &BTreeMap<String, ProspectBook>) -> Result<(), CoreError> {
        let raw = serde_json::to_string(books)
            .map_err(|e| CoreError::Storage(format!("serialize '{}': {}", BOOKS_KEY, e)))?;
        self.storage.set(BOOKS_KEY, &raw)?;
        self.bus.emit(Signal::ProspectBooksChanged);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ProspectBook> {
        self.load().remove(&normalize_name(name))
    }

    /// All books, most recently updated first.
    pub fn list(&self) -> Vec<ProspectBook> {
        let mut books: Vec<ProspectBook> = self.load().into_values().collect();
        books.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        books
    }

    /// Create-or-mutate the book under `name`'s normalized key.
    ///
    /// `created_at` is fixed when the record first appears; `updated_at`
    /// refreshes on every call.
    pub fn upsert(
        &self,
        name: &str,
        mutate: impl FnOnce(&mut ProspectBook),
    ) -> Result<ProspectBook, CoreError> {
        let key = normalize_name(name);
        let mut books = self.load();
        let now = now_rfc3339();

        let book = books.entry(key).or_insert_with(|| ProspectBook {
            display_name: name.trim().to_string(),
            created_at: now.clone(),
            ..Default::default()
        });
        mutate(book);
        book.updated_at = now;
        let updated = book.clone();

        self.persist(&books)?;
        Ok(updated)
    }

    /// Remove the book under `name`. Sentinel `None` (logged) when absent.
    pub fn remove(&self, name: &str) -> Result<Option<ProspectBook>, CoreError> {
        let key = normalize_name(name);
        let mut books = self.load();
        match books.remove(&key) {
            None => {
                log::warn!("Remove on '{}' missed key {}", BOOKS_KEY, key);
                Ok(None)
            }
            Some(removed) => {
                self.persist(&books)?;
                Ok(Some(removed))
            }
        }
    }
}

// =============================================================================
// Collaboration side effects
// =============================================================================

impl Stores {
    /// Append a comment to a prospect book and notify every roster member
    /// the comment mentions, excluding the author.
    pub fn comment_on_book(
        &self,
        prospect: &str,
        author: &str,
        text: &str,
        roster: &[TeamMember],
    ) -> Result<ProspectBook, CoreError> {
        let comment = Comment {
            id: new_id("cmt"),
            author: author.to_string(),
            text: text.to_string(),
            created_at: now_rfc3339(),
        };
        let book = self
            .books
            .upsert(prospect, |b| b.comments.push(comment))?;

        let link = format!("prospects/{}", normalize_name(prospect));
        for member in resolve_mentions(text, roster) {
            if member.name.eq_ignore_ascii_case(author) {
                continue;
            }
            self.notifications.notify(
                NotificationKind::Mention,
                author,
                &format!(
                    "{} mentioned you in a comment on {}",
                    author, book.display_name
                ),
                &link,
            )?;
        }

        Ok(book)
    }

    /// Share a prospect book with a team member and notify them.
    pub fn share_book(
        &self,
        prospect: &str,
        actor: &str,
        member: &TeamMember,
        role: &str,
    ) -> Result<ProspectBook, CoreError> {
        let book = self.books.upsert(prospect, |b| {
            if let Some(entry) = b.shared_with.iter_mut().find(|e| e.user == member.name) {
                entry.role = role.to_string();
            } else {
                b.shared_with.push(ShareEntry {
                    user: member.name.clone(),
                    role: role.to_string(),
                });
            }
        })?;

        if !member.name.eq_ignore_ascii_case(actor) {
            self.notifications.notify(
                NotificationKind::Share,
                actor,
                &format!("{} shared {} with you", actor, book.display_name),
                &format!("prospects/{}", normalize_name(prospect)),
            )?;
        }

        Ok(book)
    }
}
