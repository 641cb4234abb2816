//! Member business operations on top of the record store and upload store.
//!
//! `id` is the canonical identity. `github_username` is an ordinary attribute
//! that `find` also accepts as a fallback lookup key.

use std::collections::HashSet;

use crate::errors::AppError;
use crate::models::{Member, MemberForm};
use crate::store::RecordStore;
use crate::uploads::{self, UploadStore};

/// Length of generated member ids.
pub const ID_LENGTH: usize = 8;

/// Member operations. Every mutation reloads the document, applies the
/// change and rewrites the whole collection.
#[derive(Debug, Clone)]
pub struct MemberService {
    store: RecordStore,
    uploads: UploadStore,
}

impl MemberService {
    pub fn new(store: RecordStore, uploads: UploadStore) -> Self {
        Self { store, uploads }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// All members in document order.
    pub fn list(&self) -> Vec<Member> {
        self.store.load()
    }

    /// Find a member by id, falling back to github username.
    pub fn find(&self, key: &str) -> Option<Member> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(member) = self.store.load_by_id().remove(key) {
            return Some(member);
        }
        find_member(&self.store.load(), key).cloned()
    }

    /// Create a member from a form submission.
    ///
    /// The new record gets a fresh id and an empty portfolio; submitted
    /// portfolio rows are ignored until the first update.
    pub fn create(&self, form: &MemberForm) -> Result<Member, AppError> {
        check_attachment(form)?;

        let mut members = self.store.load();
        let mut member = Member {
            id: unique_member_id(&members),
            ..Default::default()
        };
        apply_fields(&mut member, form);

        let fresh = match &form.attachment {
            Some(attachment) => Some(self.uploads.store(&attachment.bytes, &attachment.filename)?),
            None => None,
        };
        if let Some(name) = &fresh {
            member.portfolio_file = name.clone();
        }

        members.push(member.clone());
        self.persist(&members, fresh.as_deref())?;

        tracing::info!("Created member {}", member.id);
        Ok(member)
    }

    /// Replace a member's fields from a form submission.
    ///
    /// Scalars are overwritten (missing means empty), `role`/`major` keep
    /// their stored value when nothing was submitted, and the portfolio is
    /// rebuilt wholesale. A superseded attachment is deleted only after the
    /// document has been saved.
    pub fn update(&self, id: &str, form: &MemberForm) -> Result<Member, AppError> {
        let mut members = self.store.load();
        let index = members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        check_attachment(form)?;

        let mut member = members[index].clone();
        apply_fields(&mut member, form);

        let previous = member.portfolio_file.clone();
        let mut fresh = None;
        let mut superseded = None;
        if form.remove_file && !previous.is_empty() {
            member.portfolio_file.clear();
            superseded = Some(previous);
        } else if let Some(attachment) = &form.attachment {
            let name = self.uploads.store(&attachment.bytes, &attachment.filename)?;
            member.portfolio_file = name.clone();
            fresh = Some(name);
            if !previous.is_empty() {
                superseded = Some(previous);
            }
        }

        member.portfolio = form.portfolio_entries();

        members[index] = member.clone();
        self.persist(&members, fresh.as_deref())?;

        if let Some(old) = superseded {
            self.uploads.remove(&old);
        }

        tracing::info!("Updated member {}", member.id);
        Ok(member)
    }

    /// Give every record without an id (or with a duplicate one) a fresh id.
    /// Returns how many records changed; the document is only rewritten when
    /// that is non-zero.
    pub fn migrate_identities(&self) -> Result<usize, AppError> {
        let mut members = self.store.load();
        let mut seen: HashSet<String> = HashSet::new();
        let mut assigned = 0;

        for i in 0..members.len() {
            let id = members[i].id.trim().to_string();
            if !id.is_empty() && seen.insert(id.clone()) {
                continue;
            }
            if !id.is_empty() {
                tracing::warn!("Duplicate member id {}, assigning a new one", id);
            }
            let fresh = unique_member_id(&members);
            seen.insert(fresh.clone());
            members[i].id = fresh;
            assigned += 1;
        }

        if assigned > 0 {
            self.store.save(&members)?;
            tracing::info!("Assigned ids to {} member records", assigned);
        }
        Ok(assigned)
    }

    /// Save the collection; if that fails, drop an attachment stored for
    /// this request so it is not orphaned.
    fn persist(&self, members: &[Member], fresh: Option<&str>) -> Result<(), AppError> {
        if let Err(e) = self.store.save(members) {
            if let Some(name) = fresh {
                self.uploads.remove(name);
            }
            return Err(e);
        }
        Ok(())
    }
}

/// First member whose id matches `key`, else the first whose github username does.
pub fn find_member<'a>(members: &'a [Member], key: &str) -> Option<&'a Member> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    members.iter().find(|m| m.id == key).or_else(|| {
        members
            .iter()
            .find(|m| !m.github_username.is_empty() && m.github_username == key)
    })
}

/// A short random id not already used in `members`.
pub fn unique_member_id(members: &[Member]) -> String {
    loop {
        let candidate = new_member_id();
        if !members.iter().any(|m| m.id == candidate) {
            return candidate;
        }
    }
}

fn new_member_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ID_LENGTH);
    id
}

fn check_attachment(form: &MemberForm) -> Result<(), AppError> {
    match &form.attachment {
        Some(attachment) if !uploads::is_allowed(&attachment.filename) => {
            Err(AppError::Validation(format!(
                "File type not allowed: {} (allowed: {})",
                attachment.filename,
                uploads::ALLOWED_EXTENSIONS.join(", ")
            )))
        }
        _ => Ok(()),
    }
}

fn apply_fields(member: &mut Member, form: &MemberForm) {
    member.name = form.name.trim().to_string();
    member.english_name = form.english_name.trim().to_string();
    member.intro = form.intro.trim().to_string();
    member.phone = form.phone.trim().to_string();
    member.email = form.email.trim().to_string();
    member.github_username = form.github_username.trim().to_string();
    member.portfolio_link = form.portfolio_link.trim().to_string();

    if let Some(role) = form.role.resolve() {
        member.role = role;
    }
    if let Some(major) = form.major.resolve() {
        member.major = major;
    }

    member.github_profile = Member::github_profile_for(&member.github_username);
}
