//! Root document holding the whole member collection.

use serde::{Deserialize, Serialize};

use super::{null_as_default, Member};

/// The persisted document: `{"members": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<Member>,
}

/// Borrowed form of [`MemberDocument`] used when writing.
#[derive(Debug, Serialize)]
pub struct MemberDocumentRef<'a> {
    pub members: &'a [Member],
}
