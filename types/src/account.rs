use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// A user account as shown on the admin pages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub id: String,
    pub email: String,
    pub birthday: Option<Timestamp>,
}

/// A parent or caregiver linked to one or more students.
pub type Guardian = Account;

/// A learner linked to a guardian.
pub type Student = Account;

impl TryFrom<Document> for Account {
    type Error = &'static str;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let id = doc
            .get_string("userID")
            .unwrap_or_else(|| doc.document_id());
        if id.is_empty() {
            return Err("missing id");
        }

        Ok(Self {
            id: id.to_string(),
            name: doc.get_string("name").ok_or("missing name")?.to_string(),
            email: doc.get_string("email").unwrap_or_default().to_string(),
            birthday: doc.get_timestamp("birthday"),
        })
    }
}
