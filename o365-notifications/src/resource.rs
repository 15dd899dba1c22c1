//! Subscribable mailbox resources.
//!
//! A subscription targets a resource URL. [`Subscribable`] is the seam that
//! turns a typed resource into that URL; the resolved URL is also the
//! resource's identity inside the subscription registry, so two values that
//! resolve to the same URL are the same resource.

/// A resource that can be subscribed to for change notifications.
pub trait Subscribable {
    /// Absolute URL of the resource's change collection.
    fn resource_url(&self) -> String;
}

impl Subscribable for str {
    fn resource_url(&self) -> String {
        self.to_string()
    }
}

impl Subscribable for String {
    fn resource_url(&self) -> String {
        self.clone()
    }
}

/// A mail folder in a user's mailbox.
///
/// Resolves to the folder's message collection, e.g.
/// `https://outlook.office.com/api/beta/me/mailfolders('inbox')/messages`.
/// The root form addresses every message in the mailbox regardless of
/// folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailFolder {
    mailbox_url: String,
    folder_id: Option<String>,
}

impl MailFolder {
    /// Address one folder by id or well-known name (e.g. "inbox").
    pub fn new(mailbox_url: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            mailbox_url: mailbox_url.into(),
            folder_id: Some(folder_id.into()),
        }
    }

    /// Address every message in the mailbox.
    pub fn root(mailbox_url: impl Into<String>) -> Self {
        Self {
            mailbox_url: mailbox_url.into(),
            folder_id: None,
        }
    }

    /// The user's inbox.
    pub fn inbox(mailbox_url: impl Into<String>) -> Self {
        Self::new(mailbox_url, "inbox")
    }
}

impl Subscribable for MailFolder {
    fn resource_url(&self) -> String {
        let base = self.mailbox_url.trim_end_matches('/');
        match &self.folder_id {
            Some(id) => format!("{}/mailfolders('{}')/messages", base, id),
            None => format!("{}/messages", base),
        }
    }
}
