/// Notification and email dispatch
///
/// State transitions that concern other users (task assigned, document
/// uploaded, mention, approval status change) fan out through the
/// [`Notifier`]: one in-app notification row per recipient, written before
/// the response goes out, plus a best-effort email per recipient whose
/// preferences allow it.
///
/// The dispatch path never fails the triggering request. Row-insert and
/// preference-lookup errors are logged and swallowed; the email leg runs in
/// detached tasks and is never awaited by the handler.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sitedesk_shared::notify::{Notifier, NotificationEvent};
/// use sitedesk_shared::notify::email::NoopEmailProvider;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, assignee: Uuid) {
/// let notifier = Notifier::new(pool, Arc::new(NoopEmailProvider));
///
/// notifier.dispatch(NotificationEvent::TaskAssigned {
///     project_id,
///     task_title: "Pour foundation".to_string(),
///     assignee,
/// }).await;
/// # }
/// ```

pub mod email;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::notification::{
    CreateNotification, Notification, NotificationKind, NotificationPreferences,
};
use crate::models::user::User;
use email::{EmailProvider, OutboundEmail};

/// A state transition worth telling someone about
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A task was assigned
    TaskAssigned {
        project_id: Uuid,
        task_title: String,
        assignee: Uuid,
    },

    /// A document (version) was uploaded
    DocumentUploaded {
        project_id: Uuid,
        document_name: String,
        version: i32,
        recipients: Vec<Uuid>,
    },

    /// Users were mentioned in a message
    Mentioned {
        project_id: Uuid,
        sender_name: String,
        excerpt: String,
        mentioned: Vec<Uuid>,
    },

    /// A city approval changed status
    ApprovalStatusChanged {
        project_id: Uuid,
        approval_type: String,
        status: String,
        recipients: Vec<Uuid>,
    },
}

impl NotificationEvent {
    /// The notification kind this event produces
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::TaskAssigned { .. } => NotificationKind::TaskAssigned,
            NotificationEvent::DocumentUploaded { .. } => NotificationKind::DocumentUploaded,
            NotificationEvent::Mentioned { .. } => NotificationKind::Mention,
            NotificationEvent::ApprovalStatusChanged { .. } => NotificationKind::ApprovalStatus,
        }
    }

    /// The project the event belongs to
    pub fn project_id(&self) -> Uuid {
        match self {
            NotificationEvent::TaskAssigned { project_id, .. }
            | NotificationEvent::DocumentUploaded { project_id, .. }
            | NotificationEvent::Mentioned { project_id, .. }
            | NotificationEvent::ApprovalStatusChanged { project_id, .. } => *project_id,
        }
    }

    /// Who should hear about it
    pub fn recipients(&self) -> Vec<Uuid> {
        match self {
            NotificationEvent::TaskAssigned { assignee, .. } => vec![*assignee],
            NotificationEvent::DocumentUploaded { recipients, .. } => recipients.clone(),
            NotificationEvent::Mentioned { mentioned, .. } => mentioned.clone(),
            NotificationEvent::ApprovalStatusChanged { recipients, .. } => recipients.clone(),
        }
    }

    /// Notification headline
    pub fn title(&self) -> String {
        match self {
            NotificationEvent::TaskAssigned { task_title, .. } => {
                format!("Task assigned: {task_title}")
            }
            NotificationEvent::DocumentUploaded { document_name, version, .. } => {
                format!("Document uploaded: {document_name} (v{version})")
            }
            NotificationEvent::Mentioned { sender_name, .. } => {
                format!("{sender_name} mentioned you")
            }
            NotificationEvent::ApprovalStatusChanged { approval_type, status, .. } => {
                format!("{approval_type}: {status}")
            }
        }
    }

    /// Notification body, where the event carries one
    pub fn body(&self) -> Option<String> {
        match self {
            NotificationEvent::Mentioned { excerpt, .. } => Some(excerpt.clone()),
            _ => None,
        }
    }
}

/// Dispatches notification rows and best-effort emails
///
/// Held in the API state as `Arc<Notifier>`; `dispatch` is infallible from
/// the caller's point of view.
pub struct Notifier {
    pool: PgPool,
    email: Arc<dyn EmailProvider>,
}

impl Notifier {
    /// Creates a notifier over the given pool and email provider
    pub fn new(pool: PgPool, email: Arc<dyn EmailProvider>) -> Self {
        Self { pool, email }
    }

    /// Fans an event out to its recipients
    ///
    /// Never returns an error: every failure on this path is logged and
    /// swallowed so the triggering request cannot be affected.
    pub async fn dispatch(&self, event: NotificationEvent) {
        let kind = event.kind();
        let project_id = event.project_id();
        let title = event.title();
        let body = event.body();

        for user_id in event.recipients() {
            let created = Notification::create(
                &self.pool,
                CreateNotification {
                    user_id,
                    kind,
                    title: title.clone(),
                    body: body.clone(),
                    project_id: Some(project_id),
                },
            )
            .await;

            if let Err(e) = created {
                warn!(%user_id, kind = kind.as_str(), "Failed to create notification row: {e}");
                continue;
            }

            self.spawn_email(user_id, kind, title.clone(), body.clone()).await;
        }
    }

    /// Fires the email leg for one recipient without blocking the request
    ///
    /// Preference lookup failures fall back to defaults; a user with no
    /// stored preferences row gets emailed.
    async fn spawn_email(&self, user_id: Uuid, kind: NotificationKind, title: String, body: Option<String>) {
        let prefs = match NotificationPreferences::find_or_default(&self.pool, user_id).await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(%user_id, "Failed to load notification preferences, using defaults: {e}");
                NotificationPreferences::defaults_for(user_id)
            }
        };

        if !prefs.email_enabled(kind) {
            return;
        }

        let recipient = match User::find(&self.pool, user_id).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => return,
            Err(e) => {
                warn!(%user_id, "Failed to load email recipient: {e}");
                return;
            }
        };

        let email = OutboundEmail {
            to: recipient.email,
            subject: title,
            text: body.unwrap_or_default(),
        };

        let provider = Arc::clone(&self.email);
        tokio::spawn(async move {
            if let Err(e) = provider.send(&email).await {
                warn!(to = %email.to, "Email delivery failed: {e}");
            }
        });
    }
}
