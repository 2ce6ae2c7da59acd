/// API route handlers
///
/// One module per resource, all sharing the uniform handler shape:
/// validate the payload, authorize through the access evaluator, perform
/// the persistence call, optionally dispatch notifications, and wrap the
/// result in the JSON envelope.
///
/// - `health`: Health check endpoint (public)
/// - `projects`: Project CRUD and the accessible-projects listing
/// - `project_members`: Membership management
/// - `tasks` / `subtasks`: Work items
/// - `documents`: Version-chain uploads, history, and latest listings
/// - `city_approvals` / `corrections`: Municipal review workflows
/// - `messages`: Project message board
/// - `notifications` / `notification_preferences`: In-app notifications
/// - `users`: Company user management

pub mod city_approvals;
pub mod corrections;
pub mod documents;
pub mod health;
pub mod messages;
pub mod notification_preferences;
pub mod notifications;
pub mod project_members;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;
