/// Authentication and access control for SiteDesk
///
/// # Modules
///
/// - `jwt`: Bearer-token validation at the identity boundary
/// - `identity`: The resolved caller identity threaded through handlers
/// - `access`: Project access-control evaluator and role requirements

pub mod access;
pub mod identity;
pub mod jwt;
