use uuid::Uuid;

/// An account allowed to sign in to the admin panel.
#[derive(Clone, Debug)]
pub struct AdminUser {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The address the user signs in with.
    pub email: String,
    /// The Argon2id PHC string of the user's password.
    pub password_hash: String,
    /// The role copied into every session issued for this user.
    pub role: String,
    /// Whether the user may sign in.
    pub is_active: bool,
}
