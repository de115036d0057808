//! User — the account that owns graphs, votes, and progress marks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. The password hash is an argon2 PHC string and is
/// never serialised into API responses; handlers expose [`UserRef`] instead.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub password_hash: String,
}

impl User {
  /// The public projection of this account.
  pub fn as_ref_view(&self) -> UserRef {
    UserRef {
      id:       self.user_id,
      username: self.username.clone(),
    }
  }
}

/// Input to [`crate::store::GraphStore::add_user`]. The caller is expected
/// to have hashed the password already; the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}

/// Public identity attached to graphs and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
  pub id:       Uuid,
  pub username: String,
}
