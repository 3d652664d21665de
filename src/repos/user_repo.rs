/*
 * Responsibility
 * - 起動時に seed される固定ユーザー一覧 (credential store)
 * - login 検証のみに使う。起動後は read-only なのでロック不要
 */

/// Seeded user record.
///
/// Passwords are stored and compared in plaintext, exactly like the system
/// this mirrors. Known weakness, intentionally not hardened here.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct UserRepo {
    users: Vec<User>,
}

impl UserRepo {
    pub fn seeded() -> Self {
        Self {
            users: vec![
                User {
                    id: 1,
                    username: "user1".to_string(),
                    password: "password1".to_string(),
                },
                User {
                    id: 2,
                    username: "user2".to_string(),
                    password: "password2".to_string(),
                },
            ],
        }
    }

    /// Exact, case-sensitive match on both fields. No lockout, no attempt
    /// counting.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }
}
