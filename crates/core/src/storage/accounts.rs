//! Auth account storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::instrument;

use super::parse::{parse_datetime, parse_datetime_opt, OptionalExt};
use crate::error::Result;
use crate::models::UserId;

/// A local sign-in account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: UserId::generate(),
            email,
            password_hash,
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

pub struct AccountStore<'a> {
    conn: &'a Connection,
}

impl<'a> AccountStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new account
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub fn create(&self, account: &Account) -> Result<()> {
        self.conn.execute(
            "INSERT INTO accounts (id, email, password_hash, created_at, last_login) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.id.as_str(),
                account.email,
                account.password_hash,
                account.created_at.to_rfc3339(),
                account.last_login.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Find account by email
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, password_hash, created_at, last_login FROM accounts WHERE email = ?1",
        )?;

        let account = stmt
            .query_row(params![email], |row| {
                Ok(Account {
                    id: UserId::new(row.get::<_, String>(0)?),
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?)?,
                    last_login: parse_datetime_opt(row.get::<_, Option<String>>(4)?)?,
                })
            })
            .optional()?;

        Ok(account)
    }

    /// Update last login time
    pub fn update_last_login(&self, id: &UserId) -> Result<()> {
        self.conn.execute(
            "UPDATE accounts SET last_login = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id.as_str()],
        )?;
        Ok(())
    }
}
