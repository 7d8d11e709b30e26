//! Rows of the `emails` view. Generated by tablegen; do not edit.

use rusqlite::{Statement, params};

use crate::models::utils::DatabaseError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub user_id: Option<i64>,
    pub email: String,
}

impl Email {
    pub const VIEW: &str = "emails";

    pub fn new(user_id: Option<i64>, email: String) -> Self {
        Self {
            user_id,
            email,
        }
    }

    pub const BY_USER_ID: &str = "SELECT user_id, email FROM emails WHERE user_id IS ?";

    /// Rows of [`Self::BY_USER_ID`], read lazily from a statement prepared with it.
    pub fn by_user_id<'s>(stmt: &'s mut Statement<'_>, user_id: Option<i64>) -> Result<impl Iterator<Item = rusqlite::Result<Self>> + 's, DatabaseError> {
        let rows = stmt.query_map(params![&user_id], |row| {
            Ok(Self {
                user_id: row.get(0)?,
                email: row.get(1)?,
            })
        })?;
        Ok(rows)
    }

    pub const BY_EMAIL: &str = "SELECT user_id, email FROM emails WHERE email = ?";

    /// Rows of [`Self::BY_EMAIL`], read lazily from a statement prepared with it.
    pub fn by_email<'s>(stmt: &'s mut Statement<'_>, email: String) -> Result<impl Iterator<Item = rusqlite::Result<Self>> + 's, DatabaseError> {
        let rows = stmt.query_map(params![&email], |row| {
            Ok(Self {
                user_id: row.get(0)?,
                email: row.get(1)?,
            })
        })?;
        Ok(rows)
    }

    pub const GET: &str = "SELECT user_id, email FROM emails";

    /// Rows of [`Self::GET`], read lazily from a statement prepared with it.
    pub fn get<'s>(stmt: &'s mut Statement<'_>) -> Result<impl Iterator<Item = rusqlite::Result<Self>> + 's, DatabaseError> {
        let rows = stmt.query_map(params![], |row| {
            Ok(Self {
                user_id: row.get(0)?,
                email: row.get(1)?,
            })
        })?;
        Ok(rows)
    }
}
