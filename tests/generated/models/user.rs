//! `users` rows. Generated by tablegen; do not edit.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, Statement, ToSql, params, params_from_iter};

use crate::models::converters::{optional_date_from_sql, optional_date_to_sql};
use crate::models::utils::{DatabaseError, Slot, insert_statement};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    id: Slot<Option<i64>>,
    email: Slot<String>,
    born: Slot<Option<NaiveDate>>,
    score: Slot<Option<f64>>,
}

impl User {
    pub const TABLE: &str = "users";
    pub const COLUMNS: [&str; 4] = ["id", "email", "born", "score"];
    pub const DELETE: &str = "DELETE FROM users WHERE id IS ?";

    pub fn new(id: Option<i64>, email: String, born: Option<NaiveDate>, score: Option<f64>) -> Self {
        Self {
            id: Slot::Set(id),
            email: Slot::Set(email),
            born: Slot::Set(born),
            score: Slot::Set(score),
        }
    }

    pub fn id(&self) -> Result<&Option<i64>, DatabaseError> {
        self.id.get("id")
    }

    pub fn set_id(&mut self, value: Option<i64>) {
        self.id = Slot::Set(value);
    }

    pub fn email(&self) -> Result<&String, DatabaseError> {
        self.email.get("email")
    }

    pub fn set_email(&mut self, value: String) {
        self.email = Slot::Set(value);
    }

    pub fn born(&self) -> Result<&Option<NaiveDate>, DatabaseError> {
        self.born.get("born")
    }

    pub fn set_born(&mut self, value: Option<NaiveDate>) {
        self.born = Slot::Set(value);
    }

    pub fn score(&self) -> Result<&Option<f64>, DatabaseError> {
        self.score.get("score")
    }

    pub fn set_score(&mut self, value: Option<f64>) {
        self.score = Slot::Set(value);
    }

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Slot::Set(row.get(0)?),
            email: Slot::Set(row.get(1)?),
            born: Slot::Set(optional_date_from_sql(2, row.get(2)?)?),
            score: Slot::Set(row.get(3)?),
        })
    }

    /// Insert the fields that are set and reload `self` from the stored row.
    pub fn insert(&mut self, conn: &Connection) -> Result<(), DatabaseError> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Slot::Set(value) = &self.id {
            columns.push(Self::COLUMNS[0]);
            values.push(Box::new(value.clone()));
        }
        if let Slot::Set(value) = &self.email {
            columns.push(Self::COLUMNS[1]);
            values.push(Box::new(value.clone()));
        }
        if let Slot::Set(value) = &self.born {
            columns.push(Self::COLUMNS[2]);
            values.push(Box::new(optional_date_to_sql(value)));
        }
        if let Slot::Set(value) = &self.score {
            columns.push(Self::COLUMNS[3]);
            values.push(Box::new(value.clone()));
        }
        let sql = insert_statement(Self::TABLE, &columns, &Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let row = rows.next()?.ok_or(DatabaseError::NoRow(sql.clone()))?;
        *self = Self::from_row(row)?;
        Ok(())
    }

    /// Delete the row with this primary key, returning the number of rows removed.
    pub fn delete(&self, conn: &Connection) -> Result<usize, DatabaseError> {
        let deleted = conn.execute(Self::DELETE, params![self.id()?])?;
        Ok(deleted)
    }

    pub const BY_EMAIL: &str = "SELECT id, email, born, score FROM users WHERE email = ?";

    pub fn by_email(conn: &Connection, email: String) -> Result<Option<Self>, DatabaseError> {
        let found = conn
            .query_row(Self::BY_EMAIL, params![&email], |row| {
                Ok(Self {
                    id: Slot::Set(row.get(0)?),
                    email: Slot::Set(row.get(1)?),
                    born: Slot::Set(optional_date_from_sql(2, row.get(2)?)?),
                    score: Slot::Set(row.get(3)?),
                })
            })
            .optional()?;
        Ok(found)
    }

    pub const BY_ID: &str = "SELECT id, email, born, score FROM users WHERE id IS ?";

    pub fn by_id(conn: &Connection, id: Option<i64>) -> Result<Option<Self>, DatabaseError> {
        let found = conn
            .query_row(Self::BY_ID, params![&id], |row| {
                Ok(Self {
                    id: Slot::Set(row.get(0)?),
                    email: Slot::Set(row.get(1)?),
                    born: Slot::Set(optional_date_from_sql(2, row.get(2)?)?),
                    score: Slot::Set(row.get(3)?),
                })
            })
            .optional()?;
        Ok(found)
    }

    pub const GET: &str = "SELECT id, email, born, score FROM users";

    /// Rows of [`Self::GET`], read lazily from a statement prepared with it.
    pub fn get<'s>(stmt: &'s mut Statement<'_>) -> Result<impl Iterator<Item = rusqlite::Result<Self>> + 's, DatabaseError> {
        let rows = stmt.query_map(params![], |row| {
            Ok(Self {
                id: Slot::Set(row.get(0)?),
                email: Slot::Set(row.get(1)?),
                born: Slot::Set(optional_date_from_sql(2, row.get(2)?)?),
                score: Slot::Set(row.get(3)?),
            })
        })?;
        Ok(rows)
    }
}
