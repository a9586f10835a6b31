//! Table descriptors for the staging and consolidated stores.
//!
//! Every table is described once as an ordered list of typed columns. The
//! same descriptor produces the `CREATE TABLE` statement, the insert
//! statement, and drives [`TableSchema::coerce`], the single routine that
//! turns raw string fields into bindable values for both the loader and the
//! consolidator.

use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::query::Query;

/// Declared SQLite type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Boolean,
    /// Stored as text, declared `DATETIME`.
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "DATETIME",
        }
    }

    /// Integers fall back to 0 when absent or unparseable; booleans are 1
    /// only for `TRUE`; everything else passes through as text.
    pub fn coerce(&self, raw: Option<String>) -> Value {
        match self {
            ColumnType::Integer => Value::Integer(
                raw.and_then(|s| s.trim().parse::<i64>().ok())
                    .unwrap_or(0),
            ),
            ColumnType::Boolean => Value::Integer(i64::from(raw.as_deref() == Some("TRUE"))),
            ColumnType::Text | ColumnType::Timestamp => Value::Text(raw),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
}

impl Column {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            primary_key: false,
        }
    }

    const fn key(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Integer,
            primary_key: true,
        }
    }

    fn definition(&self) -> String {
        if self.primary_key {
            format!("{} {} PRIMARY KEY", self.name, self.ty.sql())
        } else {
            format!("{} {}", self.name, self.ty.sql())
        }
    }
}

/// A coerced value ready to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(Option<String>),
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn create_sql(&self) -> String {
        let fields: Vec<String> = self.columns.iter().map(Column::definition).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            fields.join(", ")
        )
    }

    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(", "),
            placeholders
        )
    }

    /// Coerce one row. `field` is asked for each column by name, in order.
    pub fn coerce<F>(&self, mut field: F) -> Vec<Value>
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.columns
            .iter()
            .map(|c| c.ty.coerce(field(c.name)))
            .collect()
    }
}

/// Bind coerced values onto a prepared insert.
pub fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<Value>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Integer(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
        };
    }
    query
}

/// Staging table for question posts.
pub static STAGING_QUESTIONS: TableSchema = TableSchema {
    name: "questions",
    columns: &[
        Column::key("Id"),
        Column::new("AcceptedAnswerId", ColumnType::Integer),
        Column::new("CreationDate", ColumnType::Timestamp),
        Column::new("LastActivityDate", ColumnType::Timestamp),
        Column::new("Score", ColumnType::Integer),
        Column::new("ViewCount", ColumnType::Integer),
        Column::new("OwnerUserId", ColumnType::Integer),
        Column::new("OwnerDisplayName", ColumnType::Text),
        Column::new("Title", ColumnType::Text),
        Column::new("Tags", ColumnType::Text),
        Column::new("AnswerCount", ColumnType::Integer),
        Column::new("CommentCount", ColumnType::Integer),
        Column::new("FavoriteCount", ColumnType::Integer),
        Column::new("ClosedDate", ColumnType::Timestamp),
    ],
};

/// Staging table for answer posts.
pub static STAGING_ANSWERS: TableSchema = TableSchema {
    name: "answers",
    columns: &[
        Column::key("Id"),
        Column::new("ParentId", ColumnType::Integer),
        Column::new("CreationDate", ColumnType::Timestamp),
        Column::new("Score", ColumnType::Integer),
        Column::new("Body", ColumnType::Text),
        Column::new("OwnerUserId", ColumnType::Integer),
        Column::new("OwnerDisplayName", ColumnType::Text),
    ],
};

/// The consolidated question/answer table.
pub static CONSOLIDATED: TableSchema = TableSchema {
    name: "questions",
    columns: &[
        Column::key("Id"),
        Column::new("Source", ColumnType::Text),
        Column::new("SourceId", ColumnType::Integer),
        Column::new("Date", ColumnType::Timestamp),
        Column::new("Tags", ColumnType::Text),
        Column::new("Question", ColumnType::Text),
        Column::new("QuestionUser", ColumnType::Text),
        Column::new("Answer", ColumnType::Text),
        Column::new("AnswerUser", ColumnType::Text),
        Column::new("Reference", ColumnType::Text),
    ],
};
