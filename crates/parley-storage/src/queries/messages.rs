// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log queries.

use std::str::FromStr;

use parley_core::types::{Direction, Message, MessageId};
use parley_core::ParleyError;
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{map_tr_err, Database};

/// Canonical log order: timestamp first, insertion sequence for ties.
const SELECT_ORDERED: &str = "SELECT id, content, direction, sent_at_millis
     FROM messages
     ORDER BY sent_at_millis ASC, seq ASC";

/// Append a message to the log.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ParleyError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, content, direction, sent_at_millis)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    msg.id.as_str(),
                    msg.content,
                    msg.direction.to_string(),
                    msg.sent_at_millis,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Every message in canonical order.
pub async fn list_messages(db: &Database) -> Result<Vec<Message>, ParleyError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(SELECT_ORDERED)?;
            let rows = stmt.query_map([], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored messages.
pub async fn count_messages(db: &Database) -> Result<i64, ParleyError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let direction: String = row.get(2)?;
    let direction = Direction::from_str(&direction)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Message {
        id: MessageId(row.get(0)?),
        content: row.get(1)?,
        direction,
        sent_at_millis: row.get(3)?,
    })
}
