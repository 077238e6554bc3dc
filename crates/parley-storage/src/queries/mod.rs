// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the shared [`Database`](crate::Database) connection.

pub mod messages;
