// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed columns and filters for table queries.
//!
//! Each table gets its own column enum, so a filter on `personal_records`
//! can only name columns that exist there.

/// A column of one table.
pub trait Column: Copy {
    fn name(self) -> &'static str;
}

/// Filterable columns of `personal_records`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordColumn {
    Id,
    UserId,
    DateAchieved,
}

impl Column for RecordColumn {
    fn name(self) -> &'static str {
        match self {
            RecordColumn::Id => "id",
            RecordColumn::UserId => "user_id",
            RecordColumn::DateAchieved => "date_achieved",
        }
    }
}

/// Filterable columns of `profiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileColumn {
    Id,
}

impl Column for ProfileColumn {
    fn name(self) -> &'static str {
        match self {
            ProfileColumn::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality filters plus an optional ordering, rendered as PostgREST query
/// parameters.
#[derive(Debug, Clone)]
pub struct Filters<C: Column> {
    eq: Vec<(C, String)>,
    order: Option<(C, Direction)>,
}

impl<C: Column> Default for Filters<C> {
    fn default() -> Self {
        Self {
            eq: Vec::new(),
            order: None,
        }
    }
}

impl<C: Column> Filters<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: C, value: impl ToString) -> Self {
        self.eq.push((column, value.to_string()));
        self
    }

    /// Rows with a null in `column` are placed last.
    pub fn order_by(mut self, column: C, direction: Direction) -> Self {
        self.order = Some((column, direction));
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.eq.is_empty()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .eq
            .iter()
            .map(|(column, value)| (column.name().to_string(), format!("eq.{}", value)))
            .collect();

        if let Some((column, direction)) = self.order {
            let dir = match direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push((
                "order".to_string(),
                format!("{}.{}.nullslast", column.name(), dir),
            ));
        }

        params
    }
}
