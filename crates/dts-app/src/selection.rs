// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RowId;

/// At most one selected row. The id is not checked against the current
/// filter, so a selection can outlive the row's visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(RowId),
}

impl Selection {
    /// Selecting the current id clears it; any other id replaces it.
    pub fn select(&mut self, id: RowId) {
        *self = match self {
            Self::Selected(current) if *current == id => Self::Unselected,
            _ => Self::Selected(id),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::Unselected;
    }

    pub fn id(&self) -> Option<&RowId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.id() == Some(id)
    }
}
