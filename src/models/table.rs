//! Backend table identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::utils::errors::StageLightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Events,
    Gallery,
    TeamMembers,
    Messages,
    AdminUsers,
    Departments,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Events,
        Table::Gallery,
        Table::TeamMembers,
        Table::Messages,
        Table::AdminUsers,
        Table::Departments,
    ];

    /// Name of the table in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Events => "events",
            Table::Gallery => "gallery",
            Table::TeamMembers => "team_members",
            Table::Messages => "messages",
            Table::AdminUsers => "admin_users",
            Table::Departments => "departments",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = StageLightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| StageLightError::InvalidInput(format!("Unknown table: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
        assert!("users".parse::<Table>().is_err());
    }
}
