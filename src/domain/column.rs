use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of columns a card can live in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Todo => "TODO",
            Column::InProgress => "IN_PROGRESS",
            Column::Done => "DONE",
        }
    }

    pub fn all() -> &'static [Column] {
        &[Column::Todo, Column::InProgress, Column::Done]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(Column::Todo),
            "IN_PROGRESS" => Ok(Column::InProgress),
            "DONE" => Ok(Column::Done),
            _ => Err(format!(
                "Invalid column: {}. Expected one of: {}",
                s,
                Column::all()
                    .iter()
                    .map(Column::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!("TODO".parse::<Column>(), Ok(Column::Todo));
        assert_eq!("IN_PROGRESS".parse::<Column>(), Ok(Column::InProgress));
        assert_eq!("DONE".parse::<Column>(), Ok(Column::Done));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "todo".parse::<Column>().unwrap_err();
        assert!(err.contains("Invalid column: todo"));
        assert!(err.contains("IN_PROGRESS"));
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&Column::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: Column = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(back, Column::Done);
    }

    #[test]
    fn display_matches_as_str() {
        for column in Column::all() {
            assert_eq!(column.to_string(), column.as_str());
        }
    }
}
