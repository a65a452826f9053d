//! Modelos de listas (whitelist / blacklist) y sus miembros

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Nombre de la whitelist creada por la migración
pub const DEFAULT_WHITELIST: &str = "default_whitelist";
/// Nombre de la blacklist creada por la migración
pub const DEFAULT_BLACKLIST: &str = "default_blacklist";

/// Tipo de lista - se guarda como TEXT ('WHITELIST' / 'BLACKLIST')
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListType {
    Whitelist,
    Blacklist,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Whitelist => "WHITELIST",
            ListType::Blacklist => "BLACKLIST",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WHITELIST" => Ok(ListType::Whitelist),
            "BLACKLIST" => Ok(ListType::Blacklist),
            other => Err(format!("unknown list type '{}'", other)),
        }
    }
}

/// List - mapea la tabla lists
#[derive(Debug, Clone, FromRow)]
pub struct List {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub list_type: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Membresía de una matrícula en una lista - mapea list_items
#[derive(Debug, Clone, FromRow)]
pub struct ListItem {
    pub list_id: i64,
    pub plate_id: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Coincidencia de una matrícula con una lista
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ListHit {
    pub list_id: i64,
    pub list_name: String,
    pub list_type: String,
}

impl ListHit {
    pub fn kind(&self) -> Option<ListType> {
        self.list_type.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_type_round_trip_through_text() {
        assert_eq!("WHITELIST".parse::<ListType>(), Ok(ListType::Whitelist));
        assert_eq!("blacklist".parse::<ListType>(), Ok(ListType::Blacklist));
        assert!("greylist".parse::<ListType>().is_err());
        assert_eq!(ListType::Blacklist.to_string(), "BLACKLIST");
    }

    #[test]
    fn test_list_hit_kind() {
        let hit = ListHit {
            list_id: 2,
            list_name: DEFAULT_BLACKLIST.to_string(),
            list_type: "BLACKLIST".to_string(),
        };
        assert_eq!(hit.kind(), Some(ListType::Blacklist));
    }
}
