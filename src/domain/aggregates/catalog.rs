//! Category and region reference rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category { pub id: i64, pub name: String, pub slug: String, pub created_at: DateTime<Utc> }

/// Sales region a product is listed in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region { pub id: i64, pub name: String, pub slug: String, pub currency: String, pub created_at: DateTime<Utc> }
