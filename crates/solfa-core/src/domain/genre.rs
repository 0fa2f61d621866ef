use serde::{Deserialize, Serialize};

use crate::domain::ids::GenreId;

/// Un género musical del catálogo.
///
/// El nombre es único. Un género no puede borrarse mientras alguna canción lo
/// referencie; esa guarda la aplica el coordinador, no una FK de la base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
  pub id: GenreId,
  pub name: String,
}
