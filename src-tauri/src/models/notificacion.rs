use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notificacion {
    pub id: Option<i64>,
    pub tipo: String,
    pub titulo: String,
    pub mensaje: Option<String>,
    pub entidad: Option<String>,
    pub entidad_id: Option<i64>,
    #[serde(default)]
    pub leida: bool,
    pub created_at: Option<String>,
}
