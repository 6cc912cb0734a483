use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Contacto {
    pub id: Option<i64>,
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub vehiculo: Option<String>,
    pub servicios: Option<String>,
    pub resumen: Option<String>,
    #[serde(default)]
    pub origen: String,
    pub cliente_id: Option<i64>,
    pub created_at: Option<String>,
}

/// Lo que se pudo deducir de una conversación de WhatsApp
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ResumenWhatsapp {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub anio: Option<i32>,
    pub servicios: Vec<String>,
    pub resumen: String,
    pub mensajes: usize,
}

impl ResumenWhatsapp {
    /// "Nissan Versa 2018", o None si no se detectó la marca
    pub fn vehiculo(&self) -> Option<String> {
        let marca = self.marca.as_ref()?;
        let mut partes = vec![marca.clone()];
        if let Some(modelo) = &self.modelo {
            partes.push(modelo.clone());
        }
        if let Some(anio) = self.anio {
            partes.push(anio.to_string());
        }
        Some(partes.join(" "))
    }
}
