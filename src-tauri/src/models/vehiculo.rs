use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vehiculo {
    pub id: Option<i64>,
    pub folio: String,
    pub cliente_id: i64,
    pub cliente_nombre: Option<String>,
    pub cotizacion_id: Option<i64>,
    pub marca: String,
    pub modelo: Option<String>,
    pub anio: Option<i64>,
    pub color: Option<String>,
    pub placas: Option<String>,
    pub kilometraje: Option<i64>,
    pub fecha_ingreso: Option<String>,
    pub fecha_entrega_estimada: Option<String>,
    pub fecha_entrega: Option<String>,
    #[serde(default)]
    pub estado: String,
    pub notas: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FiltroVehiculos {
    pub estado: Option<String>,
    pub busqueda: Option<String>,
    #[serde(default)]
    pub solo_en_taller: bool,
}

/// Trabajo de un área (hojalatería, pintura...) sobre un vehículo
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrdenTaller {
    pub id: Option<i64>,
    pub vehiculo_id: i64,
    pub area: String,
    pub descripcion: String,
    pub tecnico: Option<String>,
    #[serde(default)]
    pub costo: f64,
    #[serde(default)]
    pub estado: String,
    pub created_at: Option<String>,
}
