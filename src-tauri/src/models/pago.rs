use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pago {
    pub id: Option<i64>,
    pub cotizacion_id: Option<i64>,
    pub cliente_id: Option<i64>,
    pub concepto: String,
    pub monto: f64,
    pub metodo: String,
    pub referencia: Option<String>,
    pub notas: Option<String>,
    pub fecha: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FiltroPagos {
    pub cotizacion_id: Option<i64>,
    pub cliente_id: Option<i64>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ingreso {
    pub id: Option<i64>,
    pub concepto: String,
    pub monto: f64,
    #[serde(default)]
    pub categoria: String,
    pub pago_id: Option<i64>,
    pub fecha: Option<String>,
    pub notas: Option<String>,
}
