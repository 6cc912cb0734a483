use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cotizacion {
    pub id: Option<i64>,
    pub folio: String,
    pub cliente_id: i64,
    pub cliente_nombre: Option<String>,
    pub vehiculo_marca: Option<String>,
    pub vehiculo_modelo: Option<String>,
    pub vehiculo_anio: Option<i64>,
    pub placas: Option<String>,
    pub descripcion: Option<String>,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub anticipo: f64,
    pub pago1: f64,
    pub liquidacion: f64,
    pub saldo_pendiente: f64,
    pub estado: String,
    pub notas: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConceptoCotizacion {
    pub id: Option<i64>,
    pub descripcion: String,
    pub cantidad: f64,
    pub precio_unitario: f64,
    #[serde(default)]
    pub importe: f64,
}

/// Datos capturados en el formulario de cotización
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NuevaCotizacion {
    pub cliente_id: i64,
    pub vehiculo_marca: Option<String>,
    pub vehiculo_modelo: Option<String>,
    pub vehiculo_anio: Option<i64>,
    pub placas: Option<String>,
    pub descripcion: Option<String>,
    pub conceptos: Vec<ConceptoCotizacion>,
    #[serde(default)]
    pub anticipo: f64,
    #[serde(default)]
    pub pago1: f64,
    #[serde(default)]
    pub liquidacion: f64,
    pub notas: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CotizacionCompleta {
    pub cotizacion: Cotizacion,
    pub conceptos: Vec<ConceptoCotizacion>,
    pub cliente_telefono: Option<String>,
    pub cliente_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FiltroCotizaciones {
    pub estado: Option<String>,
    pub cliente_id: Option<i64>,
    pub busqueda: Option<String>,
    #[serde(default)]
    pub solo_con_saldo: bool,
}
