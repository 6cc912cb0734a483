use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Cliente {
    pub id: Option<i64>,
    pub nombre: String,
    pub telefono: String,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub rfc: Option<String>,
    pub notas: Option<String>,
    #[serde(default = "activo_por_defecto")]
    pub activo: bool,
    pub created_at: Option<String>,
}

fn activo_por_defecto() -> bool {
    true
}

/// Todo lo registrado a nombre de un cliente
#[derive(Debug, Serialize, Deserialize)]
pub struct HistorialCliente {
    pub cliente: Cliente,
    pub cotizaciones: Vec<crate::models::Cotizacion>,
    pub vehiculos: Vec<crate::models::Vehiculo>,
    pub pagos: Vec<crate::models::Pago>,
    pub total_pagado: f64,
    pub saldo_pendiente: f64,
}
