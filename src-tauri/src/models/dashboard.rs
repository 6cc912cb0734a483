use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ResumenDashboard {
    pub clientes_activos: i64,
    pub cotizaciones_pendientes: i64,
    pub vehiculos_en_taller: i64,
    pub ingresos_mes: f64,
    pub saldo_por_cobrar: f64,
    pub notificaciones_no_leidas: i64,
    pub intervalo_refresco_seg: u64,
}
