//! Ciclos fijos de estado. Un clic en la etiqueta avanza al siguiente
//! estado; el último regresa al primero.

pub const CICLO_COTIZACION: &[&str] = &[
    "PENDIENTE",
    "APROBADA",
    "EN_PROCESO",
    "TERMINADA",
    "ENTREGADA",
];

pub const CICLO_VEHICULO: &[&str] = &["RECIBIDO", "EN_REPARACION", "LISTO", "ENTREGADO"];

pub const CICLO_ORDEN: &[&str] = &["PENDIENTE", "EN_PROCESO", "TERMINADA"];

/// Siguiente estado del ciclo. Un estado desconocido pasa al primero.
pub fn siguiente(ciclo: &[&'static str], actual: &str) -> &'static str {
    match ciclo.iter().position(|e| *e == actual) {
        Some(i) => ciclo[(i + 1) % ciclo.len()],
        None => ciclo[0],
    }
}

pub fn es_valido(ciclo: &[&str], estado: &str) -> bool {
    ciclo.contains(&estado)
}

/// Texto para mostrar en etiquetas y documentos
pub fn etiqueta(estado: &str) -> &'static str {
    match estado {
        "PENDIENTE" => "Pendiente",
        "APROBADA" => "Aprobada",
        "EN_PROCESO" => "En proceso",
        "TERMINADA" => "Terminada",
        "ENTREGADA" => "Entregada",
        "RECIBIDO" => "Recibido",
        "EN_REPARACION" => "En reparación",
        "LISTO" => "Listo para entrega",
        "ENTREGADO" => "Entregado",
        _ => "Sin estado",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avanza_y_da_la_vuelta() {
        assert_eq!(siguiente(CICLO_COTIZACION, "PENDIENTE"), "APROBADA");
        assert_eq!(siguiente(CICLO_COTIZACION, "ENTREGADA"), "PENDIENTE");
        assert_eq!(siguiente(CICLO_VEHICULO, "LISTO"), "ENTREGADO");
        assert_eq!(siguiente(CICLO_VEHICULO, "ENTREGADO"), "RECIBIDO");
        assert_eq!(siguiente(CICLO_ORDEN, "TERMINADA"), "PENDIENTE");
    }

    #[test]
    fn estado_desconocido_va_al_primero() {
        assert_eq!(siguiente(CICLO_COTIZACION, "CANCELADA"), "PENDIENTE");
        assert_eq!(siguiente(CICLO_VEHICULO, ""), "RECIBIDO");
        assert!(!es_valido(CICLO_ORDEN, "LISTO"));
    }

    #[test]
    fn cada_estado_tiene_etiqueta() {
        for estado in CICLO_COTIZACION.iter().chain(CICLO_VEHICULO).chain(CICLO_ORDEN) {
            assert_ne!(etiqueta(estado), "Sin estado", "{}", estado);
        }
    }
}
