use crate::error::{Resultado, TallerError};
use crate::models::ConceptoCotizacion;
use serde::{Deserialize, Serialize};

/// Margen para comparar montos en pesos
pub const TOLERANCIA: f64 = 0.01;

pub fn redondear(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totales {
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
}

/// Subtotal = suma de importes; IVA sobre el subtotal
pub fn calcular_totales(conceptos: &[ConceptoCotizacion], iva_porcentaje: f64) -> Totales {
    let subtotal: f64 = conceptos
        .iter()
        .map(|c| c.cantidad * c.precio_unitario)
        .sum();
    let subtotal = redondear(subtotal);
    let iva = redondear(subtotal * iva_porcentaje / 100.0);
    Totales {
        subtotal,
        iva,
        total: redondear(subtotal + iva),
    }
}

/// Los tres campos de pago que lleva cada cotización
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampoPago {
    Anticipo,
    Pago1,
    Liquidacion,
}

impl CampoPago {
    pub fn desde_str(campo: &str) -> Option<Self> {
        match campo.trim().to_lowercase().as_str() {
            "anticipo" => Some(CampoPago::Anticipo),
            "pago1" | "pago_1" => Some(CampoPago::Pago1),
            "liquidacion" | "liquidación" => Some(CampoPago::Liquidacion),
            _ => None,
        }
    }

    /// Columna en la tabla cotizaciones
    pub fn columna(self) -> &'static str {
        match self {
            CampoPago::Anticipo => "anticipo",
            CampoPago::Pago1 => "pago1",
            CampoPago::Liquidacion => "liquidacion",
        }
    }

    /// Campo que corresponde al concepto de un registro de la tabla pagos
    pub fn desde_concepto(concepto: &str) -> Option<Self> {
        match concepto {
            "ANTICIPO" => Some(CampoPago::Anticipo),
            "PAGO1" => Some(CampoPago::Pago1),
            "LIQUIDACION" => Some(CampoPago::Liquidacion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PagosCotizacion {
    pub anticipo: f64,
    pub pago1: f64,
    pub liquidacion: f64,
}

impl PagosCotizacion {
    pub fn pagado(&self) -> f64 {
        self.anticipo + self.pago1 + self.liquidacion
    }

    pub fn con_campo(mut self, campo: CampoPago, monto: f64) -> Self {
        match campo {
            CampoPago::Anticipo => self.anticipo = monto,
            CampoPago::Pago1 => self.pago1 = monto,
            CampoPago::Liquidacion => self.liquidacion = monto,
        }
        self
    }

    pub fn campo(&self, campo: CampoPago) -> f64 {
        match campo {
            CampoPago::Anticipo => self.anticipo,
            CampoPago::Pago1 => self.pago1,
            CampoPago::Liquidacion => self.liquidacion,
        }
    }
}

/// total − (anticipo + pago1 + liquidación), sin validar
pub fn saldo_pendiente(total: f64, pagos: &PagosCotizacion) -> f64 {
    redondear(total - pagos.pagado())
}

/// Valida los pagos contra el total y devuelve el saldo a guardar
pub fn validar_pagos(total: f64, pagos: &PagosCotizacion) -> Resultado<f64> {
    for (nombre, monto) in [
        ("anticipo", pagos.anticipo),
        ("pago 1", pagos.pago1),
        ("liquidación", pagos.liquidacion),
    ] {
        if !monto.is_finite() || monto < 0.0 {
            return Err(TallerError::validacion(format!(
                "El {} no puede ser negativo",
                nombre
            )));
        }
    }

    let saldo = saldo_pendiente(total, pagos);
    if saldo < -TOLERANCIA {
        return Err(TallerError::validacion(format!(
            "Los pagos (${:.2}) exceden el total de la cotización (${:.2})",
            pagos.pagado(),
            total
        )));
    }

    Ok(saldo.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepto(cantidad: f64, precio: f64) -> ConceptoCotizacion {
        ConceptoCotizacion {
            id: None,
            descripcion: "x".to_string(),
            cantidad,
            precio_unitario: precio,
            importe: 0.0,
        }
    }

    #[test]
    fn totales_con_iva() {
        let t = calcular_totales(&[concepto(2.0, 1500.0), concepto(1.0, 800.0)], 16.0);
        assert_eq!(t.subtotal, 3800.0);
        assert_eq!(t.iva, 608.0);
        assert_eq!(t.total, 4408.0);
    }

    #[test]
    fn saldo_es_total_menos_los_tres_pagos() {
        let pagos = PagosCotizacion {
            anticipo: 1000.0,
            pago1: 500.5,
            liquidacion: 0.0,
        };
        assert_eq!(saldo_pendiente(4408.0, &pagos), 2907.5);
        assert_eq!(validar_pagos(4408.0, &pagos).unwrap(), 2907.5);
    }

    #[test]
    fn rechaza_pagos_negativos_y_excedentes() {
        let negativo = PagosCotizacion {
            anticipo: -1.0,
            ..Default::default()
        };
        assert!(validar_pagos(100.0, &negativo).is_err());

        let excede = PagosCotizacion {
            anticipo: 60.0,
            pago1: 40.0,
            liquidacion: 0.5,
        };
        assert!(validar_pagos(100.0, &excede).is_err());

        // centavos de redondeo se toleran
        let justo = PagosCotizacion {
            anticipo: 33.34,
            pago1: 33.33,
            liquidacion: 33.33,
        };
        assert_eq!(validar_pagos(100.0, &justo).unwrap(), 0.0);
    }

    #[test]
    fn campos_de_pago() {
        assert_eq!(CampoPago::desde_str("Liquidacion"), Some(CampoPago::Liquidacion));
        assert_eq!(CampoPago::desde_str("pago1").map(CampoPago::columna), Some("pago1"));
        assert_eq!(CampoPago::desde_str("total"), None);
        let p = PagosCotizacion::default().con_campo(CampoPago::Pago1, 250.0);
        assert_eq!(p.campo(CampoPago::Pago1), 250.0);
        assert_eq!(p.pagado(), 250.0);
    }
}
