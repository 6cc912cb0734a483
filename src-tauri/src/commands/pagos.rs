use crate::commands::{cotizaciones, ingresos, notificaciones};
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::saldos::{self, CampoPago};
use crate::logica::validacion::opcional;
use crate::models::{FiltroPagos, Pago};
use rusqlite::Connection;
use tauri::State;
use tracing::info;

pub const CONCEPTOS: &[&str] = &["ANTICIPO", "PAGO1", "LIQUIDACION", "OTRO"];
pub const METODOS: &[&str] = &["EFECTIVO", "TRANSFERENCIA", "TARJETA"];

const COLUMNAS: &str =
    "id, cotizacion_id, cliente_id, concepto, monto, metodo, referencia, notas, fecha";

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Pago> {
    Ok(Pago {
        id: Some(row.get(0)?),
        cotizacion_id: row.get(1)?,
        cliente_id: row.get(2)?,
        concepto: row.get(3)?,
        monto: row.get(4)?,
        metodo: row.get(5)?,
        referencia: row.get(6)?,
        notas: row.get(7)?,
        fecha: row.get(8)?,
    })
}

fn normalizar(valor: &str, permitidos: &[&str], que: &str) -> Resultado<String> {
    let v = valor.trim().to_uppercase();
    if permitidos.contains(&v.as_str()) {
        Ok(v)
    } else {
        Err(TallerError::validacion(format!("{} inválido: {}", que, valor)))
    }
}

/// Registra el pago. Si va a una cotización y el concepto es uno de sus campos
/// de pago, el campo se incrementa y el saldo se recalcula. Todo en una sola
/// transacción junto con el ingreso.
pub fn registrar(conn: &Connection, pago: &Pago) -> Resultado<Pago> {
    let monto = saldos::redondear(pago.monto);
    if !(monto > 0.0) {
        return Err(TallerError::validacion("El monto debe ser mayor a 0"));
    }
    let concepto = normalizar(&pago.concepto, CONCEPTOS, "Concepto")?;
    let metodo = normalizar(&pago.metodo, METODOS, "Método de pago")?;

    let tx = conn.unchecked_transaction()?;

    let mut cliente_id = pago.cliente_id;
    let mut folio = None;
    if let Some(cotizacion_id) = pago.cotizacion_id {
        let cotizacion = cotizaciones::obtener_encabezado(&tx, cotizacion_id)?;
        cliente_id = cliente_id.or(Some(cotizacion.cliente_id));
        if let Some(campo) = CampoPago::desde_concepto(&concepto) {
            cotizaciones::sumar_pago(&tx, cotizacion_id, campo, monto)?;
        }
        folio = Some(cotizacion.folio);
    }

    tx.execute(
        "INSERT INTO pagos (cotizacion_id, cliente_id, concepto, monto, metodo, referencia, notas, fecha)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, datetime('now','localtime')))",
        rusqlite::params![
            pago.cotizacion_id,
            cliente_id,
            concepto,
            monto,
            metodo,
            opcional(pago.referencia.clone()),
            opcional(pago.notas.clone()),
            opcional(pago.fecha.clone()),
        ],
    )?;
    let id = tx.last_insert_rowid();
    let registrado = obtener(&tx, id)?;

    let descripcion = match &folio {
        Some(f) => format!("{} {}", concepto, f),
        None => concepto.clone(),
    };
    ingresos::insertar(&tx, &descripcion, monto, "PAGO", Some(id), registrado.fecha.as_deref(), None)?;

    notificaciones::registrar(
        &tx,
        "PAGO",
        &format!("Pago recibido ${:.2}", monto),
        Some(&format!("{} ({})", descripcion, metodo)),
        Some(id),
    );
    tx.commit()?;

    info!(pago_id = id, monto, concepto = %concepto, "pago registrado");
    Ok(registrado)
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<Pago> {
    o_no_encontrado(
        conn.query_row(
            &format!("SELECT {} FROM pagos WHERE id = ?1", COLUMNAS),
            rusqlite::params![id],
            mapear,
        ),
        "Pago",
    )
}

/// Fechas `desde`/`hasta` inclusivas en formato YYYY-MM-DD
pub fn listar(conn: &Connection, filtro: &FiltroPagos) -> Resultado<Vec<Pago>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM pagos
         WHERE (?1 IS NULL OR cotizacion_id = ?1)
           AND (?2 IS NULL OR cliente_id = ?2)
           AND (?3 IS NULL OR date(fecha) >= date(?3))
           AND (?4 IS NULL OR date(fecha) <= date(?4))
         ORDER BY fecha DESC, id DESC",
        COLUMNAS
    ))?;
    let pagos = stmt
        .query_map(
            rusqlite::params![
                filtro.cotizacion_id,
                filtro.cliente_id,
                opcional(filtro.desde.clone()),
                opcional(filtro.hasta.clone()),
            ],
            mapear,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pagos)
}

/// Borra el pago y su ingreso; el campo de la cotización se descuenta
pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let tx = conn.unchecked_transaction()?;
    let pago = obtener(&tx, id)?;

    if let (Some(cotizacion_id), Some(campo)) =
        (pago.cotizacion_id, CampoPago::desde_concepto(&pago.concepto))
    {
        if let Ok(cotizacion) = cotizaciones::obtener_encabezado(&tx, cotizacion_id) {
            let actual = saldos::PagosCotizacion {
                anticipo: cotizacion.anticipo,
                pago1: cotizacion.pago1,
                liquidacion: cotizacion.liquidacion,
            }
            .campo(campo);
            cotizaciones::actualizar_pago(&tx, cotizacion_id, campo, (actual - pago.monto).max(0.0))?;
        }
    }

    tx.execute("DELETE FROM ingresos WHERE pago_id = ?1", rusqlite::params![id])?;
    tx.execute("DELETE FROM pagos WHERE id = ?1", rusqlite::params![id])?;
    tx.commit()?;

    info!(pago_id = id, "pago eliminado");
    Ok(())
}

#[tauri::command]
pub fn registrar_pago(db: State<Database>, pago: Pago) -> Result<Pago, String> {
    db.con(|conn| registrar(conn, &pago))
}

#[tauri::command]
pub fn listar_pagos(db: State<Database>, filtro: Option<FiltroPagos>) -> Result<Vec<Pago>, String> {
    let filtro = filtro.unwrap_or_default();
    db.con(|conn| listar(conn, &filtro))
}

#[tauri::command]
pub fn eliminar_pago(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[cfg(test)]
pub(crate) fn pago_de_prueba(cotizacion_id: Option<i64>, concepto: &str, monto: f64) -> Pago {
    Pago {
        id: None,
        cotizacion_id,
        cliente_id: None,
        concepto: concepto.to_string(),
        monto,
        metodo: "efectivo".to_string(),
        referencia: None,
        notas: None,
        fecha: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::clientes::{self, cliente_de_prueba};
    use crate::commands::cotizaciones::nueva_de_prueba;

    fn cotizacion_de(conn: &Connection, precio: f64) -> (i64, i64) {
        let cliente_id = clientes::crear(conn, &cliente_de_prueba("Iván", "5577778888")).unwrap();
        let c = cotizaciones::crear(conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, precio)])).unwrap();
        (cliente_id, c.cotizacion.id.unwrap())
    }

    fn total_ingresos(conn: &Connection) -> f64 {
        conn.query_row("SELECT COALESCE(SUM(monto), 0) FROM ingresos", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn pago_actualiza_cotizacion_e_ingresos() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let (cliente_id, cot) = cotizacion_de(&conn, 1000.0);

        let p = registrar(&conn, &pago_de_prueba(Some(cot), "anticipo", 500.0)).unwrap();
        assert_eq!(p.concepto, "ANTICIPO");
        assert_eq!(p.metodo, "EFECTIVO");
        assert_eq!(p.cliente_id, Some(cliente_id));
        registrar(&conn, &pago_de_prueba(Some(cot), "ANTICIPO", 100.0)).unwrap();

        let c = cotizaciones::obtener_encabezado(&conn, cot).unwrap();
        assert_eq!(c.anticipo, 600.0);
        assert_eq!(c.saldo_pendiente, 560.0);
        assert_eq!(total_ingresos(&conn), 600.0);

        // OTRO no toca los campos de la cotización
        registrar(&conn, &pago_de_prueba(Some(cot), "OTRO", 50.0)).unwrap();
        assert_eq!(cotizaciones::obtener_encabezado(&conn, cot).unwrap().saldo_pendiente, 560.0);

        let filtrados = listar(&conn, &FiltroPagos { cotizacion_id: Some(cot), ..Default::default() }).unwrap();
        assert_eq!(filtrados.len(), 3);
    }

    #[test]
    fn excedente_no_deja_rastro() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let (_, cot) = cotizacion_de(&conn, 100.0);

        assert!(registrar(&conn, &pago_de_prueba(Some(cot), "LIQUIDACION", 500.0)).is_err());
        assert!(listar(&conn, &FiltroPagos::default()).unwrap().is_empty());
        assert_eq!(total_ingresos(&conn), 0.0);
        assert_eq!(cotizaciones::obtener_encabezado(&conn, cot).unwrap().liquidacion, 0.0);

        assert!(registrar(&conn, &pago_de_prueba(Some(cot), "ANTICIPO", 0.0)).is_err());
        assert!(registrar(&conn, &pago_de_prueba(Some(cot), "DONATIVO", 10.0)).is_err());
        let mut cheque = pago_de_prueba(Some(cot), "ANTICIPO", 10.0);
        cheque.metodo = "CHEQUE".to_string();
        assert!(registrar(&conn, &cheque).is_err());
    }

    #[test]
    fn eliminar_revierte_el_campo() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let (_, cot) = cotizacion_de(&conn, 1000.0);

        let p = registrar(&conn, &pago_de_prueba(Some(cot), "PAGO1", 300.0)).unwrap();
        eliminar(&conn, p.id.unwrap()).unwrap();

        let c = cotizaciones::obtener_encabezado(&conn, cot).unwrap();
        assert_eq!(c.pago1, 0.0);
        assert_eq!(c.saldo_pendiente, 1160.0);
        assert_eq!(total_ingresos(&conn), 0.0);
        assert!(matches!(eliminar(&conn, 999), Err(TallerError::NoEncontrado(_))));
    }

    #[test]
    fn filtro_por_fechas() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let mut enero = pago_de_prueba(None, "OTRO", 10.0);
        enero.fecha = Some("2026-01-15 10:00:00".to_string());
        let mut marzo = pago_de_prueba(None, "OTRO", 20.0);
        marzo.fecha = Some("2026-03-02 09:30:00".to_string());
        registrar(&conn, &enero).unwrap();
        registrar(&conn, &marzo).unwrap();

        let filtro = FiltroPagos {
            desde: Some("2026-01-01".to_string()),
            hasta: Some("2026-01-31".to_string()),
            ..Default::default()
        };
        let pagos = listar(&conn, &filtro).unwrap();
        assert_eq!(pagos.len(), 1);
        assert_eq!(pagos[0].monto, 10.0);
    }
}
