use crate::db::Database;
use crate::error::{Resultado, TallerError};
use crate::logica::saldos::redondear;
use crate::logica::validacion::{opcional, requerido};
use crate::models::Ingreso;
use rusqlite::Connection;
use tauri::State;

pub const CATEGORIAS: &[&str] = &["SERVICIO", "PAGO", "REFACCIONES", "OTRO"];

pub fn insertar(
    conn: &Connection,
    concepto: &str,
    monto: f64,
    categoria: &str,
    pago_id: Option<i64>,
    fecha: Option<&str>,
    notas: Option<&str>,
) -> Resultado<i64> {
    conn.execute(
        "INSERT INTO ingresos (concepto, monto, categoria, pago_id, fecha, notas)
         VALUES (?1, ?2, ?3, ?4, COALESCE(?5, datetime('now','localtime')), ?6)",
        rusqlite::params![concepto, monto, categoria, pago_id, fecha, notas],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Ingreso capturado a mano (no viene de un pago)
pub fn crear(conn: &Connection, ingreso: &Ingreso) -> Resultado<i64> {
    let concepto = requerido(&ingreso.concepto, "El concepto")?;
    let monto = redondear(ingreso.monto);
    if !(monto > 0.0) {
        return Err(TallerError::validacion("El monto debe ser mayor a 0"));
    }
    let categoria = match ingreso.categoria.trim().to_uppercase() {
        c if c.is_empty() => "SERVICIO".to_string(),
        c if CATEGORIAS.contains(&c.as_str()) => c,
        c => return Err(TallerError::validacion(format!("Categoría inválida: {}", c))),
    };
    let fecha = opcional(ingreso.fecha.clone());
    let notas = opcional(ingreso.notas.clone());

    let id = insertar(conn, &concepto, monto, &categoria, None, fecha.as_deref(), notas.as_deref())?;
    tracing::info!(ingreso_id = id, monto, "ingreso registrado");
    Ok(id)
}

pub fn listar(conn: &Connection, desde: Option<&str>, hasta: Option<&str>) -> Resultado<Vec<Ingreso>> {
    let mut stmt = conn.prepare(
        "SELECT id, concepto, monto, categoria, pago_id, fecha, notas
         FROM ingresos
         WHERE (?1 IS NULL OR date(fecha) >= date(?1))
           AND (?2 IS NULL OR date(fecha) <= date(?2))
         ORDER BY fecha DESC, id DESC",
    )?;
    let ingresos = stmt
        .query_map(rusqlite::params![desde, hasta], |row| {
            Ok(Ingreso {
                id: Some(row.get(0)?),
                concepto: row.get(1)?,
                monto: row.get(2)?,
                categoria: row.get(3)?,
                pago_id: row.get(4)?,
                fecha: row.get(5)?,
                notas: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ingresos)
}

pub fn total(conn: &Connection, desde: Option<&str>, hasta: Option<&str>) -> Resultado<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(monto), 0) FROM ingresos
         WHERE (?1 IS NULL OR date(fecha) >= date(?1))
           AND (?2 IS NULL OR date(fecha) <= date(?2))",
        rusqlite::params![desde, hasta],
        |row| row.get(0),
    )?;
    Ok(redondear(total))
}

#[tauri::command]
pub fn crear_ingreso(db: State<Database>, ingreso: Ingreso) -> Result<i64, String> {
    db.con(|conn| crear(conn, &ingreso))
}

#[tauri::command]
pub fn listar_ingresos(
    db: State<Database>,
    desde: Option<String>,
    hasta: Option<String>,
) -> Result<Vec<Ingreso>, String> {
    db.con(|conn| listar(conn, desde.as_deref(), hasta.as_deref()))
}

#[tauri::command]
pub fn total_ingresos(
    db: State<Database>,
    desde: Option<String>,
    hasta: Option<String>,
) -> Result<f64, String> {
    db.con(|conn| total(conn, desde.as_deref(), hasta.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingreso(concepto: &str, monto: f64, fecha: &str) -> Ingreso {
        Ingreso {
            id: None,
            concepto: concepto.to_string(),
            monto,
            categoria: String::new(),
            pago_id: None,
            fecha: Some(fecha.to_string()),
            notas: None,
        }
    }

    #[test]
    fn manuales_y_totales_por_rango() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();

        crear(&conn, &ingreso("Venta de chatarra", 350.0, "2026-05-03 12:00:00")).unwrap();
        crear(&conn, &ingreso("Pulido express", 400.0, "2026-06-10 16:00:00")).unwrap();
        assert!(crear(&conn, &ingreso(" ", 10.0, "2026-06-10")).is_err());
        assert!(crear(&conn, &ingreso("Nada", 0.0, "2026-06-10")).is_err());

        assert_eq!(total(&conn, None, None).unwrap(), 750.0);
        assert_eq!(total(&conn, Some("2026-06-01"), Some("2026-06-30")).unwrap(), 400.0);

        let mayo = listar(&conn, Some("2026-05-01"), Some("2026-05-31")).unwrap();
        assert_eq!(mayo.len(), 1);
        assert_eq!(mayo[0].categoria, "SERVICIO");
    }
}
