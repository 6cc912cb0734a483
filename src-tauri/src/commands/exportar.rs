use crate::db::Database;
use crate::error::Resultado;
use rusqlite::Connection;
use std::io::Write;
use std::path::Path;
use tauri::State;
use tracing::info;

/// BOM UTF-8 para que Excel abra correctamente caracteres especiales
const BOM: &[u8] = b"\xEF\xBB\xBF";
/// Separador de columnas (punto y coma para Excel en español)
const SEP: &str = ";";

fn escapar_csv(valor: &str) -> String {
    if valor.contains(';') || valor.contains('"') || valor.contains('\n') {
        format!("\"{}\"", valor.replace('"', "\"\""))
    } else {
        valor.to_string()
    }
}

fn escribir_csv(ruta: &Path, encabezados: &[&str], filas: &[Vec<String>]) -> Resultado<()> {
    let mut file = std::fs::File::create(ruta)?;
    file.write_all(BOM)?;
    writeln!(file, "{}", encabezados.join(SEP))?;

    for fila in filas {
        let linea: Vec<String> = fila.iter().map(|v| escapar_csv(v)).collect();
        writeln!(file, "{}", linea.join(SEP))?;
    }
    Ok(())
}

fn dinero(v: f64) -> String {
    format!("{:.2}", v)
}

pub fn cotizaciones_csv(conn: &Connection, desde: &str, hasta: &str, ruta: &Path) -> Resultado<usize> {
    let mut stmt = conn.prepare(
        "SELECT c.folio, c.created_at, COALESCE(cl.nombre, ''), cl.telefono,
         TRIM(COALESCE(c.vehiculo_marca, '') || ' ' || COALESCE(c.vehiculo_modelo, '')),
         c.vehiculo_anio, c.placas, c.subtotal, c.iva, c.total, c.anticipo, c.pago1,
         c.liquidacion, c.saldo_pendiente, c.estado
         FROM cotizaciones c
         LEFT JOIN clientes cl ON c.cliente_id = cl.id
         WHERE date(c.created_at) BETWEEN date(?1) AND date(?2)
         ORDER BY c.created_at DESC, c.id DESC",
    )?;

    let filas: Vec<Vec<String>> = stmt
        .query_map(rusqlite::params![desde, hasta], |row| {
            Ok(vec![
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                row.get::<_, String>(4)?,
                row.get::<_, Option<i64>>(5)?.map(|a| a.to_string()).unwrap_or_default(),
                row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                dinero(row.get(7)?),
                dinero(row.get(8)?),
                dinero(row.get(9)?),
                dinero(row.get(10)?),
                dinero(row.get(11)?),
                dinero(row.get(12)?),
                dinero(row.get(13)?),
                row.get::<_, String>(14)?,
            ])
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let encabezados = [
        "Folio", "Fecha", "Cliente", "Telefono", "Vehiculo", "Año", "Placas",
        "Subtotal", "IVA", "Total", "Anticipo", "Pago 1", "Liquidacion", "Saldo", "Estado",
    ];
    escribir_csv(ruta, &encabezados, &filas)?;
    Ok(filas.len())
}

pub fn pagos_csv(conn: &Connection, desde: &str, hasta: &str, ruta: &Path) -> Resultado<usize> {
    let mut stmt = conn.prepare(
        "SELECT p.fecha, COALESCE(c.folio, ''), COALESCE(cl.nombre, ''), p.concepto,
         p.metodo, p.monto, p.referencia, p.notas
         FROM pagos p
         LEFT JOIN cotizaciones c ON p.cotizacion_id = c.id
         LEFT JOIN clientes cl ON p.cliente_id = cl.id
         WHERE date(p.fecha) BETWEEN date(?1) AND date(?2)
         ORDER BY p.fecha DESC, p.id DESC",
    )?;

    let filas: Vec<Vec<String>> = stmt
        .query_map(rusqlite::params![desde, hasta], |row| {
            Ok(vec![
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                dinero(row.get(5)?),
                row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            ])
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let encabezados = ["Fecha", "Folio", "Cliente", "Concepto", "Metodo", "Monto", "Referencia", "Notas"];
    escribir_csv(ruta, &encabezados, &filas)?;
    Ok(filas.len())
}

pub fn clientes_csv(conn: &Connection, ruta: &Path) -> Resultado<usize> {
    let mut stmt = conn.prepare(
        "SELECT nombre, telefono, email, direccion, rfc, notas, created_at
         FROM clientes WHERE activo = 1 ORDER BY nombre COLLATE NOCASE",
    )?;

    let filas: Vec<Vec<String>> = stmt
        .query_map([], |row| {
            let texto = |i: usize| -> rusqlite::Result<String> {
                Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
            };
            Ok(vec![texto(0)?, texto(1)?, texto(2)?, texto(3)?, texto(4)?, texto(5)?, texto(6)?])
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let encabezados = ["Nombre", "Telefono", "Email", "Direccion", "RFC", "Notas", "Alta"];
    escribir_csv(ruta, &encabezados, &filas)?;
    Ok(filas.len())
}

#[tauri::command]
pub fn exportar_cotizaciones_csv(
    db: State<Database>,
    desde: String,
    hasta: String,
    ruta: String,
) -> Result<String, String> {
    let n = db.con(|conn| cotizaciones_csv(conn, &desde, &hasta, Path::new(&ruta)))?;
    info!(filas = n, ruta = %ruta, "cotizaciones exportadas");
    Ok(format!("{} cotizaciones exportadas", n))
}

#[tauri::command]
pub fn exportar_pagos_csv(
    db: State<Database>,
    desde: String,
    hasta: String,
    ruta: String,
) -> Result<String, String> {
    let n = db.con(|conn| pagos_csv(conn, &desde, &hasta, Path::new(&ruta)))?;
    info!(filas = n, ruta = %ruta, "pagos exportados");
    Ok(format!("{} pagos exportados", n))
}

#[tauri::command]
pub fn exportar_clientes_csv(db: State<Database>, ruta: String) -> Result<String, String> {
    let n = db.con(|conn| clientes_csv(conn, Path::new(&ruta)))?;
    info!(filas = n, ruta = %ruta, "clientes exportados");
    Ok(format!("{} clientes exportados", n))
}

/// Escribe texto plano (HTML, CSV ya armado en el frontend) en la ruta elegida
#[tauri::command]
pub fn guardar_archivo_texto(ruta: String, contenido: String) -> Result<String, String> {
    std::fs::write(&ruta, contenido.as_bytes()).map_err(|e| format!("Error al guardar archivo: {}", e))?;
    Ok(ruta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::clientes::{self, cliente_de_prueba};
    use crate::commands::cotizaciones::{self, nueva_de_prueba};
    use crate::commands::pagos::{self, pago_de_prueba};

    fn leer(ruta: &Path) -> String {
        let bytes = std::fs::read(ruta).unwrap();
        assert!(bytes.starts_with(BOM));
        String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn escapa_separador_y_comillas() {
        assert_eq!(escapar_csv("simple"), "simple");
        assert_eq!(escapar_csv("a;b"), "\"a;b\"");
        assert_eq!(escapar_csv("dijo \"hola\""), "\"dijo \"\"hola\"\"\"");
    }

    #[test]
    fn exporta_cotizaciones_pagos_y_clientes() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut cliente = cliente_de_prueba("Gómez; Hermanos", "5510101010");
        cliente.email = Some("gomez@correo.mx".to_string());
        let cliente_id = clientes::crear(&conn, &cliente).unwrap();
        let cot = cotizaciones::crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 500.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();
        pagos::registrar(&conn, &pago_de_prueba(Some(cot), "ANTICIPO", 80.0)).unwrap();

        let ruta = dir.path().join("cotizaciones.csv");
        assert_eq!(cotizaciones_csv(&conn, "2000-01-01", "2100-12-31", &ruta).unwrap(), 1);
        let csv = leer(&ruta);
        let lineas: Vec<&str> = csv.lines().collect();
        assert!(lineas[0].starts_with("Folio;Fecha;Cliente"));
        assert!(lineas[1].starts_with("COT-000001;"));
        assert!(lineas[1].contains("\"Gómez; Hermanos\""));
        assert!(lineas[1].contains(";580.00;80.00;0.00;0.00;500.00;PENDIENTE"));

        let ruta = dir.path().join("pagos.csv");
        assert_eq!(pagos_csv(&conn, "2000-01-01", "2100-12-31", &ruta).unwrap(), 1);
        assert!(leer(&ruta).contains(";COT-000001;"));
        assert_eq!(pagos_csv(&conn, "2000-01-01", "2000-12-31", &ruta).unwrap(), 0);

        let ruta = dir.path().join("clientes.csv");
        assert_eq!(clientes_csv(&conn, &ruta).unwrap(), 1);
        assert!(leer(&ruta).contains("gomez@correo.mx"));
    }
}
