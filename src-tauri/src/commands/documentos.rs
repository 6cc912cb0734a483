use crate::commands::{config, cotizaciones};
use crate::db::Database;
use crate::documentos::cotizacion_html;
use crate::error::Resultado;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tauri::State;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct DocumentoHtml {
    pub nombre_archivo: String,
    pub html: String,
}

pub fn documento(conn: &Connection, cotizacion_id: i64) -> Resultado<DocumentoHtml> {
    let datos = cotizaciones::obtener(conn, cotizacion_id)?;
    let cfg = config::leer_todo(conn)?;
    Ok(DocumentoHtml {
        nombre_archivo: cotizacion_html::nombre_archivo(&datos.cotizacion.folio),
        html: cotizacion_html::generar_cotizacion_html(&datos, &cfg),
    })
}

pub fn exportar(conn: &Connection, cotizacion_id: i64, ruta: &Path) -> Resultado<()> {
    let doc = documento(conn, cotizacion_id)?;
    std::fs::write(ruta, doc.html.as_bytes())?;
    info!(cotizacion_id, ruta = %ruta.display(), "cotización exportada");
    Ok(())
}

#[tauri::command]
pub fn generar_cotizacion_html(db: State<Database>, id: i64) -> Result<DocumentoHtml, String> {
    db.con(|conn| documento(conn, id))
}

#[tauri::command]
pub fn exportar_cotizacion_html(db: State<Database>, id: i64, ruta: String) -> Result<String, String> {
    db.con(|conn| exportar(conn, id, Path::new(&ruta)))?;
    Ok(ruta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::clientes::{self, cliente_de_prueba};
    use crate::commands::cotizaciones::nueva_de_prueba;

    #[test]
    fn exporta_documento_de_la_cotizacion() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let cliente_id = clientes::crear(&conn, &cliente_de_prueba("Nora", "5513131313")).unwrap();
        let id = cotizaciones::crear(&conn, &nueva_de_prueba(cliente_id, &[("Pulido general", 1.0, 900.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();

        let doc = documento(&conn, id).unwrap();
        assert_eq!(doc.nombre_archivo, "Cotizacion_COT-000001.html");
        assert!(doc.html.contains("Pulido general"));
        assert!(doc.html.contains("MI TALLER"));

        let dir = tempfile::tempdir().unwrap();
        let ruta = dir.path().join(&doc.nombre_archivo);
        exportar(&conn, id, &ruta).unwrap();
        let escrito = std::fs::read_to_string(&ruta).unwrap();
        assert!(escrito.starts_with("<!DOCTYPE html>"));

        assert!(documento(&conn, 77).is_err());
    }
}
