use crate::db::{self, Database};
use crate::error::{Resultado, TallerError};
use rusqlite::Connection;
use std::path::Path;
use tauri::State;
use tracing::{info, warn};

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Retorna la ruta actual de la base de datos
#[tauri::command]
pub fn obtener_ruta_db() -> Result<String, String> {
    Ok(db::get_db_path().to_string_lossy().to_string())
}

/// Forzar checkpoint WAL para que todo esté en el archivo principal
fn checkpoint(conn: &Connection) -> Resultado<()> {
    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
    Ok(())
}

pub fn copiar_respaldo(db_path: &Path, destino: &Path) -> Resultado<()> {
    if !db_path.exists() {
        return Err(TallerError::no_encontrado("El archivo de base de datos"));
    }
    std::fs::copy(db_path, destino)?;
    info!(destino = %destino.display(), "respaldo creado");
    Ok(())
}

fn es_sqlite(origen: &Path) -> Resultado<bool> {
    use std::io::Read;
    let mut header = [0u8; 16];
    let mut file = std::fs::File::open(origen)?;
    Ok(file.read_exact(&mut header).is_ok() && &header == SQLITE_MAGIC)
}

/// Copia el respaldo sobre la base actual dejando una copia `.pre-restore`
pub fn restaurar_archivo(origen: &Path, db_path: &Path) -> Resultado<()> {
    if !origen.exists() {
        return Err(TallerError::no_encontrado("El archivo de respaldo"));
    }
    if !es_sqlite(origen)? {
        return Err(TallerError::validacion(
            "El archivo seleccionado no es una base de datos SQLite válida",
        ));
    }

    let backup_auto = db_path.with_extension("db.pre-restore");
    if let Err(e) = std::fs::copy(db_path, &backup_auto) {
        warn!(error = %e, "no se pudo crear la copia previa a la restauración");
    }

    std::fs::copy(origen, db_path)?;

    // Eliminar archivos WAL/SHM del respaldo anterior si existen
    std::fs::remove_file(db_path.with_extension("db-wal")).ok();
    std::fs::remove_file(db_path.with_extension("db-shm")).ok();

    info!(origen = %origen.display(), "respaldo restaurado");
    Ok(())
}

/// Crea un respaldo de la base de datos en la ruta destino
#[tauri::command]
pub fn crear_respaldo(db: State<Database>, destino: String) -> Result<String, String> {
    db.con(checkpoint)?;
    copiar_respaldo(&db::get_db_path(), Path::new(&destino)).map_err(|e| e.to_string())?;
    Ok(destino)
}

/// Restaura un respaldo reemplazando la base de datos actual
#[tauri::command]
pub fn restaurar_respaldo(db: State<Database>, origen: String) -> Result<String, String> {
    db.con(checkpoint)?;
    restaurar_archivo(Path::new(&origen), &db::get_db_path()).map_err(|e| e.to_string())?;
    Ok("Respaldo restaurado. Reinicie la aplicación para aplicar los cambios.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respaldo_y_restauracion() {
        let dir = tempfile::tempdir().unwrap();
        let ruta_db = dir.path().join("taller.db");
        let db = Database::abrir(&ruta_db).unwrap();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute("INSERT INTO config (key, value) VALUES ('marca', 'antes')", []).unwrap();
            checkpoint(&conn).unwrap();
        }

        let respaldo = dir.path().join("respaldo.db");
        copiar_respaldo(&ruta_db, &respaldo).unwrap();
        assert!(es_sqlite(&respaldo).unwrap());
        drop(db);

        restaurar_archivo(&respaldo, &ruta_db).unwrap();
        assert!(ruta_db.with_extension("db.pre-restore").exists());
    }

    #[test]
    fn rechaza_archivo_que_no_es_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let falso = dir.path().join("falso.db");
        std::fs::write(&falso, b"no soy una base").unwrap();
        let err = restaurar_archivo(&falso, &dir.path().join("taller.db")).unwrap_err();
        assert!(matches!(err, TallerError::Validacion(_)));
        assert!(matches!(
            restaurar_archivo(&dir.path().join("no-existe.db"), &dir.path().join("taller.db")),
            Err(TallerError::NoEncontrado(_))
        ));
    }
}
