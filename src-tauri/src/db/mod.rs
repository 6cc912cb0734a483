pub mod schema;

use crate::error::Resultado;
use crate::models::SesionActiva;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Variable de entorno que reemplaza la ruta por defecto de la base de datos
pub const ENV_DB_PATH: &str = "TALLER_DB_PATH";

pub struct Database {
    pub conn: Mutex<Connection>,
}

pub struct SesionState {
    pub sesion: Mutex<Option<SesionActiva>>,
}

impl Database {
    pub fn new() -> Result<Self, rusqlite::Error> {
        Self::abrir(&get_db_path())
    }

    pub fn abrir(db_path: &Path) -> Result<Self, rusqlite::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        info!(ruta = %db_path.display(), "base de datos abierta");
        Self::con_conexion(conn)
    }

    /// Base en memoria con el esquema completo, para pruebas
    #[cfg(test)]
    pub fn en_memoria() -> Self {
        let conn = Connection::open_in_memory().expect("sqlite en memoria");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("pragma foreign_keys");
        Self::con_conexion(conn).expect("migraciones en memoria")
    }

    /// Bloquea la conexión y ejecuta la operación; el error sale como el texto
    /// que ve el usuario.
    pub fn con<T>(&self, op: impl FnOnce(&Connection) -> Resultado<T>) -> Result<T, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;
        op(&conn).map_err(|e| {
            tracing::debug!(error = %e, "operación rechazada");
            e.to_string()
        })
    }

    fn con_conexion(conn: Connection) -> Result<Self, rusqlite::Error> {
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| rusqlite::Error::InvalidQuery)?;
        schema::create_tables(&conn)?;
        seed_default_admin(&conn);

        Ok(())
    }
}

/// Inserta el usuario ADMINISTRADOR con PIN 0000 si no hay usuarios
fn seed_default_admin(conn: &Connection) {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))
        .unwrap_or(0);

    if count == 0 {
        let salt = crate::logica::pin::generar_salt();
        let pin_hash = crate::logica::pin::hash_pin(&salt, "0000");
        if let Err(e) = conn.execute(
            "INSERT INTO usuarios (nombre, pin_hash, pin_salt, rol, activo)
             VALUES ('ADMINISTRADOR', ?1, ?2, 'ADMIN', 1)",
            rusqlite::params![pin_hash, salt],
        ) {
            warn!(error = %e, "no se pudo crear el administrador por defecto");
        }
    }
}

/// Ruta del archivo de base de datos: `TALLER_DB_PATH` o el directorio de datos
pub fn get_db_path() -> PathBuf {
    if let Ok(ruta) = std::env::var(ENV_DB_PATH) {
        if !ruta.trim().is_empty() {
            return PathBuf::from(ruta);
        }
    }
    let mut path = dir_datos().unwrap_or_else(|| PathBuf::from("."));
    path.push("taller.db");
    path
}

fn dir_datos() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("TallerCarroceria"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".taller-carroceria"))
    }
}
