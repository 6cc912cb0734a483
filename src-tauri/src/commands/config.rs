use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crate::db::Database;
use crate::error::{Resultado, TallerError};
use rusqlite::Connection;
use std::collections::HashMap;
use tauri::State;
use tracing::info;

const MAX_LOGO_BYTES: usize = 500_000;

pub fn leer_todo(conn: &Connection) -> Resultado<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM config")?;
    let config = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(config)
}

pub fn valor(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row(
        "SELECT value FROM config WHERE key = ?1",
        rusqlite::params![key],
        |row| row.get(0),
    )
    .ok()
}

pub fn valor_numerico(conn: &Connection, key: &str, por_defecto: f64) -> f64 {
    valor(conn, key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(por_defecto)
}

pub fn iva_porcentaje(conn: &Connection) -> f64 {
    valor_numerico(conn, "iva_porcentaje", 16.0)
}

const MAX_VIGENCIA_DIAS: i64 = 3650;

/// Valida el valor de las claves con significado numérico
fn validar_valor(key: &str, value: &str) -> Resultado<()> {
    let value = value.trim();
    match key {
        "iva_porcentaje" | "intervalo_refresco_seg" => {
            let n: f64 = value
                .parse()
                .map_err(|_| TallerError::validacion(format!("'{}' debe ser numérico", key)))?;
            if !n.is_finite() {
                return Err(TallerError::validacion(format!("'{}' debe ser un número finito", key)));
            }
            if n < 0.0 {
                return Err(TallerError::validacion(format!("'{}' no puede ser negativo", key)));
            }
        }
        "vigencia_dias" => match value.parse::<i64>() {
            Ok(n) if (0..=MAX_VIGENCIA_DIAS).contains(&n) => {}
            _ => {
                return Err(TallerError::validacion(format!(
                    "'vigencia_dias' debe ser un entero entre 0 y {}",
                    MAX_VIGENCIA_DIAS
                )))
            }
        },
        "secuencial_cotizacion" => match value.parse::<i64>() {
            Ok(n) if n >= 1 => {}
            _ => {
                return Err(TallerError::validacion(
                    "'secuencial_cotizacion' debe ser un entero mayor o igual a 1",
                ))
            }
        },
        _ => {}
    }
    Ok(())
}

/// Todo o nada: si una clave es inválida no se guarda ninguna
pub fn guardar(conn: &Connection, configs: &HashMap<String, String>) -> Resultado<()> {
    for (key, value) in configs {
        validar_valor(key, value)?;
    }

    let tx = conn.unchecked_transaction()?;
    for (key, value) in configs {
        tx.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
    }
    tx.commit()?;
    info!(claves = configs.len(), "configuración guardada");
    Ok(())
}

fn cargar_logo(conn: &Connection, logo_path: &str) -> Resultado<String> {
    let bytes = std::fs::read(logo_path)?;

    if bytes.len() > MAX_LOGO_BYTES {
        return Err(TallerError::validacion(
            "La imagen es demasiado grande. Máximo 500KB.",
        ));
    }

    let b64 = BASE64.encode(&bytes);
    conn.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES ('logo_negocio', ?1)",
        rusqlite::params![b64],
    )?;
    info!(bytes = bytes.len(), "logo del negocio actualizado");

    Ok("Logo cargado correctamente".to_string())
}

#[tauri::command]
pub fn obtener_config(db: State<Database>) -> Result<HashMap<String, String>, String> {
    db.con(leer_todo)
}

#[tauri::command]
pub fn guardar_config(db: State<Database>, configs: HashMap<String, String>) -> Result<(), String> {
    db.con(|conn| guardar(conn, &configs))
}

#[tauri::command]
pub fn cargar_logo_negocio(db: State<Database>, logo_path: String) -> Result<String, String> {
    db.con(|conn| cargar_logo(conn, &logo_path))
}

#[tauri::command]
pub fn eliminar_logo_negocio(db: State<Database>) -> Result<String, String> {
    db.con(|conn| {
        conn.execute("DELETE FROM config WHERE key = 'logo_negocio'", [])?;
        Ok("Logo eliminado".to_string())
    })
}
