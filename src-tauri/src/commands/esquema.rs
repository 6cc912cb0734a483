use crate::db::Database;
use crate::error::{Resultado, TallerError};
use rusqlite::Connection;
use serde::Serialize;
use tauri::State;

#[derive(Debug, Serialize, PartialEq)]
pub struct Columna {
    pub nombre: String,
    pub tipo: String,
    pub requerido: bool,
    pub clave_primaria: bool,
}

pub fn tablas(conn: &Connection) -> Resultado<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let nombres = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(nombres)
}

pub fn columnas(conn: &Connection, tabla: &str) -> Resultado<Vec<Columna>> {
    if !tablas(conn)?.iter().any(|t| t == tabla) {
        return Err(TallerError::no_encontrado(format!("La tabla '{}'", tabla)));
    }
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columnas = stmt
        .query_map(rusqlite::params![tabla], |row| {
            Ok(Columna {
                nombre: row.get(0)?,
                tipo: row.get(1)?,
                requerido: row.get::<_, i64>(2)? != 0,
                clave_primaria: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columnas)
}

#[tauri::command]
pub fn listar_tablas(db: State<Database>) -> Result<Vec<String>, String> {
    db.con(tablas)
}

#[tauri::command]
pub fn listar_columnas(db: State<Database>, tabla: String) -> Result<Vec<Columna>, String> {
    db.con(|conn| columnas(conn, &tabla))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tablas_y_columnas() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();

        let nombres = tablas(&conn).unwrap();
        for t in ["clientes", "cotizaciones", "pagos", "notificaciones", "contactos"] {
            assert!(nombres.iter().any(|n| n == t), "falta {}", t);
        }
        assert!(!nombres.iter().any(|n| n.starts_with("sqlite_")));

        let cols = columnas(&conn, "clientes").unwrap();
        assert_eq!(
            cols[0],
            Columna {
                nombre: "id".to_string(),
                tipo: "INTEGER".to_string(),
                requerido: false,
                clave_primaria: true,
            }
        );
        let telefono = cols.iter().find(|c| c.nombre == "telefono").unwrap();
        assert!(telefono.requerido);

        assert!(columnas(&conn, "clientes; DROP TABLE clientes").is_err());
    }
}
