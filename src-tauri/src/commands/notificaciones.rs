use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::models::Notificacion;
use rusqlite::Connection;
use tauri::State;
use tracing::warn;

pub const TIPOS: &[&str] = &["CLIENTE", "COTIZACION", "VEHICULO", "PAGO", "CONTACTO", "SISTEMA"];

const LIMITE_POR_DEFECTO: i64 = 50;

/// Agrega una entrada al historial de actividad. Si falla solo se registra
/// en el log: la operación que la originó ya quedó guardada.
pub fn registrar(
    conn: &Connection,
    tipo: &str,
    titulo: &str,
    mensaje: Option<&str>,
    entidad_id: Option<i64>,
) {
    let entidad = entidad_id.map(|_| tipo.to_lowercase());
    if let Err(e) = conn.execute(
        "INSERT INTO notificaciones (tipo, titulo, mensaje, entidad, entidad_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![tipo, titulo, mensaje, entidad, entidad_id],
    ) {
        warn!(error = %e, tipo, titulo, "no se pudo registrar la notificación");
    }
}

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Notificacion> {
    Ok(Notificacion {
        id: Some(row.get(0)?),
        tipo: row.get(1)?,
        titulo: row.get(2)?,
        mensaje: row.get(3)?,
        entidad: row.get(4)?,
        entidad_id: row.get(5)?,
        leida: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
    })
}

pub fn crear(conn: &Connection, notificacion: &Notificacion) -> Resultado<Notificacion> {
    if !TIPOS.contains(&notificacion.tipo.as_str()) {
        return Err(TallerError::validacion(format!(
            "Tipo de notificación inválido: {}",
            notificacion.tipo
        )));
    }
    let titulo = crate::logica::validacion::requerido(&notificacion.titulo, "El título")?;

    conn.execute(
        "INSERT INTO notificaciones (tipo, titulo, mensaje, entidad, entidad_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            notificacion.tipo,
            titulo,
            notificacion.mensaje,
            notificacion.entidad,
            notificacion.entidad_id,
        ],
    )?;
    let id = conn.last_insert_rowid();

    o_no_encontrado(
        conn.query_row(
            "SELECT id, tipo, titulo, mensaje, entidad, entidad_id, leida, created_at
             FROM notificaciones WHERE id = ?1",
            rusqlite::params![id],
            mapear,
        ),
        "Notificación",
    )
}

pub fn listar(conn: &Connection, solo_no_leidas: bool, limite: Option<i64>) -> Resultado<Vec<Notificacion>> {
    let limite = limite.filter(|l| *l > 0).unwrap_or(LIMITE_POR_DEFECTO);
    let mut stmt = conn.prepare(
        "SELECT id, tipo, titulo, mensaje, entidad, entidad_id, leida, created_at
         FROM notificaciones
         WHERE (?1 = 0 OR leida = 0)
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;
    let notificaciones = stmt
        .query_map(rusqlite::params![solo_no_leidas as i32, limite], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notificaciones)
}

pub fn contar_no_leidas_en(conn: &Connection) -> Resultado<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM notificaciones WHERE leida = 0",
        [],
        |row| row.get(0),
    )?)
}

pub fn marcar(conn: &Connection, id: i64) -> Resultado<()> {
    let cambiadas = conn.execute(
        "UPDATE notificaciones SET leida = 1 WHERE id = ?1",
        rusqlite::params![id],
    )?;
    if cambiadas == 0 {
        return Err(TallerError::no_encontrado("Notificación"));
    }
    Ok(())
}

#[tauri::command]
pub fn listar_notificaciones(
    db: State<Database>,
    solo_no_leidas: Option<bool>,
    limite: Option<i64>,
) -> Result<Vec<Notificacion>, String> {
    db.con(|conn| listar(conn, solo_no_leidas.unwrap_or(false), limite))
}

#[tauri::command]
pub fn contar_no_leidas(db: State<Database>) -> Result<i64, String> {
    db.con(contar_no_leidas_en)
}

#[tauri::command]
pub fn marcar_leida(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| marcar(conn, id))
}

#[tauri::command]
pub fn marcar_todas_leidas(db: State<Database>) -> Result<usize, String> {
    db.con(|conn| Ok(conn.execute("UPDATE notificaciones SET leida = 1 WHERE leida = 0", [])?))
}

#[tauri::command]
pub fn eliminar_notificacion(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| {
        conn.execute("DELETE FROM notificaciones WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
    })
}

#[tauri::command]
pub fn crear_notificacion(db: State<Database>, notificacion: Notificacion) -> Result<Notificacion, String> {
    db.con(|conn| crear(conn, &notificacion))
}
