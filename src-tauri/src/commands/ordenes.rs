use crate::commands::vehiculos;
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::estados::{self, CICLO_ORDEN};
use crate::logica::validacion::{opcional, requerido};
use crate::models::OrdenTaller;
use rusqlite::Connection;
use tauri::State;
use tracing::info;

pub const AREAS: &[&str] = &["HOJALATERIA", "PINTURA", "MECANICA", "ELECTRICO", "PULIDO", "OTRO"];

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<OrdenTaller> {
    Ok(OrdenTaller {
        id: Some(row.get(0)?),
        vehiculo_id: row.get(1)?,
        area: row.get(2)?,
        descripcion: row.get(3)?,
        tecnico: row.get(4)?,
        costo: row.get(5)?,
        estado: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn validar(orden: &OrdenTaller) -> Resultado<(String, String)> {
    let area = orden.area.trim().to_uppercase();
    if !AREAS.contains(&area.as_str()) {
        return Err(TallerError::validacion(format!("Área inválida: {}", orden.area)));
    }
    let descripcion = requerido(&orden.descripcion, "La descripción")?;
    if !(orden.costo >= 0.0) {
        return Err(TallerError::validacion("El costo no puede ser negativo"));
    }
    Ok((area, descripcion))
}

pub fn crear(conn: &Connection, orden: &OrdenTaller) -> Resultado<OrdenTaller> {
    vehiculos::obtener(conn, orden.vehiculo_id)?;
    let (area, descripcion) = validar(orden)?;

    conn.execute(
        "INSERT INTO ordenes_taller (vehiculo_id, area, descripcion, tecnico, costo, estado)
         VALUES (?1, ?2, ?3, ?4, ?5, 'PENDIENTE')",
        rusqlite::params![
            orden.vehiculo_id,
            area,
            descripcion,
            opcional(orden.tecnico.clone()),
            orden.costo,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(orden_id = id, vehiculo_id = orden.vehiculo_id, area = %area, "orden de taller creada");
    obtener(conn, id)
}

pub fn actualizar(conn: &Connection, orden: &OrdenTaller) -> Resultado<OrdenTaller> {
    let id = orden
        .id
        .ok_or_else(|| TallerError::validacion("ID requerido para actualizar"))?;
    let (area, descripcion) = validar(orden)?;
    let actual = obtener(conn, id)?;
    let estado = if estados::es_valido(CICLO_ORDEN, &orden.estado) {
        orden.estado.clone()
    } else {
        actual.estado
    };

    conn.execute(
        "UPDATE ordenes_taller SET area=?1, descripcion=?2, tecnico=?3, costo=?4, estado=?5,
         updated_at=datetime('now','localtime')
         WHERE id=?6",
        rusqlite::params![area, descripcion, opcional(orden.tecnico.clone()), orden.costo, estado, id],
    )?;
    obtener(conn, id)
}

pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let borradas = conn.execute("DELETE FROM ordenes_taller WHERE id = ?1", rusqlite::params![id])?;
    if borradas == 0 {
        return Err(TallerError::no_encontrado("Orden"));
    }
    Ok(())
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<OrdenTaller> {
    o_no_encontrado(
        conn.query_row(
            "SELECT id, vehiculo_id, area, descripcion, tecnico, costo, estado, created_at
             FROM ordenes_taller WHERE id = ?1",
            rusqlite::params![id],
            mapear,
        ),
        "Orden",
    )
}

pub fn listar_por_vehiculo(conn: &Connection, vehiculo_id: i64) -> Resultado<Vec<OrdenTaller>> {
    let mut stmt = conn.prepare(
        "SELECT id, vehiculo_id, area, descripcion, tecnico, costo, estado, created_at
         FROM ordenes_taller WHERE vehiculo_id = ?1 ORDER BY id",
    )?;
    let ordenes = stmt
        .query_map(rusqlite::params![vehiculo_id], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ordenes)
}

pub fn avanzar_estado(conn: &Connection, id: i64) -> Resultado<OrdenTaller> {
    let actual = obtener(conn, id)?;
    let nuevo = estados::siguiente(CICLO_ORDEN, &actual.estado);
    conn.execute(
        "UPDATE ordenes_taller SET estado = ?1, updated_at = datetime('now','localtime') WHERE id = ?2",
        rusqlite::params![nuevo, id],
    )?;
    obtener(conn, id)
}

#[tauri::command]
pub fn crear_orden(db: State<Database>, orden: OrdenTaller) -> Result<OrdenTaller, String> {
    db.con(|conn| crear(conn, &orden))
}

#[tauri::command]
pub fn actualizar_orden(db: State<Database>, orden: OrdenTaller) -> Result<OrdenTaller, String> {
    db.con(|conn| actualizar(conn, &orden))
}

#[tauri::command]
pub fn eliminar_orden(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[tauri::command]
pub fn listar_ordenes_vehiculo(db: State<Database>, vehiculo_id: i64) -> Result<Vec<OrdenTaller>, String> {
    db.con(|conn| listar_por_vehiculo(conn, vehiculo_id))
}

#[tauri::command]
pub fn avanzar_estado_orden(db: State<Database>, id: i64) -> Result<OrdenTaller, String> {
    db.con(|conn| avanzar_estado(conn, id))
}
