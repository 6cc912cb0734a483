use crate::commands::{clientes, notificaciones};
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::estados::{self, CICLO_VEHICULO};
use crate::logica::validacion::{opcional, requerido, validar_anio};
use crate::models::{FiltroVehiculos, Vehiculo};
use rusqlite::Connection;
use tauri::State;
use tracing::info;

const SELECT_VEHICULO: &str =
    "SELECT v.id, v.folio, v.cliente_id, cl.nombre, v.cotizacion_id, v.marca, v.modelo,
            v.anio, v.color, v.placas, v.kilometraje, v.fecha_ingreso,
            v.fecha_entrega_estimada, v.fecha_entrega, v.estado, v.notas
     FROM vehiculos v
     LEFT JOIN clientes cl ON cl.id = v.cliente_id";

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Vehiculo> {
    Ok(Vehiculo {
        id: Some(row.get(0)?),
        folio: row.get(1)?,
        cliente_id: row.get(2)?,
        cliente_nombre: row.get(3)?,
        cotizacion_id: row.get(4)?,
        marca: row.get(5)?,
        modelo: row.get(6)?,
        anio: row.get(7)?,
        color: row.get(8)?,
        placas: row.get(9)?,
        kilometraje: row.get(10)?,
        fecha_ingreso: row.get(11)?,
        fecha_entrega_estimada: row.get(12)?,
        fecha_entrega: row.get(13)?,
        estado: row.get(14)?,
        notas: row.get(15)?,
    })
}

/// `fecha_entrega` según el estado nuevo en `?{n}`: se fija al pasar a
/// ENTREGADO, se conserva si ya lo estaba y se limpia en cualquier otro estado
fn fecha_entrega_sql(n: usize) -> String {
    format!(
        "CASE WHEN ?{n} != 'ENTREGADO' THEN NULL
              WHEN estado = 'ENTREGADO' THEN fecha_entrega
              ELSE datetime('now','localtime') END"
    )
}

fn folio_en_uso(conn: &Connection, folio: &str, excluir_id: Option<i64>) -> Resultado<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM vehiculos WHERE folio = ?1 AND (?2 IS NULL OR id != ?2)",
        rusqlite::params![folio, excluir_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

fn validar(conn: &Connection, vehiculo: &Vehiculo) -> Resultado<(String, String)> {
    let folio = requerido(&vehiculo.folio, "El folio")?.to_uppercase();
    let marca = requerido(&vehiculo.marca, "La marca")?;
    validar_anio(vehiculo.anio)?;
    if vehiculo.kilometraje.is_some_and(|km| km < 0) {
        return Err(TallerError::validacion("El kilometraje no puede ser negativo"));
    }
    clientes::obtener(conn, vehiculo.cliente_id)?;
    if let Some(cotizacion_id) = vehiculo.cotizacion_id {
        crate::commands::cotizaciones::obtener_encabezado(conn, cotizacion_id)?;
    }
    if folio_en_uso(conn, &folio, vehiculo.id)? {
        return Err(TallerError::Duplicado(format!(
            "El folio {} ya está asignado a otro vehículo",
            folio
        )));
    }
    Ok((folio, marca))
}

pub fn crear(conn: &Connection, vehiculo: &Vehiculo) -> Resultado<Vehiculo> {
    let (folio, marca) = validar(conn, vehiculo)?;
    let estado = if estados::es_valido(CICLO_VEHICULO, &vehiculo.estado) {
        vehiculo.estado.as_str()
    } else {
        CICLO_VEHICULO[0]
    };

    conn.execute(
        "INSERT INTO vehiculos (folio, cliente_id, cotizacion_id, marca, modelo, anio, color,
         placas, kilometraje, fecha_ingreso, fecha_entrega_estimada, estado, notas, fecha_entrega)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                 COALESCE(?10, datetime('now','localtime')), ?11, ?12, ?13,
                 CASE WHEN ?12 = 'ENTREGADO' THEN datetime('now','localtime') END)",
        rusqlite::params![
            folio,
            vehiculo.cliente_id,
            vehiculo.cotizacion_id,
            marca,
            opcional(vehiculo.modelo.clone()),
            vehiculo.anio,
            opcional(vehiculo.color.clone()),
            opcional(vehiculo.placas.clone()).map(|p| p.to_uppercase()),
            vehiculo.kilometraje,
            opcional(vehiculo.fecha_ingreso.clone()),
            opcional(vehiculo.fecha_entrega_estimada.clone()),
            estado,
            opcional(vehiculo.notas.clone()),
        ],
    )?;
    let id = conn.last_insert_rowid();

    info!(vehiculo_id = id, folio = %folio, "vehículo recibido");
    let descripcion = match opcional(vehiculo.modelo.clone()) {
        Some(modelo) => format!("{} {}", marca, modelo),
        None => marca,
    };
    notificaciones::registrar(
        conn,
        "VEHICULO",
        &format!("Vehículo recibido {}", folio),
        Some(&descripcion),
        Some(id),
    );
    obtener(conn, id)
}

pub fn actualizar(conn: &Connection, vehiculo: &Vehiculo) -> Resultado<Vehiculo> {
    let id = vehiculo
        .id
        .ok_or_else(|| TallerError::validacion("ID requerido para actualizar"))?;
    let (folio, marca) = validar(conn, vehiculo)?;
    let actual = obtener(conn, id)?;
    let estado = if estados::es_valido(CICLO_VEHICULO, &vehiculo.estado) {
        vehiculo.estado.clone()
    } else {
        actual.estado
    };

    conn.execute(
        &format!(
            "UPDATE vehiculos SET folio=?1, cliente_id=?2, cotizacion_id=?3, marca=?4, modelo=?5,
             anio=?6, color=?7, placas=?8, kilometraje=?9, fecha_entrega_estimada=?10,
             fecha_entrega={}, estado=?11, notas=?12, updated_at=datetime('now','localtime')
             WHERE id=?13",
            fecha_entrega_sql(11)
        ),
        rusqlite::params![
            folio,
            vehiculo.cliente_id,
            vehiculo.cotizacion_id,
            marca,
            opcional(vehiculo.modelo.clone()),
            vehiculo.anio,
            opcional(vehiculo.color.clone()),
            opcional(vehiculo.placas.clone()).map(|p| p.to_uppercase()),
            vehiculo.kilometraje,
            opcional(vehiculo.fecha_entrega_estimada.clone()),
            estado,
            opcional(vehiculo.notas.clone()),
            id,
        ],
    )?;
    obtener(conn, id)
}

/// Borra el vehículo y sus órdenes de trabajo
pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM ordenes_taller WHERE vehiculo_id = ?1", rusqlite::params![id])?;
    let borrados = tx.execute("DELETE FROM vehiculos WHERE id = ?1", rusqlite::params![id])?;
    if borrados == 0 {
        return Err(TallerError::no_encontrado("Vehículo"));
    }
    tx.commit()?;
    info!(vehiculo_id = id, "vehículo eliminado");
    Ok(())
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<Vehiculo> {
    o_no_encontrado(
        conn.query_row(
            &format!("{} WHERE v.id = ?1", SELECT_VEHICULO),
            rusqlite::params![id],
            mapear,
        ),
        "Vehículo",
    )
}

pub fn listar(conn: &Connection, filtro: &FiltroVehiculos) -> Resultado<Vec<Vehiculo>> {
    let estado = opcional(filtro.estado.clone());
    let busqueda = opcional(filtro.busqueda.clone()).map(|b| format!("%{}%", b));

    let mut stmt = conn.prepare(&format!(
        "{} WHERE (?1 IS NULL OR v.estado = ?1)
           AND (?2 IS NULL OR v.folio LIKE ?2 OR v.placas LIKE ?2 OR v.marca LIKE ?2
                OR v.modelo LIKE ?2 OR cl.nombre LIKE ?2)
           AND (?3 = 0 OR v.estado != 'ENTREGADO')
         ORDER BY v.fecha_ingreso DESC, v.id DESC",
        SELECT_VEHICULO
    ))?;
    let vehiculos = stmt
        .query_map(
            rusqlite::params![estado, busqueda, filtro.solo_en_taller as i32],
            mapear,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vehiculos)
}

pub fn listar_por_cliente(conn: &Connection, cliente_id: i64) -> Resultado<Vec<Vehiculo>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE v.cliente_id = ?1 ORDER BY v.fecha_ingreso DESC, v.id DESC",
        SELECT_VEHICULO
    ))?;
    let vehiculos = stmt
        .query_map(rusqlite::params![cliente_id], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vehiculos)
}

/// Avanza al siguiente estado; al llegar a ENTREGADO se fija la fecha de entrega
pub fn avanzar_estado(conn: &Connection, id: i64) -> Resultado<Vehiculo> {
    let actual = obtener(conn, id)?;
    let nuevo = estados::siguiente(CICLO_VEHICULO, &actual.estado);

    conn.execute(
        &format!(
            "UPDATE vehiculos SET fecha_entrega = {}, estado = ?1,
             updated_at = datetime('now','localtime') WHERE id = ?2",
            fecha_entrega_sql(1)
        ),
        rusqlite::params![nuevo, id],
    )?;

    info!(vehiculo_id = id, de = %actual.estado, a = nuevo, "estado de vehículo");
    notificaciones::registrar(
        conn,
        "VEHICULO",
        &format!("Vehículo {}: {}", actual.folio, estados::etiqueta(nuevo)),
        actual.cliente_nombre.as_deref(),
        Some(id),
    );
    obtener(conn, id)
}

#[tauri::command]
pub fn crear_vehiculo(db: State<Database>, vehiculo: Vehiculo) -> Result<Vehiculo, String> {
    db.con(|conn| crear(conn, &vehiculo))
}

#[tauri::command]
pub fn actualizar_vehiculo(db: State<Database>, vehiculo: Vehiculo) -> Result<Vehiculo, String> {
    db.con(|conn| actualizar(conn, &vehiculo))
}

#[tauri::command]
pub fn eliminar_vehiculo(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[tauri::command]
pub fn obtener_vehiculo(db: State<Database>, id: i64) -> Result<Vehiculo, String> {
    db.con(|conn| obtener(conn, id))
}

#[tauri::command]
pub fn listar_vehiculos(db: State<Database>, filtro: Option<FiltroVehiculos>) -> Result<Vec<Vehiculo>, String> {
    let filtro = filtro.unwrap_or_default();
    db.con(|conn| listar(conn, &filtro))
}

#[tauri::command]
pub fn avanzar_estado_vehiculo(db: State<Database>, id: i64) -> Result<Vehiculo, String> {
    db.con(|conn| avanzar_estado(conn, id))
}

#[cfg(test)]
pub(crate) fn vehiculo_de_prueba(cliente_id: i64, folio: &str) -> Vehiculo {
    Vehiculo {
        id: None,
        folio: folio.to_string(),
        cliente_id,
        cliente_nombre: None,
        cotizacion_id: None,
        marca: "Chevrolet".to_string(),
        modelo: Some("Aveo".to_string()),
        anio: Some(2015),
        color: Some("Rojo".to_string()),
        placas: Some("jkl-987".to_string()),
        kilometraje: Some(120_000),
        fecha_ingreso: None,
        fecha_entrega_estimada: None,
        fecha_entrega: None,
        estado: String::new(),
        notas: None,
    }
}
