use crate::commands::{cotizaciones, notificaciones, pagos, vehiculos};
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::validacion::{normalizar_telefono, opcional, requerido, validar_telefono};
use crate::models::{Cliente, FiltroCotizaciones, FiltroPagos, HistorialCliente};
use rusqlite::Connection;
use tauri::State;
use tracing::info;

const COLUMNAS: &str =
    "id, nombre, telefono, email, direccion, rfc, notas, activo, created_at";

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Cliente> {
    Ok(Cliente {
        id: Some(row.get(0)?),
        nombre: row.get(1)?,
        telefono: row.get(2)?,
        email: row.get(3)?,
        direccion: row.get(4)?,
        rfc: row.get(5)?,
        notas: row.get(6)?,
        activo: row.get::<_, i32>(7)? != 0,
        created_at: row.get(8)?,
    })
}

/// Cliente activo con el mismo teléfono (comparando solo dígitos)
fn telefono_duplicado(conn: &Connection, telefono: &str, excluir_id: Option<i64>) -> Resultado<Option<String>> {
    let buscado = normalizar_telefono(telefono);
    let mut stmt = conn.prepare("SELECT id, nombre, telefono FROM clientes WHERE activo = 1")?;
    let filas = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(filas
        .into_iter()
        .find(|(id, _, tel)| Some(*id) != excluir_id && normalizar_telefono(tel) == buscado)
        .map(|(_, nombre, _)| nombre))
}

/// Validación de formulario: nombre y teléfono obligatorios, teléfono único
fn validar(conn: &Connection, cliente: &Cliente) -> Resultado<(String, String)> {
    let nombre = requerido(&cliente.nombre, "El nombre")?;
    let telefono = validar_telefono(&cliente.telefono)?;

    if let Some(otro) = telefono_duplicado(conn, &telefono, cliente.id)? {
        return Err(TallerError::Duplicado(format!(
            "El teléfono {} ya está registrado con el cliente {}",
            telefono, otro
        )));
    }
    Ok((nombre, telefono))
}

pub fn crear(conn: &Connection, cliente: &Cliente) -> Resultado<i64> {
    let (nombre, telefono) = validar(conn, cliente)?;

    conn.execute(
        "INSERT INTO clientes (nombre, telefono, email, direccion, rfc, notas, activo)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
        rusqlite::params![
            nombre,
            telefono,
            opcional(cliente.email.clone()),
            opcional(cliente.direccion.clone()),
            opcional(cliente.rfc.clone()).map(|r| r.to_uppercase()),
            opcional(cliente.notas.clone()),
        ],
    )?;
    let id = conn.last_insert_rowid();

    info!(cliente_id = id, "cliente creado");
    notificaciones::registrar(conn, "CLIENTE", "Nuevo cliente", Some(&nombre), Some(id));
    Ok(id)
}

pub fn actualizar(conn: &Connection, cliente: &Cliente) -> Resultado<()> {
    let id = cliente
        .id
        .ok_or_else(|| TallerError::validacion("ID requerido para actualizar"))?;
    let (nombre, telefono) = validar(conn, cliente)?;

    let cambiados = conn.execute(
        "UPDATE clientes SET nombre=?1, telefono=?2, email=?3, direccion=?4, rfc=?5,
         notas=?6, activo=?7, updated_at=datetime('now','localtime')
         WHERE id=?8",
        rusqlite::params![
            nombre,
            telefono,
            opcional(cliente.email.clone()),
            opcional(cliente.direccion.clone()),
            opcional(cliente.rfc.clone()).map(|r| r.to_uppercase()),
            opcional(cliente.notas.clone()),
            cliente.activo as i32,
            id,
        ],
    )?;
    if cambiados == 0 {
        return Err(TallerError::no_encontrado("Cliente"));
    }
    Ok(())
}

/// Baja lógica: el historial de cotizaciones y pagos se conserva
pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let cambiados = conn.execute(
        "UPDATE clientes SET activo = 0, updated_at = datetime('now','localtime') WHERE id = ?1",
        rusqlite::params![id],
    )?;
    if cambiados == 0 {
        return Err(TallerError::no_encontrado("Cliente"));
    }
    info!(cliente_id = id, "cliente dado de baja");
    Ok(())
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<Cliente> {
    o_no_encontrado(
        conn.query_row(
            &format!("SELECT {} FROM clientes WHERE id = ?1", COLUMNAS),
            rusqlite::params![id],
            mapear,
        ),
        "Cliente",
    )
}

pub fn listar(conn: &Connection) -> Resultado<Vec<Cliente>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM clientes WHERE activo = 1 ORDER BY nombre COLLATE NOCASE",
        COLUMNAS
    ))?;
    let clientes = stmt
        .query_map([], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clientes)
}

pub fn buscar(conn: &Connection, termino: &str) -> Resultado<Vec<Cliente>> {
    let termino = termino.trim();
    if termino.is_empty() {
        return listar(conn);
    }
    let busqueda = format!("%{}%", termino);
    let digitos = normalizar_telefono(termino);
    let por_telefono = if digitos.len() >= 3 {
        format!("%{}%", digitos)
    } else {
        busqueda.clone()
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM clientes
         WHERE activo = 1
         AND (nombre LIKE ?1 OR email LIKE ?1 OR telefono LIKE ?1
              OR REPLACE(REPLACE(REPLACE(telefono, ' ', ''), '-', ''), '.', '') LIKE ?2)
         ORDER BY nombre COLLATE NOCASE LIMIT 30",
        COLUMNAS
    ))?;
    let clientes = stmt
        .query_map(rusqlite::params![busqueda, por_telefono], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clientes)
}

pub fn historial(conn: &Connection, id: i64) -> Resultado<HistorialCliente> {
    let cliente = obtener(conn, id)?;
    let cotizaciones = cotizaciones::listar(
        conn,
        &FiltroCotizaciones {
            cliente_id: Some(id),
            ..Default::default()
        },
    )?;
    let vehiculos = vehiculos::listar_por_cliente(conn, id)?;
    let pagos = pagos::listar(
        conn,
        &FiltroPagos {
            cliente_id: Some(id),
            ..Default::default()
        },
    )?;

    let total_pagado = pagos.iter().map(|p| p.monto).sum();
    let saldo_pendiente = cotizaciones.iter().map(|c| c.saldo_pendiente).sum();

    Ok(HistorialCliente {
        cliente,
        cotizaciones,
        vehiculos,
        pagos,
        total_pagado,
        saldo_pendiente,
    })
}

#[tauri::command]
pub fn crear_cliente(db: State<Database>, cliente: Cliente) -> Result<i64, String> {
    db.con(|conn| crear(conn, &cliente))
}

#[tauri::command]
pub fn actualizar_cliente(db: State<Database>, cliente: Cliente) -> Result<(), String> {
    db.con(|conn| actualizar(conn, &cliente))
}

#[tauri::command]
pub fn eliminar_cliente(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[tauri::command]
pub fn obtener_cliente(db: State<Database>, id: i64) -> Result<Cliente, String> {
    db.con(|conn| obtener(conn, id))
}

#[tauri::command]
pub fn listar_clientes(db: State<Database>) -> Result<Vec<Cliente>, String> {
    db.con(listar)
}

#[tauri::command]
pub fn buscar_clientes(db: State<Database>, termino: String) -> Result<Vec<Cliente>, String> {
    db.con(|conn| buscar(conn, &termino))
}

#[tauri::command]
pub fn historial_cliente(db: State<Database>, id: i64) -> Result<HistorialCliente, String> {
    db.con(|conn| historial(conn, id))
}

#[cfg(test)]
pub(crate) fn cliente_de_prueba(nombre: &str, telefono: &str) -> Cliente {
    Cliente {
        nombre: nombre.to_string(),
        telefono: telefono.to_string(),
        activo: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telefono_obligatorio() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let err = crear(&conn, &cliente_de_prueba("Ana", "  ")).unwrap_err();
        assert!(matches!(err, TallerError::Validacion(_)));
        assert!(crear(&conn, &cliente_de_prueba(" ", "5512345678")).is_err());
    }

    #[test]
    fn no_permite_telefono_duplicado() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();

        let id = crear(&conn, &cliente_de_prueba("Ana López", "55 1234 5678")).unwrap();
        let err = crear(&conn, &cliente_de_prueba("Otra Ana", "+52 (55) 1234-5678")).unwrap_err();
        assert!(matches!(err, TallerError::Duplicado(_)));
        assert!(err.to_string().contains("Ana López"));

        // actualizar el mismo cliente con su propio teléfono es válido
        let mut ana = obtener(&conn, id).unwrap();
        ana.email = Some("ana@correo.mx".to_string());
        actualizar(&conn, &ana).unwrap();

        // dado de baja ya no bloquea el número
        eliminar(&conn, id).unwrap();
        crear(&conn, &cliente_de_prueba("Otra Ana", "5512345678")).unwrap();
    }

    #[test]
    fn busca_por_nombre_y_telefono() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        crear(&conn, &cliente_de_prueba("Beatriz Soto", "33-1111-2222")).unwrap();
        crear(&conn, &cliente_de_prueba("Carlos Ruiz", "5599998888")).unwrap();

        assert_eq!(buscar(&conn, "soto").unwrap().len(), 1);
        assert_eq!(buscar(&conn, "33 1111").unwrap().len(), 1);
        assert_eq!(buscar(&conn, "").unwrap().len(), 2);
        assert!(buscar(&conn, "zzz").unwrap().is_empty());
    }

    #[test]
    fn historial_suma_pagos_y_saldos() {
        use crate::commands::cotizaciones::nueva_de_prueba;
        use crate::commands::pagos::pago_de_prueba;
        use crate::commands::vehiculos::vehiculo_de_prueba;

        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        let id = crear(&conn, &cliente_de_prueba("Elena Vega", "5587654321")).unwrap();
        let cot = cotizaciones::crear(&conn, &nueva_de_prueba(id, &[("Pintura", 1.0, 1000.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();
        pagos::registrar(&conn, &pago_de_prueba(Some(cot), "ANTICIPO", 400.0)).unwrap();
        vehiculos::crear(&conn, &vehiculo_de_prueba(id, "H-1")).unwrap();

        let h = historial(&conn, id).unwrap();
        assert_eq!(h.cliente.nombre, "Elena Vega");
        assert_eq!(h.cotizaciones.len(), 1);
        assert_eq!(h.vehiculos.len(), 1);
        assert_eq!(h.pagos.len(), 1);
        assert_eq!(h.total_pagado, 400.0);
        assert_eq!(h.saldo_pendiente, 760.0);
    }

    #[test]
    fn alta_genera_notificacion() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();
        crear(&conn, &cliente_de_prueba("Dora", "5511112222")).unwrap();
        let feed = notificaciones::listar(&conn, true, None).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].tipo, "CLIENTE");
        assert_eq!(feed[0].mensaje.as_deref(), Some("Dora"));
    }
}
