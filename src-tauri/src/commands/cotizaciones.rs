use crate::commands::{clientes, config, notificaciones};
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::estados::{self, CICLO_COTIZACION};
use crate::logica::saldos::{self, CampoPago, PagosCotizacion};
use crate::logica::validacion::{opcional, validar_anio};
use crate::models::{
    Cliente, ConceptoCotizacion, Cotizacion, CotizacionCompleta, FiltroCotizaciones,
    NuevaCotizacion,
};
use rusqlite::Connection;
use tauri::State;
use tracing::info;

const SELECT_COTIZACION: &str =
    "SELECT c.id, c.folio, c.cliente_id, cl.nombre, c.vehiculo_marca, c.vehiculo_modelo,
            c.vehiculo_anio, c.placas, c.descripcion, c.subtotal, c.iva, c.total,
            c.anticipo, c.pago1, c.liquidacion, c.saldo_pendiente, c.estado, c.notas,
            c.created_at
     FROM cotizaciones c
     LEFT JOIN clientes cl ON cl.id = c.cliente_id";

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Cotizacion> {
    Ok(Cotizacion {
        id: Some(row.get(0)?),
        folio: row.get(1)?,
        cliente_id: row.get(2)?,
        cliente_nombre: row.get(3)?,
        vehiculo_marca: row.get(4)?,
        vehiculo_modelo: row.get(5)?,
        vehiculo_anio: row.get(6)?,
        placas: row.get(7)?,
        descripcion: row.get(8)?,
        subtotal: row.get(9)?,
        iva: row.get(10)?,
        total: row.get(11)?,
        anticipo: row.get(12)?,
        pago1: row.get(13)?,
        liquidacion: row.get(14)?,
        saldo_pendiente: row.get(15)?,
        estado: row.get(16)?,
        notas: row.get(17)?,
        created_at: row.get(18)?,
    })
}

/// Limpia los conceptos y calcula su importe
fn preparar_conceptos(conceptos: &[ConceptoCotizacion]) -> Resultado<Vec<ConceptoCotizacion>> {
    let mut limpios = Vec::with_capacity(conceptos.len());
    for c in conceptos {
        let descripcion = c.descripcion.trim();
        if descripcion.is_empty() {
            continue;
        }
        if !(c.cantidad > 0.0) {
            return Err(TallerError::validacion(format!(
                "La cantidad de '{}' debe ser mayor a 0",
                descripcion
            )));
        }
        if !(c.precio_unitario >= 0.0) {
            return Err(TallerError::validacion(format!(
                "El precio de '{}' no puede ser negativo",
                descripcion
            )));
        }
        limpios.push(ConceptoCotizacion {
            id: None,
            descripcion: descripcion.to_string(),
            cantidad: c.cantidad,
            precio_unitario: c.precio_unitario,
            importe: saldos::redondear(c.cantidad * c.precio_unitario),
        });
    }
    if limpios.is_empty() {
        return Err(TallerError::validacion(
            "La cotización debe tener al menos un concepto",
        ));
    }
    Ok(limpios)
}

fn insertar_conceptos(conn: &Connection, cotizacion_id: i64, conceptos: &[ConceptoCotizacion]) -> Resultado<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO cotizacion_conceptos (cotizacion_id, descripcion, cantidad, precio_unitario, importe)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for c in conceptos {
        stmt.execute(rusqlite::params![
            cotizacion_id,
            c.descripcion,
            c.cantidad,
            c.precio_unitario,
            c.importe,
        ])?;
    }
    Ok(())
}

fn conceptos_de(conn: &Connection, cotizacion_id: i64) -> Resultado<Vec<ConceptoCotizacion>> {
    let mut stmt = conn.prepare(
        "SELECT id, descripcion, cantidad, precio_unitario, importe
         FROM cotizacion_conceptos WHERE cotizacion_id = ?1 ORDER BY id",
    )?;
    let conceptos = stmt
        .query_map(rusqlite::params![cotizacion_id], |row| {
            Ok(ConceptoCotizacion {
                id: Some(row.get(0)?),
                descripcion: row.get(1)?,
                cantidad: row.get(2)?,
                precio_unitario: row.get(3)?,
                importe: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(conceptos)
}

/// Toma el siguiente folio COT-000001 y avanza el secuencial. Nunca baja del
/// mayor folio ya emitido, aunque el secuencial se haya editado a mano.
fn tomar_folio(conn: &Connection) -> Resultado<String> {
    let configurado: i64 = conn
        .query_row(
            "SELECT CAST(value AS INTEGER) FROM config WHERE key = 'secuencial_cotizacion'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(1);
    let emitido: i64 = conn.query_row(
        "SELECT COALESCE(MAX(CAST(SUBSTR(folio, 5) AS INTEGER)), 0)
         FROM cotizaciones WHERE folio LIKE 'COT-%'",
        [],
        |row| row.get(0),
    )?;
    let secuencial = configurado.max(emitido + 1).max(1);

    conn.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES ('secuencial_cotizacion', CAST(?1 AS TEXT))",
        rusqlite::params![secuencial + 1],
    )?;
    Ok(format!("COT-{:06}", secuencial))
}

fn pagos_de(nueva: &NuevaCotizacion) -> PagosCotizacion {
    PagosCotizacion {
        anticipo: nueva.anticipo,
        pago1: nueva.pago1,
        liquidacion: nueva.liquidacion,
    }
}

/// Alta sin transacción propia; la abre quien llama
fn crear_en(conn: &Connection, nueva: &NuevaCotizacion) -> Resultado<CotizacionCompleta> {
    let cliente = clientes::obtener(conn, nueva.cliente_id)?;
    if !cliente.activo {
        return Err(TallerError::validacion("El cliente está dado de baja"));
    }
    validar_anio(nueva.vehiculo_anio)?;

    let conceptos = preparar_conceptos(&nueva.conceptos)?;
    let totales = saldos::calcular_totales(&conceptos, config::iva_porcentaje(conn));
    let saldo = saldos::validar_pagos(totales.total, &pagos_de(nueva))?;
    let folio = tomar_folio(conn)?;

    conn.execute(
        "INSERT INTO cotizaciones (folio, cliente_id, vehiculo_marca, vehiculo_modelo,
         vehiculo_anio, placas, descripcion, subtotal, iva, total, anticipo, pago1,
         liquidacion, saldo_pendiente, estado, notas)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 'PENDIENTE', ?15)",
        rusqlite::params![
            folio,
            nueva.cliente_id,
            opcional(nueva.vehiculo_marca.clone()),
            opcional(nueva.vehiculo_modelo.clone()),
            nueva.vehiculo_anio,
            opcional(nueva.placas.clone()).map(|p| p.to_uppercase()),
            opcional(nueva.descripcion.clone()),
            totales.subtotal,
            totales.iva,
            totales.total,
            nueva.anticipo,
            nueva.pago1,
            nueva.liquidacion,
            saldo,
            opcional(nueva.notas.clone()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    insertar_conceptos(conn, id, &conceptos)?;

    info!(cotizacion_id = id, folio = %folio, total = totales.total, "cotización creada");
    notificaciones::registrar(
        conn,
        "COTIZACION",
        &format!("Nueva cotización {}", folio),
        Some(&format!("{} por ${:.2}", cliente.nombre, totales.total)),
        Some(id),
    );

    obtener(conn, id)
}

pub fn crear(conn: &Connection, nueva: &NuevaCotizacion) -> Resultado<CotizacionCompleta> {
    let tx = conn.unchecked_transaction()?;
    let completa = crear_en(&tx, nueva)?;
    tx.commit()?;
    Ok(completa)
}

/// Cliente nuevo y su primera cotización. Si cualquiera de las dos falla no
/// queda nada guardado.
pub fn crear_con_cliente(
    conn: &Connection,
    cliente: &Cliente,
    nueva: &NuevaCotizacion,
) -> Resultado<CotizacionCompleta> {
    let tx = conn.unchecked_transaction()?;
    let cliente_id = clientes::crear(&tx, cliente)?;
    let nueva = NuevaCotizacion {
        cliente_id,
        ..nueva.clone()
    };
    let completa = crear_en(&tx, &nueva)?;
    tx.commit()?;
    Ok(completa)
}

pub fn actualizar(conn: &Connection, id: i64, datos: &NuevaCotizacion) -> Resultado<CotizacionCompleta> {
    let tx = conn.unchecked_transaction()?;
    obtener_encabezado(&tx, id)?;
    if !clientes::obtener(&tx, datos.cliente_id)?.activo {
        return Err(TallerError::validacion("El cliente está dado de baja"));
    }
    validar_anio(datos.vehiculo_anio)?;

    let conceptos = preparar_conceptos(&datos.conceptos)?;
    let totales = saldos::calcular_totales(&conceptos, config::iva_porcentaje(&tx));
    let saldo = saldos::validar_pagos(totales.total, &pagos_de(datos))?;

    tx.execute(
        "UPDATE cotizaciones SET cliente_id=?1, vehiculo_marca=?2, vehiculo_modelo=?3,
         vehiculo_anio=?4, placas=?5, descripcion=?6, subtotal=?7, iva=?8, total=?9,
         anticipo=?10, pago1=?11, liquidacion=?12, saldo_pendiente=?13, notas=?14,
         updated_at=datetime('now','localtime')
         WHERE id=?15",
        rusqlite::params![
            datos.cliente_id,
            opcional(datos.vehiculo_marca.clone()),
            opcional(datos.vehiculo_modelo.clone()),
            datos.vehiculo_anio,
            opcional(datos.placas.clone()).map(|p| p.to_uppercase()),
            opcional(datos.descripcion.clone()),
            totales.subtotal,
            totales.iva,
            totales.total,
            datos.anticipo,
            datos.pago1,
            datos.liquidacion,
            saldo,
            opcional(datos.notas.clone()),
            id,
        ],
    )?;
    tx.execute(
        "DELETE FROM cotizacion_conceptos WHERE cotizacion_id = ?1",
        rusqlite::params![id],
    )?;
    insertar_conceptos(&tx, id, &conceptos)?;
    tx.commit()?;

    info!(cotizacion_id = id, total = totales.total, "cotización actualizada");
    obtener(conn, id)
}

pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM cotizacion_conceptos WHERE cotizacion_id = ?1",
        rusqlite::params![id],
    )?;
    let borradas = tx.execute("DELETE FROM cotizaciones WHERE id = ?1", rusqlite::params![id])?;
    if borradas == 0 {
        return Err(TallerError::no_encontrado("Cotización"));
    }
    tx.commit()?;
    info!(cotizacion_id = id, "cotización eliminada");
    Ok(())
}

pub fn obtener_encabezado(conn: &Connection, id: i64) -> Resultado<Cotizacion> {
    o_no_encontrado(
        conn.query_row(
            &format!("{} WHERE c.id = ?1", SELECT_COTIZACION),
            rusqlite::params![id],
            mapear,
        ),
        "Cotización",
    )
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<CotizacionCompleta> {
    let cotizacion = obtener_encabezado(conn, id)?;
    let conceptos = conceptos_de(conn, id)?;
    let (cliente_telefono, cliente_email) = conn
        .query_row(
            "SELECT telefono, email FROM clientes WHERE id = ?1",
            rusqlite::params![cotizacion.cliente_id],
            |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .unwrap_or((None, None));

    Ok(CotizacionCompleta {
        cotizacion,
        conceptos,
        cliente_telefono,
        cliente_email,
    })
}

pub fn listar(conn: &Connection, filtro: &FiltroCotizaciones) -> Resultado<Vec<Cotizacion>> {
    let estado = opcional(filtro.estado.clone());
    let busqueda = opcional(filtro.busqueda.clone()).map(|b| format!("%{}%", b));

    let mut stmt = conn.prepare(&format!(
        "{} WHERE (?1 IS NULL OR c.estado = ?1)
           AND (?2 IS NULL OR c.cliente_id = ?2)
           AND (?3 IS NULL OR c.folio LIKE ?3 OR cl.nombre LIKE ?3
                OR c.vehiculo_marca LIKE ?3 OR c.vehiculo_modelo LIKE ?3 OR c.placas LIKE ?3)
           AND (?4 = 0 OR c.saldo_pendiente > 0.01)
         ORDER BY c.created_at DESC, c.id DESC",
        SELECT_COTIZACION
    ))?;
    let cotizaciones = stmt
        .query_map(
            rusqlite::params![estado, filtro.cliente_id, busqueda, filtro.solo_con_saldo as i32],
            mapear,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cotizaciones)
}

pub fn avanzar_estado(conn: &Connection, id: i64) -> Resultado<String> {
    let actual = obtener_encabezado(conn, id)?;
    let nuevo = estados::siguiente(CICLO_COTIZACION, &actual.estado);

    conn.execute(
        "UPDATE cotizaciones SET estado = ?1, updated_at = datetime('now','localtime') WHERE id = ?2",
        rusqlite::params![nuevo, id],
    )?;

    info!(cotizacion_id = id, de = %actual.estado, a = nuevo, "estado de cotización");
    notificaciones::registrar(
        conn,
        "COTIZACION",
        &format!("Cotización {}: {}", actual.folio, estados::etiqueta(nuevo)),
        actual.cliente_nombre.as_deref(),
        Some(id),
    );
    Ok(nuevo.to_string())
}

/// Fija uno de los campos de pago y recalcula el saldo pendiente
pub fn actualizar_pago(conn: &Connection, id: i64, campo: CampoPago, monto: f64) -> Resultado<Cotizacion> {
    let actual = obtener_encabezado(conn, id)?;
    let pagos = PagosCotizacion {
        anticipo: actual.anticipo,
        pago1: actual.pago1,
        liquidacion: actual.liquidacion,
    }
    .con_campo(campo, saldos::redondear(monto));
    let saldo = saldos::validar_pagos(actual.total, &pagos)?;

    conn.execute(
        &format!(
            "UPDATE cotizaciones SET {} = ?1, saldo_pendiente = ?2,
             updated_at = datetime('now','localtime') WHERE id = ?3",
            campo.columna()
        ),
        rusqlite::params![pagos.campo(campo), saldo, id],
    )?;

    info!(cotizacion_id = id, campo = campo.columna(), monto, saldo, "pago de cotización actualizado");
    obtener_encabezado(conn, id)
}

/// Suma un monto al campo de pago indicado
pub fn sumar_pago(conn: &Connection, id: i64, campo: CampoPago, monto: f64) -> Resultado<Cotizacion> {
    let actual = obtener_encabezado(conn, id)?;
    let previo = PagosCotizacion {
        anticipo: actual.anticipo,
        pago1: actual.pago1,
        liquidacion: actual.liquidacion,
    }
    .campo(campo);
    actualizar_pago(conn, id, campo, previo + monto)
}

#[tauri::command]
pub fn crear_cotizacion(db: State<Database>, cotizacion: NuevaCotizacion) -> Result<CotizacionCompleta, String> {
    db.con(|conn| crear(conn, &cotizacion))
}

#[tauri::command]
pub fn crear_cotizacion_con_cliente(
    db: State<Database>,
    cliente: Cliente,
    cotizacion: NuevaCotizacion,
) -> Result<CotizacionCompleta, String> {
    db.con(|conn| crear_con_cliente(conn, &cliente, &cotizacion))
}

#[tauri::command]
pub fn actualizar_cotizacion(
    db: State<Database>,
    id: i64,
    cotizacion: NuevaCotizacion,
) -> Result<CotizacionCompleta, String> {
    db.con(|conn| actualizar(conn, id, &cotizacion))
}

#[tauri::command]
pub fn eliminar_cotizacion(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[tauri::command]
pub fn obtener_cotizacion(db: State<Database>, id: i64) -> Result<CotizacionCompleta, String> {
    db.con(|conn| obtener(conn, id))
}

#[tauri::command]
pub fn listar_cotizaciones(
    db: State<Database>,
    filtro: Option<FiltroCotizaciones>,
) -> Result<Vec<Cotizacion>, String> {
    let filtro = filtro.unwrap_or_default();
    db.con(|conn| listar(conn, &filtro))
}

#[tauri::command]
pub fn avanzar_estado_cotizacion(db: State<Database>, id: i64) -> Result<String, String> {
    db.con(|conn| avanzar_estado(conn, id))
}

#[tauri::command]
pub fn actualizar_pago_cotizacion(
    db: State<Database>,
    id: i64,
    campo: String,
    monto: f64,
) -> Result<Cotizacion, String> {
    let campo = CampoPago::desde_str(&campo)
        .ok_or_else(|| format!("Campo de pago inválido: {}", campo))?;
    db.con(|conn| actualizar_pago(conn, id, campo, monto))
}

/// Vista previa del saldo mientras se escribe en el formulario
#[tauri::command]
pub fn calcular_saldo(total: f64, anticipo: f64, pago1: f64, liquidacion: f64) -> f64 {
    saldos::saldo_pendiente(
        total,
        &PagosCotizacion {
            anticipo,
            pago1,
            liquidacion,
        },
    )
}

#[cfg(test)]
pub(crate) fn nueva_de_prueba(cliente_id: i64, conceptos: &[(&str, f64, f64)]) -> NuevaCotizacion {
    NuevaCotizacion {
        cliente_id,
        vehiculo_marca: Some("Nissan".to_string()),
        vehiculo_modelo: Some("Versa".to_string()),
        vehiculo_anio: Some(2018),
        placas: Some("abc-123".to_string()),
        descripcion: None,
        conceptos: conceptos
            .iter()
            .map(|(d, cant, precio)| ConceptoCotizacion {
                id: None,
                descripcion: d.to_string(),
                cantidad: *cant,
                precio_unitario: *precio,
                importe: 0.0,
            })
            .collect(),
        anticipo: 0.0,
        pago1: 0.0,
        liquidacion: 0.0,
        notas: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::clientes::cliente_de_prueba;

    fn con_cliente() -> (Database, i64) {
        let db = Database::en_memoria();
        let id = {
            let conn = db.conn.lock().unwrap();
            clientes::crear(&conn, &cliente_de_prueba("Ana López", "5512345678")).unwrap()
        };
        (db, id)
    }

    #[test]
    fn crea_con_folio_consecutivo_y_totales() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();

        let nueva = nueva_de_prueba(cliente_id, &[("Pintura puerta", 2.0, 1500.0), ("Pulido", 1.0, 800.0), ("  ", 1.0, 5.0)]);
        let primera = crear(&conn, &nueva).unwrap();
        let segunda = crear(&conn, &nueva).unwrap();

        assert_eq!(primera.cotizacion.folio, "COT-000001");
        assert_eq!(segunda.cotizacion.folio, "COT-000002");
        // el concepto vacío se descarta
        assert_eq!(primera.conceptos.len(), 2);
        assert_eq!(primera.conceptos[0].importe, 3000.0);
        assert_eq!(primera.cotizacion.subtotal, 3800.0);
        assert_eq!(primera.cotizacion.iva, 608.0);
        assert_eq!(primera.cotizacion.total, 4408.0);
        assert_eq!(primera.cotizacion.saldo_pendiente, 4408.0);
        assert_eq!(primera.cotizacion.estado, "PENDIENTE");
        assert_eq!(primera.cotizacion.placas.as_deref(), Some("ABC-123"));
        assert_eq!(primera.cliente_telefono.as_deref(), Some("5512345678"));
    }

    #[test]
    fn requiere_conceptos_validos() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        assert!(crear(&conn, &nueva_de_prueba(cliente_id, &[])).is_err());
        assert!(crear(&conn, &nueva_de_prueba(cliente_id, &[("Hojalatería", 0.0, 100.0)])).is_err());
        assert!(crear(&conn, &nueva_de_prueba(cliente_id, &[("Hojalatería", 1.0, -1.0)])).is_err());
        assert!(matches!(
            crear(&conn, &nueva_de_prueba(999, &[("Hojalatería", 1.0, 100.0)])),
            Err(TallerError::NoEncontrado(_))
        ));
        // un intento fallido no consume folio
        let ok = crear(&conn, &nueva_de_prueba(cliente_id, &[("Hojalatería", 1.0, 100.0)])).unwrap();
        assert_eq!(ok.cotizacion.folio, "COT-000001");
    }

    #[test]
    fn secuencial_reiniciado_no_repite_folio() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let nueva = nueva_de_prueba(cliente_id, &[("Pulido", 1.0, 800.0)]);
        crear(&conn, &nueva).unwrap();
        crear(&conn, &nueva).unwrap();

        for reinicio in ["1", "abc", "-5"] {
            conn.execute(
                "UPDATE config SET value = ?1 WHERE key = 'secuencial_cotizacion'",
                rusqlite::params![reinicio],
            )
            .unwrap();
            let otra = crear(&conn, &nueva).unwrap();
            assert!(otra.cotizacion.folio.as_str() > "COT-000002", "{}", otra.cotizacion.folio);
        }
        let folios: i64 = conn
            .query_row("SELECT COUNT(DISTINCT folio) FROM cotizaciones", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folios, 5);

        // un secuencial adelantado se respeta
        conn.execute("UPDATE config SET value = '100' WHERE key = 'secuencial_cotizacion'", [])
            .unwrap();
        assert_eq!(crear(&conn, &nueva).unwrap().cotizacion.folio, "COT-000100");
    }

    #[test]
    fn actualizar_rechaza_cliente_dado_de_baja() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let id = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pulido", 1.0, 800.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();
        let baja = clientes::crear(&conn, &cliente_de_prueba("Pedro Ruiz", "5599998888")).unwrap();
        clientes::eliminar(&conn, baja).unwrap();

        let err = actualizar(&conn, id, &nueva_de_prueba(baja, &[("Pulido", 1.0, 900.0)])).unwrap_err();
        assert!(matches!(err, TallerError::Validacion(_)));
        assert_eq!(obtener(&conn, id).unwrap().cotizacion.cliente_id, cliente_id);
    }

    #[test]
    fn pagos_recalculan_saldo() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let c = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 1000.0)])).unwrap();
        let id = c.cotizacion.id.unwrap();
        assert_eq!(c.cotizacion.total, 1160.0);

        let c = actualizar_pago(&conn, id, CampoPago::Anticipo, 500.0).unwrap();
        assert_eq!(c.saldo_pendiente, 660.0);
        let c = actualizar_pago(&conn, id, CampoPago::Pago1, 160.0).unwrap();
        assert_eq!(c.saldo_pendiente, 500.0);
        let c = sumar_pago(&conn, id, CampoPago::Pago1, 40.0).unwrap();
        assert_eq!(c.pago1, 200.0);
        assert_eq!(c.saldo_pendiente, 460.0);

        // excedente rechazado, nada cambia
        assert!(actualizar_pago(&conn, id, CampoPago::Liquidacion, 461.0).is_err());
        assert!(actualizar_pago(&conn, id, CampoPago::Liquidacion, -5.0).is_err());
        let c = actualizar_pago(&conn, id, CampoPago::Liquidacion, 460.0).unwrap();
        assert_eq!(c.saldo_pendiente, 0.0);

        assert_eq!(calcular_saldo(1160.0, 500.0, 200.0, 100.0), 360.0);
    }

    #[test]
    fn actualizar_reemplaza_conceptos() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let c = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 1000.0)])).unwrap();
        let id = c.cotizacion.id.unwrap();

        let mut datos = nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 1000.0), ("Defensa", 1.0, 500.0)]);
        datos.anticipo = 300.0;
        let c = actualizar(&conn, id, &datos).unwrap();
        assert_eq!(c.conceptos.len(), 2);
        assert_eq!(c.cotizacion.total, 1740.0);
        assert_eq!(c.cotizacion.saldo_pendiente, 1440.0);
        assert_eq!(c.cotizacion.folio, "COT-000001");

        // bajar el total por debajo de lo pagado no se permite
        let mut menor = nueva_de_prueba(cliente_id, &[("Pulido", 1.0, 100.0)]);
        menor.anticipo = 300.0;
        assert!(actualizar(&conn, id, &menor).is_err());
        assert_eq!(obtener(&conn, id).unwrap().conceptos.len(), 2);
    }

    #[test]
    fn estado_avanza_en_ciclo() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let id = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 10.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();

        let recorrido: Vec<String> = (0..5).map(|_| avanzar_estado(&conn, id).unwrap()).collect();
        assert_eq!(recorrido, ["APROBADA", "EN_PROCESO", "TERMINADA", "ENTREGADA", "PENDIENTE"]);
    }

    #[test]
    fn filtros_de_listado() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let a = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 100.0)])).unwrap();
        let mut pagada = nueva_de_prueba(cliente_id, &[("Pulido", 1.0, 100.0)]);
        pagada.vehiculo_marca = Some("Mazda".to_string());
        pagada.liquidacion = 116.0;
        crear(&conn, &pagada).unwrap();
        avanzar_estado(&conn, a.cotizacion.id.unwrap()).unwrap();

        let todas = listar(&conn, &FiltroCotizaciones::default()).unwrap();
        assert_eq!(todas.len(), 2);
        assert_eq!(todas[0].cliente_nombre.as_deref(), Some("Ana López"));

        let aprobadas = listar(&conn, &FiltroCotizaciones { estado: Some("APROBADA".into()), ..Default::default() }).unwrap();
        assert_eq!(aprobadas.len(), 1);

        let con_saldo = listar(&conn, &FiltroCotizaciones { solo_con_saldo: true, ..Default::default() }).unwrap();
        assert_eq!(con_saldo.len(), 1);
        assert_eq!(con_saldo[0].folio, "COT-000001");

        let mazda = listar(&conn, &FiltroCotizaciones { busqueda: Some("mazda".into()), ..Default::default() }).unwrap();
        assert_eq!(mazda.len(), 1);
        let ana = listar(&conn, &FiltroCotizaciones { busqueda: Some("López".into()), ..Default::default() }).unwrap();
        assert_eq!(ana.len(), 2);
    }

    #[test]
    fn cliente_y_cotizacion_en_una_transaccion() {
        let db = Database::en_memoria();
        let conn = db.conn.lock().unwrap();

        // la cotización falla (sin conceptos): el cliente tampoco queda
        let err = crear_con_cliente(&conn, &cliente_de_prueba("Eva", "5522223333"), &nueva_de_prueba(0, &[]));
        assert!(err.is_err());
        assert!(clientes::listar(&conn).unwrap().is_empty());
        let notificaciones: i64 = conn
            .query_row("SELECT COUNT(*) FROM notificaciones", [], |r| r.get(0))
            .unwrap();
        assert_eq!(notificaciones, 0);

        let ok = crear_con_cliente(
            &conn,
            &cliente_de_prueba("Eva", "5522223333"),
            &nueva_de_prueba(0, &[("Pintura", 1.0, 100.0)]),
        )
        .unwrap();
        assert_eq!(ok.cotizacion.cliente_nombre.as_deref(), Some("Eva"));
        assert_eq!(clientes::listar(&conn).unwrap().len(), 1);
    }

    #[test]
    fn formulario_sin_pagos_ni_importes() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let nueva: NuevaCotizacion = serde_json::from_value(serde_json::json!({
            "cliente_id": cliente_id,
            "vehiculo_marca": "Kia",
            "vehiculo_modelo": null,
            "vehiculo_anio": null,
            "placas": "",
            "descripcion": null,
            "conceptos": [{ "id": null, "descripcion": "Facia delantera", "cantidad": 1, "precio_unitario": 2500 }],
            "notas": null
        }))
        .unwrap();
        assert_eq!(nueva.anticipo, 0.0);

        let c = crear(&conn, &nueva).unwrap();
        assert_eq!(c.conceptos[0].importe, 2500.0);
        assert_eq!(c.cotizacion.placas, None);
        assert_eq!(c.cotizacion.total, 2900.0);
    }

    #[test]
    fn eliminar_borra_conceptos() {
        let (db, cliente_id) = con_cliente();
        let conn = db.conn.lock().unwrap();
        let id = crear(&conn, &nueva_de_prueba(cliente_id, &[("Pintura", 1.0, 10.0)]))
            .unwrap()
            .cotizacion
            .id
            .unwrap();
        eliminar(&conn, id).unwrap();
        let conceptos: i64 = conn
            .query_row("SELECT COUNT(*) FROM cotizacion_conceptos", [], |r| r.get(0))
            .unwrap();
        assert_eq!(conceptos, 0);
        assert!(matches!(eliminar(&conn, id), Err(TallerError::NoEncontrado(_))));
    }
}
