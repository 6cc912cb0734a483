use crate::commands::{clientes, config, notificaciones};
use crate::db::Database;
use crate::error::{o_no_encontrado, Resultado, TallerError};
use crate::logica::validacion::{normalizar_telefono, opcional};
use crate::logica::whatsapp;
use crate::models::{Cliente, Contacto, ResumenWhatsapp};
use rusqlite::Connection;
use tauri::State;
use tracing::info;

const COLUMNAS: &str =
    "id, nombre, telefono, vehiculo, servicios, resumen, origen, cliente_id, created_at";

fn mapear(row: &rusqlite::Row) -> rusqlite::Result<Contacto> {
    Ok(Contacto {
        id: Some(row.get(0)?),
        nombre: row.get(1)?,
        telefono: row.get(2)?,
        vehiculo: row.get(3)?,
        servicios: row.get(4)?,
        resumen: row.get(5)?,
        origen: row.get(6)?,
        cliente_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub fn analizar(conn: &Connection, texto: &str) -> ResumenWhatsapp {
    let negocio = config::valor(conn, "nombre_negocio");
    whatsapp::analizar_chat(texto, negocio.as_deref())
}

fn insertar(conn: &Connection, contacto: &Contacto) -> Resultado<Contacto> {
    let origen = match contacto.origen.trim().to_uppercase() {
        o if o.is_empty() => "MANUAL".to_string(),
        o => o,
    };
    conn.execute(
        "INSERT INTO contactos (nombre, telefono, vehiculo, servicios, resumen, origen)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            opcional(contacto.nombre.clone()),
            opcional(contacto.telefono.clone()),
            opcional(contacto.vehiculo.clone()),
            opcional(contacto.servicios.clone()),
            opcional(contacto.resumen.clone()),
            origen,
        ],
    )?;
    let id = conn.last_insert_rowid();

    notificaciones::registrar(
        conn,
        "CONTACTO",
        "Nuevo contacto",
        Some(
            contacto
                .nombre
                .as_deref()
                .or(contacto.telefono.as_deref())
                .unwrap_or("Sin nombre"),
        ),
        Some(id),
    );
    obtener(conn, id)
}

/// Analiza la conversación y guarda lo detectado como contacto
pub fn importar(conn: &Connection, texto: &str) -> Resultado<Contacto> {
    if texto.trim().is_empty() {
        return Err(TallerError::validacion("Pegue el texto de la conversación"));
    }
    let resumen = analizar(conn, texto);
    if resumen.nombre.is_none() && resumen.telefono.is_none() && resumen.servicios.is_empty() {
        return Err(TallerError::validacion(
            "No se encontraron datos de contacto en la conversación",
        ));
    }

    let contacto = Contacto {
        id: None,
        nombre: resumen.nombre.clone(),
        telefono: resumen.telefono.clone(),
        vehiculo: resumen.vehiculo(),
        servicios: Some(resumen.servicios.join(", ")),
        resumen: Some(resumen.resumen.clone()),
        origen: "WHATSAPP".to_string(),
        cliente_id: None,
        created_at: None,
    };
    let guardado = insertar(conn, &contacto)?;
    info!(contacto_id = ?guardado.id, mensajes = resumen.mensajes, "chat de WhatsApp importado");
    Ok(guardado)
}

pub fn crear(conn: &Connection, contacto: &Contacto) -> Resultado<Contacto> {
    if opcional(contacto.nombre.clone()).is_none() && opcional(contacto.telefono.clone()).is_none() {
        return Err(TallerError::validacion("Indique al menos el nombre o el teléfono"));
    }
    insertar(conn, contacto)
}

pub fn obtener(conn: &Connection, id: i64) -> Resultado<Contacto> {
    o_no_encontrado(
        conn.query_row(
            &format!("SELECT {} FROM contactos WHERE id = ?1", COLUMNAS),
            rusqlite::params![id],
            mapear,
        ),
        "Contacto",
    )
}

pub fn listar(conn: &Connection) -> Resultado<Vec<Contacto>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contactos ORDER BY created_at DESC, id DESC",
        COLUMNAS
    ))?;
    let contactos = stmt
        .query_map([], mapear)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contactos)
}

pub fn eliminar(conn: &Connection, id: i64) -> Resultado<()> {
    let borrados = conn.execute("DELETE FROM contactos WHERE id = ?1", rusqlite::params![id])?;
    if borrados == 0 {
        return Err(TallerError::no_encontrado("Contacto"));
    }
    Ok(())
}

/// Da de alta al contacto como cliente y deja el vínculo en `cliente_id`
pub fn convertir_en_cliente(conn: &Connection, id: i64) -> Resultado<Cliente> {
    let tx = conn.unchecked_transaction()?;
    let contacto = obtener(&tx, id)?;
    if contacto.cliente_id.is_some() {
        return Err(TallerError::Duplicado(
            "El contacto ya fue convertido en cliente".to_string(),
        ));
    }

    let notas = [
        contacto.vehiculo.as_ref().map(|v| format!("Vehículo: {}", v)),
        contacto.resumen.clone(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n");

    let cliente = Cliente {
        nombre: contacto.nombre.clone().unwrap_or_default(),
        telefono: contacto
            .telefono
            .as_deref()
            .map(normalizar_telefono)
            .unwrap_or_default(),
        notas: Some(notas),
        activo: true,
        ..Default::default()
    };
    let cliente_id = clientes::crear(&tx, &cliente)?;
    tx.execute(
        "UPDATE contactos SET cliente_id = ?1 WHERE id = ?2",
        rusqlite::params![cliente_id, id],
    )?;
    let creado = clientes::obtener(&tx, cliente_id)?;
    tx.commit()?;

    info!(contacto_id = id, cliente_id, "contacto convertido en cliente");
    Ok(creado)
}

#[tauri::command]
pub fn analizar_chat_whatsapp(db: State<Database>, texto: String) -> Result<ResumenWhatsapp, String> {
    db.con(|conn| Ok(analizar(conn, &texto)))
}

#[tauri::command]
pub fn importar_chat_whatsapp(db: State<Database>, texto: String) -> Result<Contacto, String> {
    db.con(|conn| importar(conn, &texto))
}

#[tauri::command]
pub fn crear_contacto(db: State<Database>, contacto: Contacto) -> Result<Contacto, String> {
    db.con(|conn| crear(conn, &contacto))
}

#[tauri::command]
pub fn listar_contactos(db: State<Database>) -> Result<Vec<Contacto>, String> {
    db.con(listar)
}

#[tauri::command]
pub fn eliminar_contacto(db: State<Database>, id: i64) -> Result<(), String> {
    db.con(|conn| eliminar(conn, id))
}

#[tauri::command]
pub fn convertir_contacto_en_cliente(db: State<Database>, id: i64) -> Result<Cliente, String> {
    db.con(|conn| convertir_en_cliente(conn, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CHAT: &str = "[12/03/24, 10:15:22] Hojalatería Sánchez: Buenas tardes
[12/03/24, 10:16:05] Marta Gil: Hola, me pegaron en la facia de mi Toyota Corolla 2019
[12/03/24, 10:16:40] Marta Gil: mi cel es 81 2345 6789";

    fn con_negocio() -> Database {
        let db = Database::en_memoria();
        {
            let conn = db.conn.lock().unwrap();
            let mut cfg = HashMap::new();
            cfg.insert("nombre_negocio".to_string(), "Hojalatería Sánchez".to_string());
            config::guardar(&conn, &cfg).unwrap();
        }
        db
    }

    #[test]
    fn importar_y_convertir() {
        let db = con_negocio();
        let conn = db.conn.lock().unwrap();

        let contacto = importar(&conn, CHAT).unwrap();
        assert_eq!(contacto.nombre.as_deref(), Some("Marta Gil"));
        assert_eq!(contacto.telefono.as_deref(), Some("8123456789"));
        assert_eq!(contacto.vehiculo.as_deref(), Some("Toyota Corolla 2019"));
        assert_eq!(contacto.origen, "WHATSAPP");
        assert_eq!(listar(&conn).unwrap().len(), 1);

        let id = contacto.id.unwrap();
        let cliente = convertir_en_cliente(&conn, id).unwrap();
        assert_eq!(cliente.nombre, "Marta Gil");
        assert_eq!(cliente.telefono, "8123456789");
        assert!(cliente.notas.unwrap().contains("Toyota Corolla 2019"));
        assert_eq!(obtener(&conn, id).unwrap().cliente_id, cliente.id);

        assert!(matches!(convertir_en_cliente(&conn, id), Err(TallerError::Duplicado(_))));
    }

    #[test]
    fn conversion_fallida_no_vincula() {
        let db = con_negocio();
        let conn = db.conn.lock().unwrap();
        let sin_telefono = crear(
            &conn,
            &Contacto {
                id: None,
                nombre: Some("Pablo".to_string()),
                telefono: None,
                vehiculo: None,
                servicios: None,
                resumen: None,
                origen: String::new(),
                cliente_id: None,
                created_at: None,
            },
        )
        .unwrap();
        assert_eq!(sin_telefono.origen, "MANUAL");

        let id = sin_telefono.id.unwrap();
        assert!(convertir_en_cliente(&conn, id).is_err());
        assert_eq!(obtener(&conn, id).unwrap().cliente_id, None);
        assert!(clientes::listar(&conn).unwrap().is_empty());
    }

    #[test]
    fn texto_vacio_o_sin_datos() {
        let db = con_negocio();
        let conn = db.conn.lock().unwrap();
        assert!(importar(&conn, "   ").is_err());
        assert!(importar(&conn, "ok gracias").is_err());
        assert!(listar(&conn).unwrap().is_empty());
    }
}
